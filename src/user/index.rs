use super::controller::{callback, list_users, login, logout, me, update_user};
use actix_web::web;

pub fn user_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/login", web::get().to(login))
        .route("/callback", web::get().to(callback))
        .route("/logout", web::get().to(logout))
        .route("/api/me", web::get().to(me))
        .service(
            web::scope("/api/users")
                .route("", web::get().to(list_users))
                .route("/{id}", web::put().to(update_user)),
        );
}
