use super::controller::{admin_page, get_site, index_page, update_site};
use actix_web::web;

pub fn site_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index_page))
        .route("/admin", web::get().to(admin_page))
        .service(
            web::resource("/api/site")
                .route(web::get().to(get_site))
                .route(web::put().to(update_site)),
        );
}
