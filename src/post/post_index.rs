use super::post_controller::{create_post, delete_post, list_posts, update_post};
use crate::comment::controller::create_comment;
use actix_web::web;

pub fn post_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/posts", web::get().to(list_posts))
        .service(
            web::scope("/api/post")
                .route("", web::post().to(create_post))
                .route("/{id}", web::put().to(update_post))
                .route("/{id}", web::delete().to(delete_post))
                .route("/{id}/comment", web::post().to(create_comment)),
        );
}
