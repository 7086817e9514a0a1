use super::controller::{detect, preview};
use actix_web::web;

pub fn link_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/preview", web::get().to(preview))
        .route("/api/detect", web::post().to(detect));
}
