use super::controller::upload_file;
use actix_web::web;

pub fn upload_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/upload", web::post().to(upload_file));
}
