//! Single-owner microblog backend: posts with nested comments, link previews,
//! and a site profile, persisted as JSON documents on disk.

pub mod comment;
pub mod config;
pub mod database;
pub mod link;
pub mod middleware;
pub mod post;
pub mod router;
pub mod site;
pub mod uploader;
pub mod user;
pub mod utils;

use actix_files::Files;
use actix_web::web;

use comment::service::CommentService;
use config::AppConfig;
use database::JsonStore;
use link::preview::LinkPreviewer;
use post::post_service::PostService;
use site::service::SiteService;
use user::oauth::DiscordClient;
use user::service::UserService;
use utils::error::CustomError;
use utils::uploads::UploadService;

/// Services shared by every worker, built once from the configuration.
#[derive(Clone)]
pub struct AppState {
    pub config: web::Data<AppConfig>,
    pub posts: web::Data<PostService>,
    pub comments: web::Data<CommentService>,
    pub users: web::Data<UserService>,
    pub site: web::Data<SiteService>,
    pub uploads: web::Data<UploadService>,
    pub previewer: web::Data<LinkPreviewer>,
    pub discord: web::Data<DiscordClient>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, CustomError> {
        let store = JsonStore::new(config.data_dir.clone());
        let previewer = LinkPreviewer::new(config.preview_timeout)?;

        Ok(AppState {
            posts: web::Data::new(PostService::new(store.clone())),
            comments: web::Data::new(CommentService::new(store.clone())),
            users: web::Data::new(UserService::new(store.clone())),
            site: web::Data::new(SiteService::new(store)),
            uploads: web::Data::new(UploadService::new(config.upload_dir())),
            previewer: web::Data::new(previewer),
            discord: web::Data::new(DiscordClient::new(config.discord.clone())),
            config: web::Data::new(config),
        })
    }
}

fn json_error(err: actix_web::error::JsonPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    CustomError::BadRequestError(err.to_string()).into()
}

/// Register shared state, API routes and the static front-end.
pub fn configure(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.app_data(state.config.clone())
        .app_data(state.posts.clone())
        .app_data(state.comments.clone())
        .app_data(state.users.clone())
        .app_data(state.site.clone())
        .app_data(state.uploads.clone())
        .app_data(state.previewer.clone())
        .app_data(state.discord.clone())
        .app_data(
            web::JsonConfig::default()
                .content_type_required(false)
                .error_handler(json_error),
        )
        .configure(router::index::routes)
        .service(Files::new("/static", state.config.static_dir.clone()));
}
