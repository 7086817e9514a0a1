use actix_web::http::StatusCode;
use actix_web::middleware::{ErrorHandlers, Logger};
use actix_web::{App, HttpServer};
use env_logger::Env;
use log::{info, warn};

use antisocial::config::AppConfig;
use antisocial::middleware::error_handler::handle_error;
use antisocial::middleware::not_found::not_found;
use antisocial::{AppState, configure};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;
    if config.uses_default_admin_secret() {
        warn!("ADMIN_SECRET is not set; the default secret grants admin access");
    }
    std::fs::create_dir_all(config.upload_dir())?;

    let state = AppState::new(config.clone()).map_err(|e| std::io::Error::other(e.to_string()))?;

    info!(
        "Starting server on http://{}:{} (data in {})",
        config.host,
        config.port,
        config.data_dir.display()
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(
                ErrorHandlers::new()
                    .handler(StatusCode::NOT_FOUND, not_found)
                    .default_handler(handle_error),
            )
            .configure(|cfg| configure(cfg, &state))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    info!("Server has stopped");

    Ok(())
}
