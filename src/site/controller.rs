use actix_files::NamedFile;
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;

use crate::config::AppConfig;
use crate::middleware::auth::{current_user, require_admin};
use crate::site::model::UpdateSiteRequest;
use crate::site::service::SiteService;
use crate::utils::error::CustomError;
use crate::utils::helpers::ok_response;

fn page(config: &AppConfig, name: &str) -> Result<NamedFile, CustomError> {
    NamedFile::open(config.static_dir.join(name))
        .map_err(|_| CustomError::NotFoundError(format!("{} is missing", name)))
}

/// GET /
pub async fn index_page(config: web::Data<AppConfig>) -> Result<NamedFile, CustomError> {
    page(&config, "index.html")
}

/// GET /admin, only for logged-in admins
pub async fn admin_page(
    req: HttpRequest,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, CustomError> {
    if !current_user(&req)?.is_some_and(|u| u.is_admin) {
        return Ok(HttpResponse::Found()
            .insert_header((header::LOCATION, "/login"))
            .finish());
    }
    Ok(page(&config, "admin.html")?.into_response(&req))
}

/// GET /api/site
pub async fn get_site(site_service: web::Data<SiteService>) -> Result<HttpResponse, CustomError> {
    let site = site_service.load()?;
    Ok(ok_response("Site profile fetched successfully", json!(site)))
}

/// PUT /api/site
pub async fn update_site(
    req: HttpRequest,
    body: web::Json<UpdateSiteRequest>,
    site_service: web::Data<SiteService>,
) -> Result<HttpResponse, CustomError> {
    require_admin(&req)?;
    let site = site_service.update(body.into_inner())?;
    Ok(ok_response("Site profile updated successfully", json!(site)))
}
