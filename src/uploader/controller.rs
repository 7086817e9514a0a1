use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;

use crate::config::AppConfig;
use crate::middleware::auth::require_admin;
use crate::post::post_controller::ensure_within_limit;
use crate::utils::error::CustomError;
use crate::utils::helpers::ok_response;
use crate::utils::uploads::{UploadService, read_multipart};

/// Store a single file and return its public URL
/// POST /api/upload
pub async fn upload_file(
    req: HttpRequest,
    payload: web::Payload,
    config: web::Data<AppConfig>,
    upload_service: web::Data<UploadService>,
) -> Result<HttpResponse, CustomError> {
    require_admin(&req)?;
    ensure_within_limit(&req, config.max_upload_bytes)?;

    let form =
        read_multipart(Multipart::new(req.headers(), payload), config.max_upload_bytes).await?;
    let file = form
        .files
        .first()
        .ok_or_else(|| CustomError::BadRequestError("No file part".to_string()))?;

    let url = upload_service.save(file, None)?;

    Ok(ok_response(
        "File uploaded successfully",
        json!({ "url": url }),
    ))
}
