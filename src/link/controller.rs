use actix_web::{HttpResponse, web};
use serde_json::json;

use crate::link::detect::{DetectRequest, classify};
use crate::link::preview::{LinkPreviewer, PreviewQuery};
use crate::utils::error::CustomError;
use crate::utils::helpers::ok_response;

/// Scrape title, description and image for a URL. Fetch failures still answer 200.
/// GET /api/preview?url=
pub async fn preview(
    query: web::Query<PreviewQuery>,
    previewer: web::Data<LinkPreviewer>,
) -> Result<HttpResponse, CustomError> {
    let url = query
        .url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| CustomError::ValidationError("Missing url".to_string()))?;

    let preview = previewer.preview(url).await;
    let message = if preview.error.is_some() {
        "Preview unavailable"
    } else {
        "Preview generated successfully"
    };
    Ok(ok_response(message, json!(preview)))
}

/// POST /api/detect
pub async fn detect(body: web::Json<DetectRequest>) -> HttpResponse {
    ok_response("Content type detected", json!(classify(&body.url)))
}
