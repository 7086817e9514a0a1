use actix_multipart::Multipart;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, web};
use futures_util::StreamExt;
use serde_json::json;

use crate::config::AppConfig;
use crate::middleware::auth::{require_admin, require_user};
use crate::post::post_model::{CreatePostRequest, TagsInput, UpdatePostRequest};
use crate::post::post_service::{PostService, project};
use crate::user::service::UserService;
use crate::utils::error::CustomError;
use crate::utils::helpers::ok_response;
use crate::utils::uploads::{FileUpload, UploadService, read_multipart};

/// Reject requests whose declared length is over the upload cap.
pub fn ensure_within_limit(req: &HttpRequest, max_bytes: usize) -> Result<(), CustomError> {
    let declared = req
        .headers()
        .get(actix_web::http::header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());

    match declared {
        Some(len) if len > max_bytes => Err(CustomError::BadRequestError(format!(
            "Payload too large: {} bytes (limit {})",
            len, max_bytes
        ))),
        _ => Ok(()),
    }
}

async fn read_body(mut payload: web::Payload, max_bytes: usize) -> Result<Vec<u8>, CustomError> {
    let mut body = Vec::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk
            .map_err(|e| CustomError::BadRequestError(format!("Error reading body: {}", e)))?;
        if body.len() + chunk.len() > max_bytes {
            return Err(CustomError::BadRequestError("Payload too large".to_string()));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

/// Post fields from a multipart form, a urlencoded form, or a JSON body.
async fn read_post_fields(
    req: &HttpRequest,
    payload: web::Payload,
    max_bytes: usize,
) -> Result<(CreatePostRequest, Vec<FileUpload>), CustomError> {
    if req.content_type() == "multipart/form-data" {
        let form = read_multipart(Multipart::new(req.headers(), payload), max_bytes).await?;
        let fields = CreatePostRequest {
            title: form.field("title"),
            text: form.field("text"),
            tags: form.field("tags").map(TagsInput::Joined),
        };
        return Ok((fields, form.files));
    }

    let body = read_body(payload, max_bytes).await?;
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok((CreatePostRequest::default(), Vec::new()));
    }

    let fields = if req.content_type() == "application/x-www-form-urlencoded" {
        let raw = String::from_utf8_lossy(&body);
        web::Query::<CreatePostRequest>::from_query(&raw)
            .map(web::Query::into_inner)
            .map_err(|e| CustomError::BadRequestError(format!("Invalid form body: {}", e)))?
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| CustomError::BadRequestError(format!("Invalid JSON body: {}", e)))?
    };
    Ok((fields, Vec::new()))
}

/// GET /api/posts
pub async fn list_posts(
    post_service: web::Data<PostService>,
    user_service: web::Data<UserService>,
) -> Result<HttpResponse, CustomError> {
    let users = user_service.index()?;
    let posts: Vec<_> = post_service
        .list_posts()?
        .into_iter()
        .map(|p| project(p, &users))
        .collect();

    Ok(ok_response(
        "Posts fetched successfully",
        json!({ "posts": posts }),
    ))
}

/// POST /api/post
pub async fn create_post(
    req: HttpRequest,
    payload: web::Payload,
    config: web::Data<AppConfig>,
    post_service: web::Data<PostService>,
    upload_service: web::Data<UploadService>,
) -> Result<HttpResponse, CustomError> {
    let user = require_user(&req)?;
    ensure_within_limit(&req, config.max_upload_bytes)?;

    let (fields, files) = read_post_fields(&req, payload, config.max_upload_bytes).await?;
    let media_urls = upload_service.save_all(&files)?;
    let post = post_service.create_post(fields, media_urls, &user.id)?;

    Ok(ok_response(
        "Post created successfully",
        json!({ "post": post }),
    ))
}

/// PUT /api/post/{id}
pub async fn update_post(
    req: HttpRequest,
    post_id: web::Path<String>,
    body: web::Json<UpdatePostRequest>,
    post_service: web::Data<PostService>,
) -> Result<HttpResponse, CustomError> {
    require_admin(&req)?;
    let post = post_service.update_post(&post_id.into_inner(), body.into_inner())?;

    Ok(ok_response(
        "Post updated successfully",
        json!({ "post": post }),
    ))
}

/// DELETE /api/post/{id}
pub async fn delete_post(
    req: HttpRequest,
    post_id: web::Path<String>,
    post_service: web::Data<PostService>,
) -> Result<HttpResponse, CustomError> {
    require_admin(&req)?;
    let deleted = post_service.delete_post(&post_id.into_inner())?;

    Ok(ok_response(
        "Post deleted successfully",
        json!({ "deleted": deleted }),
    ))
}
