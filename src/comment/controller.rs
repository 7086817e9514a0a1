use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;

use crate::comment::model::CreateCommentRequest;
use crate::comment::service::CommentService;
use crate::middleware::auth::require_user;
use crate::utils::error::CustomError;
use crate::utils::helpers::ok_response;

/// Add a comment, or a reply when `parent`/`parent_id` is set
/// POST /api/post/{id}/comment
pub async fn create_comment(
    req: HttpRequest,
    post_id: web::Path<String>,
    body: web::Json<CreateCommentRequest>,
    comment_service: web::Data<CommentService>,
) -> Result<HttpResponse, CustomError> {
    let user = require_user(&req)?;
    let text = body.text.as_deref().unwrap_or("");

    let comment = comment_service.add(&post_id, text, &user.id, body.parent_id())?;

    Ok(ok_response(
        "Comment created successfully",
        json!({ "comment": comment }),
    ))
}
