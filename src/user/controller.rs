use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;

use crate::config::AppConfig;
use crate::middleware::auth::{
    create_session_token, current_user, expired_session_cookie, require_admin, session_cookie,
};
use crate::user::model::UpdateUserRequest;
use crate::user::oauth::{CallbackQuery, DiscordClient};
use crate::user::service::UserService;
use crate::utils::error::CustomError;
use crate::utils::helpers::ok_response;

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// GET /login
pub async fn login(discord: web::Data<DiscordClient>) -> Result<HttpResponse, CustomError> {
    if !discord.is_configured() {
        return Err(CustomError::InternalServerError(
            "Discord OAuth not configured".to_string(),
        ));
    }
    Ok(redirect(&discord.authorize_url()?))
}

/// GET /callback?code=
pub async fn callback(
    query: web::Query<CallbackQuery>,
    config: web::Data<AppConfig>,
    discord: web::Data<DiscordClient>,
    user_service: web::Data<UserService>,
) -> Result<HttpResponse, CustomError> {
    let Some(code) = query.into_inner().code.filter(|c| !c.is_empty()) else {
        return Ok(redirect("/"));
    };

    let access_token = discord.exchange_code(&code).await?;
    let info = discord.fetch_user(&access_token).await?;
    let user = user_service.upsert_login(&info.id, &info.username, info.avatar_url())?;

    let token = create_session_token(&user.id, &config.session_secret)?;
    log::info!("user {} logged in", user.id);

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, "/"))
        .cookie(session_cookie(token))
        .finish())
}

/// GET /logout
pub async fn logout() -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, "/"))
        .cookie(expired_session_cookie())
        .finish()
}

/// GET /api/me
pub async fn me(req: HttpRequest) -> Result<HttpResponse, CustomError> {
    let user = current_user(&req)?;
    Ok(ok_response("Current user", json!({ "user": user })))
}

/// GET /api/users
pub async fn list_users(
    req: HttpRequest,
    user_service: web::Data<UserService>,
) -> Result<HttpResponse, CustomError> {
    require_admin(&req)?;
    let users = user_service.list()?;

    Ok(ok_response(
        "Users fetched successfully",
        json!({ "users": users }),
    ))
}

/// PUT /api/users/{id}
pub async fn update_user(
    req: HttpRequest,
    user_id: web::Path<String>,
    body: web::Json<UpdateUserRequest>,
    user_service: web::Data<UserService>,
) -> Result<HttpResponse, CustomError> {
    require_admin(&req)?;
    let user = user_service.set_admin(&user_id, body.wants_admin())?;

    Ok(ok_response(
        "User updated successfully",
        json!({ "user": user }),
    ))
}
