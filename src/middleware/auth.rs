use actix_web::cookie::{Cookie, SameSite};
use actix_web::{HttpRequest, web};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::user::model::User;
use crate::user::service::UserService;
use crate::utils::error::CustomError;

pub const SESSION_COOKIE: &str = "session";
pub const ADMIN_SECRET_HEADER: &str = "X-Admin-Secret";
const SESSION_DAYS: i64 = 30;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub id: String,
    pub exp: usize,
}

#[derive(Debug, Deserialize)]
struct AdminKey {
    key: Option<String>,
}

/// Sign a session token for `user_id`.
pub fn create_session_token(user_id: &str, secret: &str) -> Result<String, CustomError> {
    let expiration = chrono::Utc::now()
        .checked_add_signed(chrono::Duration::days(SESSION_DAYS))
        .ok_or_else(|| CustomError::InternalServerError("Invalid session expiry".to_string()))?
        .timestamp() as usize;

    let claims = Claims {
        id: user_id.to_owned(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| CustomError::InternalServerError("Token generation failed".to_string()))
}

/// Claims of a valid, unexpired token; `None` for anything else.
pub fn decode_session_token(token: &str, secret: &str) -> Option<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .ok()
    .map(|data| data.claims)
}

pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish()
}

pub fn expired_session_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(SESSION_COOKIE, "").path("/").finish();
    cookie.make_removal();
    cookie
}

fn app_config(req: &HttpRequest) -> Result<&web::Data<AppConfig>, CustomError> {
    req.app_data::<web::Data<AppConfig>>()
        .ok_or_else(|| CustomError::InternalServerError("Configuration missing".to_string()))
}

/// User id carried by the request's session cookie, if it verifies.
pub fn session_user_id(req: &HttpRequest) -> Result<Option<String>, CustomError> {
    let config = app_config(req)?;
    Ok(req
        .cookie(SESSION_COOKIE)
        .and_then(|c| decode_session_token(c.value(), &config.session_secret))
        .map(|claims| claims.id))
}

/// The logged-in user, looked up fresh from the users document.
pub fn current_user(req: &HttpRequest) -> Result<Option<User>, CustomError> {
    let Some(uid) = session_user_id(req)? else {
        return Ok(None);
    };
    let users = req
        .app_data::<web::Data<UserService>>()
        .ok_or_else(|| CustomError::InternalServerError("User service missing".to_string()))?;
    users.find(&uid)
}

pub fn require_user(req: &HttpRequest) -> Result<User, CustomError> {
    current_user(req)?.ok_or_else(|| CustomError::UnauthenticatedError("Login required".to_string()))
}

/// Admin access: a logged-in admin, or the shared secret in the
/// `X-Admin-Secret` header or the `key` query parameter.
pub fn require_admin(req: &HttpRequest) -> Result<(), CustomError> {
    if current_user(req)?.is_some_and(|u| u.is_admin) {
        return Ok(());
    }

    let config = app_config(req)?;
    let header_secret = req
        .headers()
        .get(ADMIN_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let supplied = header_secret.or_else(|| {
        web::Query::<AdminKey>::from_query(req.query_string())
            .ok()
            .and_then(|q| q.into_inner().key)
    });

    if supplied.as_deref() == Some(config.admin_secret.as_str()) {
        return Ok(());
    }

    log::warn!("rejected admin request to {}", req.path());
    Err(CustomError::UnauthorizedError("Admin access required".to_string()))
}
