use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use chrono::Local;
use serde_json::{Map, Value, json};
use std::sync::atomic::{AtomicI64, Ordering};

/// Last millisecond stamp handed out by [`next_id`].
static LAST_ID_MILLIS: AtomicI64 = AtomicI64::new(0);

pub fn service_name() -> String {
    std::env::var("SERVICE_NAME").unwrap_or_else(|_| "Unknown".to_string())
}

/// Millisecond timestamp that never repeats within this process.
///
/// Two calls in the same millisecond get consecutive values.
pub fn unique_millis() -> i64 {
    let now = chrono::Utc::now().timestamp_millis();
    let mut last = LAST_ID_MILLIS.load(Ordering::Relaxed);
    loop {
        let next = if now > last { now } else { last + 1 };
        match LAST_ID_MILLIS.compare_exchange_weak(last, next, Ordering::AcqRel, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(actual) => last = actual,
        }
    }
}

/// Time-derived identifier such as `p-1718000000000`.
pub fn next_id(prefix: &str) -> String {
    format!("{}-{}", prefix, unique_millis())
}

/// Today's local date as `YYYY-MM-DD`.
pub fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Build the standard success envelope and merge the payload's keys into it.
pub fn success_response(status: StatusCode, message: &str, payload: Value) -> HttpResponse {
    let mut body = Map::new();
    body.insert("success".into(), json!(true));
    body.insert("ok".into(), json!(true));
    body.insert("message".into(), json!(message));
    body.insert("httpStatusCode".into(), json!(status.as_u16()));
    body.insert("service".into(), json!(service_name()));

    match payload {
        Value::Object(fields) => body.extend(fields),
        Value::Null => {}
        other => {
            body.insert("data".into(), other);
        }
    }

    HttpResponse::build(status).json(Value::Object(body))
}

pub fn ok_response(message: &str, payload: Value) -> HttpResponse {
    success_response(StatusCode::OK, message, payload)
}
