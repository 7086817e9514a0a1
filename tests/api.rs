use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::http::header::CONTENT_LENGTH;
use actix_web::middleware::ErrorHandlers;
use actix_web::{App, test};
use serde_json::{Value, json};
use std::path::Path;
use std::time::Duration;
use tempfile::{TempDir, tempdir};

use antisocial::config::AppConfig;
use antisocial::database::Collection;
use antisocial::middleware::auth::{ADMIN_SECRET_HEADER, SESSION_COOKIE, create_session_token};
use antisocial::middleware::error_handler::handle_error;
use antisocial::middleware::not_found::not_found;
use antisocial::{AppState, configure};

const ADMIN_SECRET: &str = "test-admin-secret";
const SESSION_SECRET: &str = "test-session-secret";

fn test_state(dir: &Path) -> AppState {
    test_state_with_cap(dir, AppConfig::default().max_upload_bytes)
}

fn test_state_with_cap(dir: &Path, max_upload_bytes: usize) -> AppState {
    let config = AppConfig {
        max_upload_bytes,
        data_dir: dir.join("data"),
        static_dir: dir.join("static"),
        admin_secret: ADMIN_SECRET.to_string(),
        session_secret: SESSION_SECRET.to_string(),
        preview_timeout: Duration::from_secs(2),
        ..AppConfig::default()
    };
    AppState::new(config).expect("app state")
}

fn setup() -> (TempDir, AppState) {
    let dir = tempdir().expect("tempdir");
    let state = test_state(dir.path());
    (dir, state)
}

macro_rules! test_app {
    ($state:expr) => {{
        let state = $state.clone();
        test::init_service(
            App::new()
                .wrap(
                    ErrorHandlers::new()
                        .handler(StatusCode::NOT_FOUND, not_found)
                        .default_handler(handle_error),
                )
                .configure(move |cfg| configure(cfg, &state)),
        )
        .await
    }};
}

/// Register a user through the login path and return a session cookie for them.
fn login(state: &AppState, id: &str, name: &str) -> Cookie<'static> {
    state.users.upsert_login(id, name, None).expect("upsert user");
    let token = create_session_token(id, SESSION_SECRET).expect("token");
    Cookie::new(SESSION_COOKIE, token)
}

#[actix_web::test]
async fn empty_store_lists_no_posts() {
    let (_dir, state) = setup();
    let app = test_app!(state);

    let req = test::TestRequest::get().uri("/api/posts").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["posts"], json!([]));
}

#[actix_web::test]
async fn creating_a_post_requires_login() {
    let (_dir, state) = setup();
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/post")
        .set_json(json!({"text": "hello"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], json!(false));
}

#[actix_web::test]
async fn link_post_is_created_and_listed_with_author() {
    let (_dir, state) = setup();
    let session = login(&state, "u1", "alice");
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/post")
        .cookie(session)
        .set_json(json!({"title": "Read", "text": "look https://example.com/a", "tags": "x, y"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let created: Value = test::read_body_json(resp).await;
    assert_eq!(created["post"]["type"], json!("link"));
    assert_eq!(created["post"]["url"], json!("https://example.com/a"));
    assert_eq!(created["post"]["text"], json!("look"));
    assert_eq!(created["post"]["tags"], json!(["x", "y"]));

    let req = test::TestRequest::get().uri("/api/posts").to_request();
    let listed: Value = test::call_and_read_body_json(&app, req).await;
    let post = &listed["posts"][0];
    assert_eq!(post["id"], created["post"]["id"]);
    assert_eq!(post["user"]["name"], json!("alice"));
    assert_eq!(post["comment_count"], json!(0));
}

#[actix_web::test]
async fn multipart_upload_makes_photo_post() {
    let (dir, state) = setup();
    let session = login(&state, "u1", "alice");
    let app = test_app!(state);

    let boundary = "XBOUNDARYX";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"text\"\r\n\r\nholiday\r\n\
         --{b}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"one.PNG\"\r\nContent-Type: image/png\r\n\r\nfirst\r\n\
         --{b}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"two.jpg\"\r\nContent-Type: image/jpeg\r\n\r\nsecond\r\n\
         --{b}--\r\n",
        b = boundary
    );
    let req = test::TestRequest::post()
        .uri("/api/post")
        .cookie(session)
        .insert_header((
            "content-type",
            format!("multipart/form-data; boundary={}", boundary),
        ))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let created: Value = test::read_body_json(resp).await;
    let post = &created["post"];
    assert_eq!(post["type"], json!("photo"));
    assert_eq!(post["text"], json!("holiday"));
    let urls = post["urls"].as_array().expect("urls");
    assert_eq!(urls.len(), 2);
    assert_eq!(post["url"], urls[0]);
    assert!(urls[0].as_str().unwrap().ends_with("-0.png"));
    assert!(urls[1].as_str().unwrap().ends_with("-1.jpg"));

    let stored = urls[1].as_str().unwrap().trim_start_matches("/static/");
    assert!(dir.path().join("static").join(stored).exists());
}

fn multipart_with_file(boundary: &str, size: usize) -> String {
    format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"big.png\"\r\n\r\n{data}\r\n--{b}--\r\n",
        b = boundary,
        data = "x".repeat(size)
    )
}

fn stored_uploads(dir: &Path) -> usize {
    std::fs::read_dir(dir.join("static").join("uploads"))
        .map(|entries| entries.count())
        .unwrap_or(0)
}

#[actix_web::test]
async fn oversized_multipart_without_length_is_rejected() {
    let dir = tempdir().unwrap();
    let state = test_state_with_cap(dir.path(), 64);
    let session = login(&state, "u1", "alice");
    let app = test_app!(state);

    let boundary = "CAPBOUNDARY";
    let mut req = test::TestRequest::post()
        .uri("/api/post")
        .cookie(session)
        .insert_header((
            "content-type",
            format!("multipart/form-data; boundary={}", boundary),
        ))
        .set_payload(multipart_with_file(boundary, 10_000))
        .to_request();
    req.headers_mut().remove(CONTENT_LENGTH);

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(stored_uploads(dir.path()), 0);

    let req = test::TestRequest::get().uri("/api/posts").to_request();
    let listed: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed["posts"], json!([]));
}

#[actix_web::test]
async fn oversized_admin_upload_without_length_is_rejected() {
    let dir = tempdir().unwrap();
    let state = test_state_with_cap(dir.path(), 64);
    let app = test_app!(state);

    let boundary = "CAPBOUNDARY";
    let mut req = test::TestRequest::post()
        .uri("/api/upload")
        .insert_header((ADMIN_SECRET_HEADER, ADMIN_SECRET))
        .insert_header((
            "content-type",
            format!("multipart/form-data; boundary={}", boundary),
        ))
        .set_payload(multipart_with_file(boundary, 10_000))
        .to_request();
    req.headers_mut().remove(CONTENT_LENGTH);

    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    assert_eq!(stored_uploads(dir.path()), 0);
}

#[actix_web::test]
async fn oversized_json_body_without_length_is_rejected() {
    let dir = tempdir().unwrap();
    let state = test_state_with_cap(dir.path(), 64);
    let session = login(&state, "u1", "alice");
    let app = test_app!(state);

    let mut req = test::TestRequest::post()
        .uri("/api/post")
        .cookie(session)
        .set_json(json!({"text": "y".repeat(500)}))
        .to_request();
    req.headers_mut().remove(CONTENT_LENGTH);

    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn declared_length_over_cap_is_rejected_up_front() {
    let dir = tempdir().unwrap();
    let state = test_state_with_cap(dir.path(), 64);
    let session = login(&state, "u1", "alice");
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/post")
        .cookie(session)
        .set_json(json!({"text": "y".repeat(500)}))
        .to_request();

    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn comments_and_replies_nest() {
    let (_dir, state) = setup();
    let session = login(&state, "u1", "alice");
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/post")
        .cookie(session.clone())
        .set_json(json!({"text": "thread"}))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let post_id = created["post"]["id"].as_str().unwrap().to_string();
    let comment_uri = format!("/api/post/{}/comment", post_id);

    let req = test::TestRequest::post()
        .uri(&comment_uri)
        .cookie(session.clone())
        .set_json(json!({"text": "first"}))
        .to_request();
    let top: Value = test::call_and_read_body_json(&app, req).await;
    let top_id = top["comment"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri(&comment_uri)
        .cookie(session.clone())
        .set_json(json!({"text": "reply", "parent": top_id}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri(&comment_uri)
        .cookie(session.clone())
        .set_json(json!({"text": "orphan", "parent_id": "c-missing"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], json!("NOT_FOUND_ERROR"));
    assert_ne!(body["message"], json!("Route does not exist"));

    let req = test::TestRequest::post()
        .uri(&comment_uri)
        .cookie(session)
        .set_json(json!({"text": "   "}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get().uri("/api/posts").to_request();
    let listed: Value = test::call_and_read_body_json(&app, req).await;
    let post = &listed["posts"][0];
    assert_eq!(post["comment_count"], json!(2));
    assert_eq!(post["comments"][0]["replies"][0]["text"], json!("reply"));
    assert_eq!(post["comments"][0]["replies"][0]["user"]["name"], json!("alice"));
}

#[actix_web::test]
async fn comment_on_unknown_post_is_not_found() {
    let (_dir, state) = setup();
    let session = login(&state, "u1", "alice");
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/post/p-404/comment")
        .cookie(session)
        .set_json(json!({"text": "hi"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn admin_updates_and_deletes_posts() {
    let (_dir, state) = setup();
    let session = login(&state, "u1", "alice");
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/post")
        .cookie(session.clone())
        .set_json(json!({"text": "draft"}))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let uri = format!("/api/post/{}", created["post"]["id"].as_str().unwrap());

    // a plain user is not an admin
    let req = test::TestRequest::put()
        .uri(&uri)
        .cookie(session)
        .set_json(json!({"title": "nope"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header((ADMIN_SECRET_HEADER, ADMIN_SECRET))
        .set_json(json!({"title": "Final", "date": "2020-01-01", "user_id": "someone-else"}))
        .to_request();
    let updated: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated["post"]["title"], json!("Final"));
    assert_eq!(updated["post"]["date"], json!("2020-01-01"));
    assert_eq!(updated["post"]["user_id"], json!("u1"));

    let req = test::TestRequest::put()
        .uri(&format!("/api/post/p-missing?key={}", ADMIN_SECRET))
        .set_json(json!({"title": "x"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    for _ in 0..2 {
        let req = test::TestRequest::delete()
            .uri(&uri)
            .insert_header((ADMIN_SECRET_HEADER, ADMIN_SECRET))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["deleted"], created["post"]["id"]);
    }

    let req = test::TestRequest::get().uri("/api/posts").to_request();
    let listed: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed["posts"], json!([]));
}

#[actix_web::test]
async fn user_management_is_admin_only() {
    let (_dir, state) = setup();
    let session = login(&state, "u1", "alice");
    let app = test_app!(state);

    let req = test::TestRequest::get().uri("/api/users").cookie(session.clone()).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::put()
        .uri("/api/users/u1")
        .insert_header((ADMIN_SECRET_HEADER, ADMIN_SECRET))
        .set_json(json!({"is_admin": 1}))
        .to_request();
    let updated: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated["user"]["is_admin"], json!(true));

    // the promoted user now passes admin checks with the session alone
    let req = test::TestRequest::get().uri("/api/users").cookie(session.clone()).to_request();
    let listed: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed["users"][0]["id"], json!("u1"));

    let req = test::TestRequest::put()
        .uri("/api/users/ghost")
        .cookie(session)
        .set_json(json!({"is_admin": true}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn me_reflects_the_session() {
    let (_dir, state) = setup();
    let session = login(&state, "u7", "gus");
    let app = test_app!(state);

    let req = test::TestRequest::get().uri("/api/me").to_request();
    let anonymous: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(anonymous["user"], Value::Null);

    let req = test::TestRequest::get().uri("/api/me").cookie(session).to_request();
    let known: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(known["user"]["name"], json!("gus"));

    let forged = Cookie::new(SESSION_COOKIE, create_session_token("u7", "wrong").unwrap());
    let req = test::TestRequest::get().uri("/api/me").cookie(forged).to_request();
    let rejected: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(rejected["user"], Value::Null);
}

#[actix_web::test]
async fn site_profile_defaults_and_updates() {
    let (_dir, state) = setup();
    let app = test_app!(state);

    let req = test::TestRequest::get().uri("/api/site").to_request();
    let site: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(site["title"], json!("Antisocial"));

    let req = test::TestRequest::put()
        .uri("/api/site")
        .set_json(json!({"title": "Mine"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::put()
        .uri(&format!("/api/site?key={}", ADMIN_SECRET))
        .set_json(json!({"title": "Mine", "description": "notes"}))
        .to_request();
    let updated: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated["title"], json!("Mine"));

    let req = test::TestRequest::get().uri("/api/site").to_request();
    let site: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(site["description"], json!("notes"));
}

#[actix_web::test]
async fn detect_classifies_urls() {
    let (_dir, state) = setup();
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/detect")
        .set_json(json!({"url": "https://youtu.be/abcdef1"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["type"], json!("video"));
    assert_eq!(body["platform"], json!("youtube"));
    assert_eq!(body["id"], json!("abcdef1"));

    let req = test::TestRequest::post()
        .uri("/api/detect")
        .set_json(json!({"url": "https://x.com/a.png?x=1"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["type"], json!("photo"));
}

#[actix_web::test]
async fn preview_validates_and_absorbs_failures() {
    let (_dir, state) = setup();
    let app = test_app!(state);

    let req = test::TestRequest::get().uri("/api/preview?url=%20").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let req = test::TestRequest::get()
        .uri(&format!("/api/preview?url=127.0.0.1:{}", port))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["url"], json!(format!("http://127.0.0.1:{}", port)));
    assert_eq!(body["title"], Value::Null);
    assert_eq!(body["image"], Value::Null);
    assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));
}

#[actix_web::test]
async fn corrupt_posts_file_fails_loudly_and_is_left_alone() {
    let (dir, state) = setup();
    let path = dir.path().join("data").join(Collection::Posts.relative_path());
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "{\"posts\": [{").unwrap();
    let session = login(&state, "u1", "alice");
    let app = test_app!(state);

    let req = test::TestRequest::get().uri("/api/posts").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], json!("STORAGE_ERROR"));

    let req = test::TestRequest::post()
        .uri("/api/post")
        .cookie(session)
        .set_json(json!({"text": "would overwrite"}))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\"posts\": [{");
}

#[actix_web::test]
async fn unknown_route_gets_json_not_found() {
    let (_dir, state) = setup();
    let app = test_app!(state);

    let req = test::TestRequest::get().uri("/api/nothing-here").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], json!("Route does not exist"));
}

#[actix_web::test]
async fn logout_clears_the_session_cookie() {
    let (_dir, state) = setup();
    let app = test_app!(state);

    let req = test::TestRequest::get().uri("/logout").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    let cleared = resp
        .response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .expect("session cookie");
    assert_eq!(cleared.value(), "");
}

#[actix_web::test]
async fn login_without_oauth_config_is_a_server_error() {
    let (_dir, state) = setup();
    let app = test_app!(state);

    let req = test::TestRequest::get().uri("/login").to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[actix_web::test]
async fn callback_without_code_goes_home() {
    let (_dir, state) = setup();
    let app = test_app!(state);

    let req = test::TestRequest::get().uri("/callback").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers().get("location").unwrap(), "/");
}
