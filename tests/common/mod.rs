// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use chrono::{Duration, Utc};
use polls::config::Config;
use polls::db::Db;
use polls::middleware::auth::{create_session_token, SESSION_COOKIE};
use polls::models::{Choice, Question};
use polls::routes::create_router;
use polls::templates::Templates;
use polls::AppState;
use std::sync::Arc;

/// Create a fresh in-memory database.
#[allow(dead_code)]
pub async fn test_db() -> Db {
    Db::in_memory()
        .await
        .expect("Failed to open in-memory database")
}

/// Create a test app backed by its own in-memory database.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub async fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with_config(Config::test_default()).await
}

#[allow(dead_code)]
pub async fn create_test_app_with_config(config: Config) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState {
        config,
        db: test_db().await,
        templates: Templates::new().expect("Templates should parse"),
    });

    (create_router(state.clone()), state)
}

/// Create a question published `days` from now (negative for the past).
#[allow(dead_code)]
pub async fn create_question(db: &Db, question_text: &str, days: i64) -> Question {
    db.create_question(question_text, Utc::now() + Duration::days(days))
        .await
        .expect("Failed to create question")
}

#[allow(dead_code)]
pub async fn create_choice(db: &Db, question: &Question, choice_text: &str) -> Choice {
    db.create_choice(question.id, choice_text, 0)
        .await
        .expect("Failed to create choice")
}

#[allow(dead_code)]
pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[allow(dead_code)]
pub fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// `Cookie` header value for a logged-in admin.
#[allow(dead_code)]
pub fn admin_cookie(state: &AppState) -> String {
    let admin = state.config.admin.as_ref().expect("admin enabled");
    let token = create_session_token(&admin.username, &admin.session_signing_key).unwrap();
    format!("{}={}", SESSION_COOKIE, token)
}

#[allow(dead_code)]
pub fn with_cookie(mut request: Request<Body>, cookie: &str) -> Request<Body> {
    request
        .headers_mut()
        .insert(header::COOKIE, cookie.parse().unwrap());
    request
}

#[allow(dead_code)]
pub async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[allow(dead_code)]
pub fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("missing Location header")
        .to_str()
        .unwrap()
}
