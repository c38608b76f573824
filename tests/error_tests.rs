// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use polls::error::AppError;

#[test]
fn test_not_found_status() {
    let response = AppError::NotFound("Question 1 not found".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[test]
fn test_bad_request_status() {
    let response = AppError::BadRequest("Invalid id".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[test]
fn test_server_errors_hide_details() {
    for err in [
        AppError::Database("disk I/O error".to_string()),
        AppError::Template("missing variable".to_string()),
        AppError::Internal(anyhow::anyhow!("boom")),
    ] {
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

#[test]
fn test_unauthorized_redirects_to_login() {
    let response = AppError::Unauthorized.into_response();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()[header::LOCATION], "/admin/login/");
}

#[test]
fn test_error_messages() {
    assert_eq!(
        AppError::NotFound("Question 7".to_string()).to_string(),
        "Resource not found: Question 7"
    );
    assert_eq!(AppError::Unauthorized.to_string(), "Admin login required");
}
