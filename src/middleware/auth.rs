// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin session middleware.
//!
//! A successful login stores an HS256 JWT in an HttpOnly cookie; every admin
//! route except the login page requires it.

use crate::config::AdminConfig;
use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Session cookie name.
pub const SESSION_COOKIE: &str = "polls_session";

/// Session lifetime: two weeks.
pub const SESSION_TTL_SECS: u64 = 14 * 24 * 60 * 60;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (admin username)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Logged-in administrator extracted from the session cookie.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub username: String,
}

/// Middleware that requires a valid admin session.
///
/// Requests without one are redirected to the login page.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let admin = state
        .config
        .admin
        .as_ref()
        .ok_or_else(|| AppError::NotFound("Admin console disabled".to_string()))?;

    let token = jar
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .ok_or(AppError::Unauthorized)?;

    let user = verify_session_token(&token, admin).ok_or_else(|| {
        tracing::debug!(path = %request.uri().path(), "Rejected admin session");
        AppError::Unauthorized
    })?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Check submitted credentials in constant time.
pub fn credentials_match(admin: &AdminConfig, username: &str, password: &str) -> bool {
    let username_ok = username.as_bytes().ct_eq(admin.username.as_bytes());
    let password_ok = password.as_bytes().ct_eq(admin.password.as_bytes());
    bool::from(username_ok & password_ok)
}

/// Create a signed session token for an admin.
pub fn create_session_token(username: &str, signing_key: &[u8]) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();

    let claims = Claims {
        sub: username.to_string(),
        iat: now as usize,
        exp: (now + SESSION_TTL_SECS) as usize,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

/// Decode a session token; `None` if invalid, expired, or for another user.
pub fn verify_session_token(token: &str, admin: &AdminConfig) -> Option<AdminUser> {
    let key = DecodingKey::from_secret(&admin.session_signing_key);
    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<Claims>(token, &key, &validation).ok()?;
    if token_data.claims.sub != admin.username {
        return None;
    }

    Some(AdminUser {
        username: token_data.claims.sub,
    })
}

/// Cookie carrying a freshly issued session token.
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/admin")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(cookie_max_age())
        .build()
}

/// Cookie that clears the session; attributes must match [`session_cookie`].
pub fn removal_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/admin")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

fn cookie_max_age() -> time::Duration {
    time::Duration::seconds(SESSION_TTL_SECS as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn admin() -> AdminConfig {
        Config::test_default().admin.unwrap()
    }

    #[test]
    fn test_credentials_match() {
        let admin = admin();
        assert!(credentials_match(&admin, "admin", "test_password"));
        assert!(!credentials_match(&admin, "admin", "wrong"));
        assert!(!credentials_match(&admin, "root", "test_password"));
        assert!(!credentials_match(&admin, "", ""));
    }

    #[test]
    fn test_session_token_round_trip() {
        let admin = admin();
        let token = create_session_token("admin", &admin.session_signing_key).unwrap();
        let user = verify_session_token(&token, &admin).expect("token should verify");
        assert_eq!(user.username, "admin");
    }

    #[test]
    fn test_session_token_rejects_wrong_key_and_user() {
        let admin = admin();

        let forged = create_session_token("admin", b"another_key_that_is_32_bytes_long!!").unwrap();
        assert!(verify_session_token(&forged, &admin).is_none());

        let other_user = create_session_token("mallory", &admin.session_signing_key).unwrap();
        assert!(verify_session_token(&other_user, &admin).is_none());

        assert!(verify_session_token("not-a-jwt", &admin).is_none());
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("token".to_string(), true);
        let rendered = cookie.to_string();
        assert!(rendered.starts_with("polls_session=token"));
        assert!(rendered.contains("HttpOnly"));
        assert!(rendered.contains("SameSite=Lax"));
        assert!(rendered.contains("Path=/admin"));
        assert!(rendered.contains("Secure"));
        assert!(rendered.contains("Max-Age=1209600"));
    }
}
