// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.

use std::env;

/// Minimum length of the admin session signing key, in bytes.
pub const MIN_SIGNING_KEY_LEN: usize = 32;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// sqlx connection URL for the SQLite database
    pub database_url: String,
    /// Whether session cookies carry the `Secure` attribute
    pub cookie_secure: bool,
    /// Admin console settings; `None` leaves the console unmounted
    pub admin: Option<AdminConfig>,
}

/// Credentials and session key for the admin console.
#[derive(Clone)]
pub struct AdminConfig {
    pub username: String,
    pub password: String,
    /// HS256 key for admin session tokens (raw bytes)
    pub session_signing_key: Vec<u8>,
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("session_signing_key", &"<redacted>")
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honoured for local
    /// development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let admin_enabled = parse_bool(env::var("ADMIN_ENABLED").ok().as_deref(), true);
        let admin = if admin_enabled {
            Some(AdminConfig::from_env()?)
        } else {
            None
        };

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .map_err(|_| ConfigError::Invalid("PORT", "must be a port number"))?,
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://polls.db".to_string()),
            cookie_secure: parse_bool(env::var("COOKIE_SECURE").ok().as_deref(), false),
            admin,
        })
    }

    /// Fixed configuration for tests: in-memory database, admin enabled.
    pub fn test_default() -> Self {
        Self {
            port: 8000,
            database_url: "sqlite::memory:".to_string(),
            cookie_secure: false,
            admin: Some(AdminConfig {
                username: "admin".to_string(),
                password: "test_password".to_string(),
                session_signing_key: b"test_session_key_32_bytes_minimum!!".to_vec(),
            }),
        }
    }
}

impl AdminConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let session_signing_key = env::var("SESSION_SIGNING_KEY")
            .map_err(|_| ConfigError::Missing("SESSION_SIGNING_KEY"))?
            .into_bytes();
        if session_signing_key.len() < MIN_SIGNING_KEY_LEN {
            return Err(ConfigError::Invalid(
                "SESSION_SIGNING_KEY",
                "must be at least 32 bytes",
            ));
        }

        Ok(Self {
            username: env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string()),
            password: env::var("ADMIN_PASSWORD")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("ADMIN_PASSWORD"))?,
            session_signing_key,
        })
    }
}

fn parse_bool(raw: Option<&str>, default: bool) -> bool {
    match raw.map(|v| v.trim().to_ascii_lowercase()) {
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => true,
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => false,
        _ => default,
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid environment variable {0}: {1}")]
    Invalid(&'static str, &'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        // Single test touches the process environment to avoid races.
        env::set_var("ADMIN_PASSWORD", "secret");
        env::set_var("SESSION_SIGNING_KEY", "test_session_key_32_bytes_minimum!!");
        env::remove_var("ADMIN_ENABLED");
        env::remove_var("PORT");

        let config = Config::from_env().expect("Config should load");
        let admin = config.admin.expect("admin enabled by default");

        assert_eq!(config.port, 8000);
        assert_eq!(admin.username, "admin");
        assert_eq!(admin.password, "secret");

        env::set_var("SESSION_SIGNING_KEY", "short");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid("SESSION_SIGNING_KEY", _))
        ));

        env::set_var("ADMIN_ENABLED", "false");
        let config = Config::from_env().expect("Config should load without admin");
        assert!(config.admin.is_none());
        env::remove_var("ADMIN_ENABLED");
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool(Some("TRUE"), false));
        assert!(parse_bool(Some(" 1 "), false));
        assert!(!parse_bool(Some("off"), true));
        assert!(parse_bool(Some("maybe"), true));
        assert!(!parse_bool(None, false));
    }

    #[test]
    fn test_admin_config_debug_redacts_secrets() {
        let config = Config::test_default();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("test_password"));
        assert!(rendered.contains("<redacted>"));
    }
}
