//! Process configuration read from the environment (after `.env` is loaded).

use axum::http::HeaderValue;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::db::DbConfig;

pub const DEFAULT_JWT_SECRET: &str = "default-jwt-secret-change-in-production";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    /// `None` runs on the in-memory store
    pub database: Option<DbConfig>,
    pub jwt_secret: String,
    pub session_ttl_hours: i64,
    pub upload_dir: PathBuf,
    pub allowed_origins: Vec<HeaderValue>,
    /// `ADMIN_EMAIL` / `ADMIN_PASSWORD`, seeded into the in-memory store
    pub bootstrap_admin: Option<(String, String)>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            environment: "development".to_string(),
            database: None,
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            session_ttl_hours: 24,
            upload_dir: PathBuf::from("uploads"),
            allowed_origins: default_origins(),
            bootstrap_admin: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: std::env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            database: std::env::var("DATABASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty())
                .map(|_| DbConfig::default()),
            jwt_secret: std::env::var("JWT_SECRET")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.jwt_secret),
            session_ttl_hours: std::env::var("SESSION_TTL_HOURS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|h: &i64| *h > 0)
                .unwrap_or(defaults.session_ttl_hours),
            upload_dir: std::env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            allowed_origins: origins_from_env().unwrap_or(defaults.allowed_origins),
            bootstrap_admin: match (std::env::var("ADMIN_EMAIL"), std::env::var("ADMIN_PASSWORD")) {
                (Ok(email), Ok(password)) if !email.is_empty() && !password.is_empty() => {
                    Some((email, password))
                }
                _ => None,
            },
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Production must not sign sessions with the built-in secret.
    pub fn check_secret(&self) -> Result<(), String> {
        if self.is_production() && self.jwt_secret == DEFAULT_JWT_SECRET {
            return Err("JWT_SECRET must be set to a secure, unique value in production".into());
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

/// ALLOWED_ORIGINS (comma-separated) wins over FRONTEND_ORIGIN.
fn origins_from_env() -> Option<Vec<HeaderValue>> {
    std::env::var("ALLOWED_ORIGINS")
        .ok()
        .and_then(|s| parse_origins(&s))
        .or_else(|| {
            std::env::var("FRONTEND_ORIGIN")
                .ok()
                .and_then(|s| parse_origins(&s))
        })
}

/// `*` cannot be combined with credentialed CORS, so it is dropped.
fn parse_origins(raw: &str) -> Option<Vec<HeaderValue>> {
    let origins: Vec<HeaderValue> = raw
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .filter(|origin| {
            if *origin == "*" {
                tracing::warn!("Ignoring wildcard CORS origin; list explicit origins instead");
                return false;
            }
            true
        })
        .filter_map(|origin| origin.parse().ok())
        .collect();
    if origins.is_empty() {
        None
    } else {
        Some(origins)
    }
}

fn default_origins() -> Vec<HeaderValue> {
    vec![
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.port, 3001);
        assert!(config.database.is_none());
        assert_eq!(config.allowed_origins.len(), 2);
        assert_eq!(
            config.bind_addr().unwrap(),
            "127.0.0.1:3001".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_default_secret_refused_in_production() {
        let mut config = AppConfig::default();
        assert!(config.check_secret().is_ok());

        config.environment = "production".to_string();
        assert!(config.check_secret().is_err());

        config.jwt_secret = "a-real-secret".to_string();
        assert!(config.check_secret().is_ok());
    }

    #[test]
    fn test_wildcard_origin_is_dropped() {
        let origins = parse_origins("*, https://example.com ,").unwrap();
        assert_eq!(origins, vec![HeaderValue::from_static("https://example.com")]);

        assert!(parse_origins("*").is_none());
        assert!(parse_origins("").is_none());
    }

    #[test]
    fn test_wildcard_only_falls_back_to_defaults_without_panicking() {
        let config = AppConfig {
            allowed_origins: parse_origins("*").unwrap_or_else(default_origins),
            ..AppConfig::default()
        };
        let _cors = crate::configure_cors(&config);
        assert_eq!(config.allowed_origins.len(), 2);
    }
}
