use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// Logging settings: `ENVIRONMENT`, `LOG_LEVEL`, `LOG_DIR`
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub environment: String,
    pub level: LogLevel,
    pub dir: PathBuf,
}

impl LogConfig {
    pub fn from_env() -> Self {
        let environment =
            std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        let level = std::env::var("LOG_LEVEL")
            .ok()
            .and_then(|raw| LogLevel::parse(&raw))
            .unwrap_or_else(|| Self::default_level(&environment));
        let dir = std::env::var("LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("logs"));

        Self {
            environment,
            level,
            dir,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    fn default_level(environment: &str) -> LogLevel {
        if environment == "production" {
            LogLevel::Info
        } else {
            LogLevel::Debug
        }
    }

    /// Directive used when `RUST_LOG` is not set.
    pub fn filter_directive(&self) -> String {
        format!(
            "insights_backend={},tower_http=debug,axum=debug,sqlx=warn",
            self.level
        )
    }
}
