//! Server configuration loaded from environment variables.
//!
//! | variable | default |
//! |---|---|
//! | `BASE_PASSWORD` | required |
//! | `JWT_SECRET` | required |
//! | `PORT` | `3001` |
//! | `BIND_ADDR` | `0.0.0.0` |
//! | `DATABASE_PATH` | `events.db` |
//! | `LOG_LEVEL` | `debug` in debug builds, `info` otherwise |
//! | `LOG_DIR` | `<cwd>/logs` |
//! | `ALLOWED_ORIGINS` | `http://localhost:5173` (comma separated) |
//! | `ALLOWED_ORIGIN_PATTERN` | `^https://allforone(-[a-z0-9-]+)?\.vercel\.app$` |

use booking_core::default_log_level;
use regex::{Regex, RegexBuilder};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
const DEFAULT_DATABASE_PATH: &str = "events.db";
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:5173";
const DEFAULT_ORIGIN_PATTERN: &str = r"^https://allforone(-[a-z0-9-]+)?\.vercel\.app$";

/// Runtime settings for the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub base_password: String,
    pub jwt_secret: String,
    pub bind_addr: IpAddr,
    pub port: u16,
    pub database_path: PathBuf,
    pub log_level: String,
    pub log_dir: PathBuf,
    /// Origins allowed verbatim.
    pub allowed_origins: Vec<String>,
    /// Origins matching this (case-insensitive) pattern are allowed too.
    pub allowed_origin_pattern: Option<Regex>,
}

/// Invalid or missing configuration.
#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, message: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(key) => write!(f, "missing required setting `{key}`"),
            Self::Invalid { key, message } => write!(f, "invalid setting `{key}`: {message}"),
        }
    }
}

impl Error for ConfigError {}

impl ServerConfig {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let base_password = value("BASE_PASSWORD").ok_or(ConfigError::Missing("BASE_PASSWORD"))?;
        let jwt_secret = value("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let port = match value("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|err| ConfigError::Invalid {
                key: "PORT",
                message: err.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let bind_addr = value("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<IpAddr>()
            .map_err(|err| ConfigError::Invalid {
                key: "BIND_ADDR",
                message: err.to_string(),
            })?;

        let log_dir = match value("LOG_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => std::env::current_dir()
                .map_err(|err| ConfigError::Invalid {
                    key: "LOG_DIR",
                    message: format!("cannot resolve working directory: {err}"),
                })?
                .join("logs"),
        };

        let allowed_origins = value("ALLOWED_ORIGINS")
            .unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.to_string())
            .split(',')
            .map(|origin| origin.trim().trim_end_matches('/').to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let pattern = value("ALLOWED_ORIGIN_PATTERN")
            .unwrap_or_else(|| DEFAULT_ORIGIN_PATTERN.to_string());
        let allowed_origin_pattern = if pattern == "-" {
            None
        } else {
            Some(
                RegexBuilder::new(&pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|err| ConfigError::Invalid {
                        key: "ALLOWED_ORIGIN_PATTERN",
                        message: err.to_string(),
                    })?,
            )
        };

        Ok(Self {
            base_password,
            jwt_secret,
            bind_addr,
            port,
            database_path: value("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH)),
            log_level: value("LOG_LEVEL").unwrap_or_else(|| default_log_level().to_string()),
            log_dir,
            allowed_origins,
            allowed_origin_pattern,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }

    /// Whether a browser origin may call the API.
    pub fn origin_allowed(&self, origin: &str) -> bool {
        self.allowed_origins.iter().any(|allowed| allowed == origin)
            || self
                .allowed_origin_pattern
                .as_ref()
                .is_some_and(|pattern| pattern.is_match(origin))
    }
}
