//! Environment-derived application configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::{env, fs};

use tracing::warn;

/// Default listen address when `BIND_ADDR` is unset.
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Default attachment directory when `UPLOAD_DIR` is unset.
const DEFAULT_UPLOAD_DIR: &str = "uploads";

/// Default connection-pool size when `DB_POOL_SIZE` is unset.
const DEFAULT_POOL_SIZE: u32 = 10;

/// Errors raised while reading configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is absent.
    #[error("missing required environment variable: {name}")]
    Missing {
        /// Variable name.
        name: &'static str,
    },
    /// A variable is present but unparseable.
    #[error("invalid value for {name}: {message}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// Parse failure description.
        message: String,
    },
    /// The configured secret file could not be read.
    #[error("failed to read secret file {path}: {message}")]
    SecretFile {
        /// Configured path.
        path: String,
        /// I/O failure description.
        message: String,
    },
}

/// Application configuration resolved at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Listen address.
    pub bind_addr: SocketAddr,
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Secret for signing and verifying bearer tokens.
    pub jwt_secret: Vec<u8>,
    /// Directory attachments are written to and served from.
    pub upload_dir: PathBuf,
    /// Maximum database connections.
    pub pool_size: u32,
}

impl AppConfig {
    /// Read configuration from the environment.
    ///
    /// `DATABASE_URL` is required. The token secret comes from
    /// `JWT_SECRET_FILE` or `JWT_SECRET`; debug builds (or
    /// `JWT_ALLOW_EPHEMERAL=1`) fall back to a random per-process secret
    /// with a warning, which invalidates all tokens on restart.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::Missing { name: "DATABASE_URL" })?;

        let bind_addr: SocketAddr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_owned())
            .parse()
            .map_err(|e| ConfigError::Invalid {
                name: "BIND_ADDR",
                message: format!("{e}"),
            })?;

        let pool_size = match env::var("DB_POOL_SIZE") {
            Ok(raw) => raw.parse().map_err(|e| ConfigError::Invalid {
                name: "DB_POOL_SIZE",
                message: format!("{e}"),
            })?,
            Err(_) => DEFAULT_POOL_SIZE,
        };

        let upload_dir =
            PathBuf::from(env::var("UPLOAD_DIR").unwrap_or_else(|_| DEFAULT_UPLOAD_DIR.to_owned()));

        Ok(Self {
            bind_addr,
            database_url,
            jwt_secret: resolve_jwt_secret()?,
            upload_dir,
            pool_size,
        })
    }
}

fn resolve_jwt_secret() -> Result<Vec<u8>, ConfigError> {
    if let Ok(path) = env::var("JWT_SECRET_FILE") {
        return fs::read(&path).map_err(|e| ConfigError::SecretFile {
            path,
            message: e.to_string(),
        });
    }
    if let Ok(secret) = env::var("JWT_SECRET") {
        return Ok(secret.into_bytes());
    }

    let allow_dev = env::var("JWT_ALLOW_EPHEMERAL").ok().as_deref() == Some("1");
    if cfg!(debug_assertions) || allow_dev {
        warn!("using ephemeral JWT secret (dev only); tokens will not survive restarts");
        Ok(uuid::Uuid::new_v4().into_bytes().to_vec())
    } else {
        Err(ConfigError::Missing { name: "JWT_SECRET" })
    }
}
