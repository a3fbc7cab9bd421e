//! HTTP Server Configuration
//!
//! Host, port, CORS and the token settings the gate is built from. Loaded
//! from an optional JSON file, then overridden from the environment.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::jwt::DEFAULT_TOKEN_TTL_SECS;
use crate::auth::JwtConfig;

/// Default config file, read when present
pub const DEFAULT_CONFIG_PATH: &str = "./gatekeep.json";

/// Signing secret override
pub const SECRET_ENV: &str = "JWT_SECRET_KEY";

/// Port override
pub const PORT_ENV: &str = "GATEKEEP_PORT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("No signing secret configured (set JWT_SECRET_KEY or auth.secret)")]
    MissingSecret,

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Token settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC signing secret; usually supplied through `JWT_SECRET_KEY`
    #[serde(default)]
    pub secret: Option<String>,

    /// Lifetime of issued tokens in seconds (default: 3600)
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: i64,
}

fn default_token_ttl() -> i64 {
    DEFAULT_TOKEN_TTL_SECS
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: None,
            token_ttl_secs: default_token_ttl(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpServerConfig {
    /// Host to bind to (default: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to (default: 3000)
    #[serde(default = "default_port")]
    pub port: u16,

    /// CORS allowed origins; empty means any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// `tracing` filter directive (default: "info")
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    #[serde(default)]
    pub auth: AuthConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            log_filter: default_log_filter(),
            auth: AuthConfig::default(),
        }
    }
}

impl HttpServerConfig {
    /// Create a new config with specified port
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// Set the signing secret
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.auth.secret = Some(secret.into());
        self
    }

    /// Load from `path`, or from [`DEFAULT_CONFIG_PATH`] if it exists, then
    /// apply process environment overrides and validate.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env_from(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON config file; missing keys take their defaults
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply overrides from a variable lookup
    pub fn apply_env_from<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(secret) = lookup(SECRET_ENV).filter(|s| !s.is_empty()) {
            self.auth.secret = Some(secret);
        }

        if let Some(port) = lookup(PORT_ENV) {
            self.port = port.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: PORT_ENV,
                value: port.clone(),
            })?;
        }

        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        match self.auth.secret.as_deref() {
            Some(secret) if !secret.trim().is_empty() => {}
            _ => return Err(ConfigError::MissingSecret),
        }

        if self.auth.token_ttl_secs <= 0 {
            return Err(ConfigError::InvalidValue {
                key: "auth.token_ttl_secs",
                value: self.auth.token_ttl_secs.to_string(),
            });
        }

        Ok(())
    }

    /// Token settings for the verifier
    pub fn jwt_config(&self) -> ConfigResult<JwtConfig> {
        let secret = self.auth.secret.as_deref().ok_or(ConfigError::MissingSecret)?;
        Ok(JwtConfig::new(secret).with_ttl(Duration::seconds(self.auth.token_ttl_secs)))
    }

    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
