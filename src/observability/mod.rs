//! Observability for gatekeep
//!
//! Installs the global `tracing` subscriber. Everything else in the crate
//! only emits events through the `tracing` macros.

use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log filter '{filter}': {reason}")]
    InvalidFilter { filter: String, reason: String },

    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(String),
}

/// Resolve the filter: `RUST_LOG` wins over the configured directive
pub fn resolve_filter(configured: &str) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    EnvFilter::try_new(configured).map_err(|e| LoggingError::InvalidFilter {
        filter: configured.to_string(),
        reason: e.to_string(),
    })
}

/// Install the global subscriber. Call once, from the CLI.
pub fn init_logging(configured: &str, format: LogFormat) -> Result<(), LoggingError> {
    let filter = resolve_filter(configured)?;

    let result = match format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .try_init(),
    };

    result.map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_filter_rejected() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let err = resolve_filter("gatekeep=notalevel").unwrap_err();
        assert!(matches!(err, LoggingError::InvalidFilter { .. }));
    }

    #[test]
    fn test_valid_filter_accepted() {
        assert!(resolve_filter("gatekeep=debug,tower_http=info").is_ok());
    }

    #[test]
    fn test_second_init_fails() {
        let _ = init_logging("warn", LogFormat::Pretty);
        assert!(matches!(
            init_logging("warn", LogFormat::Json),
            Err(LoggingError::AlreadyInitialized(_))
        ));
    }
}
