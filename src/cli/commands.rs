//! CLI command implementations

use std::path::Path;
use std::sync::Arc;

use crate::auth::{JwtManager, Role};
use crate::http_server::{AppState, HttpServer, HttpServerConfig};
use crate::observability::{init_logging, LogFormat};

use super::args::Command;
use super::errors::{CliError, CliErrorCode, CliResult};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config, json_logs } => serve(config.as_deref(), json_logs),
        Command::IssueToken {
            subject,
            role,
            config,
        } => {
            let config = HttpServerConfig::load(config.as_deref())?;
            println!("{}", issue_token(&config, subject, role)?);
            Ok(())
        }
    }
}

/// Start the HTTP server.
///
/// Configuration and schema errors abort before the listener is bound.
pub fn serve(config_path: Option<&Path>, json_logs: bool) -> CliResult<()> {
    let config = HttpServerConfig::load(config_path)?;

    let format = if json_logs { LogFormat::Json } else { LogFormat::Pretty };
    init_logging(&config.log_filter, format)?;

    let state = AppState::in_memory(config.jwt_config()?)?;
    tracing::info!(
        token_ttl_secs = config.auth.token_ttl_secs,
        cors_origins = config.cors_origins.len(),
        "state ready"
    );

    let server = HttpServer::new(config, Arc::new(state));

    let rt = tokio::runtime::Runtime::new().map_err(|e| {
        CliError::new(
            CliErrorCode::IoError,
            format!("Failed to create tokio runtime: {}", e),
        )
    })?;

    rt.block_on(server.start())?;

    Ok(())
}

/// Sign a token for `subject` with the configured secret
pub fn issue_token(config: &HttpServerConfig, subject: i64, role: Role) -> CliResult<String> {
    let manager = JwtManager::new(config.jwt_config()?);
    Ok(manager.issue(subject, role)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_token_verifies_with_same_secret() {
        let config = HttpServerConfig::default().with_secret("cli_test_secret");
        let token = issue_token(&config, 5, Role::Admin).unwrap();

        let manager = JwtManager::new(config.jwt_config().unwrap());
        let principal = manager.verify(Some(&format!("Bearer {}", token))).unwrap();
        assert_eq!(principal.subject_id, 5);
        assert_eq!(principal.role, Role::Admin);
    }

    #[test]
    fn test_issue_token_without_secret_fails() {
        let err = issue_token(&HttpServerConfig::default(), 1, Role::User).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::ConfigError);
    }
}
