//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a stable process exit code.

use miette::Diagnostic;
use thiserror::Error;

use docbot_config::ConfigError;
use docbot_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to the admin service at {url}")]
    #[diagnostic(
        code(docbot::connection_failed),
        help(
            "Check that the service is running and reachable.\n\
             Reason: {reason}\n\
             Set the URL with --api-url or `api_url` in the config file."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request to {url} timed out")]
    #[diagnostic(
        code(docbot::timeout),
        help("Increase the timeout with --timeout or check the service's load.")
    )]
    Timeout { url: String },

    // ── Service ──────────────────────────────────────────────────────
    #[error("Admin password rejected: {message}")]
    #[diagnostic(
        code(docbot::auth_failed),
        help("Re-enter the admin password configured on the server.")
    )]
    AuthFailed { message: String },

    #[error("Not found: {message}")]
    #[diagnostic(
        code(docbot::not_found),
        help("Check that --api-url points at the service root, not a sub-path.")
    )]
    NotFound { message: String },

    #[error("API error (HTTP {status}): {message}")]
    #[diagnostic(code(docbot::api_error))]
    ApiError { status: u16, message: String },

    #[error("Unexpected response: {message}")]
    #[diagnostic(
        code(docbot::decode),
        help("The service answered with a body this client does not understand.")
    )]
    Decode { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(docbot::validation))]
    Validation { field: String, reason: String },

    #[error("Settings rejected before saving")]
    #[diagnostic(code(docbot::invalid_settings), help("{details}"))]
    InvalidSettings { details: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    #[diagnostic(
        code(docbot::config),
        help("Inspect the effective configuration with: docbot config show")
    )]
    Config { message: String },

    #[error("Config file already exists at {path}")]
    #[diagnostic(
        code(docbot::config_exists),
        help("Pass --force to overwrite it.")
    )]
    ConfigExists { path: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize output: {0}")]
    #[diagnostic(code(docbot::serialize))]
    Serialize(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::InvalidSettings { .. } | Self::ConfigExists { .. } => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => {
                CliError::ConnectionFailed { url, reason }
            }

            CoreError::Timeout { url } => CliError::Timeout { url },

            CoreError::Http {
                status: 401 | 403,
                message,
            } => CliError::AuthFailed { message },

            CoreError::Http {
                status: 404,
                message,
            } => CliError::NotFound { message },

            CoreError::Http { status, message } => CliError::ApiError { status, message },

            CoreError::Decode { message } => CliError::Decode { message },

            CoreError::Validation { errors } => CliError::InvalidSettings {
                details: errors
                    .iter()
                    .map(|e| format!("{}: {}", e.field.label(), e.message))
                    .collect::<Vec<_>>()
                    .join("\n"),
            },

            CoreError::Io { message } => CliError::Io(std::io::Error::other(message)),

            CoreError::Config { message } => CliError::Config { message },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}
