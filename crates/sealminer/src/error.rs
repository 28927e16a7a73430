//! CLI error types with miette diagnostics.
//!
//! Maps `sealminer_api::Error` and `ConfigError` into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use sealminer_api::Error as ApiError;
use sealminer_config::ConfigError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const COMMAND: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach miner: {command} did not complete")]
    #[diagnostic(
        code(sealminer::connection_failed),
        help(
            "Check that the miner is powered on and reachable over HTTP.\n\
             Try a longer --timeout if the miner is slow to answer."
        )
    )]
    ConnectionFailed {
        command: String,
        #[source]
        source: ApiError,
    },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Could not log in to miner at {host}")]
    #[diagnostic(
        code(sealminer::auth_failed),
        help(
            "Verify the web password for the `seal` account.\n\
             Run: sealminer config set-password --profile {profile}"
        )
    )]
    AuthFailed { host: String, profile: String },

    // ── Commands ─────────────────────────────────────────────────────
    #[error(
        "Miner rejected command '{command}'{}",
        .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
    )]
    #[diagnostic(
        code(sealminer::command_failed),
        help(
            "The session may have expired or the command is not supported by this firmware.\n\
             Run: sealminer login"
        )
    )]
    CommandFailed { command: String, status: Option<u16> },

    #[error("Miner returned an unreadable response to '{command}'")]
    #[diagnostic(code(sealminer::bad_response), help("{message}"))]
    BadResponse { command: String, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(sealminer::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Miner profile '{name}' not found in configuration")]
    #[diagnostic(
        code(sealminer::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: sealminer config init, or pass --host"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No miner selected")]
    #[diagnostic(
        code(sealminer::no_miner),
        help(
            "Pass --host <ip>, set SEALMINER_HOST, or create a profile with: sealminer config init\n\
             Config expected at: {path}"
        )
    )]
    NoMiner { path: String },

    #[error(transparent)]
    #[diagnostic(code(sealminer::config))]
    Config(Box<ConfigError>),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(sealminer::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(sealminer::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::CommandFailed { .. } | Self::BadResponse { .. } => exit_code::COMMAND,
            Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. }
            | Self::NoMiner { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Translate a client error, naming the profile for auth help text.
    pub fn from_api(err: ApiError, profile: &str) -> Self {
        let transport_only = matches!(
            err,
            ApiError::CommandFailed {
                status: None,
                source: Some(_),
                ..
            }
        );
        if transport_only || err.is_transient() {
            return Self::ConnectionFailed {
                command: err.command().unwrap_or("request").to_owned(),
                source: err,
            };
        }
        match err {
            ApiError::Authentication { host } => Self::AuthFailed {
                host,
                profile: profile.into(),
            },
            ApiError::CommandFailed {
                command, status, ..
            } => Self::CommandFailed { command, status },
            ApiError::Deserialization {
                command, message, ..
            } => Self::BadResponse { command, message },
            ApiError::InvalidCommand(command) => Self::Validation {
                field: "command".into(),
                reason: format!("'{command}' is not a valid cgi-bin command name"),
            },
            ApiError::InvalidUrl(e) => Self::Validation {
                field: "host".into(),
                reason: e.to_string(),
            },
            other => Self::ConnectionFailed {
                command: "connect".into(),
                source: other,
            },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::ProfileNotFound { name } => Self::ProfileNotFound {
                name,
                available: "(see: sealminer config profiles)".into(),
            },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(Box::new(other)),
        }
    }
}
