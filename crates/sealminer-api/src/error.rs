use thiserror::Error;

/// Top-level error type for the `sealminer-api` crate.
///
/// Only command dispatch raises errors. Authentication failures are
/// reported as an [`AuthOutcome`](crate::AuthOutcome) and surface here
/// as [`Error::Authentication`] once a command cannot be sent.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// No session credential could be established with the miner.
    #[error("Could not authenticate web session with miner at {host}")]
    Authentication { host: String },

    // ── Dispatch ────────────────────────────────────────────────────
    /// The command was sent (or attempted) and did not succeed.
    ///
    /// `status` is set when the miner answered with a non-success HTTP
    /// status; `source` is set when the transport itself failed.
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        status: Option<u16>,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// Command name is not a valid endpoint path segment.
    #[error("Invalid command name: {0:?}")]
    InvalidCommand(String),

    // ── Transport ───────────────────────────────────────────────────
    /// Building the HTTP client failed (bad proxy, TLS backend, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Data ────────────────────────────────────────────────────────
    /// Command response was not valid JSON, with the raw body for debugging.
    #[error("Deserialization error for {command}: {message}")]
    Deserialization {
        command: String,
        message: String,
        body: String,
    },
}

impl Error {
    /// Returns `true` if the command never left because no session
    /// could be established.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns `true` if this is a transient transport error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::CommandFailed {
                source: Some(e), ..
            }
            | Self::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// The command name this error is about, if any.
    pub fn command(&self) -> Option<&str> {
        match self {
            Self::CommandFailed { command, .. } | Self::Deserialization { command, .. } => {
                Some(command)
            }
            Self::InvalidCommand(command) => Some(command),
            _ => None,
        }
    }

    /// HTTP status returned by the miner, if the failure carried one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::CommandFailed { status, .. } => *status,
            _ => None,
        }
    }
}
