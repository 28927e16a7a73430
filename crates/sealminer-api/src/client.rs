// Sealminer web API HTTP client
//
// Owns the miner address, the account secret, and the cached PHP session
// credential. Authentication lives in `auth.rs` and the named command
// wrappers in `commands.rs`, both as inherent methods on this type, so
// this module stays focused on request shaping and response classification.

use std::sync::{Mutex, RwLock};

use reqwest::header::{CONTENT_TYPE, COOKIE};
use secrecy::SecretString;
use serde_json::{Map, Value};
use tracing::{debug, trace};
use url::Url;

use crate::auth::AuthOutcome;
use crate::error::Error;
use crate::session::{SessionIdGenerator, SessionToken};
use crate::transport::TransportConfig;

/// Account name the miner's web UI always logs in with.
pub const USERNAME: &str = "seal";

/// Factory password for the `seal` account.
pub const DEFAULT_PASSWORD: &str = "seal";

/// Port of the miner's embedded web server.
pub const DEFAULT_PORT: u16 = 80;

pub(crate) const LANGUAGE: &str = "en";

/// Body of a command request; selects how the request is delivered.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    /// Pre-encoded payload, sent verbatim as a form-encoded POST body.
    Raw(String),
    /// Named parameters, sent as a JSON POST body.
    Structured(Map<String, Value>),
    /// No parameters; the command is sent as a GET.
    #[default]
    Empty,
}

impl RequestBody {
    /// Build a structured body, collapsing an empty map to [`RequestBody::Empty`].
    pub fn structured(params: Map<String, Value>) -> Self {
        if params.is_empty() {
            Self::Empty
        } else {
            Self::Structured(params)
        }
    }

    /// Raw payload body.
    pub fn raw(payload: impl Into<String>) -> Self {
        Self::Raw(payload.into())
    }
}

/// Session-authenticated client for one miner's web management API.
///
/// Commands go to `http://{host}:{port}/cgi-bin/{command}.php` with the
/// cached session credential in the `Cookie` header. The credential is
/// obtained lazily on the first command and is never refreshed on its
/// own; call [`clear_session`](Self::clear_session) to force a new login.
pub struct SealminerClient {
    http: reqwest::Client,
    base_url: Url,
    host: String,
    password: SecretString,
    token: RwLock<Option<SessionToken>>,
    session_ids: Mutex<SessionIdGenerator>,
}

impl SealminerClient {
    /// Create a client for the miner at `host:port`.
    pub fn new(
        host: &str,
        port: u16,
        password: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let base_url = Url::parse(&format!("http://{host}:{port}/"))?;
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url, password))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    ///
    /// `base_url` is the miner root, e.g. `http://192.168.1.50`.
    pub fn with_client(http: reqwest::Client, base_url: Url, password: SecretString) -> Self {
        let host = base_url.host_str().unwrap_or_default().to_owned();
        Self {
            http,
            base_url,
            host,
            password,
            token: RwLock::new(None),
            session_ids: Mutex::new(SessionIdGenerator::from_time()),
        }
    }

    /// Replace the session identifier source (e.g. with a fixed seed).
    pub fn with_session_ids(mut self, generator: SessionIdGenerator) -> Self {
        self.session_ids = Mutex::new(generator);
        self
    }

    /// The miner host this client talks to.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The miner root URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn password(&self) -> &SecretString {
        &self.password
    }

    // ── Session credential ───────────────────────────────────────────

    /// The cached session credential, if any.
    pub fn token(&self) -> Option<SessionToken> {
        self.token.read().expect("session lock poisoned").clone()
    }

    /// Whether a session credential is currently cached.
    pub fn is_authenticated(&self) -> bool {
        self.token.read().expect("session lock poisoned").is_some()
    }

    /// Drop the cached credential; the next command logs in again.
    pub fn clear_session(&self) {
        debug!(host = %self.host, "clearing session");
        *self.token.write().expect("session lock poisoned") = None;
    }

    pub(crate) fn store_token(&self, token: Option<SessionToken>) {
        *self.token.write().expect("session lock poisoned") = token;
    }

    pub(crate) fn next_session_id(&self) -> SessionToken {
        self.session_ids
            .lock()
            .expect("session id generator poisoned")
            .generate()
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base}/cgi-bin/{name}.php`.
    ///
    /// Left as a string: reqwest parses it on send, so a malformed base
    /// surfaces as the same transport error as any other send failure.
    pub(crate) fn cgi_url(&self, name: &str) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{base}/cgi-bin/{name}.php")
    }

    // ── Dispatch ─────────────────────────────────────────────────────

    /// Send one command to the miner and return its decoded JSON response.
    ///
    /// Logs in first when no credential is cached. The body variant picks
    /// the delivery: raw payload as a form POST, named parameters as a
    /// JSON POST, nothing as a GET.
    pub async fn send_command(&self, command: &str, body: RequestBody) -> Result<Value, Error> {
        validate_command(command)?;

        let token = self.ensure_session().await?;
        let url = self.cgi_url(command);
        let cookie = session_cookie(&token);
        trace!(command, "session cookie attached");

        let builder = match body {
            RequestBody::Raw(payload) => {
                debug!(command, "POST (form) {}", url);
                self.http
                    .post(url)
                    .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(payload)
            }
            RequestBody::Structured(params) if !params.is_empty() => {
                debug!(command, "POST (json) {}", url);
                self.http.post(url).json(&params)
            }
            RequestBody::Structured(_) | RequestBody::Empty => {
                debug!(command, "GET {}", url);
                self.http.get(url)
            }
        };

        let resp = builder
            .header(COOKIE, cookie)
            .send()
            .await
            .map_err(|e| Error::CommandFailed {
                command: command.to_owned(),
                status: None,
                source: Some(e),
            })?;

        let status = resp.status();
        if !status.is_success() {
            debug!(command, %status, "command rejected");
            return Err(Error::CommandFailed {
                command: command.to_owned(),
                status: Some(status.as_u16()),
                source: None,
            });
        }

        let text = resp.text().await.map_err(|e| Error::CommandFailed {
            command: command.to_owned(),
            status: Some(status.as_u16()),
            source: Some(e),
        })?;

        serde_json::from_str(&text).map_err(|e| {
            let preview: String = text.chars().take(200).collect();
            Error::Deserialization {
                command: command.to_owned(),
                message: format!("{e} (body preview: {preview:?})"),
                body: text.clone(),
            }
        })
    }

    /// Return the cached credential, logging in once if there is none.
    pub(crate) async fn ensure_session(&self) -> Result<SessionToken, Error> {
        if let Some(token) = self.token() {
            return Ok(token);
        }
        match self.authenticate().await {
            AuthOutcome::Authenticated(token) => Ok(token),
            outcome => {
                debug!(host = %self.host, ?outcome, "no session, command not sent");
                Err(Error::Authentication {
                    host: self.host.clone(),
                })
            }
        }
    }
}

impl std::fmt::Debug for SealminerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SealminerClient")
            .field("base_url", &self.base_url.as_str())
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

/// Cookie sent with every command once a session exists.
fn session_cookie(token: &SessionToken) -> String {
    format!("username={USERNAME}; userLanguage={LANGUAGE}; PHPSESSID={token}")
}

fn validate_command(command: &str) -> Result<(), Error> {
    if command.is_empty()
        || !command
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(Error::InvalidCommand(command.to_owned()));
    }
    Ok(())
}
