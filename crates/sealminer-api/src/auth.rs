// Web session authentication
//
// The miner's login endpoint confirms a session identifier the client
// picked itself: we generate a PHPSESSID, post the account credentials
// with it, and cache it only if the miner answers `{"state": 0}`.

use reqwest::header::COOKIE;
use secrecy::ExposeSecret;
use serde_json::Value;
use tracing::{debug, warn};

use crate::client::{LANGUAGE, SealminerClient, USERNAME};
use crate::session::SessionToken;

const LOGIN_ENDPOINT: &str = "login";

/// Result of one login attempt.
///
/// Authentication never raises: every way a login can go wrong is a
/// variant here, and only [`Authenticated`](Self::Authenticated) leaves a
/// credential cached on the client.
#[derive(Debug)]
pub enum AuthOutcome {
    /// The miner accepted the session; the token is now cached.
    Authenticated(SessionToken),
    /// The miner answered but did not confirm the session.
    Denied { status: u16, state: Option<i64> },
    /// The login request never completed (connection refused, timeout, ...).
    TransportFailed(reqwest::Error),
    /// The login response was not JSON.
    Undecodable { message: String },
}

impl AuthOutcome {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// The confirmed session token, if login succeeded.
    pub fn token(&self) -> Option<&SessionToken> {
        match self {
            Self::Authenticated(token) => Some(token),
            _ => None,
        }
    }
}

impl SealminerClient {
    /// Log in with a freshly generated session identifier.
    ///
    /// `POST /cgi-bin/login.php` with `username` and `origin_pwd` form
    /// fields. On success the identifier replaces any cached credential;
    /// on any failure the cached credential is cleared. Not retried.
    pub async fn authenticate(&self) -> AuthOutcome {
        let candidate = self.next_session_id();
        let outcome = self.login_with(candidate).await;
        self.store_token(outcome.token().cloned());
        outcome
    }

    async fn login_with(&self, candidate: SessionToken) -> AuthOutcome {
        let url = self.cgi_url(LOGIN_ENDPOINT);

        debug!("logging in at {}", url);

        let form = [
            ("username", USERNAME),
            ("origin_pwd", self.password().expose_secret()),
        ];
        let cookie = format!("userLanguage={LANGUAGE}; PHPSESSID={candidate}");

        let resp = match self
            .http()
            .post(url)
            .header(COOKIE, cookie)
            .form(&form)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                warn!(
                    host = %self.host(),
                    error = %e,
                    "could not authenticate web session with miner"
                );
                return AuthOutcome::TransportFailed(e);
            }
        };

        let status = resp.status();
        if !status.is_success() {
            debug!(%status, "login rejected");
            return AuthOutcome::Denied {
                status: status.as_u16(),
                state: None,
            };
        }

        let body: Value = match resp.json().await {
            Ok(body) => body,
            Err(e) => {
                debug!(error = %e, "login response is not JSON");
                return AuthOutcome::Undecodable {
                    message: e.to_string(),
                };
            }
        };

        let state = body.get("state");
        if state_confirms(state) {
            debug!("login successful");
            return AuthOutcome::Authenticated(candidate);
        }

        debug!(?state, "login not confirmed");
        AuthOutcome::Denied {
            status: status.as_u16(),
            state: state.and_then(Value::as_i64),
        }
    }
}

/// `state` confirms the session when it is numerically zero (`0`, `0.0`)
/// or `false`.
fn state_confirms(state: Option<&Value>) -> bool {
    match state {
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(Value::Bool(b)) => !b,
        _ => false,
    }
}
