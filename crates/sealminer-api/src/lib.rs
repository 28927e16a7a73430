// sealminer-api: Async Rust client for the Sealminer miner web management API

pub mod auth;
pub mod client;
pub mod commands;
pub mod error;
pub mod session;
pub mod transport;

pub use auth::AuthOutcome;
pub use client::{DEFAULT_PASSWORD, DEFAULT_PORT, RequestBody, SealminerClient, USERNAME};
pub use error::Error;
pub use session::{SESSION_ID_LEN, SessionIdGenerator, SessionToken};
pub use transport::TransportConfig;
