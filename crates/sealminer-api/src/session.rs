// PHP-style session identifiers.
//
// The miner's web server accepts any syntactically valid PHPSESSID and
// only confirms the session through the login call, so the identifier is
// simply the first 26 hex characters of a SHA-1 over 10 random bytes.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use sha1::{Digest, Sha1};

/// Length of a generated session identifier.
pub const SESSION_ID_LEN: usize = 26;

const RANDOM_BYTES: usize = 10;

/// A session credential presented to the miner as the `PHPSESSID` cookie.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken {
    value: String,
    issued_at: DateTime<Utc>,
}

impl SessionToken {
    /// The raw identifier, always [`SESSION_ID_LEN`] lowercase hex characters.
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// When this identifier was generated.
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

// The identifier is a live credential once the miner accepts it.
impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionToken")
            .field("value", &"****")
            .field("issued_at", &self.issued_at)
            .finish()
    }
}

/// Owned random source for session identifiers.
///
/// Seeded once, so successive identifiers from one generator never
/// interfere with any other generator in the process.
pub struct SessionIdGenerator {
    rng: StdRng,
}

impl SessionIdGenerator {
    /// Seed from the current wall-clock time in nanoseconds.
    pub fn from_time() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_nanos());
        // Fold the 128-bit nanosecond count into a 64-bit seed.
        #[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
        let seed = (nanos as u64) ^ ((nanos >> 64) as u64);
        Self::with_seed(seed)
    }

    /// Deterministic generator for a fixed seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Produce the next session identifier.
    pub fn generate(&mut self) -> SessionToken {
        let mut bytes = [0u8; RANDOM_BYTES];
        self.rng.fill_bytes(&mut bytes);
        SessionToken {
            value: session_id_from_bytes(&bytes),
            issued_at: Utc::now(),
        }
    }
}

impl fmt::Debug for SessionIdGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionIdGenerator").finish_non_exhaustive()
    }
}

fn session_id_from_bytes(bytes: &[u8]) -> String {
    let digest = Sha1::digest(bytes);
    let mut id = hex::encode(digest);
    id.truncate(SESSION_ID_LEN);
    id
}
