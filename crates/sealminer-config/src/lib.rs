//! Shared configuration for the Sealminer CLI.
//!
//! TOML miner profiles, password resolution (env + keyring + plaintext +
//! factory default), and translation to a ready-to-connect [`MinerConfig`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use sealminer_api::{DEFAULT_PASSWORD, DEFAULT_PORT, TransportConfig};

/// Keyring service name under which miner passwords are stored.
pub const KEYRING_SERVICE: &str = "sealminer";

/// Environment variable that overrides every other password source.
pub const PASSWORD_ENV: &str = "SEALMINER_PASSWORD";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("miner profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named on the command line.
    pub default_miner: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named miner profiles.
    #[serde(default)]
    pub miners: HashMap<String, MinerProfile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_miner: Some("default".into()),
            defaults: Defaults::default(),
            miners: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// HTTP proxy for all miners (e.g. "http://10.0.0.1:3128").
    pub proxy: Option<String>,

    #[serde(default = "default_output")]
    pub output: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            port: default_port(),
            timeout: default_timeout(),
            proxy: None,
            output: default_output(),
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_timeout() -> u64 {
    30
}
fn default_output() -> String {
    "json".into()
}

/// A named miner profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MinerProfile {
    /// Miner IP address or hostname.
    pub host: String,

    /// Override the web server port.
    pub port: Option<u16>,

    /// Web password (plaintext — prefer keyring).
    pub password: Option<String>,

    /// Environment variable name containing the web password.
    pub password_env: Option<String>,

    /// Override timeout.
    pub timeout: Option<u64>,

    /// Override proxy.
    pub proxy: Option<String>,
}

/// Everything needed to construct a `SealminerClient`.
#[derive(Debug, Clone)]
pub struct MinerConfig {
    pub host: String,
    pub port: u16,
    pub password: SecretString,
    pub transport: TransportConfig,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "sealminer", "sealminer").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("sealminer");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load Config from a specific file, layered over defaults and under
/// `SEALMINER_`-prefixed environment variables (`__` separates nesting,
/// e.g. `SEALMINER_DEFAULTS__PORT=8080`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("SEALMINER_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Profile resolution ──────────────────────────────────────────────

impl Config {
    /// Resolve the active profile name: explicit choice, then
    /// `default_miner`, then `"default"`.
    pub fn active_miner_name(&self, requested: Option<&str>) -> String {
        requested
            .map(str::to_owned)
            .or_else(|| self.default_miner.clone())
            .unwrap_or_else(|| "default".into())
    }

    /// Look up a profile by name.
    pub fn profile(&self, name: &str) -> Result<&MinerProfile, ConfigError> {
        self.miners
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound { name: name.into() })
    }
}

/// Resolve the web password for a profile.
///
/// Chain: `SEALMINER_PASSWORD` → the profile's `password_env` →
/// system keyring → plaintext in config → factory default (`seal`).
pub fn resolve_password(profile: Option<&MinerProfile>, profile_name: &str) -> SecretString {
    let from_env = std::env::var(PASSWORD_ENV).ok().or_else(|| {
        profile
            .and_then(|p| p.password_env.as_deref())
            .and_then(|name| std::env::var(name).ok())
    });

    let from_keyring = if from_env.is_none() {
        keyring::Entry::new(KEYRING_SERVICE, &keyring_user(profile_name))
            .and_then(|entry| entry.get_password())
            .ok()
    } else {
        None
    };

    password_chain(from_env, from_keyring, profile)
}

/// Pick the first available password source, falling back to the default.
fn password_chain(
    from_env: Option<String>,
    from_keyring: Option<String>,
    profile: Option<&MinerProfile>,
) -> SecretString {
    let pw = from_env
        .or(from_keyring)
        .or_else(|| profile.and_then(|p| p.password.clone()))
        .unwrap_or_else(|| DEFAULT_PASSWORD.to_owned());
    SecretString::from(pw)
}

/// Store a profile's web password in the system keyring.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &keyring_user(profile_name))?;
    entry.set_password(password)?;
    Ok(())
}

fn keyring_user(profile_name: &str) -> String {
    format!("{profile_name}/password")
}

/// Build a `TransportConfig` from a timeout and optional proxy string.
pub fn transport_config(
    timeout_secs: u64,
    proxy: Option<&str>,
) -> Result<TransportConfig, ConfigError> {
    let mut transport =
        TransportConfig::default().with_timeout(Duration::from_secs(timeout_secs));
    if let Some(proxy) = proxy {
        let url: url::Url = proxy.parse().map_err(|_| ConfigError::Validation {
            field: "proxy".into(),
            reason: format!("invalid URL: {proxy}"),
        })?;
        transport = transport.with_proxy(url);
    }
    Ok(transport)
}

/// Build a `MinerConfig` from a profile and the global defaults.
pub fn profile_to_miner_config(
    cfg: &Config,
    profile: &MinerProfile,
    profile_name: &str,
) -> Result<MinerConfig, ConfigError> {
    if profile.host.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: "host".into(),
            reason: format!("profile '{profile_name}' has no host"),
        });
    }

    let timeout = profile.timeout.unwrap_or(cfg.defaults.timeout);
    let proxy = profile.proxy.as_deref().or(cfg.defaults.proxy.as_deref());

    Ok(MinerConfig {
        host: profile.host.trim().to_owned(),
        port: profile.port.unwrap_or(cfg.defaults.port),
        password: resolve_password(Some(profile), profile_name),
        transport: transport_config(timeout, proxy)?,
    })
}
