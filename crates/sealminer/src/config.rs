//! CLI configuration — thin wrapper around `sealminer_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--host, --port, --password, --timeout).

use secrecy::SecretString;

use sealminer_config::{MinerConfig, MinerProfile};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use sealminer_config::{
    Config, Defaults, config_path, load_config_or_default, save_config, store_password,
};

/// A resolved miner target plus the profile name it came from.
pub struct Target {
    pub profile: String,
    pub miner: MinerConfig,
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.active_miner_name(global.miner.as_deref())
}

/// Translate config + global flags into a `MinerConfig`.
///
/// Flag overrides take priority over profile values. Without a matching
/// profile, `--host` alone is enough: everything else falls back to the
/// config defaults and the factory password.
pub fn resolve_target(global: &GlobalOpts, cfg: &Config) -> Result<Target, CliError> {
    let profile_name = active_profile_name(global, cfg);

    let profile = match (cfg.miners.get(&profile_name), global.host.as_deref()) {
        (Some(profile), _) => profile.clone(),
        (None, Some(host)) => MinerProfile {
            host: host.to_owned(),
            ..MinerProfile::default()
        },
        (None, None) if global.miner.is_some() => {
            let mut available: Vec<_> = cfg.miners.keys().cloned().collect();
            available.sort();
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            });
        }
        (None, None) => {
            return Err(CliError::NoMiner {
                path: config_path().display().to_string(),
            });
        }
    };

    let mut miner = sealminer_config::profile_to_miner_config(cfg, &profile, &profile_name)?;

    if let Some(ref host) = global.host {
        miner.host.clone_from(host);
    }
    if let Some(port) = global.port {
        miner.port = port;
    }
    if let Some(ref password) = global.password {
        miner.password = SecretString::from(password.clone());
    }
    if let Some(timeout) = global.timeout {
        miner.transport = miner
            .transport
            .with_timeout(std::time::Duration::from_secs(timeout));
    }

    Ok(Target {
        profile: profile_name,
        miner,
    })
}
