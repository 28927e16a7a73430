// Named miner commands
//
// Thin wrappers over `send_command`: each fixes the endpoint name and the
// request body shape. Responses stay opaque JSON.

use std::collections::BTreeMap;

use futures_util::future::join_all;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::client::{RequestBody, SealminerClient};
use crate::error::Error;

pub const GET_MINER_POOLCONF: &str = "get_miner_poolconf";
pub const SET_MINER_POOLCONF: &str = "set_miner_poolconf";
pub const GET_SYSTEM_INFO: &str = "get_system_info";
pub const GET_NETWORK_INFO: &str = "get_network_info";
pub const GET_MINER_MONITOR_STATUS: &str = "get_miner_monitor_status";
pub const GET_MINING_MODE: &str = "get_mining_mode";
pub const GET_MINER_TYPE: &str = "get_miner_type";
pub const GET_MINER_ERROR_CODE: &str = "get_miner_error_code";
pub const MINING_SETTING: &str = "mining_setting";
pub const REBOOT: &str = "reboot";

/// Raw `mining_setting` payload that starts hashing.
pub const START_MINING_PAYLOAD: &str = "{parama_data:1}";
/// Raw `mining_setting` payload that stops hashing.
pub const STOP_MINING_PAYLOAD: &str = "{parama_data:0}";

/// Read-only commands that take no parameters.
pub const QUERY_COMMANDS: &[&str] = &[
    GET_MINER_POOLCONF,
    GET_SYSTEM_INFO,
    GET_NETWORK_INFO,
    GET_MINER_MONITOR_STATUS,
    GET_MINING_MODE,
    GET_MINER_TYPE,
    GET_MINER_ERROR_CODE,
];

impl SealminerClient {
    pub async fn get_miner_poolconf(&self) -> Result<Value, Error> {
        self.send_command(GET_MINER_POOLCONF, RequestBody::Empty)
            .await
    }

    /// Replace the pool configuration. `conf` is posted as JSON as-is.
    pub async fn set_miner_poolconf(&self, conf: Map<String, Value>) -> Result<Value, Error> {
        self.send_command(SET_MINER_POOLCONF, RequestBody::structured(conf))
            .await
    }

    pub async fn get_system_info(&self) -> Result<Value, Error> {
        self.send_command(GET_SYSTEM_INFO, RequestBody::Empty).await
    }

    pub async fn get_network_info(&self) -> Result<Value, Error> {
        self.send_command(GET_NETWORK_INFO, RequestBody::Empty).await
    }

    pub async fn get_miner_monitor_status(&self) -> Result<Value, Error> {
        self.send_command(GET_MINER_MONITOR_STATUS, RequestBody::Empty)
            .await
    }

    pub async fn get_mining_mode(&self) -> Result<Value, Error> {
        self.send_command(GET_MINING_MODE, RequestBody::Empty).await
    }

    pub async fn get_miner_type(&self) -> Result<Value, Error> {
        self.send_command(GET_MINER_TYPE, RequestBody::Empty).await
    }

    pub async fn get_miner_error_code(&self) -> Result<Value, Error> {
        self.send_command(GET_MINER_ERROR_CODE, RequestBody::Empty)
            .await
    }

    /// Start (or resume) hashing.
    pub async fn restart_mining(&self) -> Result<Value, Error> {
        self.send_command(MINING_SETTING, RequestBody::raw(START_MINING_PAYLOAD))
            .await
    }

    /// Stop hashing without rebooting.
    pub async fn stop_mining(&self) -> Result<Value, Error> {
        self.send_command(MINING_SETTING, RequestBody::raw(STOP_MINING_PAYLOAD))
            .await
    }

    pub async fn reboot(&self) -> Result<Value, Error> {
        self.send_command(REBOOT, RequestBody::Empty).await
    }

    /// Send several parameterless commands concurrently over one session.
    ///
    /// The session is established once before fan-out. Results are keyed
    /// by command name. With `ignore_errors`, failed commands are logged
    /// and left out; otherwise the first failure in input order is returned.
    pub async fn multicommand(
        &self,
        commands: &[&str],
        ignore_errors: bool,
    ) -> Result<BTreeMap<String, Value>, Error> {
        self.ensure_session().await?;

        debug!(count = commands.len(), "dispatching multicommand");
        let results = join_all(
            commands
                .iter()
                .map(|cmd| self.send_command(cmd, RequestBody::Empty)),
        )
        .await;

        let mut out = BTreeMap::new();
        for (cmd, result) in commands.iter().zip(results) {
            match result {
                Ok(value) => {
                    out.insert((*cmd).to_owned(), value);
                }
                Err(e) if ignore_errors => {
                    warn!(command = cmd, error = %e, "multicommand entry failed");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(out)
    }
}
