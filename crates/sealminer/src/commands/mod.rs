//! Command dispatch: bridges CLI args -> miner web API -> output formatting.

pub mod config_cmd;
pub mod miner;
pub mod util;

use serde_json::Value;

use sealminer_api::{Error as ApiError, SealminerClient};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;
use crate::output;

/// A connected miner plus the profile it was resolved from.
pub struct MinerCtx<'a> {
    pub client: &'a SealminerClient,
    pub profile: &'a str,
}

impl MinerCtx<'_> {
    /// Map a client error into a CLI error for this profile.
    pub fn api_err(&self, err: ApiError) -> CliError {
        CliError::from_api(err, self.profile)
    }

    /// Render a command response, or translate its error.
    pub fn show(&self, global: &GlobalOpts, result: Result<Value, ApiError>) -> Result<(), CliError> {
        let value = result.map_err(|e| self.api_err(e))?;
        output::print_output(&output::render(&global.output, &value), global.quiet);
        Ok(())
    }
}

/// Dispatch a miner-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, ctx: &MinerCtx<'_>, global: &GlobalOpts) -> Result<(), CliError> {
    let client = ctx.client;
    match cmd {
        Command::Pool(args) => miner::pool(ctx, args, global).await,
        Command::System => ctx.show(global, client.get_system_info().await),
        Command::Network => ctx.show(global, client.get_network_info().await),
        Command::Monitor => ctx.show(global, client.get_miner_monitor_status().await),
        Command::Mode => ctx.show(global, client.get_mining_mode().await),
        Command::MinerType => ctx.show(global, client.get_miner_type().await),
        Command::Errors => ctx.show(global, client.get_miner_error_code().await),
        Command::Mining(args) => miner::mining(ctx, args, global).await,
        Command::Reboot => miner::reboot(ctx, global).await,
        Command::Send(args) => miner::send(ctx, args, global).await,
        Command::Batch(args) => miner::batch(ctx, args, global).await,
        Command::Login => miner::login(ctx, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
