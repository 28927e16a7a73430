//! Miner command handlers: pool, mining control, reboot, raw send, batch, login.

use serde_json::json;

use sealminer_api::commands::QUERY_COMMANDS;
use sealminer_api::{AuthOutcome, RequestBody};

use crate::cli::{BatchArgs, GlobalOpts, MiningArgs, MiningCommand, PoolArgs, PoolCommand, SendArgs};
use crate::error::CliError;
use crate::output;

use super::{MinerCtx, util};

pub async fn pool(ctx: &MinerCtx<'_>, args: PoolArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        PoolCommand::Get => ctx.show(global, ctx.client.get_miner_poolconf().await),
        PoolCommand::Set { from_file } => {
            let conf = util::read_json_object(&from_file)?;
            if conf.is_empty() {
                return Err(CliError::Validation {
                    field: "from-file".into(),
                    reason: "pool configuration object is empty".into(),
                });
            }
            ctx.show(global, ctx.client.set_miner_poolconf(conf).await)
        }
    }
}

pub async fn mining(
    ctx: &MinerCtx<'_>,
    args: MiningArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        MiningCommand::Start => ctx.show(global, ctx.client.restart_mining().await),
        MiningCommand::Stop => {
            if !util::confirm("Stop hashing on this miner?", "mining stop", global.yes)? {
                return Ok(());
            }
            ctx.show(global, ctx.client.stop_mining().await)
        }
    }
}

pub async fn reboot(ctx: &MinerCtx<'_>, global: &GlobalOpts) -> Result<(), CliError> {
    let prompt = format!("Reboot miner {}?", ctx.client.host());
    if !util::confirm(&prompt, "reboot", global.yes)? {
        return Ok(());
    }
    ctx.show(global, ctx.client.reboot().await)
}

pub async fn send(ctx: &MinerCtx<'_>, args: SendArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let body = if let Some(data) = args.data {
        RequestBody::raw(data)
    } else if let Some(ref path) = args.from_file {
        RequestBody::structured(util::read_json_object(path)?)
    } else {
        RequestBody::structured(util::parse_params(&args.param)?)
    };

    tracing::debug!(command = %args.command, ?body, "sending raw command");
    ctx.show(global, ctx.client.send_command(&args.command, body).await)
}

pub async fn batch(ctx: &MinerCtx<'_>, args: BatchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let commands: Vec<&str> = if args.commands.is_empty() {
        QUERY_COMMANDS.to_vec()
    } else {
        args.commands.iter().map(String::as_str).collect()
    };

    let results = ctx
        .client
        .multicommand(&commands, args.ignore_errors)
        .await
        .map_err(|e| ctx.api_err(e))?;

    output::print_output(&output::render(&global.output, &results), global.quiet);
    Ok(())
}

pub async fn login(ctx: &MinerCtx<'_>, global: &GlobalOpts) -> Result<(), CliError> {
    match ctx.client.authenticate().await {
        AuthOutcome::Authenticated(token) => {
            let summary = json!({
                "host": ctx.client.host(),
                "authenticated": true,
                "issued_at": token.issued_at().to_rfc3339(),
            });
            output::print_output(&output::render(&global.output, &summary), global.quiet);
            Ok(())
        }
        outcome => {
            tracing::debug!(?outcome, "login failed");
            Err(CliError::AuthFailed {
                host: ctx.client.host().to_owned(),
                profile: ctx.profile.to_owned(),
            })
        }
    }
}
