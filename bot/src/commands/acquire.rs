//! `seedhost acquire` — resolve a reachable Transmission host and print it.

use anyhow::Result;

use crate::domain::BotConfig;
use crate::output::{OutputContext, json};

/// Run the acquire command.
///
/// # Errors
///
/// Returns an error if acquisition fails. In JSON mode the error object is
/// printed to stdout before the error is returned.
pub async fn run(ctx: &OutputContext, config: &BotConfig, json_output: bool) -> Result<()> {
    if !json_output {
        ctx.info("Waiting for the control plane to publish a reachable host");
    }
    let candidate = match super::acquire_host(config).await {
        Ok(candidate) => candidate,
        Err(e) => {
            if json_output {
                println!("{}", json::format_error(&format!("{e:#}"), "ACQUISITION_FAILED")?);
            }
            return Err(e);
        }
    };

    if json_output {
        println!("{}", json::format_host(&candidate)?);
    } else {
        ctx.success("Transmission is reachable");
        ctx.kv("Host:", &candidate.address);
        ctx.kv("RPC: ", &format!("{}/transmission/rpc", candidate.probe_url()));
    }
    Ok(())
}
