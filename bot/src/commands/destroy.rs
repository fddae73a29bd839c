//! `seedhost destroy` — queue a destroy run for the daemon host.

use anyhow::Result;

use crate::application::services::host_acquisition::queue_run;
use crate::domain::{BotConfig, RunTrigger};
use crate::infra::control_plane::TerraformCloud;
use crate::output::OutputContext;

/// Run the destroy command.
///
/// # Errors
///
/// Returns an error if no control plane is configured or the request fails.
pub async fn run(ctx: &OutputContext, config: &BotConfig) -> Result<()> {
    let control_plane_config = config.require_control_plane()?;
    let control_plane = TerraformCloud::new(control_plane_config)?;
    let run = queue_run(
        &control_plane,
        control_plane_config,
        RunTrigger::DestroyByCommand,
    )
    .await?;
    ctx.success(&format!(
        "Destroy run {} queued for workspace {}",
        run.id, control_plane_config.workspace_name
    ));
    Ok(())
}
