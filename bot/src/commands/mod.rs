//! Command implementations

pub mod acquire;
pub mod destroy;
pub mod magnet;
pub mod serve;
pub mod version;

use anyhow::Result;

use crate::application::services::host_acquisition::HostAcquisition;
use crate::domain::{BotConfig, HostCandidate};
use crate::infra::control_plane::TerraformCloud;
use crate::infra::probe::HttpProbe;

/// Acquire a reachable daemon host from the control plane.
///
/// # Errors
///
/// Returns an error if no control plane is configured or acquisition fails.
pub async fn acquire_host(config: &BotConfig) -> Result<HostCandidate> {
    let control_plane_config = config.require_control_plane()?;
    let control_plane = TerraformCloud::new(control_plane_config)?;
    let probe = HttpProbe::new(config.acquisition.probe_timeout)?;
    let acquisition = HostAcquisition::new(
        &control_plane,
        &probe,
        control_plane_config,
        &config.acquisition,
        config.daemon.port,
    );
    Ok(acquisition.acquire().await?)
}
