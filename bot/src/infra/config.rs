//! Environment-backed configuration loading.

use anyhow::{Context, Result};

use crate::domain::BotConfig;
use crate::domain::config::EnvSettings;

/// Read and validate the process environment.
///
/// # Errors
///
/// Returns an error if a variable cannot be parsed or fails validation.
pub fn load() -> Result<BotConfig> {
    let settings: EnvSettings =
        envy::from_env().context("failed to read configuration from the environment")?;
    Ok(BotConfig::from_settings(settings)?)
}

/// Same as [`load`], from an explicit set of variables.
///
/// # Errors
///
/// Returns an error if a variable cannot be parsed or fails validation.
pub fn load_from<I>(vars: I) -> Result<BotConfig>
where
    I: IntoIterator<Item = (String, String)>,
{
    let settings: EnvSettings =
        envy::from_iter(vars).context("failed to read configuration from the environment")?;
    Ok(BotConfig::from_settings(settings)?)
}
