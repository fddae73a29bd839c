//! `seedhost magnet` — print the magnet link of a `.torrent` file.

use std::path::Path;

use anyhow::{Context, Result};

use crate::domain::magnet::magnet_from_torrent;

/// Run the magnet command.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid torrent.
pub fn run(path: &Path) -> Result<()> {
    let data = std::fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
    let link = magnet_from_torrent(&data)
        .with_context(|| format!("{} is not a valid torrent file", path.display()))?;
    println!("{link}");
    Ok(())
}
