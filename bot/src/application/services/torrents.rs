//! Application service — torrent management use-cases behind the chat
//! commands.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use anyhow::{Result, bail};
use chrono::Local;
use tracing::{debug, info};

use crate::application::ports::TorrentDaemon;
use crate::domain::torrent::{download_dir_for, existing_ids, unwanted_files};
use crate::domain::{TorrentSummary, TorrentWithFiles};

/// Bulk actions addressed by torrent id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdAction {
    Start,
    Stop,
    Remove,
}

impl IdAction {
    /// Past tense used in replies.
    #[must_use]
    pub fn verb(self) -> &'static str {
        match self {
            Self::Start => "started",
            Self::Stop => "stopped",
            Self::Remove => "deleted",
        }
    }
}

pub async fn list_torrents(daemon: &impl TorrentDaemon) -> Result<Vec<TorrentSummary>> {
    daemon.list().await
}

/// Every torrent with its file listing.
pub async fn list_with_files(daemon: &impl TorrentDaemon) -> Result<Vec<TorrentWithFiles>> {
    daemon.files(&[]).await
}

/// Add a magnet link into a fresh timestamped directory under `base_dir`.
///
/// # Errors
///
/// Returns an error if the daemon rejects the link.
pub async fn add_magnet(daemon: &impl TorrentDaemon, magnet: &str, base_dir: &str) -> Result<i64> {
    let download_dir = download_dir_for(base_dir, &Local::now());
    let id = daemon.add(magnet, &download_dir).await?;
    info!(id, download_dir = %download_dir, "Torrent added");
    Ok(id)
}

/// Apply `action` to the requested ids the daemon actually has.
///
/// Unknown ids and non-numeric tokens are ignored. When nothing is left the
/// daemon is not called. Returns the ids that were acted on.
///
/// # Errors
///
/// Returns an error if listing or the action itself fails.
pub async fn apply_to_existing(
    daemon: &impl TorrentDaemon,
    action: IdAction,
    requested: &[String],
) -> Result<Vec<i64>> {
    let present: Vec<i64> = daemon.list().await?.iter().map(|t| t.id).collect();
    let ids = existing_ids(requested, &present);
    if ids.is_empty() {
        debug!(?action, ?requested, "No matching torrents");
        return Ok(ids);
    }
    match action {
        IdAction::Start => daemon.start(&ids).await?,
        IdAction::Stop => daemon.stop(&ids).await?,
        IdAction::Remove => daemon.remove(&ids).await?,
    }
    info!(?action, ?ids, "Torrents updated");
    Ok(ids)
}

/// Download only `wanted` files of torrent `id`; all others are unselected.
///
/// # Errors
///
/// Returns an error if the torrent does not exist or the daemon call fails.
pub async fn set_wanted(daemon: &impl TorrentDaemon, id: i64, wanted: &[usize]) -> Result<()> {
    let torrents = daemon.files(&[id]).await?;
    let Some(torrent) = torrents.iter().find(|t| t.torrent.id == id) else {
        bail!("Torrent {id} not found");
    };
    let unwanted = unwanted_files(&torrent.files, wanted);
    daemon.set_files(id, wanted, &unwanted).await?;
    info!(id, ?wanted, ?unwanted, "File selection updated");
    Ok(())
}
