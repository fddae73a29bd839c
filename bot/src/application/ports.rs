//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` — never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::time::Duration;

use anyhow::Result;

use crate::domain::host::{HostCandidate, RunResource, StateOutputAttributes};
use crate::domain::{IncomingMessage, TorrentSummary, TorrentWithFiles};

// ── Value Types ───────────────────────────────────────────────────────────────

/// Result of one reachability probe that did not fail fatally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The daemon answered with this HTTP status. Any status counts.
    Reachable(u16),
    /// The connection attempt timed out; the host may still be booting.
    TimedOut,
}

/// One long-poll result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateBatch {
    /// Offset for the next poll; past every update seen, including ones
    /// that carried no message.
    pub next_offset: i64,
    pub messages: Vec<IncomingMessage>,
}

// ── Control plane ─────────────────────────────────────────────────────────────

/// Infrastructure-as-code control plane that provisions the daemon host.
///
/// Every error is fatal to the caller; the port never classifies transient
/// failures.
#[allow(async_fn_in_trait)]
pub trait ControlPlane {
    /// Most recent run of the workspace.
    async fn latest_run(&self, workspace_id: &str) -> Result<RunResource>;
    /// Queue a run. Returns once the control plane accepted it.
    async fn trigger_run(
        &self,
        workspace_id: &str,
        is_destroy: bool,
        message: &str,
    ) -> Result<RunResource>;
    /// Id of the first output of the current state version.
    async fn latest_state_output_id(
        &self,
        workspace_name: &str,
        organization_name: &str,
    ) -> Result<String>;
    /// A single state output by id.
    async fn state_output(&self, output_id: &str) -> Result<StateOutputAttributes>;
}

/// Bounded-time reachability check against the daemon.
#[allow(async_fn_in_trait)]
pub trait DaemonProbe {
    /// Returns `Err` for every failure other than a connect timeout.
    async fn probe(&self, candidate: &HostCandidate, timeout: Duration) -> Result<ProbeOutcome>;
}

// ── Torrent daemon ────────────────────────────────────────────────────────────

/// Transmission RPC operations used by the chat commands.
#[allow(async_fn_in_trait)]
pub trait TorrentDaemon {
    async fn list(&self) -> Result<Vec<TorrentSummary>>;
    /// Torrents with their file lists. An empty `ids` slice means all.
    async fn files(&self, ids: &[i64]) -> Result<Vec<TorrentWithFiles>>;
    /// Add a magnet link, downloading into `download_dir`. Returns the id.
    async fn add(&self, magnet: &str, download_dir: &str) -> Result<i64>;
    async fn start(&self, ids: &[i64]) -> Result<()>;
    async fn stop(&self, ids: &[i64]) -> Result<()>;
    /// Remove torrents, keeping downloaded data.
    async fn remove(&self, ids: &[i64]) -> Result<()>;
    async fn set_files(&self, id: i64, wanted: &[usize], unwanted: &[usize]) -> Result<()>;
}

/// Opens a daemon client for one command.
///
/// Implementations resolve the host on every call, so a host that was torn
/// down since the last command is provisioned again.
#[allow(async_fn_in_trait)]
pub trait TorrentDaemonFactory {
    type Daemon: TorrentDaemon;

    async fn connect(&self) -> Result<Self::Daemon>;
}

// ── Chat ──────────────────────────────────────────────────────────────────────

/// Messaging front-end.
#[allow(async_fn_in_trait)]
pub trait ChatTransport {
    /// Updates with an id of at least `offset`. May block while waiting for
    /// new messages.
    async fn poll_updates(&self, offset: i64) -> Result<UpdateBatch>;
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()>;
    /// Raw bytes of an uploaded file.
    async fn download_document(&self, file_id: &str) -> Result<Vec<u8>>;
}

/// Fetches web pages for magnet scraping.
#[allow(async_fn_in_trait)]
pub trait PageFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String>;
}
