//! Transmission RPC request and response payloads.

use serde::{Deserialize, Serialize};

use crate::error::WireError;

/// Header carrying the CSRF session token Transmission hands out on 409.
pub const SESSION_ID_HEADER: &str = "X-Transmission-Session-Id";

/// Field list requested for torrent summaries.
pub const SUMMARY_FIELDS: &[&str] = &["id", "name", "status", "percentDone"];

/// Field list requested for per-file listings.
pub const FILE_FIELDS: &[&str] = &["id", "name", "files", "fileStats"];

/// One RPC call: `{"method": ..., "arguments": {...}}`.
#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest {
    pub method: String,
    pub arguments: serde_json::Value,
}

impl RpcRequest {
    #[must_use]
    pub fn new(method: &str, arguments: serde_json::Value) -> Self {
        Self {
            method: method.to_string(),
            arguments,
        }
    }
}

/// One RPC reply. `result` is `"success"` or an error string.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse {
    pub result: String,
    #[serde(default)]
    pub arguments: serde_json::Value,
}

impl RpcResponse {
    /// Return the reply arguments when the call succeeded.
    pub fn into_arguments(self) -> Result<serde_json::Value, WireError> {
        if self.result == "success" {
            Ok(self.arguments)
        } else {
            Err(WireError::RpcFailed(self.result))
        }
    }
}

/// Torrent activity state, decoded from the numeric RPC status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "i64")]
pub enum TorrentStatus {
    Stopped,
    CheckPending,
    Checking,
    DownloadPending,
    Downloading,
    SeedPending,
    Seeding,
    Unknown(i64),
}

impl From<i64> for TorrentStatus {
    fn from(code: i64) -> Self {
        match code {
            0 => Self::Stopped,
            1 => Self::CheckPending,
            2 => Self::Checking,
            3 => Self::DownloadPending,
            4 => Self::Downloading,
            5 => Self::SeedPending,
            6 => Self::Seeding,
            other => Self::Unknown(other),
        }
    }
}

impl std::fmt::Display for TorrentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stopped => f.write_str("stopped"),
            Self::CheckPending => f.write_str("check pending"),
            Self::Checking => f.write_str("checking"),
            Self::DownloadPending => f.write_str("download pending"),
            Self::Downloading => f.write_str("downloading"),
            Self::SeedPending => f.write_str("seed pending"),
            Self::Seeding => f.write_str("seeding"),
            Self::Unknown(code) => write!(f, "unknown ({code})"),
        }
    }
}

/// A file entry of `torrent-get` `files`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub name: String,
    pub length: u64,
    #[serde(default)]
    pub bytes_completed: u64,
}

/// A file entry of `torrent-get` `fileStats`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct FileStat {
    #[serde(default = "default_wanted")]
    pub wanted: bool,
}

fn default_wanted() -> bool {
    true
}

/// One torrent as returned by `torrent-get`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Torrent {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_status")]
    pub status: TorrentStatus,
    #[serde(default)]
    pub percent_done: f64,
    #[serde(default)]
    pub files: Vec<FileEntry>,
    #[serde(default)]
    pub file_stats: Vec<FileStat>,
}

fn default_status() -> TorrentStatus {
    TorrentStatus::Unknown(-1)
}

/// `torrent-get` reply arguments.
#[derive(Debug, Clone, Deserialize)]
pub struct TorrentGetArguments {
    #[serde(default)]
    pub torrents: Vec<Torrent>,
}

/// Torrent reference returned by `torrent-add`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AddedTorrent {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub hash_string: String,
}

/// `torrent-add` reply arguments. Exactly one key is present.
#[derive(Debug, Clone, Deserialize)]
pub struct TorrentAddArguments {
    #[serde(rename = "torrent-added")]
    pub added: Option<AddedTorrent>,
    #[serde(rename = "torrent-duplicate")]
    pub duplicate: Option<AddedTorrent>,
}

impl TorrentAddArguments {
    /// The torrent that was added, or the one it duplicates.
    pub fn into_torrent(self) -> Result<AddedTorrent, WireError> {
        self.added
            .or(self.duplicate)
            .ok_or(WireError::MissingField("torrent-added"))
    }
}
