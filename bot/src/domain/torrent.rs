//! Torrent listing types and the pure helpers behind the torrent commands.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, TimeZone};

/// One row of the torrent list.
#[derive(Debug, Clone, PartialEq)]
pub struct TorrentSummary {
    pub id: i64,
    pub name: String,
    pub status: String,
    /// Completion in percent, `0.0..=100.0`.
    pub progress: f64,
}

impl fmt::Display for TorrentSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.id,
            self.name,
            self.status,
            format_progress(self.progress)
        )
    }
}

/// One file inside a torrent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TorrentFile {
    pub index: usize,
    pub name: String,
    pub size_bytes: u64,
    pub wanted: bool,
}

impl fmt::Display for TorrentFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {} MB",
            self.index,
            self.name,
            (self.size_bytes + (1 << 19)) >> 20
        )
    }
}

/// A torrent together with its files.
#[derive(Debug, Clone, PartialEq)]
pub struct TorrentWithFiles {
    pub torrent: TorrentSummary,
    pub files: Vec<TorrentFile>,
}

/// Round to two decimals, keeping at least one (`45.6`, `100.0`).
#[must_use]
pub fn format_progress(percent: f64) -> String {
    let rounded = (percent * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.1}")
    } else {
        format!("{rounded}")
    }
}

/// Requested ids that name a torrent the daemon currently has.
///
/// Tokens that are not integers are dropped. The result is sorted and free
/// of duplicates.
#[must_use]
pub fn existing_ids(requested: &[String], present: &[i64]) -> Vec<i64> {
    let present: BTreeSet<i64> = present.iter().copied().collect();
    requested
        .iter()
        .filter_map(|token| token.trim().parse::<i64>().ok())
        .filter(|id| present.contains(id))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Indices of all files not listed in `wanted`.
#[must_use]
pub fn unwanted_files(files: &[TorrentFile], wanted: &[usize]) -> Vec<usize> {
    files
        .iter()
        .map(|f| f.index)
        .filter(|index| !wanted.contains(index))
        .collect()
}

/// Per-download directory: `<base>/<ddmmYYYYHHMMSS>`.
#[must_use]
pub fn download_dir_for<Tz: TimeZone>(base: &str, now: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        now.format("%d%m%Y%H%M%S")
    )
}

// ── Unit tests ────────────────────────────────────────────────────────────────
