//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Host acquisition errors ───────────────────────────────────────────────────

/// Terminal failures of daemon host acquisition.
///
/// Transient conditions (run not yet applied, daemon connect timeout) never
/// appear here; they are retried inside the owning level's budget.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("no usable host published by the control plane after {attempts} attempts")]
    DiscoveryExhausted { attempts: u32 },

    #[error("Transmission at {address} did not answer after {attempts} attempts")]
    DaemonUnreachable { address: String, attempts: u32 },

    #[error("could not acquire a Transmission host after {attempts} attempts: {last}")]
    AcquisitionExhausted {
        attempts: u32,
        last: Box<AcquisitionError>,
    },

    #[error("control plane request failed: {0:#}")]
    ControlPlane(anyhow::Error),

    #[error("daemon probe failed: {0:#}")]
    Probe(anyhow::Error),
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors raised while validating the environment configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },

    #[error("No control plane configured. Set WORKSPACE_ID, WORKSPACE_NAME, ORGANIZATION_NAME and TF_CLOUD_TOKEN.")]
    NoControlPlane,
}

// ── Torrent file errors ───────────────────────────────────────────────────────

/// Errors raised while turning a `.torrent` file into a magnet link.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MagnetError {
    #[error("unexpected end of torrent data")]
    UnexpectedEof,

    #[error("invalid bencode prefix byte 0x{0:02x} at offset {1}")]
    InvalidPrefix(u8, usize),

    #[error("invalid bencode integer at offset {0}")]
    InvalidInt(usize),

    #[error("invalid bencode string length at offset {0}")]
    InvalidLen(usize),

    #[error("torrent file is not a bencoded dictionary")]
    NotADictionary,

    #[error("torrent file has no 'info' dictionary")]
    MissingInfo,

    #[error("trailing data after torrent dictionary")]
    TrailingData,
}

// ── Chat command errors ───────────────────────────────────────────────────────

/// Errors raised while parsing chat command arguments.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("'{0}' is not a valid id")]
    InvalidId(String),
}
