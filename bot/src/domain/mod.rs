//! Domain layer — pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, or `reqwest`.
//! All functions are synchronous and take data in, returning data out.

pub mod chat;
pub mod config;
pub mod error;
pub mod host;
pub mod magnet;
pub mod retry;
pub mod torrent;

pub use chat::{ChatCommand, ChatInfo, DocumentRef, IncomingMessage};
pub use config::{AcquisitionPolicy, BotConfig, ChatConfig, ControlPlaneConfig, DaemonConfig};
pub use error::{AcquisitionError, CommandError, ConfigError, MagnetError};
pub use host::{HostCandidate, RunAssessment, RunTrigger, assess_run};
pub use retry::{Attempt, RetryPolicy};
pub use torrent::{TorrentFile, TorrentSummary, TorrentWithFiles};
