//! Daemon host types and the pure run-classification rules used by host
//! acquisition.

use std::fmt;

pub use seedhost_common::{RunResource, RunStatus, StateOutputAttributes};

/// Address published by the control plane, paired with the daemon port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostCandidate {
    pub address: String,
    pub port: u16,
}

impl HostCandidate {
    #[must_use]
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
        }
    }

    /// Base URL the reachability probe requests.
    #[must_use]
    pub fn probe_url(&self) -> String {
        format!("http://{}:{}", self.address, self.port)
    }
}

impl fmt::Display for HostCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}

/// Runs the bot starts on the control plane. The message is shown in the
/// control plane's run history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunTrigger {
    /// Re-create the host after the latest run destroyed it.
    Create,
    /// Tear down a host whose daemon never answered.
    DestroyUnreachable,
    /// Tear down after host discovery ran out of attempts.
    DestroyOnTimeout,
    /// Tear down on explicit user request.
    DestroyByCommand,
}

impl RunTrigger {
    #[must_use]
    pub fn is_destroy(self) -> bool {
        !matches!(self, Self::Create)
    }

    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Create => "Create from bot",
            Self::DestroyUnreachable => "Destroy from bot",
            Self::DestroyOnTimeout => "Destroy from bot on timeout",
            Self::DestroyByCommand => "Destroy from bot with command",
        }
    }
}

/// What the latest run says about the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunAssessment {
    /// Still planning/applying, or finished without a usable result.
    Unsettled,
    /// Settled, but it tore the host down.
    Destroyed,
    /// Settled apply; state outputs describe a live host.
    Provisioned,
}

/// Classify the latest run of the workspace.
#[must_use]
pub fn assess_run(run: &RunResource) -> RunAssessment {
    if !run.attributes.status.is_settled() {
        RunAssessment::Unsettled
    } else if run.attributes.is_destroy {
        RunAssessment::Destroyed
    } else {
        RunAssessment::Provisioned
    }
}
