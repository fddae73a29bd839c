//! HTTP reachability probe implementing the `DaemonProbe` port.

use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::{DaemonProbe, ProbeOutcome};
use crate::domain::HostCandidate;

/// Whole-request bound, as a multiple of the connect bound. It must stay
/// strictly larger so a hanging connect surfaces as a connect timeout.
const REQUEST_BOUND_FACTOR: u32 = 2;

/// Plain `GET http://<host>:<port>`; any HTTP response means reachable.
pub struct HttpProbe {
    http: reqwest::Client,
}

impl HttpProbe {
    /// Probe client whose connection attempts give up after `connect_timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(connect_timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .context("failed to create probe HTTP client")?;
        Ok(Self { http })
    }
}

impl DaemonProbe for HttpProbe {
    async fn probe(&self, candidate: &HostCandidate, timeout: Duration) -> Result<ProbeOutcome> {
        match self
            .http
            .get(candidate.probe_url())
            .timeout(timeout.saturating_mul(REQUEST_BOUND_FACTOR))
            .send()
            .await
        {
            Ok(response) => Ok(ProbeOutcome::Reachable(response.status().as_u16())),
            Err(e) if e.is_connect() && e.is_timeout() => Ok(ProbeOutcome::TimedOut),
            Err(e) => Err(e).with_context(|| format!("probe of {candidate} failed")),
        }
    }
}
