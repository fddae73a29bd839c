//! Application service — daemon host acquisition.
//!
//! Finds the Transmission host published by the control plane and waits
//! until the daemon answers. Three nested retry levels:
//!
//! 1. [`HostAcquisition::probe_daemon`] polls the daemon port.
//! 2. [`HostAcquisition::discover_host`] polls the latest run until it is an
//!    applied, non-destroy run, then reads the host address from the state
//!    outputs. A settled destroy run queues a create run and keeps polling.
//! 3. [`HostAcquisition::acquire`] runs discovery then the probe. A failed
//!    attempt tears the host down once before the next attempt.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::cell::RefCell;

use tracing::{debug, info, warn};

use crate::application::ports::{ControlPlane, DaemonProbe, ProbeOutcome};
use crate::application::services::retry::{RetryError, retry_with};
use crate::domain::host::RunResource;
use crate::domain::{
    AcquisitionError, AcquisitionPolicy, Attempt, ControlPlaneConfig, HostCandidate,
    RunAssessment, RunTrigger, assess_run,
};

/// Host acquisition against one control-plane workspace.
pub struct HostAcquisition<'a, C, P> {
    control_plane: &'a C,
    probe: &'a P,
    config: &'a ControlPlaneConfig,
    policy: &'a AcquisitionPolicy,
    port: u16,
}

impl<'a, C: ControlPlane, P: DaemonProbe> HostAcquisition<'a, C, P> {
    pub fn new(
        control_plane: &'a C,
        probe: &'a P,
        config: &'a ControlPlaneConfig,
        policy: &'a AcquisitionPolicy,
        port: u16,
    ) -> Self {
        Self {
            control_plane,
            probe,
            config,
            policy,
            port,
        }
    }

    /// Resolve a host whose daemon is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`AcquisitionError::AcquisitionExhausted`] when every outer
    /// attempt failed, or the first fatal control-plane or probe error.
    pub async fn acquire(&self) -> Result<HostCandidate, AcquisitionError> {
        let last_failure = RefCell::new(None);
        let result = retry_with(
            self.policy.acquire,
            |attempt| {
                let last_failure = &last_failure;
                async move {
                    info!(
                        attempt,
                        max_attempts = self.policy.acquire.max_attempts,
                        "Acquiring Transmission host"
                    );
                    match self.acquire_once().await {
                        Ok(candidate) => Ok(Attempt::Ready(candidate)),
                        Err(
                            err @ (AcquisitionError::DiscoveryExhausted { .. }
                            | AcquisitionError::DaemonUnreachable { .. }),
                        ) => {
                            warn!(attempt, error = %err, "Host acquisition attempt failed");
                            *last_failure.borrow_mut() = Some(err);
                            Ok(Attempt::Pending)
                        }
                        Err(fatal) => Err(fatal),
                    }
                }
            },
            |attempt, delay| {
                info!(attempt, delay_secs = delay.as_secs(), "Retrying host acquisition");
            },
        )
        .await;

        match result {
            Ok(candidate) => {
                info!(host = %candidate, "Transmission host acquired");
                Ok(candidate)
            }
            Err(RetryError::Fatal(err)) => Err(err),
            Err(RetryError::Exhausted { attempts }) => {
                // Only empty with a zero attempt budget.
                let last = last_failure
                    .into_inner()
                    .unwrap_or(AcquisitionError::DiscoveryExhausted { attempts: 0 });
                Err(AcquisitionError::AcquisitionExhausted {
                    attempts,
                    last: Box::new(last),
                })
            }
        }
    }

    /// One discover-then-probe pass. Each failure fires exactly one destroy.
    async fn acquire_once(&self) -> Result<HostCandidate, AcquisitionError> {
        let candidate = match self.discover_host().await {
            Ok(candidate) => candidate,
            Err(err @ AcquisitionError::DiscoveryExhausted { .. }) => {
                self.trigger(RunTrigger::DestroyOnTimeout).await?;
                return Err(err);
            }
            Err(fatal) => return Err(fatal),
        };

        match self.probe_daemon(&candidate).await {
            Ok(()) => Ok(candidate),
            Err(err @ AcquisitionError::DaemonUnreachable { .. }) => {
                self.trigger(RunTrigger::DestroyUnreachable).await?;
                Err(err)
            }
            Err(fatal) => Err(fatal),
        }
    }

    /// Poll the control plane until an applied run publishes a host.
    ///
    /// # Errors
    ///
    /// Returns [`AcquisitionError::DiscoveryExhausted`] when the budget runs
    /// out, or [`AcquisitionError::ControlPlane`] on any request failure.
    pub async fn discover_host(&self) -> Result<HostCandidate, AcquisitionError> {
        retry_with(
            self.policy.discovery,
            |attempt| self.discover_once(attempt),
            |attempt, delay| {
                debug!(attempt, delay_secs = delay.as_secs(), "Host not published yet");
            },
        )
        .await
        .map_err(|e| match e {
            RetryError::Exhausted { attempts } => AcquisitionError::DiscoveryExhausted { attempts },
            RetryError::Fatal(err) => err,
        })
    }

    async fn discover_once(&self, attempt: u32) -> Result<Attempt<HostCandidate>, AcquisitionError> {
        let run = self
            .control_plane
            .latest_run(&self.config.workspace_id)
            .await
            .map_err(AcquisitionError::ControlPlane)?;

        match assess_run(&run) {
            RunAssessment::Unsettled => {
                info!(attempt, run = %run.id, status = %run.attributes.status, "Latest run is not applied yet");
                Ok(Attempt::Pending)
            }
            RunAssessment::Destroyed => {
                info!(attempt, run = %run.id, "Latest run destroyed the host");
                self.trigger(RunTrigger::Create).await?;
                Ok(Attempt::Pending)
            }
            RunAssessment::Provisioned => {
                let output_id = self
                    .control_plane
                    .latest_state_output_id(
                        &self.config.workspace_name,
                        &self.config.organization_name,
                    )
                    .await
                    .map_err(AcquisitionError::ControlPlane)?;
                let output = self
                    .control_plane
                    .state_output(&output_id)
                    .await
                    .map_err(AcquisitionError::ControlPlane)?;
                let candidate = HostCandidate::new(output.value_string(), self.port);
                info!(attempt, run = %run.id, host = %candidate, "Host published");
                Ok(Attempt::Ready(candidate))
            }
        }
    }

    /// Poll the daemon until it answers.
    ///
    /// # Errors
    ///
    /// Returns [`AcquisitionError::DaemonUnreachable`] after the probe budget
    /// is spent, or [`AcquisitionError::Probe`] on a non-timeout failure.
    pub async fn probe_daemon(&self, candidate: &HostCandidate) -> Result<(), AcquisitionError> {
        let timeout = self.policy.probe_timeout;
        retry_with(
            self.policy.probe,
            |attempt| async move {
                debug!(attempt, host = %candidate, "Probing Transmission");
                match self.probe.probe(candidate, timeout).await {
                    Ok(ProbeOutcome::Reachable(status)) => {
                        info!(host = %candidate, status, "Transmission is reachable");
                        Ok(Attempt::Ready(()))
                    }
                    Ok(ProbeOutcome::TimedOut) => Ok(Attempt::Pending),
                    Err(e) => Err(AcquisitionError::Probe(e)),
                }
            },
            |attempt, delay| {
                info!(attempt, host = %candidate, delay_secs = delay.as_secs(), "Transmission not reachable yet");
            },
        )
        .await
        .map_err(|e| match e {
            RetryError::Exhausted { attempts } => AcquisitionError::DaemonUnreachable {
                address: candidate.to_string(),
                attempts,
            },
            RetryError::Fatal(err) => err,
        })
    }

    /// Queue a run. Fire-and-forget: the run is not awaited.
    ///
    /// # Errors
    ///
    /// Returns [`AcquisitionError::ControlPlane`] if the request fails.
    pub async fn trigger(&self, trigger: RunTrigger) -> Result<(), AcquisitionError> {
        queue_run(self.control_plane, self.config, trigger).await?;
        Ok(())
    }
}

/// Queue `trigger` on the configured workspace and return the queued run.
///
/// # Errors
///
/// Returns [`AcquisitionError::ControlPlane`] if the request fails.
pub async fn queue_run(
    control_plane: &impl ControlPlane,
    config: &ControlPlaneConfig,
    trigger: RunTrigger,
) -> Result<RunResource, AcquisitionError> {
    info!(
        workspace = %config.workspace_id,
        is_destroy = trigger.is_destroy(),
        message = trigger.message(),
        "Triggering run"
    );
    let run = control_plane
        .trigger_run(&config.workspace_id, trigger.is_destroy(), trigger.message())
        .await
        .map_err(AcquisitionError::ControlPlane)?;
    debug!(run = %run.id, "Run queued");
    Ok(run)
}
