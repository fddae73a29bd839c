//! Application service — daemon client per command.
//!
//! The host is resolved again for every command: a fixed address is used
//! as is, otherwise host acquisition runs and may re-provision a host that
//! was destroyed since the previous command.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use anyhow::Result;
use tracing::debug;

use crate::application::ports::{ControlPlane, DaemonProbe, TorrentDaemon, TorrentDaemonFactory};
use crate::application::services::host_acquisition::HostAcquisition;

/// Where the daemon host comes from.
pub enum HostSource<'a, C, P> {
    /// Fixed address, never re-resolved.
    Static(&'a str),
    Acquired(HostAcquisition<'a, C, P>),
}

/// [`TorrentDaemonFactory`] that resolves the host, then opens a client
/// with `open`.
pub struct DaemonConnector<'a, C, P, F> {
    source: HostSource<'a, C, P>,
    open: F,
}

impl<'a, C, P, F> DaemonConnector<'a, C, P, F> {
    pub fn new(source: HostSource<'a, C, P>, open: F) -> Self {
        Self { source, open }
    }
}

impl<C, P, F, D> TorrentDaemonFactory for DaemonConnector<'_, C, P, F>
where
    C: ControlPlane,
    P: DaemonProbe,
    D: TorrentDaemon,
    F: Fn(&str) -> Result<D>,
{
    type Daemon = D;

    async fn connect(&self) -> Result<D> {
        let host = match &self.source {
            HostSource::Static(host) => (*host).to_string(),
            HostSource::Acquired(acquisition) => acquisition.acquire().await?.address,
        };
        debug!(host = %host, "Opening Transmission client");
        (self.open)(&host)
    }
}
