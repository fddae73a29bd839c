//! `seedhost serve` — run the chat bot until Ctrl-C.

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::application::ports::TorrentDaemonFactory;
use crate::application::services::chat::ChatService;
use crate::application::services::daemon_connector::{DaemonConnector, HostSource};
use crate::application::services::host_acquisition::HostAcquisition;
use crate::domain::{BotConfig, ConfigError};
use crate::infra::control_plane::TerraformCloud;
use crate::infra::page::HttpPageFetcher;
use crate::infra::probe::HttpProbe;
use crate::infra::telegram::TelegramClient;
use crate::infra::transmission::TransmissionClient;
use crate::output::OutputContext;

/// Run the serve command.
///
/// The daemon host is resolved once at startup, and acquisition failure
/// aborts startup. Every daemon command resolves it again, so a host torn
/// down by `/destroy` is provisioned on the next command.
///
/// # Errors
///
/// Returns an error if the bot token is missing, the daemon host cannot be
/// resolved, or a client cannot be built.
pub async fn run(ctx: &OutputContext, config: &BotConfig) -> Result<()> {
    let token = config.chat.require_token()?.clone();

    let transport = TelegramClient::new(token)?;
    let pages = HttpPageFetcher::new()?;
    let probe = HttpProbe::new(config.acquisition.probe_timeout)?;
    let control_plane = config
        .control_plane
        .as_ref()
        .map(|cfg| TerraformCloud::new(cfg).map(|client| (client, cfg)))
        .transpose()?;

    let source = match (&config.daemon.static_host, &control_plane) {
        (Some(host), _) => {
            info!(host = %host, "Using static Transmission host");
            HostSource::Static(host.as_str())
        }
        (None, Some((client, cfg))) => HostSource::Acquired(HostAcquisition::new(
            client,
            &probe,
            cfg,
            &config.acquisition,
            config.daemon.port,
        )),
        (None, None) => return Err(ConfigError::NoControlPlane.into()),
    };
    let daemons = DaemonConnector::new(source, |host: &str| {
        TransmissionClient::new(host, &config.daemon)
    });

    daemons.connect().await.context("cannot reach Transmission")?;
    ctx.success("Connected to Transmission");
    if control_plane.is_none() {
        ctx.warn("No control plane configured, /destroy is unavailable");
    }
    info!("Starting bot");

    let service = ChatService {
        transport: &transport,
        daemons: &daemons,
        pages: &pages,
        control_plane: control_plane.as_ref().map(|(client, cfg)| (client, *cfg)),
        chat: &config.chat,
        download_dir: &config.daemon.download_dir,
    };
    service
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        })
        .await
}
