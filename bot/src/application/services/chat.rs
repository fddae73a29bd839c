//! Application service — chat command dispatch and the polling loop.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::fmt::Write as _;
use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::application::ports::{ChatTransport, ControlPlane, PageFetcher, TorrentDaemonFactory};
use crate::application::services::host_acquisition::queue_run;
use crate::application::services::torrents::{self, IdAction};
use crate::domain::chat::{
    BAD_MAGNET, DESTROY_SENT, NO_MAGNET_ON_PAGE, NO_TORRENTS, NOT_AUTHORIZED, PLEASE_WAIT,
    greeting, ids_reply,
};
use crate::domain::magnet::{extract_magnet_links, magnet_from_torrent};
use crate::domain::{
    ChatCommand, ChatConfig, ChatInfo, ConfigError, ControlPlaneConfig, IncomingMessage,
    RunTrigger,
};

/// Pause after a failed poll before polling again.
const POLL_ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// Everything a chat command may touch.
pub struct ChatService<'a, T, D, W, C> {
    pub transport: &'a T,
    /// Opens a daemon client per command, so the host is resolved each time.
    pub daemons: &'a D,
    pub pages: &'a W,
    /// Needed only by `/destroy`.
    pub control_plane: Option<(&'a C, &'a ControlPlaneConfig)>,
    pub chat: &'a ChatConfig,
    pub download_dir: &'a str,
}

impl<T, D, W, C> ChatService<'_, T, D, W, C>
where
    T: ChatTransport,
    D: TorrentDaemonFactory,
    W: PageFetcher,
    C: ControlPlane,
{
    /// Long-poll for messages until `shutdown` resolves.
    ///
    /// Poll failures are logged and retried; they never end the loop.
    ///
    /// # Errors
    ///
    /// Currently always returns `Ok` once `shutdown` completes.
    pub async fn run(&self, shutdown: impl Future<Output = ()>) -> Result<()> {
        tokio::pin!(shutdown);
        let mut offset = 0;
        info!("Bot is polling for messages");
        loop {
            let polled = tokio::select! {
                () = &mut shutdown => {
                    info!("Shutting down");
                    return Ok(());
                }
                polled = self.transport.poll_updates(offset) => polled,
            };
            let batch = match polled {
                Ok(batch) => batch,
                Err(e) => {
                    warn!(error = %format!("{e:#}"), "Polling for updates failed");
                    tokio::time::sleep(POLL_ERROR_BACKOFF).await;
                    continue;
                }
            };
            offset = offset.max(batch.next_offset);
            for message in &batch.messages {
                if let Err(e) = self.handle(message).await {
                    warn!(chat = message.chat.id, error = %format!("{e:#}"), "Failed to answer message");
                }
            }
        }
    }

    /// Answer one message.
    ///
    /// Handled messages get a "please wait" notice first, then either the
    /// command result or a refusal for unauthorized chats. Command failures
    /// become the reply text. Unhandled messages are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error only if a reply cannot be sent.
    pub async fn handle(&self, message: &IncomingMessage) -> Result<()> {
        let command = match ChatCommand::parse(message) {
            Ok(None) => return Ok(()),
            Ok(Some(command)) => Ok(command),
            Err(e) => Err(e),
        };
        let chat_id = message.chat.id;

        self.transport.send_message(chat_id, PLEASE_WAIT).await?;
        info!("[FROM {chat_id}] [{}]", message.log_text());

        let reply = if !self.chat.is_authorized(chat_id) {
            NOT_AUTHORIZED.to_string()
        } else {
            match command {
                Ok(command) => self
                    .execute(&message.chat, command)
                    .await
                    .unwrap_or_else(|e| {
                        warn!(chat = chat_id, error = %format!("{e:#}"), "Command failed");
                        format!("Error: {e:#}")
                    }),
                Err(e) => e.to_string(),
            }
        };

        info!("[TO {chat_id}] [{reply}]");
        self.transport.send_message(chat_id, &reply).await
    }

    async fn execute(&self, chat: &ChatInfo, command: ChatCommand) -> Result<String> {
        match command {
            ChatCommand::Help => Ok(greeting(chat)),
            ChatCommand::List => self.list().await,
            ChatCommand::ListWithFiles => self.list_with_files().await,
            ChatCommand::Wanted {
                torrent_id,
                file_ids,
            } => {
                let daemon = self.daemons.connect().await?;
                torrents::set_wanted(&daemon, torrent_id, &file_ids).await?;
                Ok(format!("Torrent {torrent_id} download only {file_ids:?}"))
            }
            ChatCommand::AddMagnet(link) => self.add(&link).await,
            ChatCommand::InvalidMagnet => Ok(BAD_MAGNET.to_string()),
            ChatCommand::AddFromPage(url) => {
                let Some(link) = self.scrape_magnet(&url).await else {
                    return Ok(NO_MAGNET_ON_PAGE.to_string());
                };
                self.add(&link).await
            }
            ChatCommand::AddTorrentFile(document) => {
                let bytes = self
                    .transport
                    .download_document(&document.file_id)
                    .await
                    .context("failed to download the torrent file")?;
                let link = magnet_from_torrent(&bytes)?;
                self.add(&link).await
            }
            ChatCommand::Start(ids) => self.apply(IdAction::Start, &ids).await,
            ChatCommand::Stop(ids) => self.apply(IdAction::Stop, &ids).await,
            ChatCommand::Delete(ids) => self.apply(IdAction::Remove, &ids).await,
            ChatCommand::Destroy => self.destroy().await,
        }
    }

    async fn list(&self) -> Result<String> {
        let daemon = self.daemons.connect().await?;
        let list = torrents::list_torrents(&daemon).await?;
        if list.is_empty() {
            return Ok(NO_TORRENTS.to_string());
        }
        let mut reply = String::from("Active torrents:\n");
        for torrent in &list {
            let _ = writeln!(reply, "#{torrent}");
        }
        Ok(reply)
    }

    async fn list_with_files(&self) -> Result<String> {
        let daemon = self.daemons.connect().await?;
        let list = torrents::list_with_files(&daemon).await?;
        if list.is_empty() {
            return Ok(NO_TORRENTS.to_string());
        }
        let mut reply = String::from("Active torrents:\n");
        for entry in &list {
            let _ = writeln!(reply, "#{}", entry.torrent);
            for file in &entry.files {
                let _ = writeln!(reply, "{file}");
            }
        }
        Ok(reply)
    }

    async fn add(&self, link: &str) -> Result<String> {
        let daemon = self.daemons.connect().await?;
        let id = torrents::add_magnet(&daemon, link, self.download_dir).await?;
        Ok(format!("Torrent was successfully added with ID #{id}"))
    }

    async fn apply(&self, action: IdAction, ids: &[String]) -> Result<String> {
        let daemon = self.daemons.connect().await?;
        torrents::apply_to_existing(&daemon, action, ids).await?;
        Ok(ids_reply(ids, action.verb()))
    }

    /// First magnet link on the page. Fetch failures count as "none found".
    async fn scrape_magnet(&self, url: &str) -> Option<String> {
        match self.pages.fetch_text(url).await {
            Ok(html) => extract_magnet_links(&html).into_iter().next(),
            Err(e) => {
                warn!(url, error = %format!("{e:#}"), "Failed to fetch page");
                None
            }
        }
    }

    async fn destroy(&self) -> Result<String> {
        let (control_plane, config) = self.control_plane.ok_or(ConfigError::NoControlPlane)?;
        queue_run(control_plane, config, RunTrigger::DestroyByCommand).await?;
        Ok(DESTROY_SENT.to_string())
    }
}
