//! Telegram Bot API client implementing the `ChatTransport` port.
//!
//! Long polling only: `getUpdates`, `sendMessage`, `getFile` plus the file
//! download endpoint.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use crate::application::ports::{ChatTransport, UpdateBatch};
use crate::domain::config::Secret;
use crate::domain::{ChatInfo, DocumentRef, IncomingMessage};

const API_BASE: &str = "https://api.telegram.org";
/// Server-side wait of one `getUpdates` call.
const POLL_TIMEOUT_SECS: u64 = 30;

// ── Bot API payloads ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ApiReply<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    chat: Chat,
    text: Option<String>,
    document: Option<Document>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
    first_name: Option<String>,
    last_name: Option<String>,
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Document {
    file_id: String,
    file_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct File {
    file_path: Option<String>,
}

fn into_batch(updates: Vec<Update>, offset: i64) -> UpdateBatch {
    let next_offset = updates
        .iter()
        .map(|u| u.update_id + 1)
        .max()
        .unwrap_or(offset)
        .max(offset);
    let messages = updates
        .into_iter()
        .filter_map(|u| {
            let message = u.message?;
            Some(IncomingMessage {
                update_id: u.update_id,
                chat: ChatInfo {
                    id: message.chat.id,
                    first_name: message.chat.first_name,
                    last_name: message.chat.last_name,
                    title: message.chat.title,
                },
                text: message.text,
                document: message.document.map(|d| DocumentRef {
                    file_id: d.file_id,
                    file_name: d.file_name,
                }),
            })
        })
        .collect();
    UpdateBatch {
        next_offset,
        messages,
    }
}

// ── Client ────────────────────────────────────────────────────────────────────

pub struct TelegramClient {
    http: reqwest::Client,
    token: Secret,
}

impl TelegramClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(token: Secret) -> Result<Self> {
        let http = reqwest::Client::builder()
            // Long polls must outlive the server-side wait.
            .timeout(Duration::from_secs(POLL_TIMEOUT_SECS + 15))
            .build()
            .context("failed to create Telegram HTTP client")?;
        Ok(Self { http, token })
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, body: serde_json::Value) -> Result<T> {
        let url = format!("{API_BASE}/bot{}/{method}", self.token.expose());
        let reply: ApiReply<T> = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            // The URL embeds the token; keep it out of error chains.
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("Telegram '{method}' request failed"))?
            .json()
            .await
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("failed decoding Telegram '{method}' response"))?;
        if !reply.ok {
            return Err(anyhow!(
                "Telegram '{method}' failed: {}",
                reply.description.unwrap_or_default()
            ));
        }
        reply
            .result
            .ok_or_else(|| anyhow!("Telegram '{method}' returned no result"))
    }
}

impl ChatTransport for TelegramClient {
    async fn poll_updates(&self, offset: i64) -> Result<UpdateBatch> {
        let updates: Vec<Update> = self
            .call(
                "getUpdates",
                json!({
                    "offset": offset,
                    "timeout": POLL_TIMEOUT_SECS,
                    "allowed_updates": ["message"],
                }),
            )
            .await?;
        Ok(into_batch(updates, offset))
    }

    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let _: serde_json::Value = self
            .call("sendMessage", json!({ "chat_id": chat_id, "text": text }))
            .await?;
        Ok(())
    }

    async fn download_document(&self, file_id: &str) -> Result<Vec<u8>> {
        let file: File = self.call("getFile", json!({ "file_id": file_id })).await?;
        let path = file
            .file_path
            .ok_or_else(|| anyhow!("Telegram did not return a download path"))?;
        let url = format!("{API_BASE}/file/bot{}/{path}", self.token.expose());
        let bytes = self
            .http
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(reqwest::Error::without_url)
            .context("failed to download file from Telegram")?
            .bytes()
            .await
            .map_err(reqwest::Error::without_url)
            .context("failed to read file from Telegram")?;
        Ok(bytes.to_vec())
    }
}
