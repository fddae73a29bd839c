//! Transmission RPC client implementing the `TorrentDaemon` port.

use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;

use seedhost_common::transmission::{FILE_FIELDS, SESSION_ID_HEADER, SUMMARY_FIELDS};
use seedhost_common::{RpcRequest, RpcResponse, Torrent, TorrentAddArguments, TorrentGetArguments};

use crate::application::ports::TorrentDaemon;
use crate::domain::{DaemonConfig, TorrentFile, TorrentSummary, TorrentWithFiles};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// One try to learn the session id, one to use it, one spare.
const SESSION_TRIES: usize = 3;

/// Client for `http://<host>:<port>/transmission/rpc`.
pub struct TransmissionClient {
    http: reqwest::Client,
    endpoint: String,
    user: String,
    password: String,
    session_id: Mutex<Option<String>>,
}

impl TransmissionClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(host: &str, config: &DaemonConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to create Transmission HTTP client")?;
        Ok(Self {
            http,
            endpoint: format!("http://{host}:{}/transmission/rpc", config.port),
            user: config.user.trim().to_string(),
            password: config.password.expose().to_string(),
            session_id: Mutex::new(None),
        })
    }

    fn cached_session_id(&self) -> Option<String> {
        self.session_id.lock().ok().and_then(|id| id.clone())
    }

    fn store_session_id(&self, id: Option<String>) {
        if let Ok(mut slot) = self.session_id.lock() {
            *slot = id;
        }
    }

    /// Send one RPC call, renegotiating the session id on 409.
    async fn call(&self, method: &str, arguments: Value) -> Result<Value> {
        let payload = RpcRequest::new(method, arguments);
        for _ in 0..SESSION_TRIES {
            let mut request = self.http.post(&self.endpoint).json(&payload);
            if let Some(id) = self.cached_session_id() {
                request = request.header(SESSION_ID_HEADER, id);
            }
            if !self.user.is_empty() {
                request = request.basic_auth(&self.user, Some(&self.password));
            }

            let response = request
                .send()
                .await
                .with_context(|| format!("transmission request '{method}' failed"))?;
            if response.status() == StatusCode::CONFLICT {
                let id = response
                    .headers()
                    .get(SESSION_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .map(str::to_string);
                debug!(method, "Transmission session id renewed");
                self.store_session_id(id);
                continue;
            }
            if !response.status().is_success() {
                bail!("transmission RPC '{method}' failed with HTTP {}", response.status());
            }
            let reply: RpcResponse = response
                .json()
                .await
                .context("failed decoding transmission response")?;
            return Ok(reply.into_arguments()?);
        }
        Err(anyhow!("failed negotiating transmission session id"))
    }

    async fn call_as<T: DeserializeOwned>(&self, method: &str, arguments: Value) -> Result<T> {
        let value = self.call(method, arguments).await?;
        serde_json::from_value(value)
            .with_context(|| format!("unexpected '{method}' response from transmission"))
    }

    async fn get(&self, ids: &[i64], fields: &[&str]) -> Result<Vec<Torrent>> {
        let mut arguments = json!({ "fields": fields });
        if !ids.is_empty() {
            arguments["ids"] = json!(ids);
        }
        let reply: TorrentGetArguments = self.call_as("torrent-get", arguments).await?;
        Ok(reply.torrents)
    }
}

fn summary(torrent: &Torrent) -> TorrentSummary {
    TorrentSummary {
        id: torrent.id,
        name: torrent.name.clone(),
        status: torrent.status.to_string(),
        progress: (torrent.percent_done * 10_000.0).round() / 100.0,
    }
}

fn files(torrent: &Torrent) -> Vec<TorrentFile> {
    torrent
        .files
        .iter()
        .enumerate()
        .map(|(index, file)| TorrentFile {
            index,
            name: file.name.clone(),
            size_bytes: file.length,
            wanted: torrent.file_stats.get(index).is_none_or(|s| s.wanted),
        })
        .collect()
}

impl TorrentDaemon for TransmissionClient {
    async fn list(&self) -> Result<Vec<TorrentSummary>> {
        let torrents = self.get(&[], SUMMARY_FIELDS).await?;
        Ok(torrents.iter().map(summary).collect())
    }

    async fn files(&self, ids: &[i64]) -> Result<Vec<TorrentWithFiles>> {
        let fields: Vec<&str> = SUMMARY_FIELDS.iter().chain(FILE_FIELDS).copied().collect();
        let torrents = self.get(ids, &fields).await?;
        Ok(torrents
            .iter()
            .map(|t| TorrentWithFiles {
                torrent: summary(t),
                files: files(t),
            })
            .collect())
    }

    async fn add(&self, magnet: &str, download_dir: &str) -> Result<i64> {
        let reply: TorrentAddArguments = self
            .call_as(
                "torrent-add",
                json!({ "filename": magnet, "download-dir": download_dir }),
            )
            .await?;
        Ok(reply.into_torrent()?.id)
    }

    async fn start(&self, ids: &[i64]) -> Result<()> {
        self.call("torrent-start", json!({ "ids": ids })).await?;
        Ok(())
    }

    async fn stop(&self, ids: &[i64]) -> Result<()> {
        self.call("torrent-stop", json!({ "ids": ids })).await?;
        Ok(())
    }

    async fn remove(&self, ids: &[i64]) -> Result<()> {
        self.call(
            "torrent-remove",
            json!({ "ids": ids, "delete-local-data": false }),
        )
        .await?;
        Ok(())
    }

    async fn set_files(&self, id: i64, wanted: &[usize], unwanted: &[usize]) -> Result<()> {
        let mut arguments = json!({ "ids": [id] });
        if !wanted.is_empty() {
            arguments["files-wanted"] = json!(wanted);
        }
        if !unwanted.is_empty() {
            arguments["files-unwanted"] = json!(unwanted);
        }
        self.call("torrent-set", arguments).await?;
        Ok(())
    }
}
