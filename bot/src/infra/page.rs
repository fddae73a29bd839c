//! Web page fetcher implementing the `PageFetcher` port.

use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::PageFetcher;

/// Some trackers reject clients without a browser user agent.
const USER_AGENT: &str = "Mozilla/5.0";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct HttpPageFetcher {
    http: reqwest::Client,
}

impl HttpPageFetcher {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to create page HTTP client")?;
        Ok(Self { http })
    }
}

impl PageFetcher for HttpPageFetcher {
    /// Body decoded with the response charset, UTF-8 when none is given.
    async fn fetch_text(&self, url: &str) -> Result<String> {
        self.http
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .with_context(|| format!("failed to fetch {url}"))?
            .text()
            .await
            .with_context(|| format!("failed to read {url}"))
    }
}
