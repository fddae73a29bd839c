//! Terraform Cloud API client implementing the `ControlPlane` port.

use anyhow::{Context, Result, bail};
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::debug;

use seedhost_common::{
    CreateRunRequest, RunDocument, RunList, RunResource, StateOutputAttributes,
    StateOutputDocument, StateVersionList,
};

use crate::application::ports::ControlPlane;
use crate::domain::ControlPlaneConfig;

const JSON_API: &str = "application/vnd.api+json";

/// JSON:API client authenticated with a bearer token.
///
/// No request timeout is configured; a stalled request stalls the caller.
pub struct TerraformCloud {
    http: reqwest::Client,
    api_url: String,
}

impl TerraformCloud {
    /// # Errors
    ///
    /// Returns an error if the token is not a valid header value or the
    /// HTTP client cannot be built.
    pub fn new(config: &ControlPlaneConfig) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token.expose()))
            .context("TF_CLOUD_TOKEN contains characters not allowed in a header")?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(reqwest::header::AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_API));
        headers.insert(ACCEPT, HeaderValue::from_static(JSON_API));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("failed to create control plane HTTP client")?;
        Ok(Self {
            http,
            api_url: config.api_url.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.api_url)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response, what: &str) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("{what} failed with HTTP {status}: {}", body.trim());
        }
        response
            .json()
            .await
            .with_context(|| format!("failed decoding {what} response"))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, what: &str) -> Result<T> {
        debug!(path, "GET control plane");
        let response = self
            .http
            .get(self.url(path))
            .send()
            .await
            .with_context(|| format!("{what} request failed"))?;
        Self::decode(response, what).await
    }
}

/// Query string selecting the state versions of one workspace.
fn state_versions_path(workspace_name: &str, organization_name: &str) -> String {
    format!(
        "state-versions?filter%5Bworkspace%5D%5Bname%5D={workspace_name}&filter%5Borganization%5D%5Bname%5D={organization_name}"
    )
}

impl ControlPlane for TerraformCloud {
    async fn latest_run(&self, workspace_id: &str) -> Result<RunResource> {
        let runs: RunList = self
            .get(&format!("workspaces/{workspace_id}/runs"), "run list")
            .await?;
        Ok(runs.latest()?.clone())
    }

    async fn trigger_run(
        &self,
        workspace_id: &str,
        is_destroy: bool,
        message: &str,
    ) -> Result<RunResource> {
        let body = CreateRunRequest::new(workspace_id, is_destroy, message);
        let response = self
            .http
            .post(self.url("runs"))
            .body(serde_json::to_vec(&body).context("failed encoding run request")?)
            .send()
            .await
            .context("run creation request failed")?;
        let run: RunDocument = Self::decode(response, "run creation").await?;
        Ok(run.data)
    }

    async fn latest_state_output_id(
        &self,
        workspace_name: &str,
        organization_name: &str,
    ) -> Result<String> {
        let versions: StateVersionList = self
            .get(
                &state_versions_path(workspace_name, organization_name),
                "state version list",
            )
            .await?;
        Ok(versions.latest_output_id()?.to_string())
    }

    async fn state_output(&self, output_id: &str) -> Result<StateOutputAttributes> {
        let output: StateOutputDocument = self
            .get(&format!("state-version-outputs/{output_id}"), "state output")
            .await?;
        Ok(output.data.attributes)
    }
}
