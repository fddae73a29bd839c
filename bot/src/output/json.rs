//! JSON output helpers for `--json` code paths.

use anyhow::{Context, Result};
use serde_json::json;

use crate::domain::HostCandidate;

/// Acquired daemon host as a JSON object.
///
/// ```json
/// { "host": "203.0.113.7", "port": 9091, "url": "http://203.0.113.7:9091" }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_host(candidate: &HostCandidate) -> Result<String> {
    let obj = json!({
        "host": candidate.address,
        "port": candidate.port,
        "url": candidate.probe_url(),
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Error object printed instead of plain text when a `--json` command fails.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}
