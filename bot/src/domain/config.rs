//! Domain types and validators for seedhost configuration.
//!
//! Pure functions only — no I/O, no async, no environment access. The raw
//! settings are read by `crate::infra::config`.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::error::ConfigError;
use crate::domain::retry::RetryPolicy;

// ── Defaults ─────────────────────────────────────────────────────────────────

pub const DEFAULT_AUTHORIZED_USERS: &[i64] = &[294_967_926, 191_151_492];
pub const DEFAULT_TRANSMISSION_PORT: u16 = 9091;
pub const DEFAULT_TRANSMISSION_CREDENTIAL: &str = "transmission";
pub const DEFAULT_DOWNLOAD_DIR: &str = "/tmp/downloads";
pub const DEFAULT_TF_CLOUD_API_URL: &str = "https://app.terraform.io/api/v2";

pub const DEFAULT_HOST_IP_RETRIES: u32 = 2;
pub const DEFAULT_HOST_DISCOVERY_RETRIES: u32 = 50;
pub const DEFAULT_HOST_DISCOVERY_DELAY_SECS: u64 = 10;
pub const DEFAULT_CONNECTION_RETRIES: u32 = 60;
pub const DEFAULT_PROBE_DELAY_SECS: u64 = 2;
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 10;

// ── Raw settings ─────────────────────────────────────────────────────────────

/// Flat view of the process environment, one field per variable.
///
/// Field names map to upper-case variable names (`workspace_id` →
/// `WORKSPACE_ID`). Optional values are validated by [`BotConfig::from_settings`].
#[derive(Debug, Clone, Deserialize)]
pub struct EnvSettings {
    pub telegram_bot_token: Option<String>,
    #[serde(default = "default_authorized_users")]
    pub authorized_users: Vec<i64>,

    pub transmission_host: Option<String>,
    #[serde(default = "default_transmission_port")]
    pub transmission_port: u16,
    #[serde(default = "default_transmission_credential")]
    pub transmission_user: String,
    #[serde(default = "default_transmission_credential")]
    pub transmission_password: String,
    #[serde(default = "default_download_dir")]
    pub transmission_download_dir: String,

    pub workspace_id: Option<String>,
    pub workspace_name: Option<String>,
    pub organization_name: Option<String>,
    pub tf_cloud_token: Option<String>,
    #[serde(default = "default_tf_cloud_api_url")]
    pub tf_cloud_api_url: String,

    #[serde(default = "default_host_ip_retries")]
    pub get_host_ip_retries: u32,
    #[serde(default)]
    pub host_recovery_delay_secs: u64,
    #[serde(default = "default_host_discovery_retries")]
    pub host_discovery_retries: u32,
    #[serde(default = "default_host_discovery_delay_secs")]
    pub host_discovery_delay_secs: u64,
    #[serde(default = "default_connection_retries")]
    pub check_transmission_connection_retries: u32,
    #[serde(default = "default_probe_delay_secs")]
    pub transmission_probe_delay_secs: u64,
    #[serde(default = "default_probe_timeout_secs")]
    pub transmission_probe_timeout_secs: u64,
}

fn default_authorized_users() -> Vec<i64> {
    DEFAULT_AUTHORIZED_USERS.to_vec()
}

fn default_transmission_port() -> u16 {
    DEFAULT_TRANSMISSION_PORT
}

fn default_transmission_credential() -> String {
    DEFAULT_TRANSMISSION_CREDENTIAL.to_string()
}

fn default_download_dir() -> String {
    DEFAULT_DOWNLOAD_DIR.to_string()
}

fn default_tf_cloud_api_url() -> String {
    DEFAULT_TF_CLOUD_API_URL.to_string()
}

fn default_host_ip_retries() -> u32 {
    DEFAULT_HOST_IP_RETRIES
}

fn default_host_discovery_retries() -> u32 {
    DEFAULT_HOST_DISCOVERY_RETRIES
}

fn default_host_discovery_delay_secs() -> u64 {
    DEFAULT_HOST_DISCOVERY_DELAY_SECS
}

fn default_connection_retries() -> u32 {
    DEFAULT_CONNECTION_RETRIES
}

fn default_probe_delay_secs() -> u64 {
    DEFAULT_PROBE_DELAY_SECS
}

fn default_probe_timeout_secs() -> u64 {
    DEFAULT_PROBE_TIMEOUT_SECS
}

impl Default for EnvSettings {
    fn default() -> Self {
        Self {
            telegram_bot_token: None,
            authorized_users: default_authorized_users(),
            transmission_host: None,
            transmission_port: DEFAULT_TRANSMISSION_PORT,
            transmission_user: default_transmission_credential(),
            transmission_password: default_transmission_credential(),
            transmission_download_dir: default_download_dir(),
            workspace_id: None,
            workspace_name: None,
            organization_name: None,
            tf_cloud_token: None,
            tf_cloud_api_url: default_tf_cloud_api_url(),
            get_host_ip_retries: DEFAULT_HOST_IP_RETRIES,
            host_recovery_delay_secs: 0,
            host_discovery_retries: DEFAULT_HOST_DISCOVERY_RETRIES,
            host_discovery_delay_secs: DEFAULT_HOST_DISCOVERY_DELAY_SECS,
            check_transmission_connection_retries: DEFAULT_CONNECTION_RETRIES,
            transmission_probe_delay_secs: DEFAULT_PROBE_DELAY_SECS,
            transmission_probe_timeout_secs: DEFAULT_PROBE_TIMEOUT_SECS,
        }
    }
}

// ── Validated config ─────────────────────────────────────────────────────────

/// A credential that never shows up in `Debug` output or logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Terraform Cloud workspace the daemon host is provisioned from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlPlaneConfig {
    pub api_url: String,
    pub token: Secret,
    pub workspace_id: String,
    pub workspace_name: String,
    pub organization_name: String,
}

/// How to reach and authenticate against the Transmission daemon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonConfig {
    /// Fixed daemon address. When set, host acquisition is skipped.
    pub static_host: Option<String>,
    pub port: u16,
    pub user: String,
    pub password: Secret,
    pub download_dir: String,
}

/// Retry budgets of the three acquisition levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquisitionPolicy {
    /// Outer discover-then-probe attempts.
    pub acquire: RetryPolicy,
    /// Control-plane polls for a provisioned host.
    pub discovery: RetryPolicy,
    /// Reachability probes against one candidate.
    pub probe: RetryPolicy,
    /// Bound on a single reachability probe.
    pub probe_timeout: Duration,
}

impl Default for AcquisitionPolicy {
    fn default() -> Self {
        Self {
            acquire: RetryPolicy::fixed(DEFAULT_HOST_IP_RETRIES, Duration::ZERO),
            discovery: RetryPolicy::fixed(
                DEFAULT_HOST_DISCOVERY_RETRIES,
                Duration::from_secs(DEFAULT_HOST_DISCOVERY_DELAY_SECS),
            ),
            probe: RetryPolicy::fixed(
                DEFAULT_CONNECTION_RETRIES,
                Duration::from_secs(DEFAULT_PROBE_DELAY_SECS),
            ),
            probe_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
        }
    }
}

/// Chat front-end settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    pub bot_token: Option<Secret>,
    pub authorized_users: Vec<i64>,
}

impl ChatConfig {
    /// Whether messages from `chat_id` may run commands.
    #[must_use]
    pub fn is_authorized(&self, chat_id: i64) -> bool {
        self.authorized_users.contains(&chat_id)
    }

    /// The bot token, required to run the chat front-end.
    ///
    /// # Errors
    ///
    /// Returns an error if `TELEGRAM_BOT_TOKEN` was not set.
    pub fn require_token(&self) -> Result<&Secret, ConfigError> {
        self.bot_token
            .as_ref()
            .ok_or(ConfigError::Missing("TELEGRAM_BOT_TOKEN"))
    }
}

/// Immutable process configuration, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotConfig {
    pub chat: ChatConfig,
    pub daemon: DaemonConfig,
    /// Present when all control-plane variables are set.
    pub control_plane: Option<ControlPlaneConfig>,
    pub acquisition: AcquisitionPolicy,
}

impl BotConfig {
    /// Validate raw settings.
    ///
    /// Values are checked for presence only; empty strings count as unset.
    /// The control-plane variables are mandatory unless a static
    /// `TRANSMISSION_HOST` is configured.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first missing or invalid variable.
    pub fn from_settings(settings: EnvSettings) -> Result<Self, ConfigError> {
        let static_host = non_empty(settings.transmission_host.clone());
        let control_plane = control_plane_from(&settings, static_host.is_none())?;

        let acquisition = AcquisitionPolicy {
            acquire: RetryPolicy::fixed(
                positive("GET_HOST_IP_RETRIES", settings.get_host_ip_retries)?,
                Duration::from_secs(settings.host_recovery_delay_secs),
            ),
            discovery: RetryPolicy::fixed(
                positive("HOST_DISCOVERY_RETRIES", settings.host_discovery_retries)?,
                Duration::from_secs(settings.host_discovery_delay_secs),
            ),
            probe: RetryPolicy::fixed(
                positive(
                    "CHECK_TRANSMISSION_CONNECTION_RETRIES",
                    settings.check_transmission_connection_retries,
                )?,
                Duration::from_secs(settings.transmission_probe_delay_secs),
            ),
            probe_timeout: Duration::from_secs(settings.transmission_probe_timeout_secs),
        };
        if acquisition.probe_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "TRANSMISSION_PROBE_TIMEOUT_SECS",
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            chat: ChatConfig {
                bot_token: non_empty(settings.telegram_bot_token).map(Secret::new),
                authorized_users: settings.authorized_users,
            },
            daemon: DaemonConfig {
                static_host,
                port: settings.transmission_port,
                user: settings.transmission_user,
                password: Secret::new(settings.transmission_password),
                download_dir: settings.transmission_download_dir,
            },
            control_plane,
            acquisition,
        })
    }

    /// The control-plane settings, for operations that need them.
    ///
    /// # Errors
    ///
    /// Returns an error if no control plane is configured.
    pub fn require_control_plane(&self) -> Result<&ControlPlaneConfig, ConfigError> {
        self.control_plane.as_ref().ok_or(ConfigError::NoControlPlane)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn positive(key: &'static str, value: u32) -> Result<u32, ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidValue {
            key,
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(value)
}

fn control_plane_from(
    settings: &EnvSettings,
    required: bool,
) -> Result<Option<ControlPlaneConfig>, ConfigError> {
    let fields = [
        ("WORKSPACE_ID", non_empty(settings.workspace_id.clone())),
        ("WORKSPACE_NAME", non_empty(settings.workspace_name.clone())),
        ("ORGANIZATION_NAME", non_empty(settings.organization_name.clone())),
        ("TF_CLOUD_TOKEN", non_empty(settings.tf_cloud_token.clone())),
    ];
    if let Some((missing, _)) = fields.iter().find(|(_, v)| v.is_none()) {
        return if required {
            Err(ConfigError::Missing(*missing))
        } else {
            Ok(None)
        };
    }
    let [workspace_id, workspace_name, organization_name, token] =
        fields.map(|(_, v)| v.unwrap_or_default());
    Ok(Some(ControlPlaneConfig {
        api_url: settings.tf_cloud_api_url.trim_end_matches('/').to_string(),
        token: Secret::new(token),
        workspace_id,
        workspace_name,
        organization_name,
    }))
}

// ── Unit tests ───────────────────────────────────────────────────────────────
