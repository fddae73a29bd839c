//! JSON:API documents exchanged with the Terraform Cloud control plane.
//!
//! Only the attributes the bot reads are modelled; everything else in the
//! documents is ignored on deserialization.

use serde::{Deserialize, Serialize};

use crate::error::WireError;

/// Status of a run as reported by the control plane.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Pending,
    Planning,
    Planned,
    Applying,
    Applied,
    PlannedAndFinished,
    Errored,
    Discarded,
    Canceled,
    /// Any status this crate does not distinguish (policy checks, cost
    /// estimation, queued states, ...).
    #[serde(other)]
    Other,
}

impl RunStatus {
    /// Whether the run finished with infrastructure in a settled state.
    #[must_use]
    pub fn is_settled(self) -> bool {
        matches!(self, Self::Applied | Self::PlannedAndFinished)
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Planning => "planning",
            Self::Planned => "planned",
            Self::Applying => "applying",
            Self::Applied => "applied",
            Self::PlannedAndFinished => "planned_and_finished",
            Self::Errored => "errored",
            Self::Discarded => "discarded",
            Self::Canceled => "canceled",
            Self::Other => "other",
        };
        f.write_str(s)
    }
}

/// Attributes of a run resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunAttributes {
    pub status: RunStatus,
    #[serde(rename = "is-destroy", default)]
    pub is_destroy: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A run resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunResource {
    pub id: String,
    pub attributes: RunAttributes,
}

/// `GET /workspaces/{id}/runs` response, newest run first.
#[derive(Debug, Clone, Deserialize)]
pub struct RunList {
    pub data: Vec<RunResource>,
}

impl RunList {
    /// The most recent run of the workspace.
    pub fn latest(&self) -> Result<&RunResource, WireError> {
        self.data.first().ok_or(WireError::NoRuns)
    }
}

/// `POST /runs` response.
#[derive(Debug, Clone, Deserialize)]
pub struct RunDocument {
    pub data: RunResource,
}

/// Reference to another resource inside a relationship.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceIdentifier {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// `POST /runs` request body.
#[derive(Debug, Clone, Serialize)]
pub struct CreateRunRequest {
    data: CreateRunData,
}

#[derive(Debug, Clone, Serialize)]
struct CreateRunData {
    attributes: CreateRunAttributes,
    #[serde(rename = "type")]
    kind: &'static str,
    relationships: CreateRunRelationships,
}

#[derive(Debug, Clone, Serialize)]
struct CreateRunAttributes {
    #[serde(rename = "is-destroy")]
    is_destroy: bool,
    message: String,
}

#[derive(Debug, Clone, Serialize)]
struct CreateRunRelationships {
    workspace: RelationshipOne,
}

#[derive(Debug, Clone, Serialize)]
struct RelationshipOne {
    data: ResourceIdentifier,
}

impl CreateRunRequest {
    /// Build a run request for `workspace_id`.
    #[must_use]
    pub fn new(workspace_id: &str, is_destroy: bool, message: &str) -> Self {
        Self {
            data: CreateRunData {
                attributes: CreateRunAttributes {
                    is_destroy,
                    message: message.to_string(),
                },
                kind: "runs",
                relationships: CreateRunRelationships {
                    workspace: RelationshipOne {
                        data: ResourceIdentifier {
                            id: workspace_id.to_string(),
                            kind: "workspaces".to_string(),
                        },
                    },
                },
            },
        }
    }
}

/// Relationship holding a list of resource identifiers.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RelationshipMany {
    #[serde(default)]
    pub data: Vec<ResourceIdentifier>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct StateVersionRelationships {
    #[serde(default)]
    pub outputs: RelationshipMany,
}

/// A state-version resource.
#[derive(Debug, Clone, Deserialize)]
pub struct StateVersionResource {
    pub id: String,
    #[serde(default)]
    pub relationships: StateVersionRelationships,
}

/// `GET /state-versions?filter[...]` response, newest version first.
#[derive(Debug, Clone, Deserialize)]
pub struct StateVersionList {
    pub data: Vec<StateVersionResource>,
}

impl StateVersionList {
    /// Id of the first output of the newest state version.
    pub fn latest_output_id(&self) -> Result<&str, WireError> {
        let version = self.data.first().ok_or(WireError::NoStateVersions)?;
        version
            .relationships
            .outputs
            .data
            .first()
            .map(|o| o.id.as_str())
            .ok_or_else(|| WireError::NoOutputs(version.id.clone()))
    }
}

/// Attributes of a state-version output.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct StateOutputAttributes {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sensitive: bool,
    pub value: serde_json::Value,
}

impl StateOutputAttributes {
    /// The output value rendered as a plain string.
    ///
    /// String values are returned verbatim; other JSON values use their
    /// compact JSON form.
    #[must_use]
    pub fn value_string(&self) -> String {
        match &self.value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StateOutputResource {
    pub id: String,
    pub attributes: StateOutputAttributes,
}

/// `GET /state-version-outputs/{id}` response.
#[derive(Debug, Clone, Deserialize)]
pub struct StateOutputDocument {
    pub data: StateOutputResource,
}
