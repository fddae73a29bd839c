use thiserror::Error;

/// Documents that deserialized fine but lack the data the caller needs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    #[error("control plane returned no runs for the workspace")]
    NoRuns,

    #[error("control plane returned no state versions for the workspace")]
    NoStateVersions,

    #[error("state version {0} has no outputs")]
    NoOutputs(String),

    #[error("transmission RPC failed: {0}")]
    RpcFailed(String),

    #[error("transmission RPC response is missing '{0}'")]
    MissingField(&'static str),
}
