use thiserror::Error;

#[derive(Debug, Error)]
pub enum PromptgateError {
    #[error("unknown capability '{key}'")]
    PackNotFound { key: String },
    #[error("capability '{key}' has no version '{version}'")]
    VersionNotFound { key: String, version: String },
    #[error("workspace '{workspace_id}' has exhausted its AI capacity; upgrade or purchase more capacity to continue")]
    QuotaExceeded { workspace_id: String },
    #[error("entitlement check failed: {0}")]
    Entitlement(String),
    #[error("timeout {label} after {ms}ms")]
    Timeout { label: String, ms: u64 },
    #[error("completion provider failed: {0}")]
    Provider(String),
    #[error("model returned malformed output: {reason}")]
    MalformedOutput { reason: String },
    #[error("operation was cancelled")]
    Cancelled,
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("serialization/deserialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
