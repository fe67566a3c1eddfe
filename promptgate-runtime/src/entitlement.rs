use thiserror::Error;

#[derive(Debug, Error)]
pub enum EntitlementError {
    #[error("workspace '{workspace_id}' is out of AI credits")]
    QuotaExceeded { workspace_id: String },
    #[error("entitlement check failed: {0}")]
    Gate(String),
}

/// Credit-consumption seam. The atomicity of the balance mutation is entirely
/// the collaborator's concern; the runtime only observes success or failure.
#[async_trait::async_trait]
pub trait EntitlementGate: Send + Sync + 'static {
    async fn check_and_consume(
        &self,
        workspace_id: &str,
        estimated_units: u32,
        operation: &str,
    ) -> Result<(), EntitlementError>;
}

/// Always allows. The default when no entitlement collaborator is wired.
#[derive(Clone, Copy, Debug, Default)]
pub struct OpenGate;

#[async_trait::async_trait]
impl EntitlementGate for OpenGate {
    async fn check_and_consume(
        &self,
        _workspace_id: &str,
        _estimated_units: u32,
        _operation: &str,
    ) -> Result<(), EntitlementError> {
        Ok(())
    }
}
