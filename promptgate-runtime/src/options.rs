use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Per-call knobs. Created fresh for each invocation and never shared.
#[derive(Clone, Debug, Default)]
pub struct InvokeOptions {
    pub tone: Option<bool>,
    pub brevity: Option<bool>,
    pub version: Option<String>,
    pub model: Option<String>,
    pub workspace_id: Option<String>,
    pub trace_id: Option<Uuid>,
    pub is_admin: bool,
    pub cancellation: Option<CancellationToken>,
}

impl InvokeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tone(mut self, value: bool) -> Self {
        self.tone = Some(value);
        self
    }

    pub fn brevity(mut self, value: bool) -> Self {
        self.brevity = Some(value);
        self
    }

    pub fn version(mut self, value: impl Into<String>) -> Self {
        self.version = Some(value.into());
        self
    }

    pub fn model(mut self, value: impl Into<String>) -> Self {
        self.model = Some(value.into());
        self
    }

    pub fn workspace(mut self, value: impl Into<String>) -> Self {
        self.workspace_id = Some(value.into());
        self
    }

    pub fn trace_id(mut self, value: Uuid) -> Self {
        self.trace_id = Some(value);
        self
    }

    pub fn admin(mut self, value: bool) -> Self {
        self.is_admin = value;
        self
    }

    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }
}
