use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

/// One metering record per completed provider call (primary or fallback).
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct UsageEvent {
    pub workspace_id: Option<String>,
    pub trace_id: Uuid,
    pub pack_key: String,
    pub provider: String,
    pub model: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub input_cost_usd: f64,
    pub output_cost_usd: f64,
    pub total_cost_usd: f64,
    pub dry_run: bool,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum UsageStoreError {
    #[error("usage store unavailable: {0}")]
    Unavailable(String),
    #[error("usage store rejected event: {0}")]
    Rejected(String),
}

/// Durable persistence seam for usage events. Failures here are logged as
/// non-critical by the runtime and never reach the caller.
#[async_trait::async_trait]
pub trait UsageStore: Send + Sync + 'static {
    async fn record(&self, event: UsageEvent) -> Result<(), UsageStoreError>;
}

/// Discards every event. The default when no store is wired.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopUsageStore;

#[async_trait::async_trait]
impl UsageStore for NoopUsageStore {
    async fn record(&self, _event: UsageEvent) -> Result<(), UsageStoreError> {
        Ok(())
    }
}

/// In-memory store for tests and single-process deployments.
#[derive(Debug, Default)]
pub struct MemoryUsageStore {
    events: Mutex<Vec<UsageEvent>>,
}

impl MemoryUsageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<UsageEvent> {
        self.events.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl UsageStore for MemoryUsageStore {
    async fn record(&self, event: UsageEvent) -> Result<(), UsageStoreError> {
        self.events.lock().await.push(event);
        Ok(())
    }
}
