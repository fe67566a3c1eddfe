use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::Redactor;

/// Correlates everything one logical invocation does, including its fallback
/// call, under a single opaque id.
#[derive(Clone, Debug)]
pub struct TraceContext {
    pub trace_id: Uuid,
    pub started_at: DateTime<Utc>,
    start: Instant,
}

impl TraceContext {
    pub fn new() -> Self {
        Self::with_trace_id(Uuid::new_v4())
    }

    pub fn with_trace_id(trace_id: Uuid) -> Self {
        Self {
            trace_id,
            started_at: Utc::now(),
            start: Instant::now(),
        }
    }

    /// Elapsed wall time since the context was created. Non-negative by
    /// construction (monotonic clock).
    pub fn latency_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl Default for TraceContext {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TraceOutcome {
    Success,
    DryRun,
    Failure,
}

/// One structured event per invocation outcome. Shape and redaction are
/// guaranteed here; delivery is the sink's problem.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct TraceEvent {
    pub trace_id: Uuid,
    pub capability: String,
    pub provider: String,
    pub model: Option<String>,
    pub outcome: TraceOutcome,
    pub latency_ms: u64,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub error: Option<String>,
    pub metadata: BTreeMap<String, String>,
    pub emitted_at: DateTime<Utc>,
}

#[async_trait::async_trait]
pub trait TraceSink: Send + Sync {
    async fn emit(&self, event: &TraceEvent);
}

/// Sink that forwards events to the `tracing` subscriber.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

#[async_trait::async_trait]
impl TraceSink for TracingSink {
    async fn emit(&self, event: &TraceEvent) {
        tracing::info!(
            trace_id = %event.trace_id,
            capability = %event.capability,
            provider = %event.provider,
            model = event.model.as_deref(),
            outcome = ?event.outcome,
            latency_ms = event.latency_ms,
            input_tokens = event.input_tokens,
            output_tokens = event.output_tokens,
            error = event.error.as_deref(),
            "invocation finished"
        );
    }
}

/// Fans one event out to every registered sink, redacting text fields first.
#[derive(Clone, Default)]
pub struct TraceEmitter {
    sinks: Vec<Arc<dyn TraceSink>>,
    redactor: Redactor,
}

impl std::fmt::Debug for TraceEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraceEmitter")
            .field("sinks", &self.sinks.len())
            .field("redactor", &self.redactor)
            .finish()
    }
}

impl TraceEmitter {
    pub fn new(sinks: Vec<Arc<dyn TraceSink>>, redactor: Redactor) -> Self {
        Self { sinks, redactor }
    }

    pub fn noop() -> Self {
        Self {
            sinks: vec![],
            redactor: Redactor::default(),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.sinks.is_empty()
    }

    pub async fn emit(&self, event: TraceEvent) {
        let event = self.redacted(event);
        for sink in &self.sinks {
            sink.emit(&event).await;
        }
    }

    fn redacted(&self, mut event: TraceEvent) -> TraceEvent {
        event.capability = self.redactor.redact(&event.capability);
        if let Some(error) = event.error.take() {
            event.error = Some(self.redactor.redact(&error));
        }
        event.metadata = event
            .metadata
            .into_iter()
            .map(|(key, value)| (key, self.redactor.redact(&value)))
            .collect();
        event
    }
}
