mod config;
mod cost;
mod error;
mod llm;
mod redact;
mod retry;
mod timeout;
mod trace;

pub use config::{ResilienceConfig, ResilienceOverride, RuntimeConfig, RuntimeConfigBuilder};
pub use cost::{CostBreakdown, CostMeter, RateCard};
pub use error::PromptgateError;
pub use llm::{CompletionProvider, CompletionRequest, CompletionResult, Message, Role};
pub use redact::Redactor;
pub use retry::RetryPolicy;
pub use timeout::race_with_timeout;
pub use trace::{
    TraceContext, TraceEmitter, TraceEvent, TraceOutcome, TraceSink, TracingSink,
};
