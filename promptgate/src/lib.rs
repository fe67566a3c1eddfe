//! Umbrella crate for the promptgate invocation runtime.
//!
//! Re-exports the member crates; most users only need the [`prelude`].

pub use promptgate_core::{
    race_with_timeout, CompletionProvider, CompletionRequest, CompletionResult, CostBreakdown,
    CostMeter, Message, PromptgateError, RateCard, Redactor, ResilienceConfig, ResilienceOverride,
    RetryPolicy, Role, RuntimeConfig, RuntimeConfigBuilder, TraceContext, TraceEmitter,
    TraceEvent, TraceOutcome, TraceSink, TracingSink,
};
pub use promptgate_pack::{
    build_fallback_messages, build_messages, strict_json_instruction, AssembledPrompt,
    FewshotPair, ModelHints, PackRegistry, PackRegistryBuilder, PromptPack, StyleKnobs,
    MAX_FEWSHOT_PAIRS,
};
pub use promptgate_runtime::{
    DeterministicStub, EntitlementError, EntitlementGate, InvocationOutput, InvocationRuntime,
    InvocationRuntimeBuilder, InvokeOptions, MemoryUsageStore, NoopUsageStore, OpenGate,
    UsageEvent, UsageStore, UsageStoreError,
};

pub mod prelude {
    pub use promptgate_core::{
        CompletionProvider, CompletionRequest, CompletionResult, PromptgateError, RateCard,
        RuntimeConfig, TraceEvent, TraceSink,
    };
    pub use promptgate_pack::{PackRegistry, PromptPack, StyleKnobs};
    pub use promptgate_runtime::{
        EntitlementGate, InvocationOutput, InvocationRuntime, InvokeOptions, UsageEvent,
        UsageStore,
    };
}
