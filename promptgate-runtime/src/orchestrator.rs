use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use promptgate_core::{
    race_with_timeout, CompletionProvider, CompletionRequest, CompletionResult, CostMeter,
    PromptgateError, RetryPolicy, RuntimeConfig, TraceContext, TraceEmitter, TraceEvent,
    TraceOutcome, TraceSink, TracingSink,
};
use promptgate_pack::{
    build_fallback_messages, build_messages, strict_json_instruction, PackRegistry,
};

use crate::{
    DeterministicStub, EntitlementError, EntitlementGate, InvokeOptions, NoopUsageStore, OpenGate,
    UsageEvent, UsageStore,
};

const ESTIMATED_UNITS_PER_CALL: u32 = 1;

/// A parsed completion tagged with the trace id that produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct InvocationOutput {
    pub value: Value,
    pub trace_id: Uuid,
}

impl InvocationOutput {
    /// Merges the trace id into the parsed object under `"trace_id"`;
    /// non-object results are wrapped.
    pub fn into_tagged_value(self) -> Value {
        match self.value {
            Value::Object(mut map) => {
                map.insert(
                    "trace_id".to_string(),
                    Value::String(self.trace_id.to_string()),
                );
                Value::Object(map)
            }
            other => json!({
                "value": other,
                "trace_id": self.trace_id.to_string(),
            }),
        }
    }
}

/// Top-level entry point: resolves the prompt pack, enforces entitlement,
/// executes the provider call under retry and timeout policies, parses the
/// result, degrades to a single strict fallback call on malformed output,
/// and meters and traces every outcome.
pub struct InvocationRuntime {
    registry: PackRegistry,
    provider: Arc<dyn CompletionProvider>,
    usage: Arc<dyn UsageStore>,
    entitlement: Arc<dyn EntitlementGate>,
    config: RuntimeConfig,
    meter: CostMeter,
    traces: TraceEmitter,
    stub: DeterministicStub,
}

impl InvocationRuntime {
    pub fn builder() -> InvocationRuntimeBuilder {
        InvocationRuntimeBuilder::default()
    }

    /// Invokes a capability with structured input. Returns the schema-shaped
    /// parsed output tagged with the invocation's trace id, or a typed error.
    /// Every outcome, including failures, emits exactly one trace event.
    pub async fn invoke(
        &self,
        capability: &str,
        input: Value,
        options: InvokeOptions,
    ) -> Result<InvocationOutput, PromptgateError> {
        let trace = options
            .trace_id
            .map(TraceContext::with_trace_id)
            .unwrap_or_default();

        match self.run(capability, &input, &options, &trace).await {
            Ok(output) => Ok(output),
            Err(error) => {
                self.emit_outcome(
                    capability,
                    &options,
                    &trace,
                    TraceOutcome::Failure,
                    None,
                    0,
                    0,
                    Some(error.to_string()),
                )
                .await;
                Err(error)
            }
        }
    }

    async fn run(
        &self,
        capability: &str,
        input: &Value,
        options: &InvokeOptions,
        trace: &TraceContext,
    ) -> Result<InvocationOutput, PromptgateError> {
        let pack = self
            .registry
            .resolve(capability, options.version.as_deref())?;
        let model = options
            .model
            .clone()
            .unwrap_or_else(|| self.config.default_model().to_string());

        if self.config.dry_run() {
            let value = self.stub.response_for(capability);
            self.record_usage(
                self.usage_event(capability, options, trace, &model, 0, 0, true),
                options.is_admin,
            );
            self.emit_outcome(
                capability,
                options,
                trace,
                TraceOutcome::DryRun,
                Some(&model),
                0,
                0,
                None,
            )
            .await;
            return Ok(InvocationOutput {
                value,
                trace_id: trace.trace_id,
            });
        }

        if let Some(workspace_id) = options.workspace_id.as_deref() {
            self.entitlement
                .check_and_consume(workspace_id, ESTIMATED_UNITS_PER_CALL, capability)
                .await
                .map_err(|error| match error {
                    EntitlementError::QuotaExceeded { workspace_id } => {
                        PromptgateError::QuotaExceeded { workspace_id }
                    }
                    EntitlementError::Gate(reason) => PromptgateError::Entitlement(reason),
                })?;
        }

        let tone = options.tone.unwrap_or(pack.style.tone);
        let brevity = options.brevity.unwrap_or(pack.style.brevity);
        let prompt = build_messages(pack, input, tone, brevity)?;

        let request = CompletionRequest {
            model: model.clone(),
            system_prompt: prompt.system_prompt,
            messages: prompt.messages,
            output_schema: pack.output_schema.clone(),
            temperature: pack.hints.temperature,
            max_output_tokens: pack.hints.max_output_tokens,
            trace_id: Some(trace.trace_id),
        };

        let resilience = self.config.resilience_for(self.provider.id());
        let policy = RetryPolicy::new(resilience.max_retries, resilience.backoff_base);
        let primary = policy.run(|| {
            race_with_timeout(
                self.provider.complete(request.clone()),
                resilience.timeout,
                capability,
            )
        });
        let result = match options.cancellation.clone() {
            Some(token) => tokio::select! {
                _ = token.cancelled() => Err(PromptgateError::Cancelled),
                outcome = primary => outcome,
            },
            None => primary.await,
        }?;

        match parse_output(&result.text) {
            Ok(value) => Ok(self.finish(capability, options, trace, &result, value).await),
            Err(parse_error) => {
                tracing::warn!(
                    capability,
                    trace_id = %trace.trace_id,
                    error = %parse_error,
                    "primary output unparsable, issuing one strict fallback call"
                );

                let fallback_request = CompletionRequest {
                    model: self.config.fallback_model().unwrap_or(&model).to_string(),
                    system_prompt: strict_json_instruction().to_string(),
                    messages: build_fallback_messages(input)?,
                    output_schema: pack.output_schema.clone(),
                    temperature: Some(0.0),
                    max_output_tokens: pack.hints.max_output_tokens,
                    trace_id: Some(trace.trace_id),
                };

                // One attempt, outside the retry/timeout policies. A second
                // parse failure propagates; there is no third attempt.
                let fallback_result = self.provider.complete(fallback_request).await?;
                let value = parse_output(&fallback_result.text)?;
                Ok(self
                    .finish(capability, options, trace, &fallback_result, value)
                    .await)
            }
        }
    }

    async fn finish(
        &self,
        capability: &str,
        options: &InvokeOptions,
        trace: &TraceContext,
        result: &CompletionResult,
        value: Value,
    ) -> InvocationOutput {
        self.record_usage(
            self.usage_event(
                capability,
                options,
                trace,
                &result.model,
                result.input_tokens,
                result.output_tokens,
                false,
            ),
            options.is_admin,
        );
        self.emit_outcome(
            capability,
            options,
            trace,
            TraceOutcome::Success,
            Some(&result.model),
            result.input_tokens,
            result.output_tokens,
            None,
        )
        .await;

        InvocationOutput {
            value,
            trace_id: trace.trace_id,
        }
    }

    fn usage_event(
        &self,
        capability: &str,
        options: &InvokeOptions,
        trace: &TraceContext,
        model: &str,
        input_tokens: u32,
        output_tokens: u32,
        dry_run: bool,
    ) -> UsageEvent {
        let cost = self.meter.cost(model, input_tokens, output_tokens);
        UsageEvent {
            workspace_id: options.workspace_id.clone(),
            trace_id: trace.trace_id,
            pack_key: capability.to_string(),
            provider: self.provider.id().to_string(),
            model: model.to_string(),
            input_tokens,
            output_tokens,
            input_cost_usd: cost.input_cost_usd,
            output_cost_usd: cost.output_cost_usd,
            total_cost_usd: cost.total_cost_usd,
            dry_run,
            recorded_at: Utc::now(),
        }
    }

    /// Best-effort, detached. A failed write is logged and never joins the
    /// primary result's error channel.
    fn record_usage(&self, event: UsageEvent, is_admin: bool) {
        if is_admin {
            return;
        }
        let store = Arc::clone(&self.usage);
        tokio::spawn(async move {
            if let Err(error) = store.record(event).await {
                tracing::warn!(error = %error, "usage event dropped");
            }
        });
    }

    #[allow(clippy::too_many_arguments)]
    async fn emit_outcome(
        &self,
        capability: &str,
        options: &InvokeOptions,
        trace: &TraceContext,
        outcome: TraceOutcome,
        model: Option<&str>,
        input_tokens: u32,
        output_tokens: u32,
        error: Option<String>,
    ) {
        let mut metadata = BTreeMap::new();
        if let Some(workspace_id) = &options.workspace_id {
            metadata.insert("workspace_id".to_string(), workspace_id.clone());
        }
        if let Some(version) = &options.version {
            metadata.insert("pack_version".to_string(), version.clone());
        }

        self.traces
            .emit(TraceEvent {
                trace_id: trace.trace_id,
                capability: capability.to_string(),
                provider: self.provider.id().to_string(),
                model: model.map(str::to_string),
                outcome,
                latency_ms: trace.latency_ms(),
                input_tokens,
                output_tokens,
                error,
                metadata,
                emitted_at: Utc::now(),
            })
            .await;
    }
}

fn parse_output(text: &str) -> Result<Value, PromptgateError> {
    let cleaned = text.trim();
    let cleaned = if let Some(stripped) = cleaned.strip_prefix("```json") {
        stripped.trim_end_matches("```").trim()
    } else if let Some(stripped) = cleaned.strip_prefix("```") {
        stripped.trim_end_matches("```").trim()
    } else {
        cleaned
    };
    serde_json::from_str(cleaned).map_err(|error| PromptgateError::MalformedOutput {
        reason: error.to_string(),
    })
}

#[derive(Default)]
pub struct InvocationRuntimeBuilder {
    registry: Option<PackRegistry>,
    provider: Option<Arc<dyn CompletionProvider>>,
    usage: Option<Arc<dyn UsageStore>>,
    entitlement: Option<Arc<dyn EntitlementGate>>,
    config: Option<RuntimeConfig>,
    sinks: Vec<Arc<dyn TraceSink>>,
    stub: DeterministicStub,
}

impl InvocationRuntimeBuilder {
    pub fn registry(mut self, value: PackRegistry) -> Self {
        self.registry = Some(value);
        self
    }

    pub fn provider(mut self, value: Arc<dyn CompletionProvider>) -> Self {
        self.provider = Some(value);
        self
    }

    pub fn usage_store(mut self, value: Arc<dyn UsageStore>) -> Self {
        self.usage = Some(value);
        self
    }

    pub fn entitlement_gate(mut self, value: Arc<dyn EntitlementGate>) -> Self {
        self.entitlement = Some(value);
        self
    }

    pub fn config(mut self, value: RuntimeConfig) -> Self {
        self.config = Some(value);
        self
    }

    pub fn trace_sink(mut self, value: Arc<dyn TraceSink>) -> Self {
        self.sinks.push(value);
        self
    }

    pub fn stub(mut self, value: DeterministicStub) -> Self {
        self.stub = value;
        self
    }

    pub fn build(self) -> Result<InvocationRuntime, PromptgateError> {
        let registry = self
            .registry
            .ok_or_else(|| PromptgateError::InvalidConfig("pack registry is required".into()))?;
        let provider = self
            .provider
            .ok_or_else(|| PromptgateError::InvalidConfig("completion provider is required".into()))?;
        let config = self
            .config
            .ok_or_else(|| PromptgateError::InvalidConfig("runtime config is required".into()))?;

        if registry.is_empty() {
            tracing::warn!("pack registry is empty; every invocation will fail resolution");
        }

        let mut sinks = self.sinks;
        if sinks.is_empty() {
            sinks.push(Arc::new(TracingSink));
        }
        let traces = TraceEmitter::new(sinks, config.redactor());
        let meter = config.cost_meter();

        Ok(InvocationRuntime {
            registry,
            provider,
            usage: self.usage.unwrap_or_else(|| Arc::new(NoopUsageStore)),
            entitlement: self.entitlement.unwrap_or_else(|| Arc::new(OpenGate)),
            config,
            meter,
            traces,
            stub: self.stub,
        })
    }
}
