use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};
use std::time::Duration;

use promptgate_core::{
    CompletionProvider, CompletionRequest, CompletionResult, PromptgateError, RuntimeConfig,
};
use promptgate_pack::{strict_json_instruction, PackRegistry, PromptPack};
use promptgate_runtime::{InvocationRuntime, InvokeOptions, MemoryUsageStore};
use serde_json::json;
use uuid::Uuid;

/// Returns unparsable prose on the first call, then valid JSON (or prose
/// forever when `heal` is false).
struct GarbageFirstProvider {
    heal: bool,
    calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl GarbageFirstProvider {
    fn new(heal: bool) -> Self {
        Self {
            heal,
            calls: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn calls_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    fn request(&self, index: usize) -> CompletionRequest {
        self.requests.lock().unwrap()[index].clone()
    }
}

#[async_trait::async_trait]
impl CompletionProvider for GarbageFirstProvider {
    fn id(&self) -> &str {
        "fake"
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResult, PromptgateError> {
        let attempt = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let model = request.model.clone();
        self.requests.lock().unwrap().push(request);
        let text = if attempt == 1 || !self.heal {
            "Sure! Here are your insights: slow deploys.".to_string()
        } else {
            r#"{"insights": ["slow deploys"]}"#.to_string()
        };
        Ok(CompletionResult {
            text,
            input_tokens: 40,
            output_tokens: 10,
            model,
        })
    }
}

fn registry() -> PackRegistry {
    PackRegistry::builder()
        .register(
            PromptPack::new("audit.insights", "1", "You analyze audit logs.")
                .fewshot(json!({"logs": ["x"]}), json!({"insights": []})),
        )
        .build()
        .unwrap()
}

fn config() -> RuntimeConfig {
    RuntimeConfig::builder()
        .default_model("gpt-large")
        .fallback_model("gpt-small")
        .max_retries(3)
        .backoff_base(Duration::from_millis(10))
        .build()
        .unwrap()
}

#[tokio::test(start_paused = true)]
async fn parse_failure_issues_exactly_one_strict_fallback_call() {
    let provider = Arc::new(GarbageFirstProvider::new(true));
    let runtime = InvocationRuntime::builder()
        .registry(registry())
        .provider(provider.clone())
        .config(config())
        .build()
        .unwrap();

    let trace_id = Uuid::new_v4();
    let output = runtime
        .invoke(
            "audit.insights",
            json!({"logs": ["deploy took 40m"]}),
            InvokeOptions::new().trace_id(trace_id),
        )
        .await
        .unwrap();

    assert_eq!(output.value, json!({"insights": ["slow deploys"]}));
    assert_eq!(output.trace_id, trace_id);
    assert_eq!(provider.calls_counter().load(Ordering::SeqCst), 2);

    let fallback = provider.request(1);
    assert_eq!(fallback.model, "gpt-small");
    assert_eq!(fallback.temperature, Some(0.0));
    assert_eq!(fallback.system_prompt, strict_json_instruction());
    // Few-shots and style directives are dropped: only the raw input turn.
    assert_eq!(fallback.messages.len(), 1);
    assert_eq!(
        fallback.messages[0].content,
        serde_json::to_string(&json!({"logs": ["deploy took 40m"]})).unwrap()
    );
    assert_eq!(fallback.trace_id, Some(trace_id));

    // The primary call carried the full context.
    let primary = provider.request(0);
    assert!(primary.messages.len() > 1);
    assert_eq!(primary.model, "gpt-large");
}

#[tokio::test(start_paused = true)]
async fn double_parse_failure_propagates_with_no_third_attempt() {
    let provider = Arc::new(GarbageFirstProvider::new(false));
    let runtime = InvocationRuntime::builder()
        .registry(registry())
        .provider(provider.clone())
        .config(config())
        .build()
        .unwrap();

    let err = runtime
        .invoke("audit.insights", json!({}), InvokeOptions::new())
        .await
        .unwrap_err();

    assert!(matches!(err, PromptgateError::MalformedOutput { .. }));
    assert_eq!(provider.calls_counter().load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn fallback_reuses_the_primary_model_when_none_is_configured() {
    let provider = Arc::new(GarbageFirstProvider::new(true));
    let runtime = InvocationRuntime::builder()
        .registry(registry())
        .provider(provider.clone())
        .config(
            RuntimeConfig::builder()
                .default_model("gpt-large")
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();

    runtime
        .invoke("audit.insights", json!({}), InvokeOptions::new())
        .await
        .unwrap();

    assert_eq!(provider.request(1).model, "gpt-large");
}

#[tokio::test(start_paused = true)]
async fn fallback_success_is_metered_from_the_fallback_result() {
    let provider = Arc::new(GarbageFirstProvider::new(true));
    let store = Arc::new(MemoryUsageStore::new());
    let runtime = InvocationRuntime::builder()
        .registry(registry())
        .provider(provider.clone())
        .usage_store(store.clone())
        .config(config())
        .build()
        .unwrap();

    runtime
        .invoke("audit.insights", json!({}), InvokeOptions::new())
        .await
        .unwrap();

    let mut events = Vec::new();
    for _ in 0..100 {
        events = store.events().await;
        if !events.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].model, "gpt-small");
    assert_eq!(events[0].input_tokens, 40);
    assert_eq!(events[0].output_tokens, 10);
}
