use std::sync::Arc;
use std::time::Duration;

use promptgate_core::{
    CompletionProvider, CompletionRequest, CompletionResult, PromptgateError, RuntimeConfig,
};
use promptgate_pack::{PackRegistry, PromptPack};
use promptgate_runtime::{InvocationRuntime, InvokeOptions};
use serde_json::json;
use tokio_util::sync::CancellationToken;

struct HangingProvider;

#[async_trait::async_trait]
impl CompletionProvider for HangingProvider {
    fn id(&self) -> &str {
        "fake"
    }

    async fn complete(
        &self,
        _request: CompletionRequest,
    ) -> Result<CompletionResult, PromptgateError> {
        tokio::time::sleep(Duration::from_secs(86_400)).await;
        Err(PromptgateError::Provider("unreachable".to_string()))
    }
}

fn runtime() -> InvocationRuntime {
    InvocationRuntime::builder()
        .registry(
            PackRegistry::builder()
                .register(PromptPack::new(
                    "audit.insights",
                    "1",
                    "You analyze audit logs.",
                ))
                .build()
                .unwrap(),
        )
        .provider(Arc::new(HangingProvider))
        .config(
            RuntimeConfig::builder()
                .default_model("gpt-large")
                .timeout(Duration::from_secs(3600))
                .build()
                .unwrap(),
        )
        .build()
        .unwrap()
}

#[tokio::test]
async fn a_cancelled_token_aborts_the_wait() {
    let token = CancellationToken::new();
    token.cancel();

    let err = runtime()
        .invoke(
            "audit.insights",
            json!({}),
            InvokeOptions::new().cancellation(token),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, PromptgateError::Cancelled));
}

#[tokio::test]
async fn cancelling_mid_flight_aborts_the_wait() {
    let token = CancellationToken::new();
    let runtime = runtime();

    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let err = runtime
        .invoke(
            "audit.insights",
            json!({}),
            InvokeOptions::new().cancellation(token),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, PromptgateError::Cancelled));
}
