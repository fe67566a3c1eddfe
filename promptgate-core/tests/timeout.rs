use std::time::Duration;

use promptgate_core::{race_with_timeout, PromptgateError};

#[tokio::test(start_paused = true)]
async fn fast_operation_returns_its_value_unchanged() {
    let output = race_with_timeout(
        async { Ok::<_, PromptgateError>(42) },
        Duration::from_millis(50),
        "audit.insights",
    )
    .await
    .unwrap();

    assert_eq!(output, 42);
}

#[tokio::test(start_paused = true)]
async fn fast_operation_error_is_propagated_not_translated() {
    let err = race_with_timeout(
        async { Err::<i32, _>(PromptgateError::Provider("boom".to_string())) },
        Duration::from_millis(50),
        "audit.insights",
    )
    .await
    .unwrap_err();

    assert!(matches!(err, PromptgateError::Provider(_)));
}

#[tokio::test(start_paused = true)]
async fn slow_operation_times_out_with_label_and_bound() {
    let err = race_with_timeout(
        async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok::<_, PromptgateError>(42)
        },
        Duration::from_millis(50),
        "audit.insights",
    )
    .await
    .unwrap_err();

    match &err {
        PromptgateError::Timeout { label, ms } => {
            assert_eq!(label, "audit.insights");
            assert_eq!(*ms, 50);
        }
        other => panic!("expected timeout, got {other:?}"),
    }
    let message = err.to_string();
    assert!(message.contains("audit.insights"));
    assert!(message.contains("50ms"));
}
