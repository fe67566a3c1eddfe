use promptgate_pack::{ModelHints, PromptPack, StyleKnobs};
use schemars::JsonSchema;
use serde::Serialize;
use serde_json::Value;

#[derive(JsonSchema, Serialize)]
struct Insight {
    title: String,
    severity: u8,
}

#[test]
fn schema_documents_derive_from_rust_types() {
    let pack = PromptPack::new("audit.insights", "1", "You analyze audit logs.")
        .output_schema_of::<Insight>();

    let schema = pack.output_schema.as_object().unwrap();
    let properties = schema["properties"].as_object().unwrap();
    assert!(properties.contains_key("title"));
    assert!(properties.contains_key("severity"));
}

#[test]
fn builder_style_construction_fills_every_field() {
    let pack = PromptPack::new("audit.insights", "2", "You analyze audit logs.")
        .input_schema(serde_json::json!({"type": "object"}))
        .style(StyleKnobs {
            tone: true,
            brevity: false,
        })
        .hints(ModelHints {
            temperature: Some(0.2),
            max_output_tokens: Some(800),
        })
        .fewshot(
            serde_json::json!({"logs": []}),
            serde_json::json!({"insights": []}),
        );

    assert_eq!(pack.key, "audit.insights");
    assert_eq!(pack.version, "2");
    assert!(pack.style.tone);
    assert_eq!(pack.hints.temperature, Some(0.2));
    assert_eq!(pack.fewshots.len(), 1);
    assert_eq!(pack.output_schema, Value::Null);
}
