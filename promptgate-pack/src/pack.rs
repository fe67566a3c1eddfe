use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Style directives a pack supports; per-call options may override either.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct StyleKnobs {
    pub tone: bool,
    pub brevity: bool,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct ModelHints {
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct FewshotPair {
    pub input: Value,
    pub output: Value,
}

/// A versioned prompt definition for one capability key. Packs are built at
/// process start and immutable afterwards.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct PromptPack {
    pub key: String,
    pub version: String,
    pub system_prompt: String,
    pub input_schema: Value,
    pub output_schema: Value,
    pub style: StyleKnobs,
    pub hints: ModelHints,
    pub fewshots: Vec<FewshotPair>,
}

impl PromptPack {
    pub fn new(
        key: impl Into<String>,
        version: impl Into<String>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            version: version.into(),
            system_prompt: system_prompt.into(),
            input_schema: Value::Null,
            output_schema: Value::Null,
            style: StyleKnobs::default(),
            hints: ModelHints::default(),
            fewshots: Vec::new(),
        }
    }

    pub fn input_schema(mut self, schema: Value) -> Self {
        self.input_schema = schema;
        self
    }

    pub fn output_schema(mut self, schema: Value) -> Self {
        self.output_schema = schema;
        self
    }

    /// Derives the input schema document from a Rust type.
    pub fn input_schema_of<T: JsonSchema>(mut self) -> Self {
        self.input_schema = schema_value::<T>();
        self
    }

    /// Derives the output schema document from a Rust type.
    pub fn output_schema_of<T: JsonSchema>(mut self) -> Self {
        self.output_schema = schema_value::<T>();
        self
    }

    pub fn style(mut self, style: StyleKnobs) -> Self {
        self.style = style;
        self
    }

    pub fn hints(mut self, hints: ModelHints) -> Self {
        self.hints = hints;
        self
    }

    pub fn fewshot(mut self, input: Value, output: Value) -> Self {
        self.fewshots.push(FewshotPair { input, output });
        self
    }
}

fn schema_value<T: JsonSchema>() -> Value {
    serde_json::to_value(schemars::schema_for!(T)).unwrap_or(Value::Null)
}
