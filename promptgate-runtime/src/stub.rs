use std::collections::HashMap;

use serde_json::{json, Value};

/// Canned responses for dry-run mode, keyed by capability key. Never errors,
/// never touches the network; the input is not inspected, so repeated calls
/// for the same key are structurally identical.
#[derive(Clone, Debug, Default)]
pub struct DeterministicStub {
    responses: HashMap<String, Value>,
}

impl DeterministicStub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, key: impl Into<String>, response: Value) -> Self {
        self.responses.insert(key.into(), response);
        self
    }

    /// Returns the canned response for `key`, or a generic placeholder object
    /// for keys with no registered response. Schema conformance of canned
    /// responses is best-effort, not enforced.
    pub fn response_for(&self, key: &str) -> Value {
        self.responses.get(key).cloned().unwrap_or_else(|| {
            json!({
                "stub": true,
                "capability": key,
            })
        })
    }
}
