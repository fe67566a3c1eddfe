use promptgate_core::{Message, PromptgateError};
use serde_json::Value;

use crate::PromptPack;

/// At most this many few-shot pairs are rendered into the message sequence.
pub const MAX_FEWSHOT_PAIRS: usize = 3;

const TONE_DIRECTIVE: &str = "Use a warm, professional tone.";
const BREVITY_DIRECTIVE: &str = "Be brief. Prefer short sentences and omit filler.";
const STRICT_JSON_INSTRUCTION: &str =
    "Return only valid JSON for the output schema. No explanations.";

#[derive(Clone, Debug, PartialEq)]
pub struct AssembledPrompt {
    pub system_prompt: String,
    pub messages: Vec<Message>,
}

/// Renders the full prompt for a primary call: the pack's system prompt with
/// any resolved style directives appended, few-shot pairs as alternating
/// user/assistant turns, and the serialized input as the final user turn.
pub fn build_messages(
    pack: &PromptPack,
    input: &Value,
    tone: bool,
    brevity: bool,
) -> Result<AssembledPrompt, PromptgateError> {
    let mut system_prompt = pack.system_prompt.clone();
    if tone {
        system_prompt.push_str("\n\n");
        system_prompt.push_str(TONE_DIRECTIVE);
    }
    if brevity {
        system_prompt.push_str("\n\n");
        system_prompt.push_str(BREVITY_DIRECTIVE);
    }

    let mut messages = Vec::with_capacity(pack.fewshots.len().min(MAX_FEWSHOT_PAIRS) * 2 + 1);
    for pair in pack.fewshots.iter().take(MAX_FEWSHOT_PAIRS) {
        messages.push(Message::user(serde_json::to_string(&pair.input)?));
        messages.push(Message::assistant(serde_json::to_string(&pair.output)?));
    }
    messages.push(Message::user(serde_json::to_string(input)?));

    Ok(AssembledPrompt {
        system_prompt,
        messages,
    })
}

/// The reduced context for the single fallback call: the raw input turn only,
/// with few-shots and style directives dropped.
pub fn build_fallback_messages(input: &Value) -> Result<Vec<Message>, PromptgateError> {
    Ok(vec![Message::user(serde_json::to_string(input)?)])
}

/// Minimal system instruction used by the fallback call.
pub fn strict_json_instruction() -> &'static str {
    STRICT_JSON_INSTRUCTION
}
