use promptgate_core::Role;
use promptgate_pack::{
    build_fallback_messages, build_messages, strict_json_instruction, PromptPack,
    MAX_FEWSHOT_PAIRS,
};
use serde_json::json;

fn pack_with_fewshots(count: usize) -> PromptPack {
    let mut pack = PromptPack::new("audit.insights", "1", "You analyze audit logs.");
    for i in 0..count {
        pack = pack.fewshot(json!({"example": i}), json!({"insight": i}));
    }
    pack
}

#[test]
fn plain_assembly_is_system_prompt_plus_input_turn() {
    let pack = pack_with_fewshots(0);
    let input = json!({"logs": ["a", "b"]});

    let prompt = build_messages(&pack, &input, false, false).unwrap();

    assert_eq!(prompt.system_prompt, "You analyze audit logs.");
    assert_eq!(prompt.messages.len(), 1);
    assert_eq!(prompt.messages[0].role, Role::User);
    assert_eq!(
        prompt.messages[0].content,
        serde_json::to_string(&input).unwrap()
    );
}

#[test]
fn style_directives_are_appended_to_the_system_prompt() {
    let pack = pack_with_fewshots(0);

    let prompt = build_messages(&pack, &json!({}), true, true).unwrap();

    assert!(prompt.system_prompt.starts_with("You analyze audit logs."));
    assert!(prompt.system_prompt.contains("tone"));
    assert!(prompt.system_prompt.contains("brief"));
}

#[test]
fn fewshots_render_as_alternating_turns_capped_at_three_pairs() {
    let pack = pack_with_fewshots(5);

    let prompt = build_messages(&pack, &json!({"q": 1}), false, false).unwrap();

    // 3 pairs + the final input turn.
    assert_eq!(prompt.messages.len(), MAX_FEWSHOT_PAIRS * 2 + 1);
    for pair in 0..MAX_FEWSHOT_PAIRS {
        assert_eq!(prompt.messages[pair * 2].role, Role::User);
        assert_eq!(prompt.messages[pair * 2 + 1].role, Role::Assistant);
    }
    let last = prompt.messages.last().unwrap();
    assert_eq!(last.role, Role::User);
    assert_eq!(last.content, serde_json::to_string(&json!({"q": 1})).unwrap());
}

#[test]
fn fallback_prompt_is_the_raw_input_turn_only() {
    let input = json!({"logs": []});

    let messages = build_fallback_messages(&input).unwrap();

    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[0].content, serde_json::to_string(&input).unwrap());
}

#[test]
fn strict_instruction_demands_json_only() {
    let instruction = strict_json_instruction();

    assert!(instruction.contains("JSON"));
    assert!(instruction.contains("No explanations"));
}
