mod assemble;
mod pack;
mod registry;

pub use assemble::{
    build_fallback_messages, build_messages, strict_json_instruction, AssembledPrompt,
    MAX_FEWSHOT_PAIRS,
};
pub use pack::{FewshotPair, ModelHints, PromptPack, StyleKnobs};
pub use registry::{PackRegistry, PackRegistryBuilder};
