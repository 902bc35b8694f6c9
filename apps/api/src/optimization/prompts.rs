// LLM prompt constants for the optimization module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Bullet rewrite prompt. Replace `{bullet}`, `{keywords}` and
/// `{grounding_instruction}` before sending.
pub const PARAPHRASE_PROMPT_TEMPLATE: &str = r#"Rewrite the following resume bullet so it reads naturally for an applicant tracking system.

Original bullet:
{bullet}

Keywords to include where they fit: {keywords}

{grounding_instruction}

Return ONE rewritten bullet as a single sentence, without a leading dash or bullet symbol."#;
