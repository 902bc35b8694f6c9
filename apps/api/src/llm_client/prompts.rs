// Shared prompt constants for plain-text LLM output.
// Each service that needs LLM calls defines its own prompts.rs alongside it.

/// System prompt fragment that enforces a single bare line of output.
pub const SINGLE_LINE_SYSTEM: &str = "You are a precise resume editor. \
    Respond with exactly one line of plain text. \
    Do NOT use markdown, bullet markers, or quotation marks. \
    Do NOT include explanations, alternatives, or apologies.";

/// Instruction appended to every rewrite prompt.
pub const GROUNDING_INSTRUCTION: &str = "\
    CRITICAL: Keep every fact from the original bullet. Do NOT invent employers, \
    tools, numbers, or outcomes. Only weave in a suggested keyword where it fits \
    the original claim; otherwise leave it out.";
