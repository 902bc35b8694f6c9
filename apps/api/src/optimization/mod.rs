// Résumé optimization engine.
// Implements: normalization, keyword mining, section generation, match scoring,
// optional bullet paraphrasing, and the end-to-end pipeline.
// All LLM calls go through llm_client; nothing here talks to Anthropic directly.

pub mod handlers;
pub mod keywords;
pub mod normalize;
pub mod pipeline;
pub mod prompts;
pub mod rewriter;
pub mod scoring;
pub mod sections;
pub mod stop_words;
