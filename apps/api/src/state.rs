use std::sync::Arc;

use crate::config::Config;
use crate::optimization::rewriter::Paraphraser;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable paraphrase backend. `None` disables the rewrite path; requests
    /// asking for it fall back to the original experience text.
    pub paraphraser: Option<Arc<dyn Paraphraser>>,
}
