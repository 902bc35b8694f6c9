//! Experience Rewriter — paraphrases bullet lines to weave in top keywords.
//!
//! The paraphrase backend is a pluggable `Paraphraser`. Every failure it reports
//! (including a timeout imposed here) keeps the original line, independently
//! per line. Nothing from this module propagates an error to the caller.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::llm_client::prompts::{GROUNDING_INSTRUCTION, SINGLE_LINE_SYSTEM};
use crate::llm_client::LlmClient;
use crate::optimization::normalize::split_lines;
use crate::optimization::prompts::PARAPHRASE_PROMPT_TEMPLATE;

/// Number of leading keywords passed as inclusion hints.
const HINT_COUNT: usize = 3;

const BULLET_MARKERS: [char; 2] = ['-', '•'];

#[derive(Debug, Error)]
pub enum ParaphraseError {
    #[error("paraphrase timed out after {0:?}")]
    Timeout(Duration),

    #[error("paraphrase backend failed: {0}")]
    Backend(String),

    #[error("paraphrase output unusable: {0}")]
    Malformed(String),
}

/// One rewrite request. `candidates` is always 1; only a single rewrite is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParaphraseRequest {
    pub text: String,
    pub hints: Vec<String>,
    pub max_output_tokens: u32,
    pub candidates: u32,
}

/// Paraphrase capability. Carried in `AppState` as `Option<Arc<dyn Paraphraser>>`.
#[async_trait]
pub trait Paraphraser: Send + Sync {
    async fn paraphrase(&self, request: &ParaphraseRequest) -> Result<String, ParaphraseError>;
}

/// Per-run knobs for the rewriter.
#[derive(Debug, Clone, Copy)]
pub struct RewriteOptions {
    pub timeout: Duration,
    pub max_output_tokens: u32,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_output_tokens: 120,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// LlmParaphraser — Claude-backed paraphrase capability
// ────────────────────────────────────────────────────────────────────────────

/// Paraphraser backed by `LlmClient`. The client is built on first use and
/// reused for the life of the process.
pub struct LlmParaphraser {
    api_key: String,
    /// Overrides the Anthropic endpoint (proxies, local fakes).
    endpoint: Option<String>,
    client: OnceCell<LlmClient>,
}

impl LlmParaphraser {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            endpoint: None,
            client: OnceCell::new(),
        }
    }

    pub fn with_endpoint(api_key: String, endpoint: String) -> Self {
        Self {
            endpoint: Some(endpoint),
            ..Self::new(api_key)
        }
    }

    async fn client(&self) -> Result<&LlmClient, ParaphraseError> {
        self.client
            .get_or_try_init(|| async {
                debug!("Initializing paraphrase LLM client");
                match &self.endpoint {
                    Some(endpoint) => LlmClient::with_endpoint(self.api_key.clone(), endpoint.clone()),
                    None => LlmClient::new(self.api_key.clone()),
                }
            })
            .await
            .map_err(|e| ParaphraseError::Backend(e.to_string()))
    }
}

#[async_trait]
impl Paraphraser for LlmParaphraser {
    async fn paraphrase(&self, request: &ParaphraseRequest) -> Result<String, ParaphraseError> {
        debug!(
            "Paraphrasing bullet ({} candidate, {} hints, max {} tokens)",
            request.candidates,
            request.hints.len(),
            request.max_output_tokens
        );
        let prompt = build_paraphrase_prompt(request);
        self.client()
            .await?
            .call_text(&prompt, SINGLE_LINE_SYSTEM, request.max_output_tokens)
            .await
            .map_err(|e| ParaphraseError::Backend(e.to_string()))
    }
}

fn build_paraphrase_prompt(request: &ParaphraseRequest) -> String {
    PARAPHRASE_PROMPT_TEMPLATE
        .replace("{bullet}", &request.text)
        .replace("{keywords}", &request.hints.join(", "))
        .replace("{grounding_instruction}", GROUNDING_INSTRUCTION)
}

// ────────────────────────────────────────────────────────────────────────────
// Rewriter
// ────────────────────────────────────────────────────────────────────────────

/// A bullet line split into its prefix (indent + marker) and body.
struct BulletLine<'a> {
    indent: &'a str,
    marker: char,
    body: &'a str,
}

fn parse_bullet(line: &str) -> Option<BulletLine<'_>> {
    let stripped = line.trim_start();
    let marker = stripped.chars().next().filter(|c| BULLET_MARKERS.contains(c))?;
    Some(BulletLine {
        indent: &line[..line.len() - stripped.len()],
        marker,
        body: stripped[marker.len_utf8()..].trim(),
    })
}

/// Returns true when `line` starts (after whitespace) with a bullet marker.
pub fn is_bullet(line: &str) -> bool {
    parse_bullet(line).is_some()
}

/// Rewrites each bullet line of `resume_text` through `paraphraser`.
///
/// Lines keep their original order. Non-bullet lines, empty bullets, and
/// bullets whose paraphrase fails pass through unchanged.
pub async fn rewrite_experience(
    resume_text: &str,
    keywords: &[String],
    paraphraser: &dyn Paraphraser,
    options: RewriteOptions,
) -> String {
    let hints: Vec<String> = keywords.iter().take(HINT_COUNT).cloned().collect();
    let mut output = Vec::new();
    let mut rewritten = 0usize;
    let mut fallbacks = 0usize;

    for line in split_lines(resume_text) {
        let Some(bullet) = parse_bullet(line).filter(|b| !b.body.is_empty()) else {
            output.push(line.to_string());
            continue;
        };

        let request = ParaphraseRequest {
            text: bullet.body.to_string(),
            hints: hints.clone(),
            max_output_tokens: options.max_output_tokens,
            candidates: 1,
        };

        match paraphrase_line(paraphraser, &request, options.timeout).await {
            Ok(text) => {
                rewritten += 1;
                output.push(format!("{}{} {}", bullet.indent, bullet.marker, text));
            }
            Err(e) => {
                fallbacks += 1;
                warn!("Keeping original bullet: {e}");
                output.push(line.to_string());
            }
        }
    }

    debug!("Experience rewrite: {rewritten} rewritten, {fallbacks} kept after failure");
    output.join("\n")
}

async fn paraphrase_line(
    paraphraser: &dyn Paraphraser,
    request: &ParaphraseRequest,
    timeout: Duration,
) -> Result<String, ParaphraseError> {
    let text = tokio::time::timeout(timeout, paraphraser.paraphrase(request))
        .await
        .map_err(|_| ParaphraseError::Timeout(timeout))??;
    validate_paraphrase(&text)
}

/// Accepts a single non-empty line; strips a bullet marker the backend may echo.
fn validate_paraphrase(text: &str) -> Result<String, ParaphraseError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ParaphraseError::Malformed("empty output".to_string()));
    }
    if split_lines(text).len() > 1 {
        return Err(ParaphraseError::Malformed("multiple lines".to_string()));
    }
    let text = text.trim_start_matches(BULLET_MARKERS).trim();
    if text.is_empty() {
        return Err(ParaphraseError::Malformed("only a bullet marker".to_string()));
    }
    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::MODEL;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    /// Always fails with a backend error.
    struct FailingParaphraser;

    #[async_trait]
    impl Paraphraser for FailingParaphraser {
        async fn paraphrase(&self, _request: &ParaphraseRequest) -> Result<String, ParaphraseError> {
            Err(ParaphraseError::Backend("model unavailable".to_string()))
        }
    }

    /// Uppercases the bullet and records every request it sees.
    #[derive(Default)]
    struct RecordingParaphraser {
        seen: Mutex<Vec<ParaphraseRequest>>,
    }

    #[async_trait]
    impl Paraphraser for RecordingParaphraser {
        async fn paraphrase(&self, request: &ParaphraseRequest) -> Result<String, ParaphraseError> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(format!("{} using {}", request.text.to_uppercase(), request.hints.join("/")))
        }
    }

    /// Fails on bullets containing "flaky", succeeds elsewhere.
    struct SelectiveParaphraser;

    #[async_trait]
    impl Paraphraser for SelectiveParaphraser {
        async fn paraphrase(&self, request: &ParaphraseRequest) -> Result<String, ParaphraseError> {
            if request.text.contains("flaky") {
                Err(ParaphraseError::Backend("boom".to_string()))
            } else {
                Ok("Rewritten".to_string())
            }
        }
    }

    /// Never completes.
    struct HangingParaphraser;

    #[async_trait]
    impl Paraphraser for HangingParaphraser {
        async fn paraphrase(&self, _request: &ParaphraseRequest) -> Result<String, ParaphraseError> {
            std::future::pending::<()>().await;
            unreachable!()
        }
    }

    struct FixedParaphraser(&'static str);

    #[async_trait]
    impl Paraphraser for FixedParaphraser {
        async fn paraphrase(&self, _request: &ParaphraseRequest) -> Result<String, ParaphraseError> {
            Ok(self.0.to_string())
        }
    }

    fn kws(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[tokio::test]
    async fn test_failure_keeps_input_unchanged() {
        let resume = "- Built dashboards\nAcme Corp, 2019-2023";
        let out = rewrite_experience(
            resume,
            &kws(&["sql", "python"]),
            &FailingParaphraser,
            RewriteOptions::default(),
        )
        .await;
        assert_eq!(out, resume);
    }

    #[tokio::test]
    async fn test_rewrites_bullets_with_top_three_hints() {
        let paraphraser = RecordingParaphraser::default();
        let resume = "Experience\n- built dashboards\n  • cleaned data\nEducation: BSc";
        let out = rewrite_experience(
            resume,
            &kws(&["sql", "python", "tableau", "excel"]),
            &paraphraser,
            RewriteOptions::default(),
        )
        .await;

        assert_eq!(
            out,
            "Experience\n\
             - BUILT DASHBOARDS using sql/python/tableau\n  \
             • CLEANED DATA using sql/python/tableau\n\
             Education: BSc"
        );

        let seen = paraphraser.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].text, "built dashboards");
        assert_eq!(seen[0].hints, kws(&["sql", "python", "tableau"]));
        assert_eq!(seen[0].candidates, 1);
        assert_eq!(seen[0].max_output_tokens, 120);
    }

    #[tokio::test]
    async fn test_failures_are_isolated_per_line() {
        let resume = "- stable work\n- flaky work\n- more work";
        let out = rewrite_experience(resume, &kws(&["sql"]), &SelectiveParaphraser, RewriteOptions::default())
            .await;
        assert_eq!(out, "- Rewritten\n- flaky work\n- Rewritten");
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_call_times_out_and_keeps_line() {
        let resume = "- Built dashboards\n- Led migrations";
        let options = RewriteOptions {
            timeout: Duration::from_secs(5),
            max_output_tokens: 64,
        };
        let out = rewrite_experience(resume, &kws(&["sql"]), &HangingParaphraser, options).await;
        assert_eq!(out, resume);
    }

    #[tokio::test]
    async fn test_malformed_output_falls_back() {
        let resume = "- Built dashboards";
        for bad in ["", "   ", "line one\nline two", "-"] {
            let out = rewrite_experience(
                resume,
                &kws(&["sql"]),
                &FixedParaphraser(bad),
                RewriteOptions::default(),
            )
            .await;
            assert_eq!(out, resume, "output {bad:?} should have been rejected");
        }
    }

    #[tokio::test]
    async fn test_echoed_marker_is_not_doubled() {
        let out = rewrite_experience(
            "- Built dashboards",
            &kws(&["sql"]),
            &FixedParaphraser("- Built SQL dashboards"),
            RewriteOptions::default(),
        )
        .await;
        assert_eq!(out, "- Built SQL dashboards");
    }

    #[tokio::test]
    async fn test_empty_bullet_is_not_sent() {
        let paraphraser = RecordingParaphraser::default();
        let out = rewrite_experience("-\n  •  ", &kws(&["sql"]), &paraphraser, RewriteOptions::default()).await;
        assert_eq!(out, "-\n  •  ");
        assert!(paraphraser.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_is_bullet() {
        assert!(is_bullet("- item"));
        assert!(is_bullet("   • item"));
        assert!(!is_bullet("Item - with dash"));
        assert!(!is_bullet(""));
    }

    #[test]
    fn test_prompt_carries_bullet_and_hints() {
        let prompt = build_paraphrase_prompt(&ParaphraseRequest {
            text: "Built dashboards".to_string(),
            hints: kws(&["sql", "python"]),
            max_output_tokens: 120,
            candidates: 1,
        });
        assert!(prompt.contains("Built dashboards"));
        assert!(prompt.contains("sql, python"));
        assert!(!prompt.contains("{grounding_instruction}"));
    }

    #[tokio::test]
    async fn test_carriage_return_separated_bullets_rewrite_independently() {
        let out = rewrite_experience(
            "- a\r- b",
            &kws(&["sql"]),
            &FixedParaphraser("Rewritten"),
            RewriteOptions::default(),
        )
        .await;
        assert_eq!(out, "- Rewritten\n- Rewritten");
    }

    #[tokio::test]
    async fn test_output_with_unicode_line_separator_is_rejected() {
        let out = rewrite_experience(
            "- Built dashboards",
            &kws(&["sql"]),
            &FixedParaphraser("one\u{2028}two"),
            RewriteOptions::default(),
        )
        .await;
        assert_eq!(out, "- Built dashboards");
    }

    /// Serves a fixed Messages API reply on a local port and records request bodies.
    async fn spawn_messages_api(status: StatusCode, reply: Value) -> (String, Arc<Mutex<Vec<Value>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = seen.clone();
        let app = Router::new().route(
            "/v1/messages",
            post(move |Json(body): Json<Value>| {
                let recorder = recorder.clone();
                let reply = reply.clone();
                async move {
                    recorder.lock().unwrap().push(body);
                    (status, Json(reply))
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{addr}/v1/messages"), seen)
    }

    #[tokio::test]
    async fn test_llm_paraphraser_sends_hints_and_token_limit() {
        let reply = json!({
            "content": [{"type": "text", "text": "\"Built SQL dashboards in Python\""}],
            "usage": {"input_tokens": 42, "output_tokens": 7}
        });
        let (endpoint, seen) = spawn_messages_api(StatusCode::OK, reply).await;
        let paraphraser = LlmParaphraser::with_endpoint("test-key".to_string(), endpoint);
        assert!(!paraphraser.client.initialized());

        let options = RewriteOptions {
            timeout: Duration::from_secs(10),
            max_output_tokens: 77,
        };
        let out = rewrite_experience(
            "Experience\n- Built dashboards\n- Led reporting",
            &kws(&["sql", "python", "tableau", "excel"]),
            &paraphraser,
            options,
        )
        .await;

        assert_eq!(
            out,
            "Experience\n- Built SQL dashboards in Python\n- Built SQL dashboards in Python"
        );

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0]["model"], MODEL);
        assert_eq!(seen[0]["max_tokens"], 77);
        assert_eq!(seen[0]["system"], SINGLE_LINE_SYSTEM);
        let prompt = seen[0]["messages"][0]["content"].as_str().unwrap();
        assert!(prompt.contains("Built dashboards"));
        assert!(prompt.contains("sql, python, tableau"));
        assert!(!prompt.contains("excel"));
        assert!(seen[1]["messages"][0]["content"]
            .as_str()
            .unwrap()
            .contains("Led reporting"));
    }

    #[tokio::test]
    async fn test_llm_paraphraser_builds_client_once() {
        let (endpoint, _seen) = spawn_messages_api(StatusCode::OK, json!({})).await;
        let paraphraser = LlmParaphraser::with_endpoint("test-key".to_string(), endpoint);

        let first: *const LlmClient = paraphraser.client().await.unwrap();
        let second: *const LlmClient = paraphraser.client().await.unwrap();
        assert!(paraphraser.client.initialized());
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_llm_paraphraser_http_error_keeps_original_bullet() {
        let reply = json!({
            "type": "error",
            "error": {"type": "invalid_request_error", "message": "max_tokens too small"}
        });
        let (endpoint, seen) = spawn_messages_api(StatusCode::BAD_REQUEST, reply).await;
        let paraphraser = LlmParaphraser::with_endpoint("test-key".to_string(), endpoint);

        let request = ParaphraseRequest {
            text: "Built dashboards".to_string(),
            hints: kws(&["sql"]),
            max_output_tokens: 1,
            candidates: 1,
        };
        match paraphraser.paraphrase(&request).await {
            Err(ParaphraseError::Backend(message)) => {
                assert!(message.contains("400"), "{message}");
                assert!(message.contains("max_tokens too small"), "{message}");
            }
            other => panic!("expected a backend error, got {other:?}"),
        }

        let resume = "Experience\n- Built dashboards";
        let out = rewrite_experience(resume, &kws(&["sql"]), &paraphraser, RewriteOptions::default()).await;
        assert_eq!(out, resume);
        // Client errors are not retried: one call for the direct request, one for the bullet.
        assert_eq!(seen.lock().unwrap().len(), 2);
    }
}
