use anyhow::{Context, Result};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_TOP_N: usize = 15;
/// The skills line the optimizer starts from when a request supplies none.
const DEFAULT_SKILLS: &str = "SQL, Python, Power BI";
const DEFAULT_PARAPHRASE_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PARAPHRASE_MAX_TOKENS: u32 = 120;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Fails at startup if a numeric variable is present but malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Enables the paraphrase-backed experience rewriter when set.
    pub anthropic_api_key: Option<String>,
    pub top_n_keywords: usize,
    pub default_skills: String,
    pub paraphrase_timeout_secs: u64,
    pub paraphrase_max_tokens: u32,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: parse_env("PORT", DEFAULT_PORT)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            top_n_keywords: parse_env("TOP_N_KEYWORDS", DEFAULT_TOP_N)?,
            default_skills: std::env::var("DEFAULT_SKILLS")
                .unwrap_or_else(|_| DEFAULT_SKILLS.to_string()),
            paraphrase_timeout_secs: parse_env(
                "PARAPHRASE_TIMEOUT_SECS",
                DEFAULT_PARAPHRASE_TIMEOUT_SECS,
            )?,
            paraphrase_max_tokens: parse_env(
                "PARAPHRASE_MAX_TOKENS",
                DEFAULT_PARAPHRASE_MAX_TOKENS,
            )?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: DEFAULT_PORT,
            rust_log: "info".to_string(),
            anthropic_api_key: None,
            top_n_keywords: DEFAULT_TOP_N,
            default_skills: DEFAULT_SKILLS.to_string(),
            paraphrase_timeout_secs: DEFAULT_PARAPHRASE_TIMEOUT_SECS,
            paraphrase_max_tokens: DEFAULT_PARAPHRASE_MAX_TOKENS,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
