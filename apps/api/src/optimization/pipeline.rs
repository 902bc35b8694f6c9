//! Optimization pipeline — one pass from résumé text + JD to new sections and scores.
//!
//! Flow: extract_keywords → generate_summary / update_skills →
//!       (optional) rewrite_experience → score before/after → report.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::errors::AppError;
use crate::models::resume::{education_lines, ResumeSections};
use crate::optimization::keywords::extract_keywords;
use crate::optimization::rewriter::{rewrite_experience, Paraphraser, RewriteOptions};
use crate::optimization::scoring::{match_percentage, score_keywords, ScoreBand, ScoreResult};
use crate::optimization::sections::{generate_summary, update_skills};

/// Inputs for a single optimization run.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OptimizeInput {
    pub resume_text: String,
    pub jd_text: String,
    /// Skills line to extend. Falls back to the configured default.
    pub existing_skills: Option<String>,
    /// Ask for paraphrased experience bullets.
    pub rewrite: bool,
}

/// Before/after comparison plus everything needed to render the document.
#[derive(Debug, Clone, Serialize)]
pub struct OptimizationReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub keywords: Vec<String>,
    pub before: ScoreResult,
    pub after: ScoreResult,
    /// after.match_count / keywords.len() × 100; 0 when no keywords were found.
    pub percentage: f64,
    pub band: ScoreBand,
    pub rewrite_requested: bool,
    pub sections: ResumeSections,
}

/// Runs the full pipeline.
///
/// Blank job descriptions are rejected up front. An empty résumé is allowed and
/// simply scores zero before optimization.
pub async fn run_optimization(
    input: &OptimizeInput,
    config: &Config,
    paraphraser: Option<&dyn Paraphraser>,
) -> Result<OptimizationReport, AppError> {
    if input.jd_text.trim().is_empty() {
        return Err(AppError::Validation("jd_text cannot be empty".to_string()));
    }

    let run_id = Uuid::new_v4();

    // Step 1: Keywords
    let keywords = extract_keywords(&input.jd_text, config.top_n_keywords);
    info!("Run {run_id}: extracted {} keywords", keywords.len());
    if keywords.is_empty() {
        warn!("Run {run_id}: job description produced no keywords");
    }

    // Step 2: Generated sections
    let summary = generate_summary(&keywords);
    let existing_skills = input
        .existing_skills
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(config.default_skills.as_str());
    let skills = update_skills(existing_skills, &keywords);

    // Step 3: Experience, optionally paraphrased
    let (experience, experience_rewritten) = match (input.rewrite, paraphraser) {
        (true, Some(paraphraser)) => {
            let options = RewriteOptions {
                timeout: Duration::from_secs(config.paraphrase_timeout_secs),
                max_output_tokens: config.paraphrase_max_tokens,
            };
            let rewritten =
                rewrite_experience(&input.resume_text, &keywords, paraphraser, options).await;
            (rewritten, true)
        }
        (true, None) => {
            warn!("Run {run_id}: rewrite requested but no paraphraser is configured");
            (input.resume_text.clone(), false)
        }
        (false, _) => (input.resume_text.clone(), false),
    };

    let sections = ResumeSections {
        summary,
        skills,
        experience,
        education_lines: education_lines(&input.resume_text),
        experience_rewritten,
    };

    // Step 4: Scores
    let before = score_keywords(&input.resume_text, &keywords);
    let after = score_keywords(&sections.scoring_text(), &keywords);
    let percentage = match_percentage(&after, keywords.len());
    let band = ScoreBand::from_percentage(percentage);

    info!(
        "Run {run_id}: keyword matches {}/{} before, {}/{} after ({percentage:.1}%)",
        before.match_count,
        keywords.len(),
        after.match_count,
        keywords.len()
    );

    Ok(OptimizationReport {
        run_id,
        generated_at: Utc::now(),
        keywords,
        before,
        after,
        percentage,
        band,
        rewrite_requested: input.rewrite,
        sections,
    })
}
