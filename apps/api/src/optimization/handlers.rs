//! Axum route handlers for the Optimization API.

use axum::{
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::ingest::{extract_text, DocumentFormat, ExtractedText};
use crate::optimization::keywords::{extract_keywords, rank_keywords, KeywordEntry};
use crate::optimization::pipeline::{run_optimization, OptimizationReport, OptimizeInput};
use crate::optimization::scoring::{match_percentage, score_keywords, ScoreBand, ScoreResult};
use crate::optimization::stop_words::StopWords;
use crate::render::{build_document, DOCX_FILE_NAME, DOCX_MIME};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct KeywordsRequest {
    pub jd_text: String,
    pub top_n: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct KeywordsResponse {
    pub keywords: Vec<String>,
    pub ranked: Vec<KeywordEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub text: String,
    pub jd_text: String,
    pub top_n: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    pub keywords: Vec<String>,
    pub score: ScoreResult,
    pub percentage: f64,
    pub band: ScoreBand,
}

#[derive(Debug, Serialize)]
pub struct OptimizeResponse {
    pub resume_format: DocumentFormat,
    #[serde(flatten)]
    pub report: OptimizationReport,
}

/// Fields collected from an optimize upload.
#[derive(Debug, Default)]
struct OptimizeForm {
    resume: Option<(String, Bytes)>,
    jd_text: String,
    existing_skills: Option<String>,
    rewrite: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/keywords
///
/// Returns the top keywords of a job description with their frequencies.
pub async fn handle_keywords(
    State(state): State<AppState>,
    Json(request): Json<KeywordsRequest>,
) -> Result<Json<KeywordsResponse>, AppError> {
    require_jd(&request.jd_text)?;
    let top_n = request.top_n.unwrap_or(state.config.top_n_keywords);

    let ranked: Vec<KeywordEntry> = rank_keywords(&request.jd_text, StopWords::english())
        .into_iter()
        .take(top_n)
        .collect();
    let keywords = ranked.iter().map(|e| e.keyword.clone()).collect();

    Ok(Json(KeywordsResponse { keywords, ranked }))
}

/// POST /api/v1/score
///
/// Scores arbitrary text against the keywords of a job description.
pub async fn handle_score(
    State(state): State<AppState>,
    Json(request): Json<ScoreRequest>,
) -> Result<Json<ScoreResponse>, AppError> {
    require_jd(&request.jd_text)?;
    let top_n = request.top_n.unwrap_or(state.config.top_n_keywords);

    let keywords = extract_keywords(&request.jd_text, top_n);
    let score = score_keywords(&request.text, &keywords);
    let percentage = match_percentage(&score, keywords.len());

    Ok(Json(ScoreResponse {
        band: ScoreBand::from_percentage(percentage),
        keywords,
        score,
        percentage,
    }))
}

/// POST /api/v1/optimize
///
/// Multipart upload (`resume`, `jd_text`, optional `existing_skills`, `rewrite`).
/// Returns the before/after report and generated sections.
pub async fn handle_optimize(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<OptimizeResponse>, AppError> {
    let (resume_format, report) = optimize_upload(&state, multipart).await?;
    Ok(Json(OptimizeResponse {
        resume_format,
        report,
    }))
}

/// POST /api/v1/optimize/download
///
/// Same input as `/optimize`; responds with the generated DOCX as an attachment.
pub async fn handle_optimize_download(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let (_, report) = optimize_upload(&state, multipart).await?;
    let run_id = report.run_id;
    let sections = report.sections;

    let docx = tokio::task::spawn_blocking(move || build_document(&sections))
        .await
        .map_err(|e| AppError::Internal(e.into()))??;
    info!("Run {run_id}: rendered {} byte document", docx.len());

    let headers = [
        (header::CONTENT_TYPE, DOCX_MIME.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{DOCX_FILE_NAME}\""),
        ),
    ];
    Ok((headers, docx).into_response())
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn require_jd(jd_text: &str) -> Result<(), AppError> {
    if jd_text.trim().is_empty() {
        return Err(AppError::Validation("jd_text cannot be empty".to_string()));
    }
    Ok(())
}

async fn optimize_upload(
    state: &AppState,
    multipart: Multipart,
) -> Result<(DocumentFormat, OptimizationReport), AppError> {
    let form = read_optimize_form(multipart).await?;

    let (file_name, data) = form
        .resume
        .filter(|(_, data)| !data.is_empty())
        .ok_or_else(|| AppError::Validation("a resume file is required".to_string()))?;
    require_jd(&form.jd_text)?;

    let extracted = extract_in_background(file_name, data).await?;

    let input = OptimizeInput {
        resume_text: extracted.text,
        jd_text: form.jd_text,
        existing_skills: form.existing_skills,
        rewrite: form.rewrite,
    };
    let report = run_optimization(&input, &state.config, state.paraphraser.as_deref()).await?;

    Ok((extracted.format, report))
}

async fn extract_in_background(file_name: String, data: Bytes) -> Result<ExtractedText, AppError> {
    tokio::task::spawn_blocking(move || extract_text(&file_name, &data))
        .await
        .map_err(|e| AppError::Internal(e.into()))?
        .map_err(|e| AppError::Validation(format!("Could not read resume: {e}")))
}

async fn read_optimize_form(mut multipart: Multipart) -> Result<OptimizeForm, AppError> {
    let mut form = OptimizeForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "resume" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await?;
                form.resume = Some((file_name, data));
            }
            "jd_text" => form.jd_text = field.text().await?,
            "existing_skills" => form.existing_skills = Some(field.text().await?),
            "rewrite" => form.rewrite = parse_flag(&field.text().await?),
            _ => {}
        }
    }

    Ok(form)
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}
