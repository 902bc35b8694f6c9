//! Section Generator — templated summary and keyword-augmented skills line.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

static SKILL_TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w+\b").expect("valid regex"));

const CLOSING_SENTENCE: &str = "Passionate about delivering insights and driving business value.";

/// Fills the professional summary template.
///
/// Keywords 0..5 are named as areas of expertise and 5..8 as skills. Short
/// keyword lists just name fewer items.
pub fn generate_summary(keywords: &[String]) -> String {
    format!(
        "Experienced with proven ability in {}. Skilled in {}. {CLOSING_SENTENCE}",
        join_slice(keywords, 0, 5),
        join_slice(keywords, 5, 8),
    )
}

/// Appends every keyword missing (case-insensitively) from `existing_skills`,
/// comma-separated and in keyword order. Returns the input untouched when
/// nothing is added.
pub fn update_skills(existing_skills: &str, keywords: &[String]) -> String {
    let existing: HashSet<String> = SKILL_TOKEN_RE
        .find_iter(existing_skills)
        .map(|m| m.as_str().to_lowercase())
        .collect();

    let added: Vec<&str> = keywords
        .iter()
        .filter(|kw| !existing.contains(&kw.to_lowercase()))
        .map(String::as_str)
        .collect();

    if added.is_empty() {
        existing_skills.to_string()
    } else {
        format!("{existing_skills}, {}", added.join(", "))
    }
}

fn join_slice(keywords: &[String], start: usize, end: usize) -> String {
    let end = end.min(keywords.len());
    let start = start.min(end);
    keywords[start..end].join(", ")
}
