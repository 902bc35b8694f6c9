//! Match Scorer — whole-word keyword presence in normalized text.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::optimization::normalize::normalize;

/// Keywords from a keyword list that occur in a text, in keyword-list order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub match_count: usize,
    pub matched_keywords: Vec<String>,
}

impl ScoreResult {
    fn from_matches(matched_keywords: Vec<String>) -> Self {
        Self {
            match_count: matched_keywords.len(),
            matched_keywords,
        }
    }
}

/// Coarse rating of an after-optimization percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Strong,
    Moderate,
    Weak,
}

impl ScoreBand {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 80.0 {
            ScoreBand::Strong
        } else if percentage >= 50.0 {
            ScoreBand::Moderate
        } else {
            ScoreBand::Weak
        }
    }
}

/// Counts the keywords present as whole words in `text`.
///
/// Presence only: a keyword seen ten times scores the same as one seen once.
pub fn score_keywords(text: &str, keywords: &[String]) -> ScoreResult {
    let normalized = normalize(text);
    let words: HashSet<&str> = normalized.split_whitespace().collect();

    let matched = keywords
        .iter()
        .filter(|kw| words.contains(kw.to_lowercase().as_str()))
        .cloned()
        .collect();

    ScoreResult::from_matches(matched)
}

/// Share of `total_keywords` matched, in percent. An empty keyword list scores 0.
pub fn match_percentage(score: &ScoreResult, total_keywords: usize) -> f64 {
    if total_keywords == 0 {
        return 0.0;
    }
    score.match_count as f64 / total_keywords as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kws(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_matches_whole_words_only() {
        let score = score_keywords("Pythonic SQL-heavy work", &kws(&["python", "sqlheavy", "sql"]));
        assert_eq!(score.matched_keywords, kws(&["sqlheavy"]));
        assert_eq!(score.match_count, 1);
    }

    #[test]
    fn test_presence_not_frequency() {
        let score = score_keywords("sql sql sql sql", &kws(&["sql"]));
        assert_eq!(score.match_count, 1);
    }

    #[test]
    fn test_preserves_keyword_order() {
        let score = score_keywords(
            "Excel, Tableau and Python",
            &kws(&["python", "rust", "tableau", "excel"]),
        );
        assert_eq!(score.matched_keywords, kws(&["python", "tableau", "excel"]));
    }

    #[test]
    fn test_count_always_equals_matched_len() {
        let keywords = kws(&["data", "python", "k8s", "sql", "excel"]);
        for text in ["", "data", "Python 3 and K8s!", "SQL; EXCEL; data; python"] {
            let score = score_keywords(text, &keywords);
            assert_eq!(score.match_count, score.matched_keywords.len());
            let mut cursor = keywords.iter();
            for matched in &score.matched_keywords {
                assert!(cursor.any(|k| k == matched), "{matched} out of order");
            }
        }
    }

    #[test]
    fn test_empty_keywords_scores_zero_percent() {
        let score = score_keywords("anything", &[]);
        assert_eq!(score.match_count, 0);
        assert_eq!(match_percentage(&score, 0), 0.0);
    }

    #[test]
    fn test_percentage_and_band() {
        let score = score_keywords("sql python", &kws(&["sql", "python", "excel", "tableau"]));
        let pct = match_percentage(&score, 4);
        assert!((pct - 50.0).abs() < f64::EPSILON);
        assert_eq!(ScoreBand::from_percentage(pct), ScoreBand::Moderate);
        assert_eq!(ScoreBand::from_percentage(80.0), ScoreBand::Strong);
        assert_eq!(ScoreBand::from_percentage(49.9), ScoreBand::Weak);
    }
}
