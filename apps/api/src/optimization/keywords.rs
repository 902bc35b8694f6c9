//! Keyword Extractor — mines the most frequent content words from a job description.
//!
//! Tokens are alphabetic runs of three or more letters between word boundaries.
//! Digits disqualify a token entirely, which differs from the alphanumeric
//! normalization used for scoring. Both tokenizers are kept as they are: the
//! reported match counts depend on the difference.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::optimization::stop_words::StopWords;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[a-z]{3,}\b").expect("valid regex"));

/// A candidate keyword with its frequency and first-appearance rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordEntry {
    pub keyword: String,
    pub frequency: u32,
    /// Index of the keyword in the frequency table, i.e. order of first appearance.
    pub first_seen: usize,
}

/// Extracts up to `top_n` keywords using the bundled English stop-word list.
pub fn extract_keywords(jd_text: &str, top_n: usize) -> Vec<String> {
    extract_keywords_with(jd_text, top_n, StopWords::english())
}

/// Extracts up to `top_n` keywords, ordered by descending frequency and then
/// by first appearance.
pub fn extract_keywords_with(jd_text: &str, top_n: usize, stop_words: &StopWords) -> Vec<String> {
    rank_keywords(jd_text, stop_words)
        .into_iter()
        .take(top_n)
        .map(|entry| entry.keyword)
        .collect()
}

/// Builds the full ranked frequency table for `jd_text`.
///
/// Ordering key is `(-frequency, first_seen)`, applied explicitly so ties never
/// depend on map iteration order.
pub fn rank_keywords(jd_text: &str, stop_words: &StopWords) -> Vec<KeywordEntry> {
    let lowered = jd_text.to_lowercase();

    let mut table: Vec<KeywordEntry> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for token in WORD_RE.find_iter(&lowered).map(|m| m.as_str()) {
        if stop_words.contains(token) {
            continue;
        }
        match index.get(token) {
            Some(&pos) => table[pos].frequency += 1,
            None => {
                let pos = table.len();
                index.insert(token, pos);
                table.push(KeywordEntry {
                    keyword: token.to_string(),
                    frequency: 1,
                    first_seen: pos,
                });
            }
        }
    }

    table.sort_by(|a, b| {
        b.frequency
            .cmp(&a.frequency)
            .then(a.first_seen.cmp(&b.first_seen))
    });
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const ANALYST_JD: &str = r#"
        Senior Data Analyst
        You will build dashboards in Tableau and Power BI, write SQL against our warehouse,
        and automate reporting in Python. Strong SQL and Python skills required.
        Experience with stakeholder reporting and data storytelling preferred.
    "#;

    #[test]
    fn test_frequency_then_first_appearance() {
        let keywords = extract_keywords("Data analysis with SQL SQL SQL Python Python Excel", 3);
        assert_eq!(keywords, vec!["sql", "python", "data"]);
    }

    #[test]
    fn test_tie_break_is_not_alphabetical() {
        let keywords = extract_keywords("zebra mango apple", 3);
        assert_eq!(keywords, vec!["zebra", "mango", "apple"]);
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        assert!(extract_keywords("", 15).is_empty());
        assert!(extract_keywords("   \n\t ", 15).is_empty());
    }

    #[test]
    fn test_only_stop_words_yields_nothing() {
        assert!(extract_keywords("the and of", 15).is_empty());
        assert!(extract_keywords("The AND Of, whereas therefore", 15).is_empty());
    }

    #[test]
    fn test_short_and_numeric_tokens_are_discarded() {
        let keywords = extract_keywords("AI ML go3 python3 C++ R SQL 2024 k8s excel", 10);
        assert_eq!(keywords, vec!["sql", "excel"]);
    }

    #[test]
    fn test_mixed_case_counts_together() {
        let ranked = rank_keywords("Python python PYTHON rust", StopWords::english());
        assert_eq!(ranked[0].keyword, "python");
        assert_eq!(ranked[0].frequency, 3);
        assert_eq!(ranked[1].keyword, "rust");
    }

    #[test]
    fn test_never_exceeds_top_n_and_never_duplicates() {
        for n in [0, 1, 3, 5, 15, 100] {
            let keywords = extract_keywords(ANALYST_JD, n);
            assert!(keywords.len() <= n);
            let unique: HashSet<&String> = keywords.iter().collect();
            assert_eq!(unique.len(), keywords.len());
        }
    }

    #[test]
    fn test_analyst_jd_ranks_repeated_terms_first() {
        let keywords = extract_keywords(ANALYST_JD, 4);
        assert_eq!(keywords, vec!["data", "sql", "reporting", "python"]);
    }

    #[test]
    fn test_custom_stop_words_are_respected() {
        let stop = StopWords::from_list("data");
        let keywords = extract_keywords_with("data data sql", 5, &stop);
        assert_eq!(keywords, vec!["sql"]);
    }
}
