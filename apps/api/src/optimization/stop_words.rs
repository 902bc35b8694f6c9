//! English stop words excluded from keyword mining.
//!
//! The bundled list is the classic 318-word English list used by common
//! bag-of-words vectorizers. Callers that need another list build their own
//! `StopWords` and hand it to `extract_keywords_with`.

use std::collections::HashSet;

use once_cell::sync::Lazy;

const ENGLISH_STOP_WORDS: &str = include_str!("stop_words_en.txt");

static ENGLISH: Lazy<StopWords> = Lazy::new(|| StopWords::from_list(ENGLISH_STOP_WORDS));

/// A set of lowercase words to ignore during keyword extraction.
#[derive(Debug, Clone, Default)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    /// Builds a stop-word set from whitespace-separated words.
    pub fn from_list(list: &str) -> Self {
        Self {
            words: list.split_whitespace().map(str::to_lowercase).collect(),
        }
    }

    pub fn english() -> &'static StopWords {
        &ENGLISH
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }
}
