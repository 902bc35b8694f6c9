use serde::{Deserialize, Serialize};

use crate::optimization::normalize::split_lines;

/// Replacement résumé content assembled for one optimization run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeSections {
    pub summary: String,
    pub skills: String,
    /// Original résumé text, or its bullet-rewritten form.
    pub experience: String,
    /// Original lines mentioning "education", case-insensitively, verbatim.
    pub education_lines: Vec<String>,
    /// True when `experience` went through the paraphrase rewriter.
    pub experience_rewritten: bool,
}

impl ResumeSections {
    /// Text the "after" score is computed against.
    pub fn scoring_text(&self) -> String {
        format!("{}\n{}\n{}", self.summary, self.skills, self.experience)
    }
}

/// Lines of `resume_text` containing "education" in any case.
pub fn education_lines(resume_text: &str) -> Vec<String> {
    split_lines(resume_text)
        .into_iter()
        .filter(|line| line.to_lowercase().contains("education"))
        .map(str::to_string)
        .collect()
}
