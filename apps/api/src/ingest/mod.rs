// Résumé ingestion: turns an uploaded file into plain text.
// Format is chosen by file extension only.

pub mod extract;

pub use extract::{extract_text, DocumentFormat, ExtractedText};
