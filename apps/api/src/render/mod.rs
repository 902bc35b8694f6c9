// Document output: renders ResumeSections into a downloadable DOCX.

pub mod docx;
mod parts;

pub use docx::{build_document, DocumentError, DOCX_FILE_NAME, DOCX_MIME};
