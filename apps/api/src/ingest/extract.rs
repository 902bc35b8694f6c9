//! Text extraction for uploaded résumés.
//!
//! `.docx` is read from its header, body and footer parts, one line per
//! paragraph or soft line break.
//! `.pdf` goes through pdf-extract. Any other extension yields empty text,
//! which downstream scoring reports as zero matches.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

const MAIN_DOCUMENT_PART: &str = "word/document.xml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    Docx,
    Pdf,
    Unsupported,
}

impl DocumentFormat {
    pub fn from_file_name(file_name: &str) -> Self {
        let extension = std::path::Path::new(file_name)
            .extension()
            .and_then(|v| v.to_str())
            .map(|v| v.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "docx" => DocumentFormat::Docx,
            "pdf" => DocumentFormat::Pdf,
            _ => DocumentFormat::Unsupported,
        }
    }
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid DOCX archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("invalid DOCX body: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("failed to read DOCX body: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to extract PDF text: {0}")]
    Pdf(String),
}

/// Plain text pulled from an upload, tagged with the format it came from.
#[derive(Debug, Clone)]
pub struct ExtractedText {
    pub format: DocumentFormat,
    pub text: String,
}

/// Extracts plain text from `data`, choosing the parser by `file_name`'s extension.
pub fn extract_text(file_name: &str, data: &[u8]) -> Result<ExtractedText, ExtractError> {
    let format = DocumentFormat::from_file_name(file_name);

    let text = match format {
        DocumentFormat::Docx => extract_docx_text(data)?,
        DocumentFormat::Pdf => {
            pdf_extract::extract_text_from_mem(data).map_err(|e| ExtractError::Pdf(e.to_string()))?
        }
        DocumentFormat::Unsupported => {
            warn!("Unsupported resume file type: {file_name}; continuing with empty text");
            String::new()
        }
    };

    debug!("Extracted {} chars from {file_name} ({format:?})", text.len());
    Ok(ExtractedText { format, text })
}

fn extract_docx_text(data: &[u8]) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data))?;

    let mut lines = Vec::new();
    for part in docx_text_parts(&archive) {
        let mut xml = String::new();
        archive.by_name(&part)?.read_to_string(&mut xml)?;
        lines.extend(extract_part_lines(&xml)?);
    }

    Ok(lines.join("\n"))
}

/// Parts carrying body text, in reading order: headers, document, footers.
fn docx_text_parts<R>(archive: &zip::ZipArchive<R>) -> Vec<String>
where
    R: Read + std::io::Seek,
{
    let numbered = |prefix: &str| {
        let mut parts: Vec<(u32, String)> = archive
            .file_names()
            .filter_map(|name| {
                let index = name.strip_prefix(prefix)?.strip_suffix(".xml")?;
                let index = if index.is_empty() { 0 } else { index.parse().ok()? };
                Some((index, name.to_string()))
            })
            .collect();
        parts.sort();
        parts.into_iter().map(|(_, name)| name)
    };

    let mut parts: Vec<String> = numbered("word/header").collect();
    parts.push(MAIN_DOCUMENT_PART.to_string());
    parts.extend(numbered("word/footer"));
    parts
}

/// Collects `w:t` runs paragraph by paragraph. Soft breaks start a new line;
/// deleted text and field instructions are skipped.
fn extract_part_lines(xml: &str) -> Result<Vec<String>, ExtractError> {
    let mut reader = Reader::from_str(xml);

    let mut buf = Vec::new();
    let mut current = String::new();
    let mut lines = Vec::new();
    let mut in_paragraph = false;
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"w:p" => {
                    in_paragraph = true;
                    current.clear();
                }
                b"w:t" => in_text = in_paragraph,
                _ => {}
            },
            Event::End(e) => match e.name().as_ref() {
                b"w:p" => {
                    push_lines(&mut lines, &current);
                    current.clear();
                    in_paragraph = false;
                    in_text = false;
                }
                b"w:t" => in_text = false,
                _ => {}
            },
            Event::Empty(e) if in_paragraph => match e.name().as_ref() {
                b"w:tab" => current.push('\t'),
                b"w:br" | b"w:cr" => current.push('\n'),
                _ => {}
            },
            Event::Text(e) if in_text => {
                current.push_str(&e.xml_content().map_err(quick_xml::Error::from)?);
            }
            Event::GeneralRef(e) if in_text => {
                let name = e.decode().map_err(quick_xml::Error::from)?;
                if let Some(ch) = e.resolve_char_ref().map_err(quick_xml::Error::from)? {
                    current.push(ch);
                } else if let Some(resolved) = quick_xml::escape::resolve_predefined_entity(&name) {
                    current.push_str(resolved);
                }
            }
            Event::Eof => break,
            _ => {}
        }

        buf.clear();
    }

    Ok(lines)
}

fn push_lines(lines: &mut Vec<String>, paragraph: &str) {
    lines.extend(
        paragraph
            .split('\n')
            .filter(|line| !line.trim().is_empty())
            .map(|line| line.trim_end().to_string()),
    );
}
