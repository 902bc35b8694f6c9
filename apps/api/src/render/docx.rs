//! Document Assembler — writes `ResumeSections` as a minimal WordprocessingML package.
//!
//! Section order is fixed: Summary, Experience, Skills, Education.

use std::io::{Cursor, Write};

use chrono::{SecondsFormat, Utc};
use quick_xml::escape::escape;
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::models::resume::ResumeSections;
use crate::optimization::normalize::split_lines;
use crate::optimization::rewriter::is_bullet;
use crate::render::parts::{
    CONTENT_TYPES_XML, CORE_XML_TEMPLATE, DOCUMENT_FOOTER, DOCUMENT_HEADER, DOCUMENT_RELS_XML,
    NUMBERING_XML, PACKAGE_RELS_XML, STYLES_XML,
};

pub const DOCX_FILE_NAME: &str = "ATS_Optimized_Resume.docx";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to write DOCX archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("failed to write DOCX part: {0}")]
    Io(#[from] std::io::Error),
}

/// Paragraph styles used in the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParagraphStyle {
    Normal,
    Heading1,
    ListBullet,
}

/// Renders `sections` into DOCX bytes.
///
/// Experience lines become one paragraph each, trimmed. When the experience was
/// rewritten, bullet lines are emitted as list items with the marker removed.
pub fn build_document(sections: &ResumeSections) -> Result<Vec<u8>, DocumentError> {
    let document_xml = render_document_xml(sections);
    let core_xml = CORE_XML_TEMPLATE.replace(
        "{created}",
        &Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    );

    let parts: [(&str, &str); 7] = [
        ("[Content_Types].xml", CONTENT_TYPES_XML),
        ("_rels/.rels", PACKAGE_RELS_XML),
        ("docProps/core.xml", &core_xml),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS_XML),
        ("word/document.xml", &document_xml),
        ("word/styles.xml", STYLES_XML),
        ("word/numbering.xml", NUMBERING_XML),
    ];

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, body) in parts {
        writer.start_file(name, options)?;
        writer.write_all(body.as_bytes())?;
    }

    Ok(writer.finish()?.into_inner())
}

fn render_document_xml(sections: &ResumeSections) -> String {
    let mut body = String::from(DOCUMENT_HEADER);

    push_paragraph(&mut body, ParagraphStyle::Heading1, "Summary");
    push_paragraph(&mut body, ParagraphStyle::Normal, &sections.summary);

    push_paragraph(&mut body, ParagraphStyle::Heading1, "Experience");
    for line in split_lines(&sections.experience) {
        let line = line.trim();
        if sections.experience_rewritten && is_bullet(line) {
            let item = line.trim_start_matches(['-', '•']).trim_start();
            push_paragraph(&mut body, ParagraphStyle::ListBullet, item);
        } else {
            push_paragraph(&mut body, ParagraphStyle::Normal, line);
        }
    }

    push_paragraph(&mut body, ParagraphStyle::Heading1, "Skills");
    push_paragraph(&mut body, ParagraphStyle::Normal, &sections.skills);

    push_paragraph(&mut body, ParagraphStyle::Heading1, "Education");
    for line in &sections.education_lines {
        push_paragraph(&mut body, ParagraphStyle::Normal, line);
    }

    body.push_str(DOCUMENT_FOOTER);
    body
}

fn push_paragraph(out: &mut String, style: ParagraphStyle, text: &str) {
    out.push_str("<w:p>");
    match style {
        ParagraphStyle::Normal => {}
        ParagraphStyle::Heading1 => out.push_str(r#"<w:pPr><w:pStyle w:val="Heading1"/></w:pPr>"#),
        ParagraphStyle::ListBullet => {
            out.push_str(r#"<w:pPr><w:pStyle w:val="ListBullet"/></w:pPr>"#)
        }
    }
    if !text.is_empty() {
        out.push_str(r#"<w:r><w:t xml:space="preserve">"#);
        out.push_str(&escape(text));
        out.push_str("</w:t></w:r>");
    }
    out.push_str("</w:p>");
}
