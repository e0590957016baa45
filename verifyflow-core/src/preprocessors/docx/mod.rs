//! DOCX Preprocessor
//!
//! Opens the zip container, parses `word/document.xml` (and `word/styles.xml`
//! for style names), then folds the parsed body into a DocumentModel.

pub mod xml_parser;

use crate::error::ExtractionError;
use crate::preprocessors::traits::Preprocessor;
use crate::storage::calculate_document_hash;
use crate::types::*;
use regex::Regex;
use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::sync::LazyLock;
use tracing::debug;
use xml_parser::{parse_document_xml, parse_style_names, ParagraphData};

const DOCUMENT_PART: &str = "word/document.xml";
const STYLES_PART: &str = "word/styles.xml";

static LEVEL_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)").unwrap());

#[derive(Debug, Default, Clone, Copy)]
pub struct DocxPreprocessor;

impl DocxPreprocessor {
    pub fn new() -> Self {
        Self
    }

    fn read_part(
        archive: &mut zip::ZipArchive<Cursor<&[u8]>>,
        part: &str,
    ) -> Result<Option<String>, ExtractionError> {
        let mut file = match archive.by_name(part) {
            Ok(file) => file,
            Err(zip::result::ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| ExtractionError::Archive(format!("{part}: {e}")))?;
        Ok(Some(contents))
    }
}

impl Preprocessor for DocxPreprocessor {
    fn extract(&self, bytes: &[u8]) -> Result<DocumentModel, ExtractionError> {
        if bytes.is_empty() {
            return Err(ExtractionError::EmptyInput);
        }

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
        let document_xml = Self::read_part(&mut archive, DOCUMENT_PART)?
            .ok_or_else(|| ExtractionError::MissingPart(DOCUMENT_PART.to_string()))?;
        let style_names = match Self::read_part(&mut archive, STYLES_PART)? {
            Some(xml) => parse_style_names(&xml)?,
            None => HashMap::new(),
        };

        let body = parse_document_xml(&document_xml)?;
        debug!(
            "DOCX parsed: {} paragraphs, {} tables, {} styles",
            body.paragraphs.len(),
            body.tables.len(),
            style_names.len()
        );

        let mut parts = Vec::new();
        let mut headings = Vec::new();
        let mut italic_runs = Vec::new();
        let mut font_names = Vec::new();
        let mut font_sizes = Vec::new();
        let mut line_spacings = Vec::new();

        for (index, paragraph) in body.paragraphs.iter().enumerate() {
            let text = paragraph.text.trim();
            if !text.is_empty() {
                parts.push(text.to_string());
                if let Some(level) = heading_level(paragraph, &style_names) {
                    headings.push(Heading {
                        text: text.to_string(),
                        level,
                        location: format!("p:{index}"),
                    });
                }
            }

            if let Some(spacing) = paragraph.line_spacing {
                line_spacings.push(spacing);
            }

            for run in &paragraph.runs {
                if let Some(font) = &run.font_name {
                    font_names.push(font.clone());
                }
                if let Some(size) = run.size_pt {
                    font_sizes.push(size);
                }
                let run_text = run.text.trim();
                if run.italic && !text.is_empty() && !run_text.is_empty() {
                    italic_runs.push(RunSample {
                        paragraph_index: index,
                        text: run_text.to_string(),
                    });
                }
            }
        }

        let formatting = FormattingStats {
            font_name: most_common(&font_names, |f| f.clone()),
            font_size_pt: most_common(&font_sizes, |s| s.to_string()),
            line_spacing: most_common(&line_spacings, |s| s.to_string()),
        };

        let margins_mm = body
            .margins
            .map(|m| PageMargins::from_twips(m.left, m.right, m.top, m.bottom));

        Ok(DocumentModel {
            format: DocumentFormat::Docx,
            text: parts.join("\n"),
            // No layout engine: a DOCX is reported as a single page
            page_count: 1,
            headings,
            tables: body.tables,
            formatting,
            metadata: FormatMetadata::Docx {
                paragraph_count: body.paragraphs.len(),
                margins_mm,
                italic_runs,
            },
            source_sha256: calculate_document_hash(bytes),
        })
    }

    fn name(&self) -> &str {
        "docx"
    }

    fn supports_format(&self, format: DocumentFormat) -> bool {
        format == DocumentFormat::Docx
    }
}

/// Heading level from a "heading N" / "Заголовок N" style name, clamped to 1..=6
fn heading_level(paragraph: &ParagraphData, style_names: &HashMap<String, String>) -> Option<u8> {
    let style_id = paragraph.style_id.as_deref()?;
    let style = style_names
        .get(style_id)
        .map(String::as_str)
        .unwrap_or(style_id)
        .to_lowercase();
    if !(style.contains("heading") || style.contains("заголов")) {
        return None;
    }
    let level = LEVEL_DIGITS
        .captures(&style)
        .and_then(|c| c[1].parse::<u32>().ok())
        .unwrap_or(1);
    Some(level.clamp(1, 6) as u8)
}

/// Most frequent value; ties go to the value seen first
fn most_common<T: Clone>(values: &[T], key: impl Fn(&T) -> String) -> Option<T> {
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    for (position, value) in values.iter().enumerate() {
        counts.entry(key(value)).or_insert((0, position)).0 += 1;
    }
    counts
        .values()
        .max_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)))
        .map(|&(_, first)| values[first].clone())
}
