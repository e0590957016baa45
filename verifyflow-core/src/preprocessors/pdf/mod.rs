//! PDF Preprocessor
//!
//! Uses a pluggable backend to get per-page text, then rebuilds lines,
//! headings and tables from that text with layout-free heuristics.

pub mod backends;

use crate::error::ExtractionError;
use crate::preprocessors::traits::Preprocessor;
use crate::storage::calculate_document_hash;
use crate::types::*;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

pub use backends::PdfBackend;

#[cfg(feature = "pdf-extract-backend")]
pub use backends::PdfExtractBackend;

static HYPHEN_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-\n([А-Яа-яЁё])").unwrap());

static CELL_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\t| {3,}").unwrap());

const SECTION_KEYWORDS: [&str; 6] = [
    "ВВЕДЕНИЕ",
    "ЗАКЛЮЧЕНИЕ",
    "СОДЕРЖАНИЕ",
    "ОГЛАВЛЕНИЕ",
    "СПИСОК",
    "ПРИЛОЖЕНИ",
];

/// Backend enum for runtime backend selection
pub enum PdfBackendImpl {
    #[cfg(feature = "pdf-extract-backend")]
    PdfExtract(PdfExtractBackend),
    /// Caller-supplied backend (alternative engines, tests)
    Custom(Box<dyn PdfBackend>),
}

impl PdfBackend for PdfBackendImpl {
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<String>, ExtractionError> {
        match self {
            #[cfg(feature = "pdf-extract-backend")]
            PdfBackendImpl::PdfExtract(backend) => backend.extract_pages(pdf_bytes),
            PdfBackendImpl::Custom(backend) => backend.extract_pages(pdf_bytes),
        }
    }

    fn name(&self) -> &str {
        match self {
            #[cfg(feature = "pdf-extract-backend")]
            PdfBackendImpl::PdfExtract(backend) => backend.name(),
            PdfBackendImpl::Custom(backend) => backend.name(),
        }
    }
}

/// PDF Preprocessor with pluggable backend
///
/// Processes PDF documents through two stages:
/// 1. Backend extraction: PDF bytes → page texts
/// 2. Page heuristics: page texts → DocumentModel
pub struct PdfPreprocessor {
    backend: PdfBackendImpl,
}

impl PdfPreprocessor {
    /// Create PdfPreprocessor with the pdf-extract backend
    #[cfg(feature = "pdf-extract-backend")]
    pub fn new_with_pdf_extract() -> Self {
        Self {
            backend: PdfBackendImpl::PdfExtract(PdfExtractBackend::new()),
        }
    }

    /// Create PdfPreprocessor with any backend
    pub fn with_backend(backend: Box<dyn PdfBackend>) -> Self {
        Self {
            backend: PdfBackendImpl::Custom(backend),
        }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Build the model from already extracted page texts
    pub fn model_from_pages(pages: &[String], source_sha256: String) -> DocumentModel {
        let mut lines_out = Vec::new();
        let mut headings = Vec::new();
        let mut tables = Vec::new();

        for (page_index, raw) in pages.iter().enumerate() {
            let page_number = page_index as u32 + 1;
            let page_text = HYPHEN_BREAK.replace_all(raw, "$1");

            for line in page_text.lines().map(str::trim).filter(|l| !l.is_empty()) {
                if looks_like_heading(line) {
                    headings.push(Heading {
                        text: line.to_string(),
                        level: 1,
                        location: format!("page:{page_number}"),
                    });
                }
                lines_out.push(line.to_string());
            }

            // Column detection needs the untrimmed lines of the raw page
            let rows = table_rows(raw);
            if rows.len() >= 2 {
                tables.push(Table {
                    index: tables.len(),
                    page: Some(page_number),
                    rows,
                });
            }
        }

        let page_count = pages.len() as u32;
        DocumentModel {
            format: DocumentFormat::Pdf,
            text: lines_out.join("\n"),
            page_count,
            headings,
            tables,
            formatting: FormattingStats::default(),
            metadata: FormatMetadata::Pdf { page_count },
            source_sha256,
        }
    }
}

impl Preprocessor for PdfPreprocessor {
    fn extract(&self, bytes: &[u8]) -> Result<DocumentModel, ExtractionError> {
        if bytes.is_empty() {
            return Err(ExtractionError::EmptyInput);
        }

        let pages = self.backend.extract_pages(bytes)?;
        debug!("PDF backend '{}' returned {} pages", self.backend.name(), pages.len());

        Ok(Self::model_from_pages(&pages, calculate_document_hash(bytes)))
    }

    fn name(&self) -> &str {
        "pdf"
    }

    fn supports_format(&self, format: DocumentFormat) -> bool {
        format == DocumentFormat::Pdf
    }
}

/// Mostly-uppercase short line, or one starting with a section keyword
pub fn looks_like_heading(line: &str) -> bool {
    let line = line.trim();
    let length = line.chars().count();
    if !(3..=120).contains(&length) {
        return false;
    }

    let letters: Vec<char> = line.chars().filter(|c| is_heading_letter(*c)).collect();
    if letters.len() < 3 {
        return false;
    }

    let upper = letters.iter().filter(|c| c.is_uppercase()).count();
    if upper as f64 / letters.len() as f64 > 0.8 {
        return true;
    }

    let upper_line = line.to_uppercase();
    SECTION_KEYWORDS.iter().any(|k| upper_line.starts_with(k))
}

fn is_heading_letter(c: char) -> bool {
    c.is_ascii_alphabetic() || ('А'..='я').contains(&c) || c == 'Ё' || c == 'ё'
}

/// Lines split on tabs or runs of 3+ spaces, keeping those with at least two cells
fn table_rows(page_text: &str) -> Vec<Vec<String>> {
    page_text
        .lines()
        .filter(|line| CELL_SEPARATOR.is_match(line))
        .map(|line| {
            CELL_SEPARATOR
                .split(line)
                .map(str::trim)
                .filter(|cell| !cell.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .filter(|cells| cells.len() >= 2)
        .collect()
}
