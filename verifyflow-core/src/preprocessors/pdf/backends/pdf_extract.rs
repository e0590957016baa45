//! pdf-extract backend
//!
//! Pure-Rust text extraction for digital PDFs with an embedded text layer.
//! Scanned documents come back as empty pages; there is no OCR.

use super::PdfBackend;
use crate::error::ExtractionError;
use std::panic::{catch_unwind, AssertUnwindSafe};

#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractBackend;

impl PdfExtractBackend {
    pub fn new() -> Self {
        Self
    }
}

impl PdfBackend for PdfExtractBackend {
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<String>, ExtractionError> {
        // pdf-extract panics on some malformed content streams
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(pdf_bytes)
        }));

        match outcome {
            Ok(Ok(pages)) => Ok(pages),
            Ok(Err(e)) => Err(ExtractionError::Pdf(e.to_string())),
            Err(_) => Err(ExtractionError::Pdf(
                "text extraction aborted on malformed content".to_string(),
            )),
        }
    }

    fn name(&self) -> &str {
        "pdf-extract"
    }
}
