//! PDF Backend trait
//!
//! Defines the interface that all PDF text backends must implement.
//! Every backend yields plain text per page; layout heuristics run on top of it.

use crate::error::ExtractionError;

/// Backend trait for PDF text extraction
///
/// Backends must return one entry per page, in page order, with line breaks
/// preserved so the heading and table heuristics can work line by line.
pub trait PdfBackend: Send + Sync {
    /// Extract the text of each page
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<String>, ExtractionError>;

    /// Backend identifier for logging/debugging
    fn name(&self) -> &str;
}

#[cfg(feature = "pdf-extract-backend")]
pub mod pdf_extract;

#[cfg(feature = "pdf-extract-backend")]
pub use self::pdf_extract::PdfExtractBackend;
