// Preprocessor abstraction for document extraction
//
// This module defines the boundary between format-specific extraction
// (bytes -> DocumentModel) and rule evaluation (DocumentModel -> issues).
// Everything after this point works with DocumentModel and is format-agnostic.

use crate::error::ExtractionError;
use crate::types::{DocumentFormat, DocumentModel};
use std::path::Path;

/// Preprocessor trait - converts a submitted document into a DocumentModel
///
/// Preprocessors handle:
/// - Container and markup parsing (DOCX zip + XML, PDF content streams)
/// - Text, heading and table extraction
/// - Format-specific metadata (margins, run styling, page count)
pub trait Preprocessor: Send + Sync {
    /// Extract the document model from raw bytes
    fn extract(&self, bytes: &[u8]) -> Result<DocumentModel, ExtractionError>;

    /// Convenience method: Process from file path
    fn extract_file(&self, input: &Path) -> Result<DocumentModel, ExtractionError> {
        let bytes = std::fs::read(input)?;
        self.extract(&bytes)
    }

    /// Get preprocessor name for debugging/logging
    fn name(&self) -> &str;

    /// Check if preprocessor handles the given format
    fn supports_format(&self, format: DocumentFormat) -> bool;
}
