//! Document Preprocessors
//!
//! This module provides the extraction layer that turns a submitted document
//! into the unified DocumentModel every rule works with.
//!
//! ## Architecture
//!
//! ```text
//! Document bytes (DOCX, PDF)
//!     ↓
//! [Format-specific Preprocessor]
//!     ↓
//! DocumentModel (unified format)
//!     ↓
//! [Rule Engine]
//!     ↓
//! Issues → Report
//! ```
//!
//! ## Available Preprocessors
//!
//! - `DocxPreprocessor` - Word documents via zip + quick-xml
//! - `PdfPreprocessor` - PDF documents via a pluggable text backend

pub mod docx;
pub mod pdf;
pub mod traits;

// Re-export main types
pub use docx::DocxPreprocessor;
pub use pdf::{PdfBackend, PdfBackendImpl, PdfPreprocessor};
pub use traits::Preprocessor;

// Re-export backends
#[cfg(feature = "pdf-extract-backend")]
pub use pdf::PdfExtractBackend;
