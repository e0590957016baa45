// VerifyFlow Core Library
//
// Checks thesis documents (DOCX/PDF) against profile-driven rules.
// Main interface: bytes + format + profile → Report of issues.

pub mod cache;
pub mod classifier;
pub mod config;
pub mod error;
pub mod heuristics;
pub mod preprocessors;
pub mod processor;
pub mod report;
pub mod rules;
pub mod storage;
pub mod types;

// Re-export main types and functions for easy use
pub use config::{Profile, RuleConfig, DEFAULT_PROFILE};
pub use error::{CheckError, ExtractionError, ProfileError};
pub use heuristics::{CaseClassifier, GrammaticalCase, NlpCapabilities, PersonTagger};
pub use preprocessors::{DocxPreprocessor, PdfPreprocessor, Preprocessor};
pub use processor::{CheckOptions, DocumentProcessor};
pub use report::Report;
pub use rules::{RuleEngine, ValidationRule};
pub use storage::{BuiltinProfileSource, DirectoryProfileSource, ProfileSource};
pub use types::*;

// Re-export backends for direct use
#[cfg(feature = "pdf-extract-backend")]
pub use preprocessors::PdfExtractBackend;
