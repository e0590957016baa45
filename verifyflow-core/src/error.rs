//! Error taxonomy exposed at the library boundary.
//!
//! Extraction and profile failures are distinct variants so a caller can map
//! them to different statuses. Faults inside individual rules never surface
//! here; the rule engine turns them into zero findings.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("document is empty")]
    EmptyInput,

    #[error("not a valid DOCX container: {0}")]
    Archive(String),

    #[error("DOCX part missing: {0}")]
    MissingPart(String),

    #[error("malformed XML in {part}: {message}")]
    Xml { part: String, message: String },

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("failed to read document: {0}")]
    Io(#[from] std::io::Error),
}

impl From<zip::result::ZipError> for ExtractionError {
    fn from(err: zip::result::ZipError) -> Self {
        ExtractionError::Archive(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("profile not found: {0}")]
    NotFound(String),

    #[error("failed to parse profile {name}: {source}")]
    Parse {
        name: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to read profile {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Profile(#[from] ProfileError),
}

impl CheckError {
    pub fn is_extraction(&self) -> bool {
        matches!(self, CheckError::Extraction(_))
    }
}
