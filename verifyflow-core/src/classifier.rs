use crate::error::ExtractionError;
use crate::types::DocumentFormat;
use std::path::Path;
use tracing::debug;

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const PDF_MAGIC: &[u8] = b"%PDF";

/// Decides which adapter handles a submission
#[derive(Debug, Default, Clone, Copy)]
pub struct FormatClassifier;

impl FormatClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Format from the file extension, cross-checked against the magic bytes
    pub fn classify(&self, file_name: &Path, bytes: &[u8]) -> Result<DocumentFormat, ExtractionError> {
        if bytes.is_empty() {
            return Err(ExtractionError::EmptyInput);
        }

        let extension = file_name
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        let declared: DocumentFormat = extension
            .parse()
            .map_err(|_| ExtractionError::UnsupportedFormat(file_name.display().to_string()))?;

        if let Some(sniffed) = Self::sniff(bytes) {
            if sniffed != declared {
                // The adapter will fail on its own; keep the declared format
                debug!(
                    "'{}' declared as {} but content looks like {}",
                    file_name.display(),
                    declared,
                    sniffed
                );
            }
        }
        Ok(declared)
    }

    /// Format suggested by the leading bytes, if recognizable
    pub fn sniff(bytes: &[u8]) -> Option<DocumentFormat> {
        if bytes.starts_with(ZIP_MAGIC) {
            Some(DocumentFormat::Docx)
        } else if bytes.starts_with(PDF_MAGIC) {
            Some(DocumentFormat::Pdf)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_decides_case_insensitively() {
        let classifier = FormatClassifier::new();
        assert_eq!(
            classifier.classify(Path::new("thesis.DOCX"), b"PK\x03\x04rest").unwrap(),
            DocumentFormat::Docx
        );
        assert_eq!(
            classifier.classify(Path::new("dir/thesis.pdf"), b"%PDF-1.7").unwrap(),
            DocumentFormat::Pdf
        );
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let classifier = FormatClassifier::new();
        assert!(matches!(
            classifier.classify(Path::new("thesis.doc"), b"data"),
            Err(ExtractionError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            classifier.classify(Path::new("noext"), b"data"),
            Err(ExtractionError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(
            FormatClassifier::new().classify(Path::new("a.pdf"), b""),
            Err(ExtractionError::EmptyInput)
        ));
    }

    #[test]
    fn sniffs_magic_bytes() {
        assert_eq!(FormatClassifier::sniff(b"%PDF-1.4"), Some(DocumentFormat::Pdf));
        assert_eq!(FormatClassifier::sniff(b"PK\x03\x04"), Some(DocumentFormat::Docx));
        assert_eq!(FormatClassifier::sniff(b"plain"), None);
    }
}
