//! Report aggregation: merges rule findings with the public slice of the
//! document model.

use crate::heuristics::text::truncate_chars;
use crate::types::*;
use serde::{Deserialize, Serialize};

const SAMPLE_HEADINGS: usize = 10;
const SAMPLE_HEADING_CHARS: usize = 80;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub profile_name: String,
    pub format: DocumentFormat,
    pub page_count: u32,
    pub metadata: ReportMetadata,
    pub detected: DetectedMetadata,
    pub summary: Summary,
    pub issues: Vec<Issue>,
}

/// Document metadata safe to publish; run-level samples stay internal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paragraphs: Option<usize>,
    pub tables: usize,
    pub pages: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margins_mm: Option<PageMargins>,
    pub source_sha256: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedMetadata {
    pub formatting: DetectedFormatting,
    pub headings_found: usize,
    pub sample_headings: Vec<Heading>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedFormatting {
    pub most_common: FormattingStats,
}

impl Report {
    pub fn build(model: &DocumentModel, profile_name: &str, issues: Vec<Issue>) -> Self {
        let sample_headings = model
            .headings
            .iter()
            .take(SAMPLE_HEADINGS)
            .map(|h| Heading {
                text: truncate_chars(&h.text, SAMPLE_HEADING_CHARS),
                ..h.clone()
            })
            .collect();

        Self {
            profile_name: profile_name.to_string(),
            format: model.format,
            page_count: model.page_count,
            metadata: ReportMetadata {
                paragraphs: model.metadata.paragraph_count(),
                tables: model.tables.len(),
                pages: model.page_count,
                margins_mm: model.metadata.margins_mm().map(|m| m.rounded()),
                source_sha256: model.source_sha256.clone(),
            },
            detected: DetectedMetadata {
                formatting: DetectedFormatting {
                    most_common: model.formatting.clone(),
                },
                headings_found: model.headings.len(),
                sample_headings,
            },
            summary: Summary::from_issues(&issues),
            issues,
        }
    }

    pub fn has_critical(&self) -> bool {
        self.summary.critical > 0
    }

    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> DocumentModel {
        let headings = (0..12)
            .map(|i| Heading {
                text: format!("{i} {}", "Очень длинный заголовок ".repeat(5)),
                level: 1,
                location: format!("p:{i}"),
            })
            .collect();
        DocumentModel {
            format: DocumentFormat::Docx,
            text: "Текст".to_string(),
            page_count: 1,
            headings,
            tables: Vec::new(),
            formatting: FormattingStats {
                font_name: Some("Times New Roman".to_string()),
                font_size_pt: Some(14.0),
                line_spacing: Some(1.5),
            },
            metadata: FormatMetadata::Docx {
                paragraph_count: 40,
                margins_mm: Some(PageMargins::from_twips(1701, 850, 1134, 1134)),
                italic_runs: vec![RunSample {
                    paragraph_index: 0,
                    text: "in vitro".to_string(),
                }],
            },
            source_sha256: "abc".to_string(),
        }
    }

    #[test]
    fn builds_summary_and_public_metadata() {
        let issues = vec![
            Issue::new(Severity::Critical, Category::Formal, "A", "a"),
            Issue::new(Severity::Warning, Category::Formal, "B", "b"),
            Issue::new(Severity::Warning, Category::Logical, "C", "c"),
        ];
        let report = Report::build(&model(), "vkr_ru", issues);

        assert_eq!(report.summary.critical, 1);
        assert_eq!(report.summary.warning, 2);
        assert_eq!(report.summary.total, 3);
        assert!(report.has_critical());
        assert_eq!(report.metadata.paragraphs, Some(40));
        assert_eq!(
            report.metadata.margins_mm,
            Some(PageMargins { left: 30.0, right: 15.0, top: 20.0, bottom: 20.0 })
        );
        assert_eq!(report.detected.headings_found, 12);
    }

    #[test]
    fn heading_sample_is_truncated() {
        let report = Report::build(&model(), "vkr_ru", Vec::new());
        assert_eq!(report.detected.sample_headings.len(), 10);
        assert!(report
            .detected
            .sample_headings
            .iter()
            .all(|h| h.text.chars().count() <= 80));
        assert!(!report.has_critical());
    }

    #[test]
    fn run_samples_never_reach_json() {
        let json = Report::build(&model(), "vkr_ru", Vec::new()).to_json(false).unwrap();
        assert!(!json.contains("in vitro"));
        assert!(!json.contains("italic_runs"));
        assert!(json.contains("\"profile_name\":\"vkr_ru\""));
        assert!(json.contains("\"format\":\"docx\""));
    }
}
