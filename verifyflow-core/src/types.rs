use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

// ===== DOCUMENT MODEL =====
// Built once per submission by a preprocessor, then shared read-only by every rule.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Docx,
    Pdf,
}

impl DocumentFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::Docx => "docx",
            DocumentFormat::Pdf => "pdf",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "docx" => Ok(DocumentFormat::Docx),
            "pdf" => Ok(DocumentFormat::Pdf),
            other => Err(format!("unsupported document format: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentModel {
    pub format: DocumentFormat,
    /// Full extracted text, paragraphs (DOCX) or lines (PDF) joined by `\n`
    pub text: String,
    pub page_count: u32,
    /// Headings in document order
    pub headings: Vec<Heading>,
    pub tables: Vec<Table>,
    pub formatting: FormattingStats,
    pub metadata: FormatMetadata,
    /// SHA-256 of the submitted bytes
    pub source_sha256: String,
}

impl DocumentModel {
    pub fn is_docx(&self) -> bool {
        self.format == DocumentFormat::Docx
    }

    /// Headings at or above the given level (1 = top level)
    pub fn headings_up_to(&self, level: u8) -> impl Iterator<Item = &Heading> {
        self.headings.iter().filter(move |h| h.level <= level)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    pub text: String,
    /// 1..=6
    pub level: u8,
    /// `p:<paragraph index>` for DOCX, `page:<n>` for PDF
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub index: usize,
    /// 1-based page the table was found on (PDF only)
    pub page: Option<u32>,
    /// Non-empty rows only; rows may be ragged
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Column count is taken from the first row
    pub fn column_count(&self) -> usize {
        self.rows.first().map(|r| r.len()).unwrap_or(0)
    }

    pub fn row_text(&self, row: usize) -> String {
        self.rows
            .get(row)
            .map(|cells| cells.join(" "))
            .unwrap_or_default()
    }
}

/// Most common run-level formatting values (DOCX only)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormattingStats {
    pub font_name: Option<String>,
    pub font_size_pt: Option<f32>,
    pub line_spacing: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageMargins {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl PageMargins {
    /// Build from WordprocessingML page geometry units (1/1440 inch)
    pub fn from_twips(left: i64, right: i64, top: i64, bottom: i64) -> Self {
        Self {
            left: twips_to_mm(left),
            right: twips_to_mm(right),
            top: twips_to_mm(top),
            bottom: twips_to_mm(bottom),
        }
    }

    pub fn side(&self, side: MarginSide) -> f64 {
        match side {
            MarginSide::Left => self.left,
            MarginSide::Right => self.right,
            MarginSide::Top => self.top,
            MarginSide::Bottom => self.bottom,
        }
    }

    /// Rounded to 0.1 mm for display
    pub fn rounded(&self) -> Self {
        Self {
            left: round_tenth(self.left),
            right: round_tenth(self.right),
            top: round_tenth(self.top),
            bottom: round_tenth(self.bottom),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarginSide {
    Left,
    Right,
    Top,
    Bottom,
}

impl MarginSide {
    pub const ALL: [MarginSide; 4] = [
        MarginSide::Left,
        MarginSide::Right,
        MarginSide::Top,
        MarginSide::Bottom,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            MarginSide::Left => "left",
            MarginSide::Right => "right",
            MarginSide::Top => "top",
            MarginSide::Bottom => "bottom",
        }
    }

    pub fn label_ru(&self) -> &'static str {
        match self {
            MarginSide::Left => "левое",
            MarginSide::Right => "правое",
            MarginSide::Top => "верхнее",
            MarginSide::Bottom => "нижнее",
        }
    }
}

pub fn twips_to_mm(units: i64) -> f64 {
    units as f64 / 1440.0 * 25.4
}

pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// A run of text sampled for run-level style checks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSample {
    pub paragraph_index: usize,
    pub text: String,
}

/// Format-specific metadata. Run samples are internal and never reach the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FormatMetadata {
    Docx {
        paragraph_count: usize,
        margins_mm: Option<PageMargins>,
        italic_runs: Vec<RunSample>,
    },
    Pdf {
        page_count: u32,
    },
}

impl FormatMetadata {
    pub fn margins_mm(&self) -> Option<PageMargins> {
        match self {
            FormatMetadata::Docx { margins_mm, .. } => *margins_mm,
            FormatMetadata::Pdf { .. } => None,
        }
    }

    pub fn italic_runs(&self) -> &[RunSample] {
        match self {
            FormatMetadata::Docx { italic_runs, .. } => italic_runs,
            FormatMetadata::Pdf { .. } => &[],
        }
    }

    pub fn paragraph_count(&self) -> Option<usize> {
        match self {
            FormatMetadata::Docx {
                paragraph_count, ..
            } => Some(*paragraph_count),
            FormatMetadata::Pdf { .. } => None,
        }
    }
}

// ===== FINDINGS =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Formal,
    Logical,
    Syntactic,
    Structural,
}

pub const DEFAULT_LOCATION: &str = "document";
pub const NO_EVIDENCE: &str = "—";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub severity: Severity,
    pub category: Category,
    pub rule_id: String,
    pub message: String,
    pub evidence: String,
    pub location: String,
    pub remediation_hint: String,
}

impl Issue {
    pub fn new(
        severity: Severity,
        category: Category,
        rule_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            rule_id: rule_id.into(),
            message: message.into(),
            evidence: NO_EVIDENCE.to_string(),
            location: DEFAULT_LOCATION.to_string(),
            remediation_hint: String::new(),
        }
    }

    pub fn with_evidence(mut self, evidence: impl Into<String>) -> Self {
        let evidence = evidence.into();
        if !evidence.trim().is_empty() {
            self.evidence = evidence;
        }
        self
    }

    /// An empty location falls back to `document`
    pub fn at(mut self, location: impl Into<String>) -> Self {
        let location = location.into();
        self.location = if location.trim().is_empty() {
            DEFAULT_LOCATION.to_string()
        } else {
            location
        };
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.remediation_hint = hint.into();
        self
    }
}

/// Severity counts over a set of issues
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub critical: usize,
    pub warning: usize,
    pub info: usize,
    pub total: usize,
}

impl Summary {
    pub fn from_issues(issues: &[Issue]) -> Self {
        let mut counts: HashMap<Severity, usize> = HashMap::new();
        for issue in issues {
            *counts.entry(issue.severity).or_insert(0) += 1;
        }

        Self {
            critical: counts.get(&Severity::Critical).copied().unwrap_or(0),
            warning: counts.get(&Severity::Warning).copied().unwrap_or(0),
            info: counts.get(&Severity::Info).copied().unwrap_or(0),
            total: issues.len(),
        }
    }
}
