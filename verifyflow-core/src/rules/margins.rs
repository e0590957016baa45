use super::engine::ValidationRule;
use crate::config::{MarginsOptions, Profile};
use crate::types::*;
use anyhow::Result;
use tracing::debug;

const KEY: &str = "margins_docx";

/// First-section page margins against the expected millimetre values
pub struct MarginsRule;

impl ValidationRule for MarginsRule {
    fn id(&self) -> &'static str {
        KEY
    }

    fn evaluate(&self, model: &DocumentModel, profile: &Profile) -> Result<Vec<Issue>> {
        let Some(config) = profile.rule(KEY) else {
            return Ok(Vec::new());
        };
        if !model.is_docx() {
            return Ok(Vec::new());
        }
        let Some(actual) = model.metadata.margins_mm() else {
            debug!("no section geometry in document, skipping margins");
            return Ok(Vec::new());
        };
        let severity = config.severity_or(Severity::Critical);
        let options: MarginsOptions = config.options()?;

        let issues = MarginSide::ALL
            .iter()
            .filter_map(|&side| {
                let expected = options.expected_mm.side(side)?;
                let value = actual.side(side);
                if (value - expected).abs() <= options.tolerance_mm {
                    return None;
                }
                Some(
                    Issue::new(
                        severity,
                        Category::Formal,
                        format!("Margins.{}", side.key()),
                        format!(
                            "Поле {}: {:.1} мм (ожидается {:.0} мм)",
                            side.label_ru(),
                            value,
                            expected
                        ),
                    )
                    .with_evidence(format!("{}={:.1}мм", side.key(), value))
                    .at("docx:section1")
                    .with_hint("Word → Разметка страницы → Поля → Настраиваемые поля."),
                )
            })
            .collect();

        Ok(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::*;

    const GOST: &str = "expected_mm: { left: 30, right: 15, top: 20, bottom: 20 }";

    fn model_with_margins(margins: Option<PageMargins>) -> DocumentModel {
        let mut model = docx_model("Текст");
        model.metadata = FormatMetadata::Docx {
            paragraph_count: 1,
            margins_mm: margins,
            italic_runs: Vec::new(),
        };
        model
    }

    fn margins(left: f64, right: f64, top: f64, bottom: f64) -> PageMargins {
        PageMargins { left, right, top, bottom }
    }

    #[test]
    fn margins_within_tolerance_pass() {
        let model = model_with_margins(Some(margins(30.9, 14.0, 20.0, 21.4)));
        let issues = MarginsRule.evaluate(&model, &profile_with(KEY, GOST)).unwrap();
        assert!(issues.is_empty());
    }

    #[test]
    fn each_side_out_of_tolerance_is_reported() {
        let model = model_with_margins(Some(margins(20.0, 15.0, 20.0, 25.4)));
        let issues = MarginsRule.evaluate(&model, &profile_with(KEY, GOST)).unwrap();
        assert_eq!(rule_ids(&issues), vec!["Margins.left", "Margins.bottom"]);
        assert_eq!(issues[0].message, "Поле левое: 20.0 мм (ожидается 30 мм)");
        assert_eq!(issues[1].evidence, "bottom=25.4мм");
        assert_eq!(issues[0].location, "docx:section1");
        assert_eq!(issues[0].severity, Severity::Critical);
    }

    #[test]
    fn twips_are_converted_before_comparison() {
        // 1701 twips ≈ 30.0 mm, 850 ≈ 15.0 mm, 1134 ≈ 20.0 mm
        let model = model_with_margins(Some(PageMargins::from_twips(1701, 850, 1134, 1134)));
        let issues = MarginsRule.evaluate(&model, &profile_with(KEY, GOST)).unwrap();
        assert!(issues.is_empty());
    }

    #[test]
    fn unset_sides_pdf_and_missing_geometry_are_skipped() {
        let model = model_with_margins(Some(margins(10.0, 10.0, 10.0, 10.0)));
        let issues = MarginsRule
            .evaluate(&model, &profile_with(KEY, "expected_mm: { left: 10 }"))
            .unwrap();
        assert!(issues.is_empty());

        let issues = MarginsRule
            .evaluate(&pdf_model("Текст"), &profile_with(KEY, GOST))
            .unwrap();
        assert!(issues.is_empty());

        let issues = MarginsRule
            .evaluate(&model_with_margins(None), &profile_with(KEY, GOST))
            .unwrap();
        assert!(issues.is_empty());
    }
}
