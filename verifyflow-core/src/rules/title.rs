use super::engine::ValidationRule;
use crate::config::{Profile, TitleFieldsOptions};
use crate::heuristics::dates::{MAX_YEAR, MIN_YEAR};
use crate::heuristics::structure::title_zone;
use crate::types::*;
use anyhow::Result;
use regex::Regex;
use std::sync::LazyLock;

const KEY: &str = "title_page_fields";

static YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(\d{4})\b").unwrap());

/// Year and required markers on the title page
pub struct TitleFieldsRule;

impl ValidationRule for TitleFieldsRule {
    fn id(&self) -> &'static str {
        KEY
    }

    fn evaluate(&self, model: &DocumentModel, profile: &Profile) -> Result<Vec<Issue>> {
        let Some(config) = profile.rule(KEY) else {
            return Ok(Vec::new());
        };
        let severity = config.severity_or(Severity::Warning);
        let options: TitleFieldsOptions = config.options()?;

        let zone = title_zone(model, options.title_scope_pages);
        let mut issues = Vec::new();

        if !has_plausible_year(zone.text) {
            issues.push(
                Issue::new(
                    severity,
                    Category::Formal,
                    "Title.Year",
                    "На титульной части не найден год (например, 2026).",
                )
                .at(zone.location.clone())
                .with_hint("Проверь титульный лист: обычно внизу указывают город и год."),
            );
        }

        let lower = zone.text.to_lowercase();
        for field in &options.required {
            let key = if field.key.trim().is_empty() {
                "field"
            } else {
                field.key.as_str()
            };
            let hints: Vec<String> = if field.hints.is_empty() {
                vec![key.to_lowercase()]
            } else {
                field.hints.iter().map(|h| h.to_lowercase()).collect()
            };
            if hints.iter().any(|h| !h.is_empty() && lower.contains(h.as_str())) {
                continue;
            }

            let evidence = if field.hints.is_empty() {
                key.to_string()
            } else {
                hints.iter().take(4).cloned().collect::<Vec<_>>().join(", ")
            };
            issues.push(
                Issue::new(
                    severity,
                    Category::Formal,
                    "Title.RequiredField",
                    format!("В титульной зоне не найдено поле/маркер: {key}"),
                )
                .with_evidence(evidence)
                .at(zone.location.clone())
                .with_hint(
                    "Проверь титульный лист: должны быть ФИО, тема, руководитель, город и год (согласно методичке).",
                ),
            );
        }

        Ok(issues)
    }
}

fn has_plausible_year(text: &str) -> bool {
    YEAR.captures_iter(text).any(|caps| {
        caps[1]
            .parse::<i32>()
            .map(|year| (MIN_YEAR..=MAX_YEAR).contains(&year))
            .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::*;

    const CONFIG: &str = r#"
required:
  - { key: topic, hints: ["тема", "на тему"] }
  - { key: supervisor, hints: ["руководитель"] }
  - { key: city, hints: ["город", "москва", "казань"] }
"#;

    #[test]
    fn missing_year_is_reported_once() {
        let model = docx_model("Министерство науки\nТема: Разработка системы\nМосква");
        let issues = TitleFieldsRule
            .evaluate(&model, &profile_with(KEY, CONFIG))
            .unwrap();
        assert_eq!(rule_ids(&issues), vec!["Title.Year", "Title.RequiredField"]);
        assert_eq!(issues[0].location, "start of document");
        assert_eq!(issues[1].evidence, "руководитель");
    }

    #[test]
    fn field_without_hints_is_searched_by_key() {
        let profile = profile_with(KEY, "required: [{ key: кафедра }]");
        let issues = TitleFieldsRule.evaluate(&docx_model("2024"), &profile).unwrap();
        assert_eq!(issues[0].evidence, "кафедра");
        let issues = TitleFieldsRule
            .evaluate(&docx_model("Кафедра ИТ 2024"), &profile)
            .unwrap();
        assert!(issues.is_empty());
    }

    #[test]
    fn out_of_range_year_does_not_count() {
        let model = docx_model("Тема работы\nруководитель\nгород 3024");
        let issues = TitleFieldsRule
            .evaluate(&model, &profile_with(KEY, "{}"))
            .unwrap();
        assert_eq!(rule_ids(&issues), vec!["Title.Year"]);
    }

    #[test]
    fn complete_title_page_passes() {
        let model = docx_model("ВКР на тему «Система учёта»\nНаучный руководитель Сидоров П.П.\nгород Казань 2025");
        let issues = TitleFieldsRule
            .evaluate(&model, &profile_with(KEY, CONFIG))
            .unwrap();
        assert!(issues.is_empty(), "{issues:?}");
    }

    #[test]
    fn pdf_title_zone_is_page_scoped() {
        let mut text = "x".repeat(5000);
        text.push_str(" 2024");
        let model = pdf_model(&text);
        let issues = TitleFieldsRule
            .evaluate(&model, &profile_with(KEY, "title_scope_pages: 1"))
            .unwrap();
        assert_eq!(rule_ids(&issues), vec!["Title.Year"]);
        assert_eq!(issues[0].location, "pages:1..1");
    }

    #[test]
    fn hint_evidence_lists_first_four_hints() {
        let model = docx_model("2024");
        let profile = profile_with(KEY, r#"required: [{ key: student_fio, hints: ["а1", "б2", "в3", "г4", "д5"] }]"#);
        let issues = TitleFieldsRule.evaluate(&model, &profile).unwrap();
        assert_eq!(issues[0].evidence, "а1, б2, в3, г4");
    }

    #[test]
    fn absent_section_disables_rule() {
        let issues = TitleFieldsRule
            .evaluate(&docx_model(""), &Profile::empty("x"))
            .unwrap();
        assert!(issues.is_empty());
    }
}
