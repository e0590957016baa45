use super::engine::ValidationRule;
use crate::config::Profile;
use crate::heuristics::structure::{extract_table_of_contents, normalize_section, sections_match};
use crate::types::*;
use anyhow::Result;

const KEY: &str = "content_match";
/// Headings deeper than this are not compared against the TOC
const MAX_HEADING_LEVEL: u8 = 2;
/// Leading entries compared position by position for the order check
const ORDER_PREFIX: usize = 3;

/// Table of contents against the document's actual headings
pub struct ContentMatchRule;

impl ValidationRule for ContentMatchRule {
    fn id(&self) -> &'static str {
        KEY
    }

    fn evaluate(&self, model: &DocumentModel, profile: &Profile) -> Result<Vec<Issue>> {
        let Some(config) = profile.rule(KEY) else {
            return Ok(Vec::new());
        };
        let severity = config.severity_or(Severity::Critical);

        let toc = extract_table_of_contents(&model.text);
        if toc.is_empty() {
            return Ok(Vec::new());
        }

        let actual: Vec<&str> = model
            .headings_up_to(MAX_HEADING_LEVEL)
            .map(|h| h.text.as_str())
            .collect();
        if actual.is_empty() {
            return Ok(vec![Issue::new(
                Severity::Warning,
                Category::Structural,
                "ContentMatch.NoHeadings",
                "Не найдены заголовки разделов в документе.",
            )
            .with_hint("Проверь, что разделы оформлены как заголовки (стили Heading в Word).")]);
        }

        let toc_norm: Vec<String> = toc.iter().map(|s| normalize_section(s)).collect();
        let actual_norm: Vec<String> = actual.iter().map(|s| normalize_section(s)).collect();
        let mut issues = Vec::new();

        let missing: Vec<&str> = toc_norm
            .iter()
            .filter(|entry| !actual_norm.iter().any(|a| sections_match(entry, a)))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            issues.push(
                Issue::new(
                    severity,
                    Category::Structural,
                    "ContentMatch.MissingSections",
                    format!(
                        "Разделы из оглавления отсутствуют в документе: {}",
                        missing.iter().take(5).copied().collect::<Vec<_>>().join(", ")
                    ),
                )
                .with_evidence(format!(
                    "Найдено в оглавлении: {}, найдено в документе: {}",
                    toc.len(),
                    actual.len()
                ))
                .with_hint(
                    "Проверь соответствие оглавления фактическому содержанию работы. Добавь отсутствующие разделы или исправь оглавление.",
                ),
            );
        }

        if toc_norm.len() >= 2 && actual_norm.len() >= 2 {
            let aligned = toc_norm
                .iter()
                .zip(&actual_norm)
                .take(ORDER_PREFIX)
                .filter(|(entry, heading)| sections_match(entry, heading))
                .count();
            if aligned == 0 {
                issues.push(
                    Issue::new(
                        Severity::Warning,
                        Category::Structural,
                        "ContentMatch.Order",
                        "Возможно нарушен порядок разделов: оглавление не соответствует фактическому порядку в документе.",
                    )
                    .with_evidence(format!(
                        "Первые разделы в оглавлении: {}",
                        toc_norm.iter().take(ORDER_PREFIX).cloned().collect::<Vec<_>>().join(", ")
                    ))
                    .at("table_of_contents")
                    .with_hint("Проверь порядок разделов в документе и обнови оглавление."),
                );
            }
        }

        Ok(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::*;

    const TEXT: &str = "СОДЕРЖАНИЕ\n1. Анализ предметной области 3\n2. Проектирование системы 10\n3. Реализация модулей 20\nВВЕДЕНИЕ\nТекст";

    fn model_with_headings(headings: &[(&str, u8)]) -> DocumentModel {
        let mut model = docx_model(TEXT);
        model.headings = headings
            .iter()
            .enumerate()
            .map(|(i, (text, level))| Heading {
                text: text.to_string(),
                level: *level,
                location: format!("p:{i}"),
            })
            .collect();
        model
    }

    fn run(model: &DocumentModel) -> Vec<Issue> {
        ContentMatchRule
            .evaluate(model, &profile_with(KEY, "{}"))
            .unwrap()
    }

    #[test]
    fn matching_structure_passes() {
        let model = model_with_headings(&[
            ("1 Анализ предметной области", 1),
            ("2. Проектирование системы", 1),
            ("2.1 Архитектура", 3),
            ("3. Реализация модулей", 2),
        ]);
        assert!(run(&model).is_empty());
    }

    #[test]
    fn missing_sections_are_listed() {
        let model = model_with_headings(&[
            ("Анализ предметной области", 1),
            ("Проектирование системы", 1),
        ]);
        let issues = run(&model);
        assert_eq!(rule_ids(&issues), vec!["ContentMatch.MissingSections"]);
        assert!(issues[0].message.ends_with("реализация модулей"));
        assert_eq!(issues[0].evidence, "Найдено в оглавлении: 3, найдено в документе: 2");
    }

    #[test]
    fn shuffled_headings_trigger_order_warning() {
        let model = model_with_headings(&[
            ("Реализация модулей", 1),
            ("Анализ предметной области", 1),
            ("Проектирование системы", 1),
        ]);
        let issues = run(&model);
        assert_eq!(rule_ids(&issues), vec!["ContentMatch.Order"]);
        assert_eq!(issues[0].location, "table_of_contents");
    }

    #[test]
    fn no_headings_and_no_toc() {
        let issues = run(&model_with_headings(&[("Глубокий", 3)]));
        assert_eq!(rule_ids(&issues), vec!["ContentMatch.NoHeadings"]);

        let issues = ContentMatchRule
            .evaluate(&docx_model("Просто текст"), &profile_with(KEY, "{}"))
            .unwrap();
        assert!(issues.is_empty());
    }
}
