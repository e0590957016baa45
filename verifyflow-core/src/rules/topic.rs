use super::engine::ValidationRule;
use crate::config::{Profile, TopicOptions};
use crate::heuristics::structure::{find_topic, normalize_topic, sections_match, DOCX_TITLE_ZONE_CHARS};
use crate::heuristics::text::{char_prefix, truncate_chars};
use crate::types::*;
use anyhow::Result;

const KEY: &str = "topic_match";

/// Title-page topic against the approved topic list
pub struct TopicMatchRule;

impl ValidationRule for TopicMatchRule {
    fn id(&self) -> &'static str {
        KEY
    }

    fn evaluate(&self, model: &DocumentModel, profile: &Profile) -> Result<Vec<Issue>> {
        let Some(config) = profile.rule(KEY) else {
            return Ok(Vec::new());
        };
        let severity = config.severity_or(Severity::Critical);
        let options: TopicOptions = config.options()?;

        let approved: Vec<String> = options
            .approved_topics
            .iter()
            .map(|t| normalize_topic(t))
            .filter(|t| !t.is_empty())
            .collect();
        if approved.is_empty() {
            return Ok(Vec::new());
        }

        let zone = char_prefix(&model.text, DOCX_TITLE_ZONE_CHARS);
        let Some(topic) = find_topic(zone) else {
            return Ok(vec![Issue::new(
                Severity::Warning,
                Category::Formal,
                "Topic.NotFound",
                "Не найдена тема работы в титульной зоне.",
            )
            .at("title_page")
            .with_hint("Проверь, что тема работы указана на титульном листе.")]);
        };

        let found = normalize_topic(&topic);
        if approved.iter().any(|a| sections_match(&found, a)) {
            return Ok(Vec::new());
        }

        Ok(vec![Issue::new(
            severity,
            Category::Formal,
            "Topic.Mismatch",
            format!(
                "Тема работы не соответствует утверждённому образцу. Найдено: '{}'",
                truncate_chars(&topic, 100)
            ),
        )
        .with_evidence(truncate_chars(&topic, 150))
        .at("title_page")
        .with_hint("Проверь формулировку темы работы и сверь с утверждённым вариантом.")])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::*;

    const APPROVED: &str = r#"approved_topics: ["Разработка информационной системы учёта заявок"]"#;

    fn run(text: &str, yaml: &str) -> Vec<Issue> {
        TopicMatchRule
            .evaluate(&docx_model(text), &profile_with(KEY, yaml))
            .unwrap()
    }

    #[test]
    fn matching_topic_passes_regardless_of_case_and_quotes() {
        let text = "ВКР на тему «РАЗРАБОТКА  информационной системы учёта заявок»\nРуководитель";
        assert!(run(text, APPROVED).is_empty());
    }

    #[test]
    fn different_topic_is_a_mismatch() {
        let issues = run("Тема: Анализ рынка ценных бумаг\nгород Москва", APPROVED);
        assert_eq!(rule_ids(&issues), vec!["Topic.Mismatch"]);
        assert_eq!(issues[0].evidence, "Анализ рынка ценных бумаг");
        assert_eq!(issues[0].severity, Severity::Critical);
    }

    #[test]
    fn missing_topic_is_a_warning() {
        let issues = run("Информационная система без маркера", APPROVED);
        assert_eq!(rule_ids(&issues), vec!["Topic.NotFound"]);
        assert_eq!(issues[0].severity, Severity::Warning);
        assert_eq!(issues[0].location, "title_page");
    }

    #[test]
    fn empty_approved_list_disables_check() {
        assert!(run("Тема: что угодно", "approved_topics: []").is_empty());
        assert!(run("Тема: что угодно", "{}").is_empty());
    }
}
