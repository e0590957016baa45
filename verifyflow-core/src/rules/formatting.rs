use super::engine::ValidationRule;
use crate::config::{FormattingOptions, Profile};
use crate::heuristics::text::truncate_chars;
use crate::types::*;
use anyhow::Result;

const KEY: &str = "formatting_docx";
const SAMPLE_CHARS: usize = 40;

/// Italic runs are expected to carry Latin terms
pub struct ItalicFormattingRule;

impl ValidationRule for ItalicFormattingRule {
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
        let severity = config.severity_or(Severity::Info);
        let options: FormattingOptions = config.options()?;
        if !options.italic.warn_if_not_latin {
            return Ok(Vec::new());
        }

        let offenders: Vec<&RunSample> = model
            .metadata
            .italic_runs()
            .iter()
            .filter(|run| run.paragraph_index < options.max_paragraphs)
            .filter(|run| !run.text.trim().is_empty())
            .filter(|run| !run.text.chars().any(|c| c.is_ascii_alphabetic()))
            .collect();

        if offenders.is_empty() {
            return Ok(Vec::new());
        }

        let samples = offenders
            .iter()
            .take(options.max_samples)
            .map(|run| format!("p{}: '{}'", run.paragraph_index, truncate_chars(run.text.trim(), SAMPLE_CHARS)))
            .collect::<Vec<_>>()
            .join("; ");

        Ok(vec![Issue::new(
            severity,
            Category::Formal,
            "Font.ItalicNonLatin",
            format!(
                "Курсив обычно используют для латинских терминов (in vivo/in vitro и т.п.). Найдено курсивных фрагментов без латиницы: {}.",
                offenders.len()
            ),
        )
        .with_evidence(samples)
        .at("docx:runs")
        .with_hint("Проверь курсив: оставь его для латинских терминов и названий, остальной текст набери прямым шрифтом.")])
    }
}
