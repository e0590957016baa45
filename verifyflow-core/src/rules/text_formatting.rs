use super::engine::ValidationRule;
use crate::config::{Profile, TextFormattingOptions};
use crate::types::*;
use anyhow::Result;

const KEY: &str = "text_formatting";
const SAMPLE_POSITIONS: usize = 5;

/// Invisible or non-standard spacing characters in the body text
pub struct TextFormattingRule;

impl ValidationRule for TextFormattingRule {
    fn id(&self) -> &'static str {
        KEY
    }

    fn evaluate(&self, model: &DocumentModel, profile: &Profile) -> Result<Vec<Issue>> {
        let Some(config) = profile.rule(KEY) else {
            return Ok(Vec::new());
        };
        let severity = config.severity_or(Severity::Warning);
        let options: TextFormattingOptions = config.options()?;

        // Character positions, not byte offsets
        let positions: Vec<usize> = model
            .text
            .chars()
            .enumerate()
            .filter(|(_, c)| is_nonstandard_char(*c))
            .map(|(position, _)| position)
            .take(options.max_positions)
            .collect();

        if positions.is_empty() {
            return Ok(Vec::new());
        }

        let sample = positions
            .iter()
            .take(SAMPLE_POSITIONS)
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(", ");

        Ok(vec![Issue::new(
            severity,
            Category::Formal,
            "TextFormatting.nonstandard_char",
            format!(
                "Найдено проблем форматирования типа 'Нестандартные символы': {}",
                positions.len()
            ),
        )
        .with_evidence(format!("Первые позиции: {sample}"))
        .with_hint("Исправь форматирование: замени неразрывные и специальные пробелы обычными, убери мягкие переносы.")])
    }
}

/// No-break space, soft hyphen, typographic spaces, zero-width and direction marks
fn is_nonstandard_char(c: char) -> bool {
    matches!(c, '\u{00A0}' | '\u{00AD}' | '\u{2000}'..='\u{200F}' | '\u{2028}'..='\u{202F}')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::*;

    #[test]
    fn reports_char_positions() {
        let text = "Тема\u{00A0}работы и\u{200B}текст\u{00AD}";
        let issues = TextFormattingRule
            .evaluate(&docx_model(text), &profile_with(KEY, "{}"))
            .unwrap();
        assert_eq!(rule_ids(&issues), vec!["TextFormatting.nonstandard_char"]);
        assert!(issues[0].message.ends_with(": 3"));
        assert_eq!(issues[0].evidence, "Первые позиции: 4, 13, 19");
    }

    #[test]
    fn count_is_capped() {
        let text = "\u{00A0}".repeat(80);
        let issues = TextFormattingRule
            .evaluate(&docx_model(&text), &profile_with(KEY, "{}"))
            .unwrap();
        assert!(issues[0].message.ends_with(": 50"));
        assert_eq!(issues[0].evidence, "Первые позиции: 0, 1, 2, 3, 4");
    }

    #[test]
    fn clean_text_and_regular_whitespace_pass() {
        let issues = TextFormattingRule
            .evaluate(&docx_model("Обычный текст\tс табуляцией\nи переводом строки"), &profile_with(KEY, "{}"))
            .unwrap();
        assert!(issues.is_empty());
        assert!(is_nonstandard_char('\u{202F}'));
        assert!(!is_nonstandard_char('\u{2030}'));
    }
}
