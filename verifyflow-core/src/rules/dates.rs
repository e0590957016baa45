use super::engine::ValidationRule;
use crate::config::{DatesOptions, Profile};
use crate::heuristics::dates::{self, DateMatch};
use crate::heuristics::text::window_before;
use crate::types::*;
use anyhow::Result;
use regex::Regex;
use std::sync::LazyLock;

const KEY: &str = "dates";
const MAX_RANGE_PAIRS: usize = 5;
/// Characters before the first date searched for the start word
const LEAD_IN_CHARS: usize = 12;

static RANGE_START: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\b(?:с|от)\b").unwrap());
static RANGE_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\b(?:по|до)\b").unwrap());

/// Date presence, year spread and `с … по …` range ordering
pub struct DatesRule;

impl ValidationRule for DatesRule {
    fn id(&self) -> &'static str {
        KEY
    }

    fn evaluate(&self, model: &DocumentModel, profile: &Profile) -> Result<Vec<Issue>> {
        let Some(config) = profile.rule(KEY) else {
            return Ok(Vec::new());
        };
        let severity = config.severity_or(Severity::Warning);
        let options: DatesOptions = config.options()?;

        let found = dates::scan(&model.text);
        if found.is_empty() {
            return Ok(vec![Issue::new(
                severity,
                Category::Formal,
                "Dates.None",
                "В документе не найдено дат (форматы: '06.12.2024 г.' или '09 декабря 2024 г.').",
            )
            .with_hint(
                "Если документ служебный (задание/утверждение), добавь дату в требуемом формате с 'г.' после даты.",
            )]);
        }

        let mut issues = Vec::new();

        let min_year = found.iter().map(DateMatch::year).min().unwrap_or_default();
        let max_year = found.iter().map(DateMatch::year).max().unwrap_or_default();
        if max_year - min_year > options.max_year_spread {
            issues.push(
                Issue::new(
                    severity,
                    Category::Logical,
                    "Dates.Range",
                    format!("Подозрительно широкий разброс годов: {min_year}–{max_year}."),
                )
                .with_evidence(format!("{min_year}..{max_year}"))
                .with_hint(
                    "Проверь корректность дат: нет ли опечаток в годах (например, 2014 вместо 2024).",
                ),
            );
        }

        let start_hints = lowercase_all(&options.range_hints.start);
        let end_hints = lowercase_all(&options.range_hints.end);

        let ranges = found
            .windows(2)
            .filter(|pair| {
                let lead_in = window_before(&model.text, pair[0].offset, LEAD_IN_CHARS);
                let between = model
                    .text
                    .get(pair[0].end()..pair[1].offset)
                    .unwrap_or_default();
                is_range(lead_in, between, &start_hints, &end_hints)
            })
            .take(MAX_RANGE_PAIRS);

        for pair in ranges {
            let (first, second) = (&pair[0], &pair[1]);
            if first.date > second.date {
                issues.push(
                    Issue::new(
                        severity,
                        Category::Logical,
                        "Dates.Order",
                        "Нарушена последовательность дат в диапазоне (начало позже окончания).",
                    )
                    .with_evidence(format!("{} … {}", first.fragment, second.fragment))
                    .with_hint("Проверь, что дата начала меньше или равна дате окончания."),
                );
            }
        }

        Ok(issues)
    }
}

fn lowercase_all(words: &[String]) -> Vec<String> {
    words
        .iter()
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

/// A start word right before or after the first date, and an end word
/// between the two dates
fn is_range(lead_in: &str, between: &str, start_hints: &[String], end_hints: &[String]) -> bool {
    let has_start = mentions(lead_in, &RANGE_START, start_hints)
        || mentions(between, &RANGE_START, start_hints);
    has_start && mentions(between, &RANGE_END, end_hints)
}

fn mentions(text: &str, words: &Regex, hints: &[String]) -> bool {
    if words.is_match(text) {
        return true;
    }
    let lower = text.to_lowercase();
    hints.iter().any(|h| lower.contains(h.as_str()))
}
