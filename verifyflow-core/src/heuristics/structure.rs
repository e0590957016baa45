//! Structure cross-referencing: table of contents, headings, title zone, topic.

use super::text::{char_prefix, collapse_whitespace, window_after};
use crate::types::{DocumentFormat, DocumentModel};
use regex::Regex;
use std::sync::LazyLock;

const TOC_MARKERS: [&str; 2] = ["содержание", "оглавление"];
const TOC_END_MARKERS: [&str; 4] = ["введение", "1.", "глава 1", "раздел 1"];
/// Characters after the TOC marker before an end marker may close the block
const TOC_MIN_SPAN: usize = 100;

/// DOCX title zone, in characters
pub const DOCX_TITLE_ZONE_CHARS: usize = 6000;
/// Characters per PDF page assumed for the title zone
pub const PDF_CHARS_PER_PAGE: usize = 5000;

const TOPIC_WINDOW: usize = 300;

static NUMBERED_ENTRY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+[\.\)]\s+").unwrap());
static LETTERED_ENTRY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[А-ЯЁ]\.\s+").unwrap());
static TRAILING_PAGE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+\d+\s*$").unwrap());

static TOPIC_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:на\s+тему|тема)\b").unwrap());
static TOPIC_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:на\s+тему|тема)[:\s]+(.+?)(?:\n|$|руководитель|год|город)").unwrap()
});

/// Leading slice of the text treated as the title page, with its location label
pub struct TitleZone<'a> {
    pub text: &'a str,
    pub location: String,
}

pub fn title_zone(model: &DocumentModel, pdf_pages: usize) -> TitleZone<'_> {
    match model.format {
        DocumentFormat::Docx => TitleZone {
            text: char_prefix(&model.text, DOCX_TITLE_ZONE_CHARS),
            location: "start of document".to_string(),
        },
        DocumentFormat::Pdf => {
            let pages = pdf_pages.max(1);
            TitleZone {
                text: char_prefix(&model.text, pages * PDF_CHARS_PER_PAGE),
                location: format!("pages:1..{pages}"),
            }
        }
    }
}

/// Section titles listed in the table of contents, numbering and page numbers stripped
pub fn extract_table_of_contents(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    // Lowercasing can shift byte offsets for a few scripts; bail out rather than mis-slice
    if lower.len() != text.len() {
        return extract_table_of_contents_by_lines(text);
    }

    let Some(start) = TOC_MARKERS.iter().find_map(|m| lower.find(m)) else {
        return Vec::new();
    };

    let search_from = super::text::forward_chars(text, start, TOC_MIN_SPAN);
    let end = TOC_END_MARKERS
        .iter()
        .filter_map(|m| lower[search_from..].find(m).map(|p| search_from + p))
        .min()
        .unwrap_or(text.len());

    toc_entries(&text[start..end])
}

fn extract_table_of_contents_by_lines(text: &str) -> Vec<String> {
    let lines: Vec<&str> = text.lines().collect();
    let Some(first) = lines
        .iter()
        .position(|l| TOC_MARKERS.iter().any(|m| l.to_lowercase().contains(m)))
    else {
        return Vec::new();
    };
    let block: Vec<&str> = lines[first..]
        .iter()
        .take_while(|l| !l.to_lowercase().trim().starts_with("введение"))
        .copied()
        .collect();
    toc_entries(&block.join("\n"))
}

fn toc_entries(block: &str) -> Vec<String> {
    block
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| {
            let lower = line.to_lowercase();
            !TOC_MARKERS.iter().any(|m| lower.contains(m))
        })
        .filter(|line| NUMBERED_ENTRY.is_match(line) || LETTERED_ENTRY.is_match(line))
        .filter_map(|line| {
            let cleaned = NUMBERED_ENTRY.replace(line, "");
            let cleaned = LETTERED_ENTRY.replace(&cleaned, "");
            let cleaned = TRAILING_PAGE.replace(&cleaned, "");
            let cleaned = cleaned.trim();
            (cleaned.chars().count() > 3).then(|| cleaned.to_string())
        })
        .collect()
}

/// Lowercased, whitespace-collapsed, leading numbering removed
pub fn normalize_section(title: &str) -> String {
    let collapsed = collapse_whitespace(&title.to_lowercase());
    let stripped = NUMBERED_ENTRY.replace(&collapsed, "");
    let stripped = LETTERED_ENTRY.replace(&stripped, "");
    stripped.trim().to_string()
}

/// Containment in either direction
pub fn sections_match(a: &str, b: &str) -> bool {
    a.contains(b) || b.contains(a)
}

/// Topic text following a `Тема:` / `на тему` marker
pub fn find_topic(title_text: &str) -> Option<String> {
    TOPIC_MARKER.find_iter(title_text).find_map(|marker| {
        let window = window_after(title_text, marker.start(), TOPIC_WINDOW);
        let caps = TOPIC_TEXT.captures(window)?;
        let topic = caps[1].trim();
        (!topic.is_empty()).then(|| topic.to_string())
    })
}

/// Lowercased, whitespace-collapsed, surrounding quotes dropped
pub fn normalize_topic(topic: &str) -> String {
    collapse_whitespace(&topic.to_lowercase())
        .trim_matches(|c: char| matches!(c, '«' | '»' | '"' | '“' | '”' | '.') || c.is_whitespace())
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOC_TEXT: &str = "Титульный лист\nСОДЕРЖАНИЕ\n1. Анализ предметной области 5\n2. Проектирование системы 12\n3) Реализация 20\nА. Листинги программы 40\n2.1 Подраздел\n\nВВЕДЕНИЕ\nТекст введения";

    #[test]
    fn extracts_numbered_toc_entries() {
        let entries = extract_table_of_contents(TOC_TEXT);
        assert_eq!(
            entries,
            vec![
                "Анализ предметной области",
                "Проектирование системы",
                "Реализация",
                "Листинги программы",
            ]
        );
    }

    #[test]
    fn no_toc_marker_means_no_entries() {
        assert!(extract_table_of_contents("1. Раздел один\n2. Раздел два").is_empty());
    }

    #[test]
    fn normalizes_sections_for_comparison() {
        assert_eq!(normalize_section("1.  Анализ   ПРЕДМЕТНОЙ области"), "анализ предметной области");
        assert!(sections_match("анализ", "анализ предметной области"));
    }

    #[test]
    fn finds_topic_after_marker() {
        let title = "Министерство науки\nТема: Разработка системы учёта заявок\nРуководитель: Сидоров П.П.";
        assert_eq!(find_topic(title).as_deref(), Some("Разработка системы учёта заявок"));
    }

    #[test]
    fn topic_marker_is_a_whole_word() {
        // "система" must not be mistaken for the marker
        assert_eq!(find_topic("Информационная система кафедры\n"), None);
        assert_eq!(
            find_topic("выполнена на тему «Анализ данных»\n").as_deref(),
            Some("«Анализ данных»")
        );
    }

    #[test]
    fn topic_normalization_drops_quotes() {
        assert_eq!(normalize_topic("«Анализ   Данных»"), "анализ данных");
    }
}
