//! Date recognition shared by every date-aware rule.
//!
//! Four shapes are recognized: worded (`9 декабря 2024 г.`), numeric
//! (`06.12.2024`, marker optional), and year-only (`2024 г.`). Numeric matches
//! are filtered against their surrounding text so that study-program codes
//! (`09.03.04`) and document numbers (`№ 33.02-05/334`) are not taken for dates.

use super::text::{window_after, window_around};
use chrono::{Datelike, NaiveDate};
use regex::{Captures, Regex};
use std::collections::HashSet;
use std::sync::LazyLock;

pub const MONTHS_GENITIVE: [&str; 12] = [
    "января",
    "февраля",
    "марта",
    "апреля",
    "мая",
    "июня",
    "июля",
    "августа",
    "сентября",
    "октября",
    "ноября",
    "декабря",
];

pub const MIN_YEAR: i32 = 1900;
pub const MAX_YEAR: i32 = 2100;

static WORDED_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(\d{{1,2}})\s+({})\s+(\d{{4}})\b(?P<marker>\s*г\.)?",
        MONTHS_GENITIVE.join("|")
    ))
    .unwrap()
});

static NUMERIC_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})\.(\d{1,2})\.(\d{4})\b(?P<marker>\s*г\.)?").unwrap()
});

static LOOSE_NUMERIC_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,4})\.(\d{1,3})\.(\d{2,4})\b(?P<marker>\s*г\.)?").unwrap()
});

static YEAR_ONLY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(\d{4})\s*г\.").unwrap());

static MARKER_AHEAD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+г\.").unwrap());

static CLASSIFICATION_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(направление|специальность|код|профиль).*?\d{2}\.\d{2}\.\d{2}").unwrap()
});

static DOCUMENT_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"№\s*\d+\.\d+[-/]\d+").unwrap());

static PROGRAM_VOCABULARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"программная|инженерия|направление|специальность|код|профиль").unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateShape {
    Worded,
    Numeric,
    YearOnly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateMatch {
    pub date: NaiveDate,
    /// Matched text, including a trailing `г.` marker when present
    pub fragment: String,
    /// Byte offset into the scanned text
    pub offset: usize,
    pub shape: DateShape,
}

impl DateMatch {
    pub fn end(&self) -> usize {
        self.offset + self.fragment.len()
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    /// `DD.MM.YYYY` with two-digit day and month. Worded and year-only dates
    /// have no numeric layout to check.
    pub fn is_canonical(&self) -> bool {
        match self.shape {
            DateShape::Numeric => {
                let mut parts = self.fragment.split('.');
                let day = parts.next().unwrap_or("");
                let month = parts.next().unwrap_or("");
                day.len() == 2 && month.len() == 2
            }
            DateShape::Worded | DateShape::YearOnly => true,
        }
    }
}

/// A `D.M.Y`-looking fragment from the loose scanner with its verdict
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LooseDate {
    pub fragment: String,
    pub offset: usize,
    /// `Some` when widths, ranges and the calendar all check out
    pub date: Option<NaiveDate>,
    pub two_digit_year: bool,
}

impl LooseDate {
    pub fn is_valid(&self) -> bool {
        self.date.is_some()
    }

    pub fn end(&self) -> usize {
        self.offset + self.fragment.len()
    }
}

/// All date matches in `text`, ordered by offset and unique by (offset, fragment)
pub fn scan(text: &str) -> Vec<DateMatch> {
    let mut found = scan_worded(text);
    found.extend(scan_numeric(text));

    // Spans of every fuller date-shaped fragment, accepted or not
    let spans: Vec<(usize, usize)> = WORDED_DATE
        .find_iter(text)
        .chain(LOOSE_NUMERIC_DATE.find_iter(text))
        .map(|m| (m.start(), m.end()))
        .collect();
    for caps in YEAR_ONLY.captures_iter(text) {
        let whole = match caps.get(0) {
            Some(m) => m,
            None => continue,
        };
        if spans
            .iter()
            .any(|&(s, e)| whole.start() < e && s < whole.end())
        {
            continue;
        }
        let year: i32 = match caps[1].parse() {
            Ok(y) => y,
            Err(_) => continue,
        };
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            continue;
        }
        if let Some(date) = NaiveDate::from_ymd_opt(year, 1, 1) {
            found.push(DateMatch {
                date,
                fragment: whole.as_str().to_string(),
                offset: whole.start(),
                shape: DateShape::YearOnly,
            });
        }
    }

    dedup_sorted(found)
}

/// Worded and numeric dates only
pub fn scan_full_dates(text: &str) -> Vec<DateMatch> {
    let mut found = scan_worded(text);
    found.extend(scan_numeric(text));
    dedup_sorted(found)
}

/// Every `D{1,4}.M{1,3}.Y{2,4}` fragment with a validity verdict
pub fn scan_loose_numeric(text: &str) -> Vec<LooseDate> {
    LOOSE_NUMERIC_DATE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let (day, month, year) = (&caps[1], &caps[2], &caps[3]);
            let date = if day.len() <= 2 && month.len() <= 2 && year.len() == 4 {
                validated_date(day, month, year)
            } else {
                None
            };
            Some(LooseDate {
                fragment: whole.as_str().to_string(),
                offset: whole.start(),
                date,
                two_digit_year: year.len() == 2,
            })
        })
        .collect()
}

/// True when the fragment contains anything date-shaped, valid or not
pub fn contains_date_shape(text: &str) -> bool {
    WORDED_DATE.is_match(text) || LOOSE_NUMERIC_DATE.is_match(text)
}

/// Context check for a numeric candidate spanning `start..end`
pub fn is_likely_not_date(text: &str, start: usize, end: usize) -> bool {
    if is_code_or_document_number(text, start, end) {
        return true;
    }
    !has_marker_ahead(text, end) && has_program_vocabulary_ahead(text, end)
}

fn scan_worded(text: &str) -> Vec<DateMatch> {
    WORDED_DATE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let month_name = caps[2].to_lowercase();
            let month = MONTHS_GENITIVE.iter().position(|m| *m == month_name)? as u32 + 1;
            let date = validated_date(&caps[1], &month.to_string(), &caps[3])?;
            Some(DateMatch {
                date,
                fragment: whole.as_str().to_string(),
                offset: whole.start(),
                shape: DateShape::Worded,
            })
        })
        .collect()
}

fn scan_numeric(text: &str) -> Vec<DateMatch> {
    NUMERIC_DATE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let digits_end = caps.get(3)?.end();

            if is_code_or_document_number(text, whole.start(), digits_end) {
                return None;
            }

            let has_marker = caps.name("marker").is_some() || has_marker_ahead(text, digits_end);
            // Program vocabulary ahead rejects a bare date whatever keywords surround it
            if !has_marker && has_program_vocabulary_ahead(text, digits_end) {
                return None;
            }

            Some(DateMatch {
                date: numeric_date(&caps)?,
                fragment: whole.as_str().to_string(),
                offset: whole.start(),
                shape: DateShape::Numeric,
            })
        })
        .collect()
}

fn numeric_date(caps: &Captures<'_>) -> Option<NaiveDate> {
    validated_date(&caps[1], &caps[2], &caps[3])
}

fn validated_date(day: &str, month: &str, year: &str) -> Option<NaiveDate> {
    let day: u32 = day.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    let year: i32 = year.parse().ok()?;
    if !(1..=31).contains(&day) || !(1..=12).contains(&month) {
        return None;
    }
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

fn is_code_or_document_number(text: &str, start: usize, end: usize) -> bool {
    let context = window_around(text, start, end, 50, 50).to_lowercase();
    CLASSIFICATION_CODE.is_match(&context) || DOCUMENT_NUMBER.is_match(&context)
}

fn has_marker_ahead(text: &str, end: usize) -> bool {
    MARKER_AHEAD.is_match(window_after(text, end, 10))
}

fn has_program_vocabulary_ahead(text: &str, end: usize) -> bool {
    PROGRAM_VOCABULARY.is_match(&window_after(text, end, 100).to_lowercase())
}

fn dedup_sorted(mut found: Vec<DateMatch>) -> Vec<DateMatch> {
    found.sort_by_key(|m| m.offset);
    let mut seen = HashSet::new();
    found.retain(|m| seen.insert((m.offset, m.fragment.clone())));
    found
}
