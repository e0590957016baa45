//! Full-name (FIO) lookup after anchor phrases, role disambiguation, and the
//! per-name checks used by the FIO rules.

use super::nlp::{CaseClassifier, GrammaticalCase, PersonSpan, PersonTagger};
use super::text::window_after;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Text inspected after a supervisor anchor for a student-admission marker
pub const ROLE_CONFLICT_WINDOW: usize = 60;

const ADMISSION_MARKERS: [&str; 2] = ["допустить", "обучающ"];

/// Capitalized word, optionally hyphenated
const WORD: &str = r"\p{Lu}\p{Ll}+(?:-\p{Lu}\p{Ll}+)?";

static FALLBACK_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b(?:{w}\s+\p{{Lu}}\.\s*\p{{Lu}}\.|\p{{Lu}}\.\s*\p{{Lu}}\.\s*{w}|{w}\s+{w}(?:\s+{w})?)",
        w = WORD
    ))
    .unwrap()
});

static INITIALS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\p{Lu}\.\s*\p{Lu}\b").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameCandidate {
    pub name: String,
    /// Byte offset of the name in the document text
    pub offset: usize,
    /// Anchor phrase as configured
    pub anchor: String,
    /// Byte offset right after the anchor occurrence
    pub anchor_end: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleAssignment {
    pub student: Vec<NameCandidate>,
    pub supervisor: Vec<NameCandidate>,
}

/// Anchors and window sizes for both roles
#[derive(Debug, Clone)]
pub struct RoleAnchors<'a> {
    pub student: &'a [String],
    pub student_window: usize,
    pub supervisor: &'a [String],
    pub supervisor_window: usize,
}

/// First person mention in `window`: tagger first, capitalized-word pattern second
pub fn find_person(window: &str, tagger: &dyn PersonTagger) -> Option<PersonSpan> {
    tagger
        .find_person_spans(window)
        .into_iter()
        .next()
        .or_else(|| fallback_person_spans(window).into_iter().next())
}

pub fn fallback_person_spans(text: &str) -> Vec<PersonSpan> {
    FALLBACK_NAME
        .find_iter(text)
        .map(|m| PersonSpan {
            text: m.as_str().to_string(),
            offset: m.start(),
        })
        .collect()
}

/// One candidate per anchor occurrence, unique by name offset, in text order
pub fn find_candidates_after_anchors(
    text: &str,
    anchors: &[String],
    window_chars: usize,
    tagger: &dyn PersonTagger,
) -> Vec<NameCandidate> {
    let mut candidates = Vec::new();
    let mut seen = HashSet::new();

    for anchor in anchors {
        let Some(pattern) = anchor_pattern(anchor) else {
            continue;
        };
        for occurrence in pattern.find_iter(text) {
            let anchor_end = occurrence.end();
            let window = window_after(text, anchor_end, window_chars);
            if let Some(person) = find_person(window, tagger) {
                let offset = anchor_end + person.offset;
                if seen.insert(offset) {
                    candidates.push(NameCandidate {
                        name: person.text,
                        offset,
                        anchor: anchor.clone(),
                        anchor_end,
                    });
                }
            }
        }
    }

    candidates.sort_by_key(|c| c.offset);
    candidates
}

/// Split candidates between student and supervisor roles.
///
/// A supervisor anchor followed closely by an admission marker ("допустить",
/// "обучающегося") introduces the student, so that candidate moves over.
pub fn resolve_roles(text: &str, anchors: &RoleAnchors<'_>, tagger: &dyn PersonTagger) -> RoleAssignment {
    let mut student =
        find_candidates_after_anchors(text, anchors.student, anchors.student_window, tagger);
    let mut supervisor = Vec::new();

    let student_offsets: HashSet<usize> = student.iter().map(|c| c.offset).collect();
    for candidate in find_candidates_after_anchors(
        text,
        anchors.supervisor,
        anchors.supervisor_window,
        tagger,
    ) {
        if has_admission_marker_after(text, candidate.anchor_end) {
            if !student_offsets.contains(&candidate.offset) {
                student.push(candidate);
            }
        } else if !student_offsets.contains(&candidate.offset) {
            supervisor.push(candidate);
        }
    }

    student.sort_by_key(|c| c.offset);
    RoleAssignment {
        student,
        supervisor,
    }
}

pub fn has_admission_marker_after(text: &str, anchor_end: usize) -> bool {
    let tail = window_after(text, anchor_end, ROLE_CONFLICT_WINDOW).to_lowercase();
    ADMISSION_MARKERS.iter().any(|m| tail.contains(m))
}

/// Case of the first token the classifier recognizes
pub fn guess_case(name: &str, classifier: &dyn CaseClassifier) -> Option<GrammaticalCase> {
    name.split_whitespace()
        .map(|token| {
            token
                .chars()
                .filter(|c| c.is_alphabetic() || *c == '-')
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .find_map(|word| classifier.classify_case(&word))
}

/// Initials such as `А.Б.` / `А. Б.` or a standalone dotted initial
pub fn is_abbreviated(name: &str) -> bool {
    if INITIALS.is_match(name) {
        return true;
    }
    name.split_whitespace().any(|part| {
        let mut chars = part.chars();
        matches!(
            (chars.next(), chars.next(), chars.next()),
            (Some(first), Some('.'), None) if first.is_uppercase()
        )
    })
}

/// Whitespace and periods removed, uppercased
pub fn normalize_name_key(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && *c != '.')
        .flat_map(char::to_uppercase)
        .collect()
}

pub fn is_ignored(name: &str, ignored: &[String]) -> bool {
    let key = normalize_name_key(name);
    let last = last_token_letters(name);

    ignored.iter().any(|entry| {
        let entry_key = normalize_name_key(entry);
        if entry_key.is_empty() {
            return false;
        }
        if !key.is_empty()
            && (entry_key == key || key.contains(&entry_key) || entry_key.contains(&key))
        {
            return true;
        }
        let entry_last = last_token_letters(entry);
        !last.is_empty() && last == entry_last
    })
}

fn last_token_letters(name: &str) -> String {
    name.split_whitespace()
        .last()
        .unwrap_or("")
        .chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(char::to_uppercase)
        .collect()
}

fn anchor_pattern(anchor: &str) -> Option<Regex> {
    let anchor = anchor.trim();
    if anchor.is_empty() {
        return None;
    }
    Regex::new(&format!("(?i){}", regex::escape(anchor))).ok()
}
