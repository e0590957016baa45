//! Capability interfaces for named-entity tagging and morphology.
//!
//! Heavy NLP models live outside the core. They are constructed once by the
//! host, wrapped in [`NlpCapabilities`], and injected into the rule engine.
//! The built-in implementations keep the checker usable without any model.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GrammaticalCase {
    #[serde(rename = "nomn")]
    Nominative,
    #[serde(rename = "gent")]
    Genitive,
    #[serde(rename = "datv")]
    Dative,
    #[serde(rename = "accs")]
    Accusative,
    #[serde(rename = "ablt")]
    Instrumental,
    #[serde(rename = "loct")]
    Prepositional,
    #[serde(rename = "voct")]
    Vocative,
}

impl GrammaticalCase {
    pub fn code(&self) -> &'static str {
        match self {
            GrammaticalCase::Nominative => "nomn",
            GrammaticalCase::Genitive => "gent",
            GrammaticalCase::Dative => "datv",
            GrammaticalCase::Accusative => "accs",
            GrammaticalCase::Instrumental => "ablt",
            GrammaticalCase::Prepositional => "loct",
            GrammaticalCase::Vocative => "voct",
        }
    }

    pub fn name_ru(&self) -> &'static str {
        match self {
            GrammaticalCase::Nominative => "именительный",
            GrammaticalCase::Genitive => "родительный",
            GrammaticalCase::Dative => "дательный",
            GrammaticalCase::Accusative => "винительный",
            GrammaticalCase::Instrumental => "творительный",
            GrammaticalCase::Prepositional => "предложный",
            GrammaticalCase::Vocative => "звательный",
        }
    }

    pub fn all_except_nominative() -> Vec<GrammaticalCase> {
        vec![
            GrammaticalCase::Genitive,
            GrammaticalCase::Dative,
            GrammaticalCase::Accusative,
            GrammaticalCase::Instrumental,
            GrammaticalCase::Prepositional,
            GrammaticalCase::Vocative,
        ]
    }
}

impl fmt::Display for GrammaticalCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name_ru())
    }
}

/// A person mention with its byte offset in the tagged text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonSpan {
    pub text: String,
    pub offset: usize,
}

pub trait PersonTagger: Send + Sync {
    /// Person mentions in document order
    fn find_person_spans(&self, text: &str) -> Vec<PersonSpan>;

    fn name(&self) -> &str;
}

pub trait CaseClassifier: Send + Sync {
    /// Best-guess case of a single word form, `None` when unknown
    fn classify_case(&self, token: &str) -> Option<GrammaticalCase>;

    fn name(&self) -> &str;
}

/// Tagger that never finds anything, so name lookup falls back to patterns
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPersonTagger;

impl PersonTagger for NoopPersonTagger {
    fn find_person_spans(&self, _text: &str) -> Vec<PersonSpan> {
        Vec::new()
    }

    fn name(&self) -> &str {
        "noop"
    }
}

/// Ending-based case guesser for Russian surnames, given names and patronymics.
///
/// Endings are checked longest first. Ambiguous feminine forms (`-овой`,
/// `-ской`) resolve to genitive, the form that dominates title pages.
#[derive(Debug, Default, Clone, Copy)]
pub struct SuffixCaseClassifier;

const CASE_ENDINGS: &[(&str, GrammaticalCase)] = &[
    // patronymics
    ("овичем", GrammaticalCase::Instrumental),
    ("евичем", GrammaticalCase::Instrumental),
    ("ьичом", GrammaticalCase::Instrumental),
    ("овича", GrammaticalCase::Genitive),
    ("евича", GrammaticalCase::Genitive),
    ("ьича", GrammaticalCase::Genitive),
    ("овичу", GrammaticalCase::Dative),
    ("евичу", GrammaticalCase::Dative),
    ("ьичу", GrammaticalCase::Dative),
    ("овиче", GrammaticalCase::Prepositional),
    ("евиче", GrammaticalCase::Prepositional),
    ("ович", GrammaticalCase::Nominative),
    ("евич", GrammaticalCase::Nominative),
    ("ьич", GrammaticalCase::Nominative),
    ("овной", GrammaticalCase::Instrumental),
    ("евной", GrammaticalCase::Instrumental),
    ("ичной", GrammaticalCase::Instrumental),
    ("овны", GrammaticalCase::Genitive),
    ("евны", GrammaticalCase::Genitive),
    ("ичны", GrammaticalCase::Genitive),
    ("овне", GrammaticalCase::Dative),
    ("евне", GrammaticalCase::Dative),
    ("ичне", GrammaticalCase::Dative),
    ("овну", GrammaticalCase::Accusative),
    ("евну", GrammaticalCase::Accusative),
    ("ичну", GrammaticalCase::Accusative),
    ("овна", GrammaticalCase::Nominative),
    ("евна", GrammaticalCase::Nominative),
    ("ична", GrammaticalCase::Nominative),
    // adjectival surnames
    ("ского", GrammaticalCase::Genitive),
    ("цкого", GrammaticalCase::Genitive),
    ("скому", GrammaticalCase::Dative),
    ("цкому", GrammaticalCase::Dative),
    ("ским", GrammaticalCase::Instrumental),
    ("цким", GrammaticalCase::Instrumental),
    ("ском", GrammaticalCase::Prepositional),
    ("цком", GrammaticalCase::Prepositional),
    ("ский", GrammaticalCase::Nominative),
    ("цкий", GrammaticalCase::Nominative),
    ("ской", GrammaticalCase::Genitive),
    ("цкой", GrammaticalCase::Genitive),
    ("скую", GrammaticalCase::Accusative),
    ("цкую", GrammaticalCase::Accusative),
    ("ская", GrammaticalCase::Nominative),
    ("цкая", GrammaticalCase::Nominative),
    // possessive surnames
    ("овым", GrammaticalCase::Instrumental),
    ("евым", GrammaticalCase::Instrumental),
    ("ёвым", GrammaticalCase::Instrumental),
    ("иным", GrammaticalCase::Instrumental),
    ("ыным", GrammaticalCase::Instrumental),
    ("овой", GrammaticalCase::Genitive),
    ("евой", GrammaticalCase::Genitive),
    ("ёвой", GrammaticalCase::Genitive),
    ("иной", GrammaticalCase::Genitive),
    ("ыной", GrammaticalCase::Genitive),
    ("ову", GrammaticalCase::Dative),
    ("еву", GrammaticalCase::Dative),
    ("ёву", GrammaticalCase::Dative),
    ("ину", GrammaticalCase::Dative),
    ("ыну", GrammaticalCase::Dative),
    ("ове", GrammaticalCase::Prepositional),
    ("еве", GrammaticalCase::Prepositional),
    ("ёве", GrammaticalCase::Prepositional),
    ("ова", GrammaticalCase::Genitive),
    ("ева", GrammaticalCase::Genitive),
    ("ёва", GrammaticalCase::Genitive),
    ("ина", GrammaticalCase::Genitive),
    ("ына", GrammaticalCase::Genitive),
    ("ов", GrammaticalCase::Nominative),
    ("ев", GrammaticalCase::Nominative),
    ("ёв", GrammaticalCase::Nominative),
    ("ин", GrammaticalCase::Nominative),
    ("ын", GrammaticalCase::Nominative),
    // given names
    ("ием", GrammaticalCase::Instrumental),
    ("ией", GrammaticalCase::Instrumental),
    ("ию", GrammaticalCase::Dative),
    ("ия", GrammaticalCase::Genitive),
    ("ий", GrammaticalCase::Nominative),
    ("ем", GrammaticalCase::Instrumental),
    ("ом", GrammaticalCase::Instrumental),
    ("ой", GrammaticalCase::Instrumental),
    ("у", GrammaticalCase::Dative),
    ("ю", GrammaticalCase::Dative),
    ("а", GrammaticalCase::Genitive),
    ("я", GrammaticalCase::Genitive),
];

const CONSONANTS: &str = "бвгджзклмнпрстфхцчшщ";

impl CaseClassifier for SuffixCaseClassifier {
    fn classify_case(&self, token: &str) -> Option<GrammaticalCase> {
        let word = token.trim_matches('-').to_lowercase();
        let letters = word.chars().filter(|c| c.is_alphabetic()).count();
        if letters < 2 || !word.chars().all(is_cyrillic_or_hyphen) {
            return None;
        }

        // Hyphenated surnames decline on the last part
        let tail = word.rsplit('-').next().unwrap_or(&word);

        if let Some((_, case)) = CASE_ENDINGS.iter().find(|(ending, _)| {
            tail.ends_with(ending) && tail.chars().count() > ending.chars().count()
        }) {
            return Some(*case);
        }

        match tail.chars().last() {
            Some(c) if CONSONANTS.contains(c) => Some(GrammaticalCase::Nominative),
            _ => None,
        }
    }

    fn name(&self) -> &str {
        "suffix"
    }
}

fn is_cyrillic_or_hyphen(c: char) -> bool {
    c == '-' || ('а'..='я').contains(&c) || c == 'ё'
}

/// Injected NLP providers, shared across rules and threads
#[derive(Clone)]
pub struct NlpCapabilities {
    pub tagger: Arc<dyn PersonTagger>,
    pub morphology: Arc<dyn CaseClassifier>,
}

impl NlpCapabilities {
    pub fn new(tagger: Arc<dyn PersonTagger>, morphology: Arc<dyn CaseClassifier>) -> Self {
        Self { tagger, morphology }
    }
}

impl Default for NlpCapabilities {
    fn default() -> Self {
        Self::new(Arc::new(NoopPersonTagger), Arc::new(SuffixCaseClassifier))
    }
}

impl fmt::Debug for NlpCapabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NlpCapabilities")
            .field("tagger", &self.tagger.name())
            .field("morphology", &self.morphology.name())
            .finish()
    }
}
