//! Stateless text heuristics shared by the rules.
//!
//! Nothing here knows about profiles or issues; rules combine these helpers
//! with their own configuration.

pub mod dates;
pub mod names;
pub mod nlp;
pub mod structure;
pub mod text;

pub use dates::{DateMatch, DateShape, LooseDate};
pub use names::{NameCandidate, RoleAnchors, RoleAssignment};
pub use nlp::{
    CaseClassifier, GrammaticalCase, NlpCapabilities, NoopPersonTagger, PersonSpan, PersonTagger,
    SuffixCaseClassifier,
};
