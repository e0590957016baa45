// Rule catalogue. Each file holds one rule (or a family sharing helpers):
// - engine.rs: ValidationRule trait and the ordered RuleEngine
// - title.rs, dates.rs, date_format.rs: title page and date checks
// - fio.rs: person-name case and abbreviation checks
// - text_formatting.rs, formatting.rs, margins.rs: typography and layout
// - calendar_plan.rs, topic.rs, content_match.rs: structure cross-checks

pub mod calendar_plan;
pub mod content_match;
pub mod date_format;
pub mod dates;
pub mod engine;
pub mod fio;
pub mod formatting;
pub mod margins;
pub mod text_formatting;
pub mod title;
pub mod topic;

pub use engine::{RuleEngine, ValidationRule};
