use crate::config::Profile;
use crate::heuristics::NlpCapabilities;
use crate::types::*;
use anyhow::Result;
use rayon::prelude::*;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;
use tracing::{debug, warn};

use super::calendar_plan::CalendarPlanRule;
use super::content_match::ContentMatchRule;
use super::date_format::DateFormatStrictRule;
use super::dates::DatesRule;
use super::fio::{FioCasesRule, StudentFioRule, SupervisorFioRule};
use super::formatting::ItalicFormattingRule;
use super::margins::MarginsRule;
use super::text_formatting::TextFormattingRule;
use super::title::TitleFieldsRule;
use super::topic::TopicMatchRule;

/// One independent check over the document model.
///
/// A rule reads only its own profile section and returns no issues when that
/// section is absent or disabled.
pub trait ValidationRule: Send + Sync {
    /// Profile key of the rule's configuration section
    fn id(&self) -> &'static str;

    fn evaluate(&self, model: &DocumentModel, profile: &Profile) -> Result<Vec<Issue>>;
}

/// Fixed, ordered rule set
pub struct RuleEngine {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl RuleEngine {
    pub fn new(nlp: NlpCapabilities) -> Self {
        Self::with_rules(vec![
            Box::new(TitleFieldsRule),
            Box::new(DatesRule),
            Box::new(FioCasesRule::new(nlp.clone())),
            Box::new(StudentFioRule::new(nlp.clone())),
            Box::new(SupervisorFioRule::new(nlp)),
            Box::new(DateFormatStrictRule),
            Box::new(TextFormattingRule),
            Box::new(CalendarPlanRule),
            Box::new(TopicMatchRule),
            Box::new(ContentMatchRule),
            Box::new(MarginsRule),
            Box::new(ItalicFormattingRule),
        ])
    }

    pub fn with_rules(rules: Vec<Box<dyn ValidationRule>>) -> Self {
        Self { rules }
    }

    pub fn rule_ids(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.id()).collect()
    }

    /// Run every rule in order
    pub fn evaluate(&self, model: &DocumentModel, profile: &Profile) -> Vec<Issue> {
        self.rules
            .iter()
            .flat_map(|rule| run_guarded(rule.as_ref(), model, profile))
            .collect()
    }

    /// Run rules on the rayon pool; output order matches [`RuleEngine::evaluate`]
    pub fn evaluate_parallel(&self, model: &DocumentModel, profile: &Profile) -> Vec<Issue> {
        let per_rule: Vec<Vec<Issue>> = self
            .rules
            .par_iter()
            .map(|rule| run_guarded(rule.as_ref(), model, profile))
            .collect();
        per_rule.into_iter().flatten().collect()
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new(NlpCapabilities::default())
    }
}

/// A failing or panicking rule contributes no issues
fn run_guarded(rule: &dyn ValidationRule, model: &DocumentModel, profile: &Profile) -> Vec<Issue> {
    let start = Instant::now();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| rule.evaluate(model, profile)));

    match outcome {
        Ok(Ok(issues)) => {
            debug!(
                "Rule '{}': {} issues in {:.2}ms",
                rule.id(),
                issues.len(),
                start.elapsed().as_secs_f64() * 1000.0
            );
            issues
        }
        Ok(Err(err)) => {
            warn!("Rule '{}' failed, skipping its findings: {:#}", rule.id(), err);
            Vec::new()
        }
        Err(payload) => {
            warn!(
                "Rule '{}' panicked, skipping its findings: {}",
                rule.id(),
                panic_message(payload.as_ref())
            );
            Vec::new()
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    struct FixedRule(&'static str);

    impl ValidationRule for FixedRule {
        fn id(&self) -> &'static str {
            self.0
        }

        fn evaluate(&self, _model: &DocumentModel, _profile: &Profile) -> Result<Vec<Issue>> {
            Ok(vec![Issue::new(
                Severity::Info,
                Category::Formal,
                self.0,
                "fixed",
            )])
        }
    }

    struct FailingRule;

    impl ValidationRule for FailingRule {
        fn id(&self) -> &'static str {
            "failing"
        }

        fn evaluate(&self, _model: &DocumentModel, _profile: &Profile) -> Result<Vec<Issue>> {
            Err(anyhow!("broken options"))
        }
    }

    struct PanickingRule;

    impl ValidationRule for PanickingRule {
        fn id(&self) -> &'static str {
            "panicking"
        }

        fn evaluate(&self, _model: &DocumentModel, _profile: &Profile) -> Result<Vec<Issue>> {
            panic!("index out of range")
        }
    }

    fn model() -> DocumentModel {
        DocumentModel {
            format: DocumentFormat::Pdf,
            text: String::new(),
            page_count: 0,
            headings: Vec::new(),
            tables: Vec::new(),
            formatting: FormattingStats::default(),
            metadata: FormatMetadata::Pdf { page_count: 0 },
            source_sha256: String::new(),
        }
    }

    #[test]
    fn faults_degrade_to_no_findings() {
        let engine = RuleEngine::with_rules(vec![
            Box::new(FixedRule("a")),
            Box::new(FailingRule),
            Box::new(PanickingRule),
            Box::new(FixedRule("b")),
        ]);
        let issues = engine.evaluate(&model(), &Profile::empty("test"));
        let ids: Vec<&str> = issues.iter().map(|i| i.rule_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn parallel_keeps_rule_order() {
        const IDS: [&str; 8] = ["r0", "r1", "r2", "r3", "r4", "r5", "r6", "r7"];
        let engine = RuleEngine::with_rules(
            IDS.into_iter()
                .map(|id| Box::new(FixedRule(id)) as Box<dyn ValidationRule>)
                .collect(),
        );
        let profile = Profile::empty("test");
        assert_eq!(
            engine.evaluate(&model(), &profile),
            engine.evaluate_parallel(&model(), &profile)
        );
    }

    #[test]
    fn default_catalogue_order() {
        assert_eq!(
            RuleEngine::default().rule_ids(),
            vec![
                "title_page_fields",
                "dates",
                "fio_cases",
                "student_fio_detailed",
                "supervisor_fio_detailed",
                "date_format_strict",
                "text_formatting",
                "calendar_plan",
                "topic_match",
                "content_match",
                "margins_docx",
                "formatting_docx",
            ]
        );
    }

    #[test]
    fn empty_profile_yields_no_issues() {
        let issues = RuleEngine::default().evaluate(&model(), &Profile::empty("none"));
        assert!(issues.is_empty());
    }
}
