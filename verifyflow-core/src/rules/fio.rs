use super::engine::ValidationRule;
use crate::config::{FioContextsOptions, Profile, StudentFioOptions, SupervisorFioOptions};
use crate::heuristics::names::{self, NameCandidate, RoleAnchors, RoleAssignment};
use crate::heuristics::text::{char_prefix, window_after};
use crate::heuristics::{GrammaticalCase, NlpCapabilities};
use crate::types::*;
use anyhow::Result;
use regex::Regex;

const CASES_KEY: &str = "fio_cases";
const STUDENT_KEY: &str = "student_fio_detailed";
const SUPERVISOR_KEY: &str = "supervisor_fio_detailed";

/// Characters after a context trigger searched for a name
const CONTEXT_WINDOW: usize = 140;
const TITLE_LOCATION: &str = "title_page";

/// Case of names following configured context phrases
pub struct FioCasesRule {
    nlp: NlpCapabilities,
}

impl FioCasesRule {
    pub fn new(nlp: NlpCapabilities) -> Self {
        Self { nlp }
    }
}

impl ValidationRule for FioCasesRule {
    fn id(&self) -> &'static str {
        CASES_KEY
    }

    fn evaluate(&self, model: &DocumentModel, profile: &Profile) -> Result<Vec<Issue>> {
        let Some(config) = profile.rule(CASES_KEY) else {
            return Ok(Vec::new());
        };
        let severity = config.severity_or(Severity::Warning);
        let options: FioContextsOptions = config.options()?;
        let text = &model.text;
        let mut issues = Vec::new();

        for context in &options.contexts {
            let trigger = context.trigger.trim().to_lowercase();
            let Some(expected) = context.expected_case else {
                continue;
            };
            // Supervisor phrases belong to the supervisor rule
            if trigger.is_empty() || trigger.contains("руководител") {
                continue;
            }
            let label = context.label.clone().unwrap_or_else(|| trigger.clone());
            let pattern = Regex::new(&format!("(?i){}", regex::escape(&trigger)))?;

            for occurrence in pattern.find_iter(text) {
                let window = window_after(text, occurrence.end(), CONTEXT_WINDOW);
                let Some(person) = names::find_person(window, self.nlp.tagger.as_ref()) else {
                    continue;
                };
                if names::is_ignored(&person.text, &profile.ignored_full_names) {
                    continue;
                }
                let Some(found) = names::guess_case(&person.text, self.nlp.morphology.as_ref())
                else {
                    continue;
                };
                if found == expected
                    || (expected == GrammaticalCase::Genitive && found == GrammaticalCase::Dative)
                {
                    continue;
                }

                issues.push(
                    Issue::new(
                        severity,
                        Category::Syntactic,
                        "FIO.Case",
                        format!(
                            "ФИО после контекста “{label}” возможно в неверном падеже: найден {}, ожидается {}.",
                            found.name_ru(),
                            expected.name_ru()
                        ),
                    )
                    .with_evidence(format!("{trigger} … {}", person.text))
                    .with_hint(
                        "Исправь ФИО в формальном поле в соответствии с требуемым падежом (обычно 'от студента' → родительный).",
                    ),
                );
            }
        }

        Ok(issues)
    }
}

/// Student's full name on the title page: present, unabbreviated, in an accepted case
pub struct StudentFioRule {
    nlp: NlpCapabilities,
}

impl StudentFioRule {
    pub fn new(nlp: NlpCapabilities) -> Self {
        Self { nlp }
    }
}

impl ValidationRule for StudentFioRule {
    fn id(&self) -> &'static str {
        STUDENT_KEY
    }

    fn evaluate(&self, model: &DocumentModel, profile: &Profile) -> Result<Vec<Issue>> {
        let Some(config) = profile.rule(STUDENT_KEY) else {
            return Ok(Vec::new());
        };
        let severity = config.severity_or(Severity::Critical);
        let student: StudentFioOptions = config.options()?;
        let supervisor = supervisor_options(profile)?;

        let zone = char_prefix(&model.text, student.title_zone_chars);
        let roles = resolve(zone, &student, &supervisor, &self.nlp);

        if roles.student.is_empty() {
            return Ok(vec![Issue::new(
                severity,
                Category::Formal,
                "StudentFIO.Missing",
                format!(
                    "Не найдено ФИО обучающегося в титульной зоне (якоря: {}).",
                    student.anchors.join("/")
                ),
            )
            .at(TITLE_LOCATION)
            .with_hint("Укажи полное ФИО обучающегося после маркера 'обучающегося' или 'допустить'.")]);
        }

        let mut issues = Vec::new();
        for candidate in &roles.student {
            if names::is_ignored(&candidate.name, &profile.ignored_full_names) {
                continue;
            }
            let evidence = evidence_of(candidate);

            if names::is_abbreviated(&candidate.name) {
                issues.push(
                    Issue::new(
                        severity,
                        Category::Syntactic,
                        "StudentFIO.Abbreviation",
                        "ФИО обучающегося содержит сокращения (И.О.). Требуется полное написание (Фамилия Имя Отчество).",
                    )
                    .with_evidence(evidence.clone())
                    .at(TITLE_LOCATION)
                    .with_hint("Укажи полное ФИО без сокращений (например, 'Иванов Иван Иванович')."),
                );
            }

            if let Some(found) = names::guess_case(&candidate.name, self.nlp.morphology.as_ref()) {
                if !student.accepted_cases.contains(&found) {
                    issues.push(
                        Issue::new(
                            severity,
                            Category::Syntactic,
                            "StudentFIO.Case",
                            format!(
                                "ФИО обучающегося должно быть полным в одном из падежей: {}. Найден: {}.",
                                case_list(&student.accepted_cases),
                                found.name_ru()
                            ),
                        )
                        .with_evidence(evidence)
                        .at(TITLE_LOCATION)
                        .with_hint(
                            "Укажи полное ФИО в одном из допустимых падежей (например, 'от студента Иванова Ивана Ивановича').",
                        ),
                    );
                }
            }
        }

        Ok(issues)
    }
}

/// Supervisor's full name on the title page; only the first candidate is checked
pub struct SupervisorFioRule {
    nlp: NlpCapabilities,
}

impl SupervisorFioRule {
    pub fn new(nlp: NlpCapabilities) -> Self {
        Self { nlp }
    }
}

impl ValidationRule for SupervisorFioRule {
    fn id(&self) -> &'static str {
        SUPERVISOR_KEY
    }

    fn evaluate(&self, model: &DocumentModel, profile: &Profile) -> Result<Vec<Issue>> {
        let Some(config) = profile.rule(SUPERVISOR_KEY) else {
            return Ok(Vec::new());
        };
        let severity = config.severity_or(Severity::Critical);
        let supervisor: SupervisorFioOptions = config.options()?;
        let student = student_options(profile)?;

        let zone = char_prefix(&model.text, supervisor.title_zone_chars);
        let roles = resolve(zone, &student, &supervisor, &self.nlp);

        let Some(candidate) = roles.supervisor.first() else {
            return Ok(vec![Issue::new(
                severity,
                Category::Formal,
                "SupervisorFIO.Missing",
                "Не найдено ФИО руководителя в титульной зоне (якорь: руководитель).",
            )
            .at(TITLE_LOCATION)
            .with_hint("Укажи полное ФИО руководителя после маркера 'руководитель'.")]);
        };

        if names::is_ignored(&candidate.name, &profile.ignored_full_names) {
            return Ok(Vec::new());
        }

        let evidence = evidence_of(candidate);
        let mut issues = Vec::new();

        if names::is_abbreviated(&candidate.name) {
            issues.push(
                Issue::new(
                    severity,
                    Category::Syntactic,
                    "SupervisorFIO.Abbreviation",
                    "ФИО руководителя содержит сокращения. Требуется полное написание (Фамилия Имя Отчество).",
                )
                .with_evidence(evidence.clone())
                .at(TITLE_LOCATION)
                .with_hint("Укажи полное ФИО руководителя без сокращений."),
            );
        }

        if let Some(found) = names::guess_case(&candidate.name, self.nlp.morphology.as_ref()) {
            if !supervisor.accepted_cases.contains(&found) {
                issues.push(
                    Issue::new(
                        severity,
                        Category::Syntactic,
                        "SupervisorFIO.Case",
                        "ФИО руководителя должно быть полным и в косвенном падеже (не именительный).",
                    )
                    .with_evidence(evidence)
                    .at(TITLE_LOCATION)
                    .with_hint(
                        "Укажи ФИО руководителя в косвенном падеже (например, 'руководитель Иванова Ивана Ивановича').",
                    ),
                );
            }
        }

        Ok(issues)
    }
}

// Both role rules resolve student and supervisor together, so each needs the
// other's anchors even when the other rule is switched off.

fn student_options(profile: &Profile) -> Result<StudentFioOptions> {
    Ok(match profile.rules.get(STUDENT_KEY) {
        Some(config) => config.options()?,
        None => StudentFioOptions::default(),
    })
}

fn supervisor_options(profile: &Profile) -> Result<SupervisorFioOptions> {
    Ok(match profile.rules.get(SUPERVISOR_KEY) {
        Some(config) => config.options()?,
        None => SupervisorFioOptions::default(),
    })
}

fn resolve(
    zone: &str,
    student: &StudentFioOptions,
    supervisor: &SupervisorFioOptions,
    nlp: &NlpCapabilities,
) -> RoleAssignment {
    let anchors = RoleAnchors {
        student: &student.anchors,
        student_window: student.window_chars,
        supervisor: &supervisor.anchors,
        supervisor_window: supervisor.window_chars,
    };
    names::resolve_roles(zone, &anchors, nlp.tagger.as_ref())
}

fn evidence_of(candidate: &NameCandidate) -> String {
    format!("{} ... {}", candidate.anchor, candidate.name)
}

fn case_list(cases: &[GrammaticalCase]) -> String {
    cases
        .iter()
        .map(GrammaticalCase::name_ru)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleConfig;
    use crate::heuristics::{PersonSpan, PersonTagger, SuffixCaseClassifier};
    use crate::rules::test_support::*;
    use std::sync::Arc;

    fn student_rule() -> StudentFioRule {
        StudentFioRule::new(NlpCapabilities::default())
    }

    fn supervisor_rule() -> SupervisorFioRule {
        SupervisorFioRule::new(NlpCapabilities::default())
    }

    #[test]
    fn genitive_student_after_admission_passes() {
        let model = docx_model("Допустить к защите\nдопустить Петрова Ивана Ивановича к защите");
        let issues = student_rule()
            .evaluate(&model, &profile_with(STUDENT_KEY, "{}"))
            .unwrap();
        assert!(issues.is_empty(), "{issues:?}");
    }

    #[test]
    fn nominative_student_is_flagged() {
        let model = docx_model("Работа обучающегося\nПетров Иван Иванович");
        let issues = student_rule()
            .evaluate(&model, &profile_with(STUDENT_KEY, "{}"))
            .unwrap();
        assert_eq!(rule_ids(&issues), vec!["StudentFIO.Case"]);
        assert!(issues[0].message.ends_with("Найден: именительный."));
        assert_eq!(issues[0].evidence, "обучающегося ... Петров Иван Иванович");
        assert_eq!(issues[0].location, "title_page");
    }

    #[test]
    fn abbreviated_student_is_flagged() {
        let model = docx_model("обучающегося Петрова И.И.");
        let issues = student_rule()
            .evaluate(&model, &profile_with(STUDENT_KEY, "{}"))
            .unwrap();
        assert_eq!(rule_ids(&issues), vec!["StudentFIO.Abbreviation"]);
    }

    #[test]
    fn missing_student_is_reported() {
        let issues = student_rule()
            .evaluate(&docx_model("Титульный лист без имён"), &profile_with(STUDENT_KEY, "{}"))
            .unwrap();
        assert_eq!(rule_ids(&issues), vec!["StudentFIO.Missing"]);
        assert!(issues[0].message.contains("обучающегося/допустить"));
    }

    #[test]
    fn ignored_names_are_skipped() {
        let model = docx_model("обучающегося Петров Иван Иванович");
        let mut profile = profile_with(STUDENT_KEY, "{}");
        profile.ignored_full_names = vec!["ПЕТРОВ ИВАН ИВАНОВИЧ".to_string()];
        let issues = student_rule().evaluate(&model, &profile).unwrap();
        assert!(issues.is_empty());
    }

    #[test]
    fn supervisor_in_nominative_is_flagged() {
        let model = docx_model("Руководитель: доцент Сидоров Петр Петрович\nМосква 2024");
        let issues = supervisor_rule()
            .evaluate(&model, &profile_with(SUPERVISOR_KEY, "{}"))
            .unwrap();
        assert_eq!(rule_ids(&issues), vec!["SupervisorFIO.Case"]);
        assert_eq!(issues[0].evidence, "руководитель ... Сидоров Петр Петрович");
    }

    #[test]
    fn supervisor_abbreviation_and_missing() {
        let model = docx_model("Руководитель Сидорова П.П.");
        let issues = supervisor_rule()
            .evaluate(&model, &profile_with(SUPERVISOR_KEY, "{}"))
            .unwrap();
        assert_eq!(rule_ids(&issues), vec!["SupervisorFIO.Abbreviation"]);

        let issues = supervisor_rule()
            .evaluate(&docx_model("Без руководства"), &profile_with(SUPERVISOR_KEY, "{}"))
            .unwrap();
        assert_eq!(rule_ids(&issues), vec!["SupervisorFIO.Missing"]);
    }

    #[test]
    fn supervisor_anchor_before_admission_moves_to_student() {
        let text = "Руководитель образовательной программы\nдопустить к защите Петрова Ивана Ивановича";
        let supervisor = supervisor_rule()
            .evaluate(&docx_model(text), &profile_with(SUPERVISOR_KEY, "{}"))
            .unwrap();
        assert_eq!(rule_ids(&supervisor), vec!["SupervisorFIO.Missing"]);

        let student = student_rule()
            .evaluate(&docx_model(text), &profile_with(STUDENT_KEY, "{}"))
            .unwrap();
        assert!(student.is_empty(), "{student:?}");
    }

    #[test]
    fn context_case_mismatch_is_reported() {
        let profile = profile_with(
            CASES_KEY,
            r#"contexts:
  - { trigger: "от студента", expected_case: gent, label: "от студента" }
  - { trigger: "руководитель", expected_case: gent }
  - { trigger: "без падежа" }"#,
        );
        let rule = FioCasesRule::new(NlpCapabilities::default());

        let issues = rule
            .evaluate(&docx_model("Отзыв от студента Петров Иван Иванович"), &profile)
            .unwrap();
        assert_eq!(rule_ids(&issues), vec!["FIO.Case"]);
        assert!(issues[0].message.contains("найден именительный, ожидается родительный"));
        assert_eq!(issues[0].evidence, "от студента … Петров Иван Иванович");

        // dative is accepted where genitive is expected
        let issues = rule
            .evaluate(&docx_model("Отзыв от студента Петрову Ивану Ивановичу"), &profile)
            .unwrap();
        assert!(issues.is_empty());

        // supervisor triggers are left to the supervisor rule
        let issues = rule
            .evaluate(&docx_model("руководитель Сидоров Петр"), &profile)
            .unwrap();
        assert!(issues.is_empty());
    }

    struct FixedTagger;

    impl PersonTagger for FixedTagger {
        fn find_person_spans(&self, text: &str) -> Vec<PersonSpan> {
            text.find("петровым")
                .map(|offset| PersonSpan {
                    text: "петровым".to_string(),
                    offset,
                })
                .into_iter()
                .collect()
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[test]
    fn injected_tagger_takes_precedence() {
        let nlp = NlpCapabilities::new(Arc::new(FixedTagger), Arc::new(SuffixCaseClassifier));
        let rule = StudentFioRule::new(nlp);
        let profile = Profile::empty("t").with_rule(STUDENT_KEY, RuleConfig::default());
        let issues = rule
            .evaluate(&docx_model("обучающегося Иванов Иван и петровым"), &profile)
            .unwrap();
        assert_eq!(rule_ids(&issues), vec!["StudentFIO.Case"]);
        assert!(issues[0].message.ends_with("Найден: творительный."));
    }
}
