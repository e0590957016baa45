use crate::error::ProfileError;
use crate::heuristics::GrammaticalCase;
use crate::types::{MarginSide, Severity};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::path::Path;

pub const DEFAULT_PROFILE: &str = "vkr_ru";

const BUILTIN_PROFILES: &[(&str, &str)] = &[(DEFAULT_PROFILE, include_str!("../profiles/vkr_ru.yaml"))];

/// Top-level profile keys that are never rule sections
const PROFILE_KEYS: [&str; 5] = [
    "name",
    "rules",
    "ignored_full_names",
    "ignored_fios",
    "ignoredFullNames",
];

// Default value functions for serde
fn default_true() -> bool {
    true
}

fn default_profile_name() -> String {
    DEFAULT_PROFILE.to_string()
}

/// A named rule profile: per-rule settings plus names the FIO rules must skip
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default = "default_profile_name")]
    pub name: String,
    #[serde(default)]
    pub rules: BTreeMap<String, RuleConfig>,
    #[serde(default, alias = "ignored_fios", alias = "ignoredFullNames")]
    pub ignored_full_names: Vec<String>,
}

/// Settings of one rule. Rule-specific keys stay in `options` and are read
/// through the rule's typed options struct.
///
/// A section without `enabled` is on; only an absent section or
/// `enabled: false` turns a rule off.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Whether this rule is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub severity: Option<Severity>,
    #[serde(flatten)]
    pub options: BTreeMap<String, Value>,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            severity: None,
            options: BTreeMap::new(),
        }
    }
}

impl RuleConfig {
    pub fn severity_or(&self, default: Severity) -> Severity {
        self.severity.unwrap_or(default)
    }

    /// Deserialize the rule-specific keys into `T`
    pub fn options<T: DeserializeOwned>(&self) -> Result<T, serde_yaml::Error> {
        serde_yaml::from_value(serde_yaml::to_value(&self.options)?)
    }
}

impl Profile {
    pub fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            rules: BTreeMap::new(),
            ignored_full_names: Vec::new(),
        }
    }

    /// Load profile from YAML file
    pub fn load_from_file(path: &Path) -> Result<Self, ProfileError> {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content = std::fs::read_to_string(path).map_err(|source| ProfileError::Io {
            name: name.clone(),
            source,
        })?;
        Self::from_yaml_str(&name, &content)
    }

    /// Parse a profile; `name` is used when the document has no `name` key
    pub fn from_yaml_str(name: &str, content: &str) -> Result<Self, ProfileError> {
        let mut value: Value =
            serde_yaml::from_str(content).map_err(|source| ProfileError::Parse {
                name: name.to_string(),
                source,
            })?;
        let has_name = value.get("name").is_some();
        hoist_top_level_rules(&mut value);
        let mut profile: Profile =
            serde_yaml::from_value(value).map_err(|source| ProfileError::Parse {
                name: name.to_string(),
                source,
            })?;
        if !has_name && !name.is_empty() {
            profile.name = name.to_string();
        }
        Ok(profile)
    }

    /// Built-in profile shipped with the library
    pub fn builtin(name: &str) -> Option<Result<Self, ProfileError>> {
        BUILTIN_PROFILES
            .iter()
            .find(|(builtin, _)| *builtin == name)
            .map(|(builtin, yaml)| Self::from_yaml_str(builtin, yaml))
    }

    pub fn builtin_names() -> Vec<&'static str> {
        BUILTIN_PROFILES.iter().map(|(name, _)| *name).collect()
    }

    /// Settings of an enabled rule; `None` when absent or disabled
    pub fn rule(&self, key: &str) -> Option<&RuleConfig> {
        self.rules.get(key).filter(|cfg| cfg.enabled)
    }

    /// Enable or replace a rule section
    pub fn with_rule(mut self, key: &str, config: RuleConfig) -> Self {
        self.rules.insert(key.to_string(), config);
        self
    }
}

/// Move rule sections written next to `name` under `rules`.
///
/// Any mapping-valued top-level key other than the profile's own keys is a
/// rule section. A section already under `rules` wins over a top-level one.
fn hoist_top_level_rules(value: &mut Value) {
    let Some(root) = value.as_mapping_mut() else {
        return;
    };
    let top_level: Vec<Value> = root
        .iter()
        .filter(|(key, section)| {
            section.is_mapping() && key.as_str().is_some_and(|k| !PROFILE_KEYS.contains(&k))
        })
        .map(|(key, _)| key.clone())
        .collect();
    if top_level.is_empty() {
        return;
    }

    let rules_key = Value::String("rules".to_string());
    let mut rules = match root.remove(&rules_key) {
        Some(Value::Mapping(rules)) => rules,
        None | Some(Value::Null) => Mapping::new(),
        // Leave a malformed `rules` for serde to report
        Some(other) => {
            root.insert(rules_key, other);
            return;
        }
    };
    for key in top_level {
        if let Some(section) = root.remove(&key) {
            if !rules.contains_key(&key) {
                rules.insert(key, section);
            }
        }
    }
    root.insert(rules_key, Value::Mapping(rules));
}

// ===== Rule option structs =====

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TitleFieldsOptions {
    /// PDF pages treated as the title zone
    pub title_scope_pages: usize,
    pub required: Vec<RequiredField>,
}

impl Default for TitleFieldsOptions {
    fn default() -> Self {
        Self {
            title_scope_pages: 1,
            required: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequiredField {
    pub key: String,
    #[serde(default)]
    pub hints: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatesOptions {
    pub max_year_spread: i32,
    pub range_hints: RangeHints,
}

impl Default for DatesOptions {
    fn default() -> Self {
        Self {
            max_year_spread: 15,
            range_hints: RangeHints::default(),
        }
    }
}

/// Extra words marking the start and end of a date range
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeHints {
    pub start: Vec<String>,
    pub end: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FioContextsOptions {
    pub contexts: Vec<FioContext>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FioContext {
    #[serde(default)]
    pub trigger: String,
    #[serde(default)]
    pub expected_case: Option<GrammaticalCase>,
    #[serde(default)]
    pub label: Option<String>,
}

fn default_student_anchors() -> Vec<String> {
    vec!["обучающегося".to_string(), "допустить".to_string()]
}

fn default_student_window() -> usize {
    300
}

fn default_student_cases() -> Vec<GrammaticalCase> {
    vec![
        GrammaticalCase::Genitive,
        GrammaticalCase::Dative,
        GrammaticalCase::Accusative,
    ]
}

fn default_supervisor_anchors() -> Vec<String> {
    vec![
        "руководитель".to_string(),
        "научный руководитель".to_string(),
        "руководителя".to_string(),
    ]
}

fn default_supervisor_window() -> usize {
    400
}

fn default_title_zone_chars() -> usize {
    6000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentFioOptions {
    #[serde(default = "default_student_anchors")]
    pub anchors: Vec<String>,
    #[serde(default = "default_student_window")]
    pub window_chars: usize,
    #[serde(default = "default_student_cases")]
    pub accepted_cases: Vec<GrammaticalCase>,
    #[serde(default = "default_title_zone_chars")]
    pub title_zone_chars: usize,
}

impl Default for StudentFioOptions {
    fn default() -> Self {
        Self {
            anchors: default_student_anchors(),
            window_chars: default_student_window(),
            accepted_cases: default_student_cases(),
            title_zone_chars: default_title_zone_chars(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupervisorFioOptions {
    #[serde(default = "default_supervisor_anchors")]
    pub anchors: Vec<String>,
    #[serde(default = "default_supervisor_window")]
    pub window_chars: usize,
    #[serde(default = "GrammaticalCase::all_except_nominative")]
    pub accepted_cases: Vec<GrammaticalCase>,
    #[serde(default = "default_title_zone_chars")]
    pub title_zone_chars: usize,
}

impl Default for SupervisorFioOptions {
    fn default() -> Self {
        Self {
            anchors: default_supervisor_anchors(),
            window_chars: default_supervisor_window(),
            accepted_cases: GrammaticalCase::all_except_nominative(),
            title_zone_chars: default_title_zone_chars(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarginsOptions {
    pub expected_mm: ExpectedMargins,
    pub tolerance_mm: f64,
}

impl Default for MarginsOptions {
    fn default() -> Self {
        Self {
            expected_mm: ExpectedMargins::default(),
            tolerance_mm: 1.5,
        }
    }
}

/// Expected margin per side; unset sides are not checked
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpectedMargins {
    pub left: Option<f64>,
    pub right: Option<f64>,
    pub top: Option<f64>,
    pub bottom: Option<f64>,
}

impl ExpectedMargins {
    pub fn side(&self, side: MarginSide) -> Option<f64> {
        match side {
            MarginSide::Left => self.left,
            MarginSide::Right => self.right,
            MarginSide::Top => self.top,
            MarginSide::Bottom => self.bottom,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicOptions {
    pub approved_topics: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TextFormattingOptions {
    /// Occurrences counted before reporting stops
    pub max_positions: usize,
}

impl Default for TextFormattingOptions {
    fn default() -> Self {
        Self { max_positions: 50 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormattingOptions {
    pub italic: ItalicOptions,
    pub max_paragraphs: usize,
    pub max_samples: usize,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        Self {
            italic: ItalicOptions::default(),
            max_paragraphs: 900,
            max_samples: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItalicOptions {
    #[serde(default = "default_true")]
    pub warn_if_not_latin: bool,
}

impl Default for ItalicOptions {
    fn default() -> Self {
        Self {
            warn_if_not_latin: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILE_YAML: &str = r#"
name: custom
ignored_fios: ["Иванов Иван Иванович"]
rules:
  dates: { enabled: true, severity: critical, max_year_spread: 10, range_hints: { start: ["начало"] } }
  margins_docx:
    enabled: false
    tolerance_mm: 2
    expected_mm: { left: 30, right: 15 }
  topic_match:
    approved_topics: ["Разработка системы"]
"#;

    #[test]
    fn parses_profile_with_alias_and_options() {
        let profile = Profile::from_yaml_str("fallback", PROFILE_YAML).unwrap();
        assert_eq!(profile.name, "custom");
        assert_eq!(profile.ignored_full_names, vec!["Иванов Иван Иванович"]);

        let dates = profile.rule("dates").unwrap();
        assert_eq!(dates.severity_or(Severity::Warning), Severity::Critical);
        let options: DatesOptions = dates.options().unwrap();
        assert_eq!(options.max_year_spread, 10);
        assert_eq!(options.range_hints.start, vec!["начало"]);
        assert!(options.range_hints.end.is_empty());
    }

    #[test]
    fn top_level_rule_sections_are_loaded() {
        let yaml = r#"
ignoredFullNames: ["Иванов Иван Иванович"]
margins_docx: { enabled: true, severity: critical, tolerance_mm: 2 }
dates: { enabled: false }
description: "Профиль кафедры"
rules:
  dates: { enabled: true, max_year_spread: 5 }
"#;
        let profile = Profile::from_yaml_str("kafedra", yaml).unwrap();
        assert_eq!(profile.name, "kafedra");
        assert_eq!(profile.ignored_full_names, vec!["Иванов Иван Иванович"]);

        let margins = profile.rule("margins_docx").unwrap();
        assert_eq!(margins.severity_or(Severity::Warning), Severity::Critical);
        let options: MarginsOptions = margins.options().unwrap();
        assert_eq!(options.tolerance_mm, 2.0);

        // the nested section wins
        let dates: DatesOptions = profile.rule("dates").unwrap().options().unwrap();
        assert_eq!(dates.max_year_spread, 5);
        assert!(!profile.rules.contains_key("description"));
    }

    #[test]
    fn disabled_and_absent_rules_are_not_returned() {
        let profile = Profile::from_yaml_str("x", PROFILE_YAML).unwrap();
        assert!(profile.rule("margins_docx").is_none());
        assert!(profile.rule("calendar_plan").is_none());
        // a present section without `enabled` is on
        assert!(profile.rule("topic_match").is_some());
    }

    #[test]
    fn option_defaults_fill_missing_keys() {
        let cfg = RuleConfig::default();
        let student: StudentFioOptions = cfg.options().unwrap();
        assert_eq!(student.window_chars, 300);
        assert_eq!(student.anchors, vec!["обучающегося", "допустить"]);
        let supervisor: SupervisorFioOptions = cfg.options().unwrap();
        assert!(!supervisor.accepted_cases.contains(&GrammaticalCase::Nominative));
        let margins: MarginsOptions = cfg.options().unwrap();
        assert_eq!(margins.tolerance_mm, 1.5);
        assert!(margins.expected_mm.left.is_none());
    }

    #[test]
    fn name_falls_back_to_file_stem() {
        let profile = Profile::from_yaml_str("from_file", "rules: {}").unwrap();
        assert_eq!(profile.name, "from_file");
    }

    #[test]
    fn builtin_profile_parses() {
        let profile = Profile::builtin(DEFAULT_PROFILE).unwrap().unwrap();
        assert_eq!(profile.name, DEFAULT_PROFILE);
        assert!(profile.rule("dates").is_some());
        assert!(profile.rule("student_fio_detailed").is_some());
        assert!(Profile::builtin("missing").is_none());
    }

    #[test]
    fn invalid_yaml_is_a_parse_error() {
        let result = Profile::from_yaml_str("bad", "rules: [unclosed");
        assert!(matches!(result, Err(ProfileError::Parse { .. })));
    }

    #[test]
    fn loads_profile_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("strict.yaml");
        std::fs::write(&path, "rules:\n  dates: { max_year_spread: 5 }\n").unwrap();
        let profile = Profile::load_from_file(&path).unwrap();
        assert_eq!(profile.name, "strict");
        let options: DatesOptions = profile.rule("dates").unwrap().options().unwrap();
        assert_eq!(options.max_year_spread, 5);
    }
}
