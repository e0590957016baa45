use super::engine::ValidationRule;
use crate::config::Profile;
use crate::heuristics::dates;
use crate::heuristics::text::window_around;
use crate::types::*;
use anyhow::Result;

const KEY: &str = "date_format_strict";

/// Two-digit-year fragments near these stems are program codes such as `09.03.01`
const PROGRAM_CODE_MARKERS: [&str; 7] = [
    "направлен",
    "специальн",
    "профиль",
    "информат",
    "техника",
    "инженер",
    "программы",
];

/// Numeric dates must be `ДД.ММ.ГГГГ`; broken `D.M.Y` fragments are reported too
pub struct DateFormatStrictRule;

impl ValidationRule for DateFormatStrictRule {
    fn id(&self) -> &'static str {
        KEY
    }

    fn evaluate(&self, model: &DocumentModel, profile: &Profile) -> Result<Vec<Issue>> {
        let Some(config) = profile.rule(KEY) else {
            return Ok(Vec::new());
        };
        let severity = config.severity_or(Severity::Warning);
        let text = &model.text;
        let mut issues = Vec::new();

        for found in dates::scan_full_dates(text) {
            if found.is_canonical() || dates::is_likely_not_date(text, found.offset, found.end()) {
                continue;
            }
            issues.push(
                Issue::new(
                    severity,
                    Category::Formal,
                    "Date.Format",
                    "Дата должна быть в формате 'ДД.ММ.ГГГГ' или 'ДД месяц ГГГГ' (допустимо с/без 'г.').",
                )
                .with_evidence(found.fragment)
                .with_hint("Приведи дату к виду '06.12.2024' или '06.12.2024 г.' / '09 декабря 2024 г.'."),
            );
        }

        for loose in dates::scan_loose_numeric(text) {
            if loose.is_valid() {
                continue;
            }
            if loose.two_digit_year && near_program_code(text, loose.offset, loose.end()) {
                continue;
            }
            issues.push(
                Issue::new(
                    severity,
                    Category::Formal,
                    "Date.InvalidFormat",
                    "Некорректная дата. Ожидается порядок ДД.ММ.ГГГГ (допустимо с/без 'г.').",
                )
                .with_evidence(loose.fragment)
                .with_hint("Проверь порядок дня и месяца (1-31 и 1-12) и год из четырёх цифр."),
            );
        }

        Ok(issues)
    }
}

fn near_program_code(text: &str, start: usize, end: usize) -> bool {
    let context = window_around(text, start, end, 30, 40).to_lowercase();
    PROGRAM_CODE_MARKERS.iter().any(|m| context.contains(m))
}
