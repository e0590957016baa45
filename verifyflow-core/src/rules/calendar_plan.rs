use super::engine::ValidationRule;
use crate::config::Profile;
use crate::heuristics::dates;
use crate::types::*;
use anyhow::Result;
use chrono::NaiveDate;

const KEY: &str = "calendar_plan";
const LOCATION: &str = "calendar_plan_table";

/// Calendar plan table: present, dated, dates well-formed and in chronological order
pub struct CalendarPlanRule;

impl ValidationRule for CalendarPlanRule {
    fn id(&self) -> &'static str {
        KEY
    }

    fn evaluate(&self, model: &DocumentModel, profile: &Profile) -> Result<Vec<Issue>> {
        let Some(config) = profile.rule(KEY) else {
            return Ok(Vec::new());
        };
        let severity = config.severity_or(Severity::Critical);

        if model.tables.is_empty() {
            return Ok(vec![Issue::new(
                Severity::Warning,
                Category::Structural,
                "CalendarPlan.NotFound",
                "Не найдена таблица календарного плана.",
            )
            .with_hint("Добавь таблицу календарного плана с этапами работы и датами.")]);
        }

        let Some(table) = model.tables.iter().find(|t| is_calendar_table(t)) else {
            return Ok(vec![Issue::new(
                Severity::Warning,
                Category::Structural,
                "CalendarPlan.NoDates",
                "В таблицах не найдены даты в формате 'ДД.ММ.ГГГГ г.' или 'ДД месяц ГГГГ г.'.",
            )
            .with_hint(
                "Проверь, что календарный план содержит даты в правильном формате (например, '06.12.2024 г.' или '09 декабря 2024 г.').",
            )]);
        };

        let mut issues = Vec::new();
        let mut found: Vec<NaiveDate> = Vec::new();

        // Row 0 is the header
        for row in 1..table.rows.len() {
            let row_text = table.row_text(row);
            let full = dates::scan_full_dates(&row_text);

            for loose in dates::scan_loose_numeric(&row_text) {
                let inside_full = full
                    .iter()
                    .any(|d| d.offset <= loose.offset && loose.offset < d.end());
                if inside_full || loose.is_valid() {
                    continue;
                }
                issues.push(
                    Issue::new(
                        severity,
                        Category::Formal,
                        "CalendarPlan.InvalidDate",
                        "Некорректная дата в календарном плане. Ожидается формат ДД.ММ.ГГГГ (допустимо с/без 'г.').",
                    )
                    .with_evidence(loose.fragment)
                    .at(LOCATION)
                    .with_hint("Исправь дату на вид '06.12.2024' или '06.12.2024 г.' и проверь день/месяц/год."),
                );
            }

            found.extend(full.iter().map(|d| d.date));
        }

        // Any reordering counts, adjacent or not
        if found.len() >= 2 && !found.windows(2).all(|pair| pair[0] <= pair[1]) {
            issues.push(
                Issue::new(
                    severity,
                    Category::Logical,
                    "CalendarPlan.Order",
                    "Нарушен хронологический порядок дат в календарном плане.",
                )
                .with_evidence(format!("Найдено дат: {}", found.len()))
                .at(LOCATION)
                .with_hint("Упорядочь даты этапов работы в хронологическом порядке (от ранних к поздним)."),
            );
        }

        Ok(issues)
    }
}

/// At least two rows and some row holding something date-shaped
fn is_calendar_table(table: &Table) -> bool {
    table.rows.len() >= 2
        && (0..table.rows.len()).any(|row| dates::contains_date_shape(&table.row_text(row)))
}
