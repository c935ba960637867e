//! Shareable plain-text health report.
//!
//! Sections: recent blood pressure, current medications, recent meals and
//! recent symptoms. Each section prints an empty-state line instead of
//! disappearing, so a doctor can tell "nothing logged" from "not included".
//!
//! The medication list is capped at `REPORT_MEDICATION_LIMIT` (the store's
//! page size, 200) newest entries.

use std::fmt::Write;

use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use uuid::Uuid;

use super::records::{self, BpReading, FoodLog, MAX_LIST_LIMIT, Medication, RecordError, RecordStore, SymptomLog};

pub const REPORT_BP_LIMIT: i64 = 5;
pub const REPORT_MEDICATION_LIMIT: i64 = MAX_LIST_LIMIT;
pub const REPORT_MEAL_LIMIT: i64 = 3;
pub const REPORT_SYMPTOM_LIMIT: i64 = 3;

const HEADER_DATE: &[BorrowedFormatItem<'static>] =
    format_description!("[weekday repr:short] [month repr:short] [day] [year]");
const LINE_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Everything the report prints, newest first within each list.
#[derive(Debug, Clone, Default)]
pub struct ReportData {
    pub readings: Vec<(OffsetDateTime, BpReading)>,
    pub medications: Vec<Medication>,
    pub meals: Vec<FoodLog>,
    pub symptoms: Vec<(OffsetDateTime, SymptomLog)>,
}

fn fmt_date(at: OffsetDateTime, format: &[BorrowedFormatItem<'_>]) -> String {
    at.format(format).unwrap_or_else(|_| at.date().to_string())
}

/// Render the report text.
#[must_use]
pub fn render_report(generated_at: OffsetDateTime, data: &ReportData) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "HEALTH REPORT - {}", fmt_date(generated_at, HEADER_DATE));
    out.push('\n');

    out.push_str("--- BLOOD PRESSURE LOG ---\n");
    if data.readings.is_empty() {
        out.push_str("No readings recorded.\n");
    }
    for (at, r) in &data.readings {
        let flag = if r.is_crisis() { " [CRISIS]" } else { "" };
        let _ = writeln!(out, "{}/{} mmHg - {}{flag}", r.systolic, r.diastolic, fmt_date(*at, LINE_DATE));
    }
    out.push('\n');

    out.push_str("--- CURRENT MEDICATIONS ---\n");
    if data.medications.is_empty() {
        out.push_str("No medications listed.\n");
    }
    for m in &data.medications {
        let _ = writeln!(out, "- {} ({}): {}", m.name, m.dosage, m.instructions);
    }
    out.push('\n');

    out.push_str("--- RECENT MEALS ---\n");
    if data.meals.is_empty() {
        out.push_str("No meals logged.\n");
    }
    for f in &data.meals {
        let _ = writeln!(out, "- {} ({})", f.meal, f.description);
    }
    out.push('\n');

    out.push_str("--- RECENT SYMPTOMS ---\n");
    if data.symptoms.is_empty() {
        out.push_str("No symptoms logged.\n");
    }
    for (at, s) in &data.symptoms {
        let _ = writeln!(out, "- {} (severity {}/5) - {}", s.symptom, s.severity, fmt_date(*at, LINE_DATE));
    }

    out
}

/// Gather the user's recent records and render the report.
pub async fn build_report(
    store: &dyn RecordStore,
    user_id: Uuid,
    generated_at: OffsetDateTime,
) -> Result<String, RecordError> {
    let readings = records::recent::<BpReading>(store, user_id, REPORT_BP_LIMIT).await?;
    let medications = records::recent::<Medication>(store, user_id, REPORT_MEDICATION_LIMIT).await?;
    let meals = records::recent::<FoodLog>(store, user_id, REPORT_MEAL_LIMIT).await?;
    let symptoms = records::recent::<SymptomLog>(store, user_id, REPORT_SYMPTOM_LIMIT).await?;

    let data = ReportData {
        readings: readings.into_iter().map(|(r, e)| (r.recorded_at, e)).collect(),
        // Oldest first, the order the user added them.
        medications: medications.into_iter().rev().map(|(_, e)| e).collect(),
        meals: meals.into_iter().map(|(_, e)| e).collect(),
        symptoms: symptoms.into_iter().map(|(r, e)| (r.recorded_at, e)).collect(),
    };
    Ok(render_report(generated_at, &data))
}

#[cfg(test)]
#[path = "report_test.rs"]
mod tests;
