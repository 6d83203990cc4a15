//! Activity reports over a date range.
//!
//! Summarizes events by category and by day, and medication adherence from
//! the intake history:
//! - **Taken**: history entries marked taken
//! - **Missed**: history entries marked not taken
//! - **Rate**: `taken / (taken + missed)` as a rounded percentage

use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::calendar::EventRecord;
use crate::clock;
use crate::error::ValidationError;
use crate::medication::MedicationHistoryRecord;

/// Default report window in days, ending today.
pub const DEFAULT_RANGE_DAYS: i64 = 30;

const EVENTS_HEADER: &str = "Data,Título,Categoria,Horário Início,Horário Fim,Local";
const ADHERENCE_HEADER: &str = "Medicamento,Doses Tomadas,Doses Perdidas,Taxa de Adesão";
const UNCATEGORIZED: &str = "Outros";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryStat {
    pub category: String,
    pub count: usize,
    /// Share of all events in range, rounded.
    pub percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCount {
    pub date: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationAdherence {
    pub medication_id: String,
    pub name: String,
    pub taken: u32,
    pub missed: u32,
}

impl MedicationAdherence {
    pub fn rate(&self) -> u32 {
        percent(self.taken as usize, (self.taken + self.missed) as usize)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub start: String,
    pub end: String,
    pub total_events: usize,
    pub by_category: Vec<CategoryStat>,
    pub by_day: Vec<DayCount>,
    pub adherence: Vec<MedicationAdherence>,
    #[serde(skip)]
    events: Vec<EventRecord>,
}

impl Report {
    /// Events inside the range, in date then start-time order.
    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }
}

fn percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((part as f64 / whole as f64) * 100.0).round() as u32
}

/// `[today - 30 days, today]`.
pub fn default_range(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    (today - Duration::days(DEFAULT_RANGE_DAYS), today)
}

fn in_range(date: &str, start: NaiveDate, end: NaiveDate) -> bool {
    clock::parse_date("date", date).is_ok_and(|d| d >= start && d <= end)
}

/// Build a report over `[start, end]`, both inclusive.
pub fn build(
    events: &[EventRecord],
    history: &[MedicationHistoryRecord],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Report, ValidationError> {
    if end < start {
        return Err(ValidationError::InvalidRange {
            start: clock::format_date(start),
            end: clock::format_date(end),
        });
    }

    let mut selected: Vec<EventRecord> = events
        .iter()
        .filter(|e| in_range(&e.date, start, end))
        .cloned()
        .collect();
    selected.sort_by(|a, b| (&a.date, &a.start_time).cmp(&(&b.date, &b.start_time)));
    let total = selected.len();

    let mut categories: BTreeMap<&str, usize> = BTreeMap::new();
    let mut days: BTreeMap<&str, usize> = BTreeMap::new();
    for e in &selected {
        let category = if e.category.is_empty() {
            UNCATEGORIZED
        } else {
            e.category.as_str()
        };
        *categories.entry(category).or_default() += 1;
        *days.entry(e.date.as_str()).or_default() += 1;
    }

    let mut by_category: Vec<CategoryStat> = categories
        .into_iter()
        .map(|(category, count)| CategoryStat {
            category: category.to_string(),
            count,
            percentage: percent(count, total),
        })
        .collect();
    // Stable: ties keep alphabetical order.
    by_category.sort_by(|a, b| b.count.cmp(&a.count));

    let by_day = start
        .iter_days()
        .take_while(|d| *d <= end)
        .map(|d| {
            let date = clock::format_date(d);
            let count = days.get(date.as_str()).copied().unwrap_or(0);
            DayCount { date, count }
        })
        .collect();

    let mut adherence: Vec<MedicationAdherence> = Vec::new();
    for h in history.iter().filter(|h| in_range(&h.date, start, end)) {
        let idx = match adherence.iter().position(|a| a.medication_id == h.medication_id) {
            Some(i) => i,
            None => {
                let name = if h.medication_name.is_empty() {
                    format!("Medicamento {}", h.medication_id)
                } else {
                    h.medication_name.clone()
                };
                adherence.push(MedicationAdherence {
                    medication_id: h.medication_id.clone(),
                    name,
                    taken: 0,
                    missed: 0,
                });
                adherence.len() - 1
            }
        };
        if h.taken {
            adherence[idx].taken += 1;
        } else {
            adherence[idx].missed += 1;
        }
    }

    Ok(Report {
        start: clock::format_date(start),
        end: clock::format_date(end),
        total_events: total,
        by_category,
        by_day,
        adherence,
        events: selected,
    })
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Event list as CSV.
pub fn events_csv(events: &[EventRecord]) -> String {
    let mut out = format!("{EVENTS_HEADER}\n");
    for e in events {
        let _ = writeln!(
            out,
            "{},{},{},{},{},{}",
            csv_field(&e.date),
            csv_field(&e.title),
            csv_field(&e.category),
            csv_field(&e.start_time),
            csv_field(&e.end_time),
            csv_field(e.location.as_deref().unwrap_or_default()),
        );
    }
    out
}

/// Adherence table as CSV.
pub fn adherence_csv(rows: &[MedicationAdherence]) -> String {
    let mut out = format!("{ADHERENCE_HEADER}\n");
    for r in rows {
        let _ = writeln!(out, "{},{},{},{}%", csv_field(&r.name), r.taken, r.missed, r.rate());
    }
    out
}

/// `eventos_<name>_<date>.csv` / `medicamentos_<name>_<date>.csv`.
pub fn export_filename(kind: &str, person: Option<&str>, today: NaiveDate) -> String {
    let person = person.map(str::trim).filter(|p| !p.is_empty()).unwrap_or("idoso");
    format!("{kind}_{person}_{}.csv", clock::format_date(today))
}
