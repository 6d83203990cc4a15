//! Medication records, intake history and the store that owns them.

mod store;

pub use store::MedicationStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MedicationStatus {
    #[default]
    Active,
    Inactive,
}

/// A medication on the care plan.
///
/// `time` is the daily dose time as `HH:MM`; dates are `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationRecord {
    pub id: String,
    pub name: String,
    pub dosage: String,
    #[serde(default)]
    pub frequency: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default)]
    pub status: MedicationStatus,
    #[serde(default)]
    pub instructions: String,
    #[serde(default = "default_reminders")]
    pub reminders: bool,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_reminders() -> bool {
    true
}

impl MedicationRecord {
    pub fn is_active(&self) -> bool {
        self.status == MedicationStatus::Active
    }
}

/// Fields supplied when adding a medication.
#[derive(Debug, Clone, Default)]
pub struct NewMedication {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub time: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub instructions: String,
    pub notes: String,
}

/// Partial update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationPatch {
    pub name: Option<String>,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub time: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: Option<MedicationStatus>,
    pub instructions: Option<String>,
    pub reminders: Option<bool>,
    pub notes: Option<String>,
}

/// One "taken / not taken" entry in the intake history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationHistoryRecord {
    pub id: String,
    pub medication_id: String,
    pub medication_name: String,
    pub date: String,
    pub time: String,
    pub taken: bool,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

/// Loosely-typed import row; accepts Portuguese or English column names.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MedicationImportRow {
    #[serde(alias = "nome")]
    pub name: String,
    #[serde(alias = "dosagem")]
    pub dosage: String,
    #[serde(alias = "frequencia")]
    pub frequency: String,
    #[serde(alias = "horario")]
    pub time: String,
    #[serde(alias = "dataInicio")]
    pub start_date: String,
    #[serde(alias = "dataFim")]
    pub end_date: String,
    #[serde(alias = "instrucoes")]
    pub instructions: String,
    #[serde(alias = "observacoes")]
    pub notes: String,
}
