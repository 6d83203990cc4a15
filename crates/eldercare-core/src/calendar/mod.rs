//! Calendar events (appointments, visits, activities) and their store.

mod store;

pub use store::EventStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CATEGORY: &str = "Outro";

/// A dated calendar entry. `date` is `YYYY-MM-DD`; times are `HH:MM`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub id: String,
    pub title: String,
    pub date: String,
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_category")]
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

#[derive(Debug, Clone, Default)]
pub struct NewEvent {
    pub title: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub location: Option<String>,
    pub description: String,
    pub category: Option<String>,
}

/// Partial update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPatch {
    pub title: Option<String>,
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
}

/// Loosely-typed import row; accepts Portuguese or English column names.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventImportRow {
    #[serde(alias = "titulo")]
    pub title: String,
    #[serde(alias = "data")]
    pub date: String,
    #[serde(alias = "horaInicio")]
    pub start_time: String,
    #[serde(alias = "horaFim")]
    pub end_time: String,
    #[serde(alias = "local")]
    pub location: String,
    #[serde(alias = "descricao")]
    pub description: String,
    #[serde(alias = "categoria")]
    pub category: String,
}
