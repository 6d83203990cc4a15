//! Persistent calendar event store.

use std::rc::Rc;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use super::{EventImportRow, EventPatch, EventRecord, NewEvent, DEFAULT_CATEGORY};
use crate::clock;
use crate::error::{CoreError, Result, ValidationError};
use crate::notice::Notifier;
use crate::storage::{keys, StateStore};

pub struct EventStore {
    state: StateStore,
    notifier: Rc<dyn Notifier>,
    events: Vec<EventRecord>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn optional_time(field: &'static str, value: &str) -> Result<String, ValidationError> {
    match value.trim() {
        "" => Ok(String::new()),
        v => clock::normalize_time(field, v),
    }
}

fn by_date_then_time(a: &EventRecord, b: &EventRecord) -> std::cmp::Ordering {
    a.date
        .cmp(&b.date)
        .then_with(|| a.start_time.cmp(&b.start_time))
}

impl EventStore {
    pub fn load(state: StateStore, notifier: Rc<dyn Notifier>) -> Result<Self> {
        let events = state.load_or_default(keys::EVENTS)?;
        Ok(Self {
            state,
            notifier,
            events,
        })
    }

    pub fn reload(&mut self) -> Result<()> {
        self.events = self.state.load_or_default(keys::EVENTS)?;
        Ok(())
    }

    pub fn all(&self) -> &[EventRecord] {
        &self.events
    }

    pub fn get(&self, id: &str) -> Option<&EventRecord> {
        self.events.iter().find(|e| e.id == id)
    }

    fn persist(&self) -> Result<()> {
        self.state.save(keys::EVENTS, &self.events)?;
        Ok(())
    }

    fn validate(input: NewEvent) -> Result<EventRecord, ValidationError> {
        let title = input.title.trim().to_string();
        if title.is_empty() {
            return Err(ValidationError::MissingField("title"));
        }
        if input.date.trim().is_empty() {
            return Err(ValidationError::MissingField("date"));
        }
        if input.start_time.trim().is_empty() {
            return Err(ValidationError::MissingField("startTime"));
        }
        let date = clock::normalize_date("date", &input.date)?;
        let start_time = clock::normalize_time("startTime", &input.start_time)?;
        let end_time = optional_time("endTime", &input.end_time)?;

        let now = Utc::now();
        Ok(EventRecord {
            id: Uuid::new_v4().to_string(),
            title,
            date,
            start_time,
            end_time,
            location: non_empty(input.location),
            description: input.description,
            category: non_empty(input.category).unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            created_at: now,
            updated_at: now,
        })
    }

    /// Add an event.
    ///
    /// # Errors
    /// Title, date and start time are required and must be well-formed.
    pub fn add(&mut self, input: NewEvent) -> Result<EventRecord> {
        let event = match Self::validate(input) {
            Ok(event) => event,
            Err(e) => {
                self.notifier.error(&e.to_string());
                return Err(e.into());
            }
        };
        self.events.push(event.clone());
        self.persist()?;
        self.notifier
            .success(&format!("Evento \"{}\" adicionado com sucesso!", event.title));
        Ok(event)
    }

    fn apply(mut updated: EventRecord, patch: EventPatch) -> Result<EventRecord, ValidationError> {
        if let Some(title) = patch.title {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(ValidationError::MissingField("title"));
            }
            updated.title = title;
        }
        if let Some(date) = patch.date {
            updated.date = clock::normalize_date("date", &date)?;
        }
        if let Some(start) = patch.start_time {
            updated.start_time = clock::normalize_time("startTime", &start)?;
        }
        if let Some(end) = patch.end_time {
            updated.end_time = optional_time("endTime", &end)?;
        }
        if let Some(location) = patch.location {
            updated.location = non_empty(Some(location));
        }
        if let Some(description) = patch.description {
            updated.description = description;
        }
        if let Some(category) = patch.category {
            updated.category = non_empty(Some(category)).unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
        }
        Ok(updated)
    }

    pub fn update(&mut self, id: &str, patch: EventPatch) -> Result<EventRecord> {
        let idx = self
            .events
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| CoreError::NotFound {
                kind: "event",
                id: id.to_string(),
            })?;

        let mut updated = match Self::apply(self.events[idx].clone(), patch) {
            Ok(updated) => updated,
            Err(e) => {
                self.notifier.error(&e.to_string());
                return Err(e.into());
            }
        };
        updated.updated_at = Utc::now();

        self.events[idx] = updated.clone();
        self.persist()?;
        self.notifier.success("Evento atualizado com sucesso!");
        Ok(updated)
    }

    /// Remove an event. Unknown ids are a no-op returning `None`.
    pub fn delete(&mut self, id: &str) -> Result<Option<EventRecord>> {
        let Some(idx) = self.events.iter().position(|e| e.id == id) else {
            return Ok(None);
        };
        let removed = self.events.remove(idx);
        self.persist()?;
        self.notifier
            .success(&format!("Evento \"{}\" removido com sucesso!", removed.title));
        Ok(Some(removed))
    }

    /// Events on `date`, by start time.
    pub fn for_day(&self, date: NaiveDate) -> Vec<EventRecord> {
        let day = clock::format_date(date);
        let mut events: Vec<_> = self.events.iter().filter(|e| e.date == day).cloned().collect();
        events.sort_by(|a, b| a.start_time.cmp(&b.start_time));
        events
    }

    /// Events between `start` and `end` inclusive, by date then start time.
    pub fn in_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<EventRecord> {
        let (start, end) = (clock::format_date(start), clock::format_date(end));
        let mut events: Vec<_> = self
            .events
            .iter()
            .filter(|e| e.date >= start && e.date <= end)
            .cloned()
            .collect();
        events.sort_by(by_date_then_time);
        events
    }

    pub fn by_category(&self, category: &str) -> Vec<EventRecord> {
        let mut events: Vec<_> = self
            .events
            .iter()
            .filter(|e| e.category == category)
            .cloned()
            .collect();
        events.sort_by(by_date_then_time);
        events
    }

    /// Import loosely-typed rows; rows need a title, a date and a start time.
    pub fn import(&mut self, rows: Vec<EventImportRow>, today: NaiveDate) -> Result<Vec<EventRecord>> {
        if rows.is_empty() {
            self.notifier.error("Dados CSV inválidos ou vazios");
            return Err(ValidationError::EmptyImport("events").into());
        }

        let mut imported = Vec::new();
        for row in rows {
            let date = match row.date.trim() {
                "" => clock::format_date(today),
                d => d.to_string(),
            };
            let input = NewEvent {
                title: row.title,
                date,
                start_time: row.start_time,
                end_time: row.end_time,
                location: Some(row.location),
                description: row.description,
                category: Some(row.category),
            };
            match Self::validate(input) {
                Ok(event) => imported.push(event),
                Err(e) => tracing::debug!(error = %e, "skipping event import row"),
            }
        }

        if imported.is_empty() {
            self.notifier
                .error("Nenhum evento válido encontrado no arquivo CSV");
            return Err(ValidationError::EmptyImport("events").into());
        }

        self.events.extend(imported.iter().cloned());
        self.persist()?;
        self.notifier
            .success(&format!("{} eventos importados com sucesso!", imported.len()));
        Ok(imported)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.events.clear();
        self.state.remove(keys::EVENTS)?;
        Ok(())
    }
}
