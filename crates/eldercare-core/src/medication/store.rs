//! Persistent medication store.
//!
//! Holds the medication list and intake history in memory and writes the
//! whole collection back under its key after every mutation.

use std::rc::Rc;

use chrono::{NaiveDate, NaiveDateTime, Utc};
use uuid::Uuid;

use super::{
    MedicationHistoryRecord, MedicationImportRow, MedicationPatch, MedicationRecord,
    MedicationStatus, NewMedication,
};
use crate::clock;
use crate::error::{CoreError, Result, ValidationError};
use crate::notice::Notifier;
use crate::storage::{keys, StateStore};

pub struct MedicationStore {
    state: StateStore,
    notifier: Rc<dyn Notifier>,
    medications: Vec<MedicationRecord>,
    history: Vec<MedicationHistoryRecord>,
}

fn required(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(value.to_string())
}

fn optional_date(field: &'static str, value: Option<&str>) -> Result<Option<String>, ValidationError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => clock::normalize_date(field, v).map(Some),
    }
}

fn check_range(start: &str, end: Option<&str>) -> Result<(), ValidationError> {
    if let Some(end) = end {
        if end < start {
            return Err(ValidationError::InvalidRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
    }
    Ok(())
}

impl MedicationStore {
    /// Load medications and history from the state store.
    pub fn load(state: StateStore, notifier: Rc<dyn Notifier>) -> Result<Self> {
        let medications = state.load_or_default(keys::MEDICATIONS)?;
        let history = state.load_or_default(keys::MEDICATION_HISTORY)?;
        Ok(Self {
            state,
            notifier,
            medications,
            history,
        })
    }

    /// Re-read both collections from storage, dropping in-memory state.
    pub fn reload(&mut self) -> Result<()> {
        self.medications = self.state.load_or_default(keys::MEDICATIONS)?;
        self.history = self.state.load_or_default(keys::MEDICATION_HISTORY)?;
        Ok(())
    }

    pub fn all(&self) -> &[MedicationRecord] {
        &self.medications
    }

    pub fn history(&self) -> &[MedicationHistoryRecord] {
        &self.history
    }

    pub fn get(&self, id: &str) -> Option<&MedicationRecord> {
        self.medications.iter().find(|m| m.id == id)
    }

    fn persist_medications(&self) -> Result<()> {
        self.state.save(keys::MEDICATIONS, &self.medications)?;
        Ok(())
    }

    fn persist_history(&self) -> Result<()> {
        self.state.save(keys::MEDICATION_HISTORY, &self.history)?;
        Ok(())
    }

    fn validate(&self, input: &NewMedication) -> Result<MedicationRecord, ValidationError> {
        let name = required("name", &input.name)?;
        let dosage = required("dosage", &input.dosage)?;
        let time = clock::normalize_time("time", &required("time", &input.time)?)?;
        let start_date = clock::normalize_date("startDate", &required("startDate", &input.start_date)?)?;
        let end_date = optional_date("endDate", input.end_date.as_deref())?;
        check_range(&start_date, end_date.as_deref())?;

        let now = Utc::now();
        Ok(MedicationRecord {
            id: Uuid::new_v4().to_string(),
            name,
            dosage,
            frequency: input.frequency.trim().to_string(),
            time,
            start_date,
            end_date,
            status: MedicationStatus::Active,
            instructions: input.instructions.clone(),
            reminders: true,
            notes: input.notes.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Add a new active medication.
    ///
    /// # Errors
    /// Returns a validation error when name, dosage, time or start date are
    /// missing or malformed; nothing is stored in that case.
    pub fn add(&mut self, input: NewMedication) -> Result<MedicationRecord> {
        let record = match self.validate(&input) {
            Ok(record) => record,
            Err(e) => {
                self.notifier.error(&e.to_string());
                return Err(e.into());
            }
        };
        self.medications.push(record.clone());
        self.persist_medications()?;
        self.notifier
            .success(&format!("Medicamento {} adicionado com sucesso!", record.name));
        Ok(record)
    }

    fn apply(mut updated: MedicationRecord, patch: MedicationPatch) -> Result<MedicationRecord, ValidationError> {
        if let Some(name) = patch.name {
            updated.name = required("name", &name)?;
        }
        if let Some(dosage) = patch.dosage {
            updated.dosage = required("dosage", &dosage)?;
        }
        if let Some(frequency) = patch.frequency {
            updated.frequency = frequency;
        }
        if let Some(time) = patch.time {
            updated.time = clock::normalize_time("time", &time)?;
        }
        if let Some(start) = patch.start_date {
            updated.start_date = clock::normalize_date("startDate", &start)?;
        }
        if let Some(end) = patch.end_date {
            updated.end_date = optional_date("endDate", Some(end.as_str()))?;
        }
        check_range(&updated.start_date, updated.end_date.as_deref())?;
        if let Some(status) = patch.status {
            updated.status = status;
        }
        if let Some(instructions) = patch.instructions {
            updated.instructions = instructions;
        }
        if let Some(reminders) = patch.reminders {
            updated.reminders = reminders;
        }
        if let Some(notes) = patch.notes {
            updated.notes = notes;
        }
        Ok(updated)
    }

    /// Apply a partial update. An empty `end_date` clears it.
    pub fn update(&mut self, id: &str, patch: MedicationPatch) -> Result<MedicationRecord> {
        let idx = self
            .medications
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| CoreError::NotFound {
                kind: "medication",
                id: id.to_string(),
            })?;

        let mut updated = match Self::apply(self.medications[idx].clone(), patch) {
            Ok(updated) => updated,
            Err(e) => {
                self.notifier.error(&e.to_string());
                return Err(e.into());
            }
        };
        updated.updated_at = Utc::now();

        self.medications[idx] = updated.clone();
        self.persist_medications()?;
        self.notifier.success("Medicamento atualizado com sucesso!");
        Ok(updated)
    }

    /// Remove a medication. Unknown ids are a no-op returning `None`.
    pub fn delete(&mut self, id: &str) -> Result<Option<MedicationRecord>> {
        let Some(idx) = self.medications.iter().position(|m| m.id == id) else {
            return Ok(None);
        };
        let removed = self.medications.remove(idx);
        self.persist_medications()?;
        self.notifier
            .success(&format!("Medicamento {} removido com sucesso!", removed.name));
        Ok(Some(removed))
    }

    /// Record a dose as taken (or missed) now.
    pub fn record_taken(
        &mut self,
        medication_id: &str,
        taken: bool,
        notes: &str,
    ) -> Result<MedicationHistoryRecord> {
        self.record_taken_at(medication_id, taken, notes, clock::now_local())
    }

    /// Record a dose against an explicit local wall-clock time.
    pub fn record_taken_at(
        &mut self,
        medication_id: &str,
        taken: bool,
        notes: &str,
        at: NaiveDateTime,
    ) -> Result<MedicationHistoryRecord> {
        let Some(medication) = self.get(medication_id) else {
            self.notifier.error("Medicamento não encontrado!");
            return Err(CoreError::NotFound {
                kind: "medication",
                id: medication_id.to_string(),
            });
        };

        let record = MedicationHistoryRecord {
            id: Uuid::new_v4().to_string(),
            medication_id: medication.id.clone(),
            medication_name: medication.name.clone(),
            date: clock::format_date(at.date()),
            time: clock::minute_of(at),
            taken,
            notes: notes.to_string(),
            created_at: Utc::now(),
        };
        let name = medication.name.clone();

        self.history.push(record.clone());
        self.persist_history()?;

        if taken {
            self.notifier
                .success(&format!("Medicamento {name} registrado como tomado!"));
        } else {
            self.notifier
                .warning(&format!("Medicamento {name} registrado como não tomado!"));
        }
        Ok(record)
    }

    /// Intake history of one medication, newest first.
    pub fn history_for(&self, medication_id: &str) -> Vec<MedicationHistoryRecord> {
        let mut records: Vec<_> = self
            .history
            .iter()
            .filter(|r| r.medication_id == medication_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records
    }

    /// Active medications sorted by name.
    pub fn active(&self) -> Vec<MedicationRecord> {
        let mut active: Vec<_> = self
            .medications
            .iter()
            .filter(|m| m.is_active())
            .cloned()
            .collect();
        active.sort_by_key(|m| m.name.to_lowercase());
        active
    }

    /// Active medications whose treatment window covers `date`.
    pub fn for_day(&self, date: NaiveDate) -> Vec<MedicationRecord> {
        let day = clock::format_date(date);
        self.medications
            .iter()
            .filter(|m| m.is_active())
            .filter(|m| m.start_date.as_str() <= day.as_str())
            .filter(|m| m.end_date.as_deref().map_or(true, |end| end >= day.as_str()))
            .cloned()
            .collect()
    }

    /// Import loosely-typed rows. Rows without name and dosage are skipped,
    /// as are rows whose time or dates are present but malformed.
    ///
    /// # Errors
    /// Returns [`ValidationError::EmptyImport`] when nothing usable remains.
    pub fn import(&mut self, rows: Vec<MedicationImportRow>, today: NaiveDate) -> Result<Vec<MedicationRecord>> {
        if rows.is_empty() {
            self.notifier.error("Dados CSV inválidos ou vazios");
            return Err(ValidationError::EmptyImport("medications").into());
        }

        let now = Utc::now();
        let mut imported = Vec::new();
        for row in rows {
            if row.name.trim().is_empty() || row.dosage.trim().is_empty() {
                continue;
            }
            let parsed = (|| -> Result<_, ValidationError> {
                let time = match row.time.trim() {
                    "" => String::new(),
                    t => clock::normalize_time("time", t)?,
                };
                let start_date = match row.start_date.trim() {
                    "" => clock::format_date(today),
                    d => clock::normalize_date("startDate", d)?,
                };
                let end_date = optional_date("endDate", Some(row.end_date.as_str()))?;
                Ok((time, start_date, end_date))
            })();
            let (time, start_date, end_date) = match parsed {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!(name = %row.name, error = %e, "skipping medication import row");
                    continue;
                }
            };

            imported.push(MedicationRecord {
                id: Uuid::new_v4().to_string(),
                name: row.name.trim().to_string(),
                dosage: row.dosage.trim().to_string(),
                frequency: row.frequency,
                time,
                start_date,
                end_date,
                status: MedicationStatus::Active,
                instructions: row.instructions,
                reminders: true,
                notes: row.notes,
                created_at: now,
                updated_at: now,
            });
        }

        if imported.is_empty() {
            self.notifier
                .error("Nenhum medicamento válido encontrado no arquivo CSV");
            return Err(ValidationError::EmptyImport("medications").into());
        }

        self.medications.extend(imported.iter().cloned());
        self.persist_medications()?;
        self.notifier.success(&format!(
            "{} medicamentos importados com sucesso!",
            imported.len()
        ));
        Ok(imported)
    }

    /// Forget every medication and history entry, in memory and on disk.
    pub fn clear(&mut self) -> Result<()> {
        self.medications.clear();
        self.history.clear();
        self.state.remove(keys::MEDICATIONS)?;
        self.state.remove(keys::MEDICATION_HISTORY)?;
        Ok(())
    }
}
