//! Per-day record of reminders already fired.
//!
//! Persisted under `firedReminders` so that a restarted scheduler does not
//! repeat a reminder it already showed within the same minute or window.
//! Entries from earlier days are dropped on the first tick of a new day.
//! The ledger only moves forward: a tick dated before the recorded day
//! leaves it untouched.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Trigger;
use crate::clock;
use crate::error::Result;
use crate::storage::{keys, StateStore};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct LedgerDoc {
    day: String,
    fired: BTreeSet<String>,
}

pub struct FiredLedger {
    state: StateStore,
    doc: LedgerDoc,
}

impl FiredLedger {
    pub fn load(state: StateStore) -> Result<Self> {
        let doc = state.load_or_default(keys::FIRED_REMINDERS)?;
        Ok(Self { state, doc })
    }

    /// Day the recorded triggers belong to, if any were recorded.
    pub fn day(&self) -> Option<&str> {
        (!self.doc.day.is_empty()).then_some(self.doc.day.as_str())
    }

    pub fn len(&self) -> usize {
        self.doc.fired.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc.fired.is_empty()
    }

    /// Switch to `date`, forgetting triggers of earlier days. Returns false,
    /// changing nothing, when `date` is before the recorded day.
    pub fn roll_to(&mut self, date: NaiveDate) -> Result<bool> {
        let recorded = NaiveDate::parse_from_str(&self.doc.day, "%Y-%m-%d").ok();
        if recorded.is_some_and(|recorded| date < recorded) {
            tracing::debug!(day = %self.doc.day, requested = %date, "not rolling fired reminders back");
            return Ok(false);
        }

        let day = clock::format_date(date);
        if self.doc.day != day {
            if !self.doc.fired.is_empty() {
                tracing::debug!(from = %self.doc.day, to = %day, dropped = self.doc.fired.len(), "pruning fired reminders");
            }
            self.doc = LedgerDoc {
                day,
                fired: BTreeSet::new(),
            };
            self.persist()?;
        }
        Ok(true)
    }

    pub fn contains(&self, trigger: &Trigger) -> bool {
        self.doc.fired.contains(&trigger.key())
    }

    /// Record a trigger. Returns false if it was already recorded.
    pub fn record(&mut self, trigger: &Trigger) -> Result<bool> {
        if !self.doc.fired.insert(trigger.key()) {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.doc = LedgerDoc::default();
        self.state.remove(keys::FIRED_REMINDERS)?;
        Ok(())
    }

    fn persist(&self) -> Result<()> {
        self.state.save(keys::FIRED_REMINDERS, &self.doc)?;
        Ok(())
    }
}
