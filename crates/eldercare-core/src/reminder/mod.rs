//! Medication and event reminders.

mod evaluator;
mod ledger;
mod scheduler;

pub use evaluator::{DueReminder, ReminderEvaluator, Trigger, EVENT_TITLE, MEDICATION_TITLE};
pub use ledger::FiredLedger;
pub use scheduler::ReminderScheduler;
