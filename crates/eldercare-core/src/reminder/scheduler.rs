//! Periodic reminder evaluation.
//!
//! One tick reads the current medications and events, evaluates them at the
//! local wall clock and publishes whatever is due. With de-duplication on,
//! a trigger fires at most once per day; with it off every matching tick
//! publishes again.

use std::time::Duration;

use chrono::NaiveDateTime;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use super::{FiredLedger, ReminderEvaluator};
use crate::app::App;
use crate::calendar::EventRecord;
use crate::clock;
use crate::error::Result;
use crate::medication::MedicationRecord;
use crate::notification::{NotificationCenter, NotificationRecord};
use crate::storage::{Config, StateStore};

pub struct ReminderScheduler {
    evaluator: ReminderEvaluator,
    ledger: Option<FiredLedger>,
    interval: Duration,
    clock: fn() -> NaiveDateTime,
}

impl ReminderScheduler {
    pub fn new(evaluator: ReminderEvaluator, ledger: Option<FiredLedger>, interval: Duration) -> Self {
        Self {
            evaluator,
            ledger,
            interval,
            clock: clock::now_local,
        }
    }

    pub fn from_config(config: &Config, state: StateStore) -> Result<Self> {
        let ledger = if config.reminders.dedupe {
            Some(FiredLedger::load(state)?)
        } else {
            None
        };
        Ok(Self::new(
            ReminderEvaluator::new(config.reminders.event_lead_minutes)?,
            ledger,
            config.tick_interval(),
        ))
    }

    /// Replace the wall clock used by [`run`](Self::run).
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn dedupes(&self) -> bool {
        self.ledger.is_some()
    }

    /// Evaluate `app` once at `now` and publish what is due. Returns the
    /// published notifications.
    pub fn tick(&mut self, app: &mut App, now: NaiveDateTime) -> Result<Vec<NotificationRecord>> {
        let App {
            medications,
            events,
            notifications,
            ..
        } = app;
        self.fire(now, medications.all(), events.all(), notifications)
    }

    /// Evaluate the given records at `now`, publishing through `center`.
    pub fn fire(
        &mut self,
        now: NaiveDateTime,
        medications: &[MedicationRecord],
        events: &[EventRecord],
        center: &mut NotificationCenter,
    ) -> Result<Vec<NotificationRecord>> {
        // A tick dated before the ledger's day is evaluated without it.
        let tracking = match self.ledger.as_mut() {
            Some(ledger) => ledger.roll_to(now.date())?,
            None => false,
        };
        let mut ledger = if tracking { self.ledger.as_mut() } else { None };

        let mut published = Vec::new();
        for due in self.evaluator.evaluate(now, medications, events) {
            if ledger.as_ref().is_some_and(|l| l.contains(&due.trigger)) {
                tracing::trace!(trigger = %due.trigger.key(), "already fired today");
                continue;
            }

            center.publish(due.notification.clone())?;
            tracing::info!(trigger = %due.trigger.key(), title = %due.notification.title, "reminder fired");

            if let Some(ledger) = ledger.as_mut() {
                ledger.record(&due.trigger)?;
            }
            published.push(due.notification);
        }
        Ok(published)
    }

    /// Tick `app` at the configured interval until `shutdown` flips to true
    /// or its sender is dropped. The first tick happens immediately.
    ///
    /// Stores are reloaded before every tick so edits made by other
    /// processes are seen. A failing tick is logged and the loop continues.
    pub async fn run(&mut self, app: &mut App, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(interval_secs = self.interval.as_secs(), dedupe = self.dedupes(), "reminder scheduler started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = app.reload() {
                        tracing::warn!(error = %e, "could not reload state before tick");
                        continue;
                    }
                    let now = (self.clock)();
                    match self.tick(app, now) {
                        Ok(fired) if !fired.is_empty() => {
                            tracing::debug!(count = fired.len(), at = %now, "tick published reminders");
                        }
                        Ok(_) => {}
                        Err(e) => tracing::error!(error = %e, "reminder tick failed"),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("reminder scheduler stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, CoreError};
    use crate::notification::{Delivery, MemorySink, NotificationFeed, Permission};
    use chrono::{NaiveDate, Utc};

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 15)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn center(state: &StateStore) -> NotificationCenter {
        let delivery = Delivery::new(Box::new(MemorySink::new(Permission::Granted)), state.clone(), true, "");
        NotificationCenter::new(NotificationFeed::load(state.clone()).unwrap(), delivery)
    }

    fn paracetamol() -> MedicationRecord {
        MedicationRecord {
            id: "m1".into(),
            name: "Paracetamol".into(),
            dosage: "500mg".into(),
            frequency: "Diário".into(),
            time: "07:00".into(),
            start_date: "2026-10-01".into(),
            end_date: None,
            status: Default::default(),
            instructions: String::new(),
            reminders: true,
            notes: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn dedupe_fires_once_per_minute() {
        let state = StateStore::in_memory().unwrap();
        let mut center = center(&state);
        let ledger = FiredLedger::load(state.clone()).unwrap();
        let mut sched = ReminderScheduler::new(ReminderEvaluator::default(), Some(ledger), Duration::from_secs(20));
        let meds = vec![paracetamol()];

        assert_eq!(sched.fire(at(7, 0, 0), &meds, &[], &mut center).unwrap().len(), 1);
        assert!(sched.fire(at(7, 0, 20), &meds, &[], &mut center).unwrap().is_empty());
        assert!(sched.fire(at(7, 0, 40), &meds, &[], &mut center).unwrap().is_empty());
        assert_eq!(center.feed.len(), 1);
    }

    #[test]
    fn without_dedupe_every_matching_tick_fires() {
        let state = StateStore::in_memory().unwrap();
        let mut center = center(&state);
        let mut sched = ReminderScheduler::new(ReminderEvaluator::default(), None, Duration::from_secs(20));
        let meds = vec![paracetamol()];

        for s in [0, 20, 40] {
            sched.fire(at(7, 0, s), &meds, &[], &mut center).unwrap();
        }
        assert_eq!(center.feed.len(), 3);
    }

    #[test]
    fn ledger_survives_a_restart() {
        let state = StateStore::in_memory().unwrap();
        let mut center = center(&state);
        let meds = vec![paracetamol()];

        let mut first = ReminderScheduler::from_config(&Config::default(), state.clone()).unwrap();
        first.fire(at(7, 0, 5), &meds, &[], &mut center).unwrap();

        let mut second = ReminderScheduler::from_config(&Config::default(), state.clone()).unwrap();
        assert!(second.fire(at(7, 0, 45), &meds, &[], &mut center).unwrap().is_empty());
        assert_eq!(center.feed.len(), 1);
    }

    #[test]
    fn from_config_honours_dedupe_switch() {
        let state = StateStore::in_memory().unwrap();
        let mut cfg = Config::default();
        cfg.reminders.dedupe = false;
        cfg.reminders.interval_secs = 5;
        let sched = ReminderScheduler::from_config(&cfg, state).unwrap();
        assert!(!sched.dedupes());
        assert_eq!(sched.interval(), Duration::from_secs(5));
    }

    #[test]
    fn from_config_reports_unusable_event_lead() {
        let mut cfg = Config::default();
        cfg.reminders.event_lead_minutes = i64::MAX;
        let err = ReminderScheduler::from_config(&cfg, StateStore::in_memory().unwrap()).err().unwrap();
        assert!(matches!(err, CoreError::Config(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn backdated_tick_keeps_todays_record() {
        let state = StateStore::in_memory().unwrap();
        let mut center = center(&state);
        let ledger = FiredLedger::load(state.clone()).unwrap();
        let mut sched = ReminderScheduler::new(ReminderEvaluator::default(), Some(ledger), Duration::from_secs(20));
        let meds = vec![paracetamol()];
        let yesterday = NaiveDate::from_ymd_opt(2026, 10, 14)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();

        assert_eq!(sched.fire(at(7, 0, 0), &meds, &[], &mut center).unwrap().len(), 1);
        sched.fire(yesterday, &meds, &[], &mut center).unwrap();
        assert!(sched.fire(at(7, 0, 30), &meds, &[], &mut center).unwrap().is_empty());
        assert_eq!(center.feed.len(), 1);
    }
}
