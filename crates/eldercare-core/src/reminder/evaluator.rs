//! Decides which reminders are due at a given wall-clock minute.
//!
//! Pure: no storage, no clock. The scheduler supplies `now` and the current
//! medication and event lists.

use chrono::{Duration, NaiveDateTime};

use crate::calendar::EventRecord;
use crate::clock;
use crate::error::ConfigError;
use crate::medication::MedicationRecord;
use crate::notification::{NotificationData, NotificationKind, NotificationRecord};
use crate::storage::MAX_EVENT_LEAD_MINUTES;

pub const MEDICATION_TITLE: &str = "Lembrete de Medicamento";
pub const EVENT_TITLE: &str = "Lembrete de Evento";

/// Identity of a reminder condition, used to de-duplicate across ticks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Trigger {
    /// Dose time of a medication.
    Medication { id: String, time: String },
    /// Lead window before an event.
    Event { id: String, start_time: String },
}

impl Trigger {
    pub fn key(&self) -> String {
        match self {
            Trigger::Medication { id, time } => format!("medication:{id}@{time}"),
            Trigger::Event { id, start_time } => format!("event:{id}@{start_time}"),
        }
    }
}

/// A reminder whose condition holds, with the notification it produces.
#[derive(Debug, Clone)]
pub struct DueReminder {
    pub trigger: Trigger,
    pub notification: NotificationRecord,
}

#[derive(Debug, Clone, Copy)]
pub struct ReminderEvaluator {
    event_lead: Duration,
}

impl Default for ReminderEvaluator {
    fn default() -> Self {
        Self {
            event_lead: Duration::minutes(30),
        }
    }
}

impl ReminderEvaluator {
    /// # Errors
    ///
    /// Returns an error if the lead time is negative or longer than a day.
    pub fn new(event_lead_minutes: i64) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            key: "reminders.event_lead_minutes".into(),
            message: format!("{event_lead_minutes} is outside 0..={MAX_EVENT_LEAD_MINUTES} minutes"),
        };
        if !(0..=MAX_EVENT_LEAD_MINUTES).contains(&event_lead_minutes) {
            return Err(invalid());
        }
        let event_lead = Duration::try_minutes(event_lead_minutes).ok_or_else(invalid)?;
        Ok(Self { event_lead })
    }

    pub fn event_lead_minutes(&self) -> i64 {
        self.event_lead.num_minutes()
    }

    /// Active medications whose dose time is the current minute.
    pub fn medications_due(&self, now: NaiveDateTime, medications: &[MedicationRecord]) -> Vec<DueReminder> {
        let minute = clock::minute_of(now);
        medications
            .iter()
            .filter(|m| m.is_active() && m.time == minute)
            .map(|m| DueReminder {
                trigger: Trigger::Medication {
                    id: m.id.clone(),
                    time: m.time.clone(),
                },
                notification: NotificationRecord::new(
                    NotificationKind::Medication,
                    MEDICATION_TITLE,
                    format!("Hora de tomar {} - {}", m.name, m.dosage),
                )
                .with_data(NotificationData::Medication {
                    medication_id: m.id.clone(),
                    medication_name: m.name.clone(),
                }),
            })
            .collect()
    }

    /// Events today whose start is within one minute either side of the lead
    /// time, bounds excluded.
    pub fn events_due(&self, now: NaiveDateTime, events: &[EventRecord]) -> Vec<DueReminder> {
        let today = clock::format_date(now.date());
        let slack = Duration::minutes(1);
        let (lower, upper) = (self.event_lead - slack, self.event_lead + slack);
        let lead_min = self.event_lead_minutes();

        events
            .iter()
            .filter(|e| e.date == today)
            .filter_map(|e| {
                let start = match clock::parse_time("startTime", &e.start_time) {
                    Ok(t) => now.date().and_time(t),
                    Err(err) => {
                        tracing::debug!(event = %e.id, error = %err, "event has no usable start time");
                        return None;
                    }
                };
                let until = start - now;
                (until > lower && until < upper).then(|| DueReminder {
                    trigger: Trigger::Event {
                        id: e.id.clone(),
                        start_time: e.start_time.clone(),
                    },
                    notification: NotificationRecord::new(
                        NotificationKind::Event,
                        EVENT_TITLE,
                        format!("{} começa em {lead_min} minutos ({})", e.title, e.start_time),
                    )
                    .with_data(NotificationData::Event {
                        event_id: e.id.clone(),
                        event_title: e.title.clone(),
                    }),
                })
            })
            .collect()
    }

    /// Everything due at `now`, medications first.
    pub fn evaluate(
        &self,
        now: NaiveDateTime,
        medications: &[MedicationRecord],
        events: &[EventRecord],
    ) -> Vec<DueReminder> {
        let mut due = self.medications_due(now, medications);
        due.extend(self.events_due(now, events));
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::medication::MedicationStatus;
    use chrono::{NaiveDate, Utc};

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 15)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn med(name: &str, time: &str, status: MedicationStatus) -> MedicationRecord {
        MedicationRecord {
            id: format!("id-{name}"),
            name: name.into(),
            dosage: "500mg".into(),
            frequency: String::new(),
            time: time.into(),
            start_date: "2026-10-01".into(),
            end_date: None,
            status,
            instructions: String::new(),
            reminders: true,
            notes: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn event(title: &str, date: &str, start: &str) -> EventRecord {
        EventRecord {
            id: format!("id-{title}"),
            title: title.into(),
            date: date.into(),
            start_time: start.into(),
            end_time: String::new(),
            location: None,
            description: String::new(),
            category: "Outro".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn medication_due_at_its_minute() {
        let eval = ReminderEvaluator::default();
        let meds = vec![med("Paracetamol", "07:00", MedicationStatus::Active)];
        let due = eval.medications_due(at(7, 0, 42), &meds);
        assert_eq!(due.len(), 1);
        let n = &due[0].notification;
        assert_eq!(n.kind, NotificationKind::Medication);
        assert_eq!(n.title, MEDICATION_TITLE);
        assert_eq!(n.message, "Hora de tomar Paracetamol - 500mg");
        assert!(!n.read);
        assert!(eval.medications_due(at(7, 1, 0), &meds).is_empty());
        assert!(eval.medications_due(at(6, 59, 59), &meds).is_empty());
    }

    #[test]
    fn inactive_medication_never_due() {
        let eval = ReminderEvaluator::default();
        let meds = vec![med("Paracetamol", "07:00", MedicationStatus::Inactive)];
        assert!(eval.medications_due(at(7, 0, 0), &meds).is_empty());
    }

    #[test]
    fn event_window_is_exclusive() {
        let eval = ReminderEvaluator::default();
        let events = vec![event("Consulta", "2026-10-15", "14:00")];
        assert_eq!(eval.events_due(at(13, 30, 0), &events).len(), 1);
        assert_eq!(eval.events_due(at(13, 29, 30), &events).len(), 1);
        assert_eq!(eval.events_due(at(13, 30, 59), &events).len(), 1);
        assert!(eval.events_due(at(13, 29, 0), &events).is_empty());
        assert!(eval.events_due(at(13, 31, 0), &events).is_empty());
        assert!(eval.events_due(at(13, 0, 0), &events).is_empty());
    }

    #[test]
    fn event_message_mentions_title_and_start() {
        let eval = ReminderEvaluator::default();
        let events = vec![event("Consulta", "2026-10-15", "14:00")];
        let due = eval.events_due(at(13, 30, 0), &events);
        assert_eq!(due[0].notification.title, EVENT_TITLE);
        assert_eq!(
            due[0].notification.message,
            "Consulta começa em 30 minutos (14:00)"
        );
    }

    #[test]
    fn events_on_other_days_are_ignored() {
        let eval = ReminderEvaluator::default();
        let events = vec![
            event("Amanhã", "2026-10-16", "14:00"),
            event("Sem hora", "2026-10-15", ""),
        ];
        assert!(eval.events_due(at(13, 30, 0), &events).is_empty());
    }

    #[test]
    fn lead_time_is_configurable() {
        let eval = ReminderEvaluator::new(60).unwrap();
        let events = vec![event("Consulta", "2026-10-15", "14:00")];
        assert_eq!(eval.events_due(at(13, 0, 0), &events).len(), 1);
        assert!(eval.events_due(at(13, 30, 0), &events).is_empty());
    }

    #[test]
    fn lead_time_outside_one_day_is_rejected() {
        assert!(ReminderEvaluator::new(i64::MAX).is_err());
        assert!(ReminderEvaluator::new(-1).is_err());
        assert_eq!(ReminderEvaluator::new(0).unwrap().event_lead_minutes(), 0);
    }

    #[test]
    fn triggers_have_stable_keys() {
        let t = Trigger::Medication {
            id: "m1".into(),
            time: "07:00".into(),
        };
        assert_eq!(t.key(), "medication:m1@07:00");
    }
}
