//! Integration tests for reminder evaluation through the full application state.

use std::rc::Rc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use eldercare_core::calendar::NewEvent;
use eldercare_core::medication::{MedicationPatch, MedicationStatus, NewMedication};
use eldercare_core::notice::RecordingNotifier;
use eldercare_core::notification::{MemorySink, NotificationData, NotificationKind, Permission};
use eldercare_core::error::{ApiError, CoreError};
use eldercare_core::{App, Config, ReminderScheduler, StateStore};
use std::cell::RefCell;

type Delivered = Rc<RefCell<Vec<(String, String)>>>;

fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 15)
        .unwrap()
        .and_hms_opt(h, m, s)
        .unwrap()
}

fn seven_am() -> NaiveDateTime {
    at(7, 0, 10)
}

fn app_with(config: Config) -> (App, Delivered) {
    let sink = MemorySink::new(Permission::Granted);
    let delivered = sink.delivered();
    let mut app = App::with_parts(
        config,
        StateStore::in_memory().unwrap(),
        Rc::new(RecordingNotifier::new()),
        Box::new(sink),
    )
    .unwrap();
    assert!(app.notifications.delivery.request_permission());
    (app, delivered)
}

fn add_paracetamol(app: &mut App) -> String {
    app.medications
        .add(NewMedication {
            name: "Paracetamol".into(),
            dosage: "750mg".into(),
            frequency: "8/8h".into(),
            time: "07:00".into(),
            start_date: "2026-10-01".into(),
            ..Default::default()
        })
        .unwrap()
        .id
}

fn add_consulta(app: &mut App) -> String {
    app.events
        .add(NewEvent {
            title: "Consulta".into(),
            date: "2026-10-15".into(),
            start_time: "14:00".into(),
            end_time: "15:00".into(),
            category: Some("Consulta".into()),
            ..Default::default()
        })
        .unwrap()
        .id
}

#[test]
fn test_medication_reminder_fires_at_dose_time() {
    let (mut app, delivered) = app_with(Config::default());
    let id = add_paracetamol(&mut app);
    let mut sched = ReminderScheduler::from_config(&app.config, app.state.clone()).unwrap();

    let fired = sched.tick(&mut app, at(7, 0, 0)).unwrap();

    assert_eq!(fired.len(), 1);
    let n = &app.notifications.feed.items()[0];
    assert_eq!(n.kind, NotificationKind::Medication);
    assert_eq!(n.title, "Lembrete de Medicamento");
    assert!(n.message.contains("Paracetamol"));
    assert!(!n.read);
    assert_eq!(
        n.data,
        Some(NotificationData::Medication {
            medication_id: id,
            medication_name: "Paracetamol".into()
        })
    );
    assert_eq!(delivered.borrow().len(), 1);
}

#[test]
fn test_inactive_medication_is_silent() {
    let (mut app, _) = app_with(Config::default());
    let id = add_paracetamol(&mut app);
    app.medications
        .update(
            &id,
            MedicationPatch {
                status: Some(MedicationStatus::Inactive),
                ..Default::default()
            },
        )
        .unwrap();
    let mut sched = ReminderScheduler::from_config(&app.config, app.state.clone()).unwrap();

    assert!(sched.tick(&mut app, at(7, 0, 0)).unwrap().is_empty());
    assert!(app.notifications.feed.is_empty());
}

#[test]
fn test_event_reminder_thirty_minutes_ahead() {
    let (mut app, _) = app_with(Config::default());
    add_consulta(&mut app);
    let mut sched = ReminderScheduler::from_config(&app.config, app.state.clone()).unwrap();

    assert!(sched.tick(&mut app, at(13, 0, 0)).unwrap().is_empty());
    let fired = sched.tick(&mut app, at(13, 30, 0)).unwrap();

    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].kind, NotificationKind::Event);
    assert_eq!(fired[0].title, "Lembrete de Evento");
    assert_eq!(fired[0].message, "Consulta começa em 30 minutos (14:00)");
    assert_eq!(app.notifications.feed.len(), 1);
}

#[test]
fn test_dedupe_suppresses_repeats_within_the_window() {
    let (mut app, delivered) = app_with(Config::default());
    add_paracetamol(&mut app);
    add_consulta(&mut app);
    let mut sched = ReminderScheduler::from_config(&app.config, app.state.clone()).unwrap();

    for now in [at(7, 0, 0), at(7, 0, 30), at(13, 29, 30), at(13, 30, 0), at(13, 30, 30)] {
        sched.tick(&mut app, now).unwrap();
    }

    assert_eq!(app.notifications.feed.len(), 2);
    assert_eq!(delivered.borrow().len(), 2);
}

#[test]
fn test_dedupe_off_refires_every_matching_tick() {
    let mut config = Config::default();
    config.reminders.dedupe = false;
    let (mut app, _) = app_with(config);
    add_paracetamol(&mut app);
    let mut sched = ReminderScheduler::from_config(&app.config, app.state.clone()).unwrap();

    sched.tick(&mut app, at(7, 0, 0)).unwrap();
    sched.tick(&mut app, at(7, 0, 30)).unwrap();

    assert_eq!(app.notifications.feed.len(), 2);
}

#[test]
fn test_next_day_fires_again() {
    let (mut app, _) = app_with(Config::default());
    add_paracetamol(&mut app);
    let mut sched = ReminderScheduler::from_config(&app.config, app.state.clone()).unwrap();

    sched.tick(&mut app, at(7, 0, 0)).unwrap();
    let tomorrow = NaiveDate::from_ymd_opt(2026, 10, 16)
        .unwrap()
        .and_hms_opt(7, 0, 0)
        .unwrap();
    assert_eq!(sched.tick(&mut app, tomorrow).unwrap().len(), 1);
}

#[test]
fn test_denied_permission_still_fills_the_feed() {
    let sink = MemorySink::new(Permission::Denied);
    let delivered = sink.delivered();
    let mut app = App::with_parts(
        Config::default(),
        StateStore::in_memory().unwrap(),
        Rc::new(RecordingNotifier::new()),
        Box::new(sink),
    )
    .unwrap();
    assert!(!app.notifications.delivery.request_permission());
    add_paracetamol(&mut app);
    let mut sched = ReminderScheduler::from_config(&app.config, app.state.clone()).unwrap();

    sched.tick(&mut app, at(7, 0, 0)).unwrap();

    assert_eq!(app.notifications.feed.len(), 1);
    assert!(delivered.borrow().is_empty());
}

#[test]
fn test_failing_sink_still_fills_the_feed() {
    let mut app = App::with_parts(
        Config::default(),
        StateStore::in_memory().unwrap(),
        Rc::new(RecordingNotifier::new()),
        Box::new(MemorySink::failing()),
    )
    .unwrap();
    assert!(app.notifications.delivery.request_permission());
    add_paracetamol(&mut app);
    let mut sched = ReminderScheduler::from_config(&app.config, app.state.clone()).unwrap();

    let fired = sched.tick(&mut app, at(7, 0, 0));

    assert_eq!(fired.unwrap().len(), 1);
    assert_eq!(app.notifications.feed.len(), 1);
    assert_eq!(app.notifications.feed.unread_count(), 1);
}

#[test]
fn test_backdated_tick_does_not_reset_todays_reminders() {
    let (mut app, delivered) = app_with(Config::default());
    add_paracetamol(&mut app);
    let mut sched = ReminderScheduler::from_config(&app.config, app.state.clone()).unwrap();
    let yesterday = NaiveDate::from_ymd_opt(2026, 10, 14)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap();

    assert_eq!(sched.tick(&mut app, at(7, 0, 0)).unwrap().len(), 1);
    assert!(sched.tick(&mut app, yesterday).unwrap().is_empty());
    assert!(sched.tick(&mut app, at(7, 0, 30)).unwrap().is_empty());

    let mut restarted = ReminderScheduler::from_config(&app.config, app.state.clone()).unwrap();
    assert!(restarted.tick(&mut app, at(7, 0, 45)).unwrap().is_empty());
    assert_eq!(app.notifications.feed.len(), 1);
    assert_eq!(delivered.borrow().len(), 1);
}

#[test]
fn test_bad_api_url_leaves_offline_features_working() {
    let mut config = Config::default();
    config.set("api.base_url", "localhost/api").unwrap();
    let (mut app, _) = app_with(config);
    add_paracetamol(&mut app);
    let mut sched = ReminderScheduler::from_config(&app.config, app.state.clone()).unwrap();

    assert_eq!(sched.tick(&mut app, at(7, 0, 0)).unwrap().len(), 1);
    assert_eq!(app.notifications.feed.len(), 1);
    assert_eq!(app.medications.all().len(), 1);
}

#[tokio::test]
async fn test_bad_api_url_fails_backend_calls() {
    let mut config = Config::default();
    config.api.base_url = "localhost/api".into();
    let (mut app, _) = app_with(config);

    let err = app.login("ana@example.com", "secret", false).await.unwrap_err();
    assert!(matches!(err, CoreError::Api(ApiError::InvalidUrl(_))));
    assert!(!app.auth.is_authenticated());
}

#[tokio::test]
async fn test_run_ticks_immediately_and_stops_on_shutdown() {
    let mut config = Config::default();
    config.reminders.interval_secs = 1;
    let (mut app, _) = app_with(config);
    add_paracetamol(&mut app);
    let mut sched = ReminderScheduler::from_config(&app.config, app.state.clone())
        .unwrap()
        .with_clock(seven_am);
    let (tx, rx) = tokio::sync::watch::channel(false);

    let stop = async {
        tokio::time::sleep(Duration::from_millis(200)).await;
        tx.send(true).unwrap();
    };
    let (result, ()) = tokio::join!(sched.run(&mut app, rx), stop);

    result.unwrap();
    assert_eq!(app.notifications.feed.len(), 1);
}
