//! Integration tests for on-disk persistence of client state.

use std::rc::Rc;

use chrono::NaiveDate;
use eldercare_core::calendar::EventImportRow;
use eldercare_core::medication::{MedicationImportRow, NewMedication};
use eldercare_core::notice::RecordingNotifier;
use eldercare_core::notification::NotificationKind;
use eldercare_core::storage::{keys, Scope};
use eldercare_core::{Database, EventStore, MedicationStore, NotificationFeed, NotificationRecord, StateStore};

fn open(dir: &tempfile::TempDir) -> StateStore {
    StateStore::new(Database::open_at(&dir.path().join("eldercare.db")).unwrap())
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 15).unwrap()
}

#[test]
fn test_medications_survive_reopen_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let saved = {
        let mut meds = MedicationStore::load(open(&dir), Rc::new(RecordingNotifier::new())).unwrap();
        for (name, time) in [("Losartana", "08:00"), ("Metformina", "12:30"), ("Sinvastatina", "21:00")] {
            meds.add(NewMedication {
                name: name.into(),
                dosage: "1 comprimido".into(),
                time: time.into(),
                start_date: "2026-10-01".into(),
                ..Default::default()
            })
            .unwrap();
        }
        let id = meds.all()[1].id.clone();
        meds.record_taken(&id, true, "após o almoço").unwrap();
        meds.all().to_vec()
    };

    let meds = MedicationStore::load(open(&dir), Rc::new(RecordingNotifier::new())).unwrap();
    assert_eq!(meds.all(), saved.as_slice());
    assert_eq!(meds.history().len(), 1);
    assert_eq!(meds.history()[0].medication_name, "Metformina");
}

#[test]
fn test_feed_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let id = {
        let mut feed = NotificationFeed::load(open(&dir)).unwrap();
        feed.add(NotificationRecord::new(NotificationKind::Info, "a", "primeira")).unwrap();
        let second = NotificationRecord::new(NotificationKind::Info, "b", "segunda");
        let id = second.id.clone();
        feed.add(second).unwrap();
        feed.mark_read(&id).unwrap();
        id
    };

    let feed = NotificationFeed::load(open(&dir)).unwrap();
    assert_eq!(feed.len(), 2);
    assert_eq!(feed.items()[0].id, id);
    assert!(feed.items()[0].read);
    assert_eq!(feed.unread_count(), 1);
}

#[test]
fn test_corrupted_collection_is_cleared_on_load() {
    let dir = tempfile::tempdir().unwrap();
    open(&dir)
        .set_raw(Scope::Persistent, keys::EVENTS, "[{\"id\": ")
        .unwrap();

    let state = open(&dir);
    let events = EventStore::load(state.clone(), Rc::new(RecordingNotifier::new())).unwrap();
    assert!(events.all().is_empty());
    assert!(state.get_raw(Scope::Persistent, keys::EVENTS).unwrap().is_none());
}

#[test]
fn test_session_scope_ends_with_the_session() {
    let dir = tempfile::tempdir().unwrap();
    let state = open(&dir);
    state.set_raw(Scope::Session, keys::TOKEN, "tok").unwrap();
    assert_eq!(
        open(&dir).get_raw(Scope::Session, keys::TOKEN).unwrap().as_deref(),
        Some("tok")
    );
    state.database().end_session().unwrap();
    assert!(open(&dir).get_raw(Scope::Session, keys::TOKEN).unwrap().is_none());
}

#[test]
fn test_import_from_portuguese_rows() {
    let dir = tempfile::tempdir().unwrap();
    let state = open(&dir);

    let rows: Vec<MedicationImportRow> = serde_json::from_value(serde_json::json!([
        { "nome": "Omeprazol", "dosagem": "20mg", "horario": "07:30", "dataInicio": "2026-10-01" },
        { "nome": "", "dosagem": "10mg" },
        { "nome": "Vitamina D", "dosagem": "1 gota", "horario": "25:99" }
    ]))
    .unwrap();
    let mut meds = MedicationStore::load(state.clone(), Rc::new(RecordingNotifier::new())).unwrap();
    let imported = meds.import(rows, today()).unwrap();
    assert_eq!(imported.len(), 1);
    assert_eq!(imported[0].name, "Omeprazol");

    let rows: Vec<EventImportRow> = serde_json::from_value(serde_json::json!([
        { "titulo": "Fisioterapia", "horaInicio": "09:00", "categoria": "Saúde" },
        { "titulo": "Sem horário", "data": "2026-10-20" }
    ]))
    .unwrap();
    let mut events = EventStore::load(state, Rc::new(RecordingNotifier::new())).unwrap();
    let imported = events.import(rows, today()).unwrap();
    assert_eq!(imported.len(), 1);
    assert_eq!(imported[0].date, "2026-10-15");
}
