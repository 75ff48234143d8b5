use booking_core::db::open_db_in_memory;
use booking_core::{
    Event, EventRepository, EventStore, EventValidationError, RepoError, SqliteEventRepository,
};
use serde_json::json;

fn booked(id: &str, date: &str, participants: &[&str]) -> Event {
    Event::new(id, "Nunta - Chisinau", date).with_participants(participants.iter().copied())
}

#[test]
fn create_and_get_roundtrip_keeps_attributes() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::try_new(&conn).unwrap();

    let mut event = booked("evt-1", "2024-05-01", &["Ana", "Mihai"]);
    event.color = Some("#ff00aa".to_string());
    event
        .attributes
        .insert("location".to_string(), json!("Chisinau"));
    repo.create_event(&event).unwrap();

    let loaded = repo.get_event("evt-1").unwrap().unwrap();
    assert_eq!(loaded.title, "Nunta - Chisinau");
    assert_eq!(loaded.start, "2024-05-01");
    assert!(loaded.all_day);
    assert_eq!(loaded.color.as_deref(), Some("#ff00aa"));
    assert_eq!(loaded.attributes.get("location"), Some(&json!("Chisinau")));
    assert_eq!(loaded.participants(), vec!["Ana", "Mihai"]);
    assert!(loaded.created_at.is_some());
    assert_eq!(loaded.created_at, loaded.updated_at);
}

#[test]
fn create_with_existing_id_returns_already_exists() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::try_new(&conn).unwrap();

    repo.create_event(&booked("evt-1", "2024-05-01", &[])).unwrap();
    let err = repo
        .create_event(&booked("evt-1", "2024-05-02", &[]))
        .unwrap_err();
    assert!(matches!(err, RepoError::AlreadyExists(id) if id == "evt-1"));
}

#[test]
fn create_rejects_blank_date() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::try_new(&conn).unwrap();

    let err = repo.create_event(&booked("evt-1", " ", &[])).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(EventValidationError::BlankStart)
    ));
}

#[test]
fn update_replaces_fields_and_attributes() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::try_new(&conn).unwrap();

    let mut event = booked("evt-1", "2024-05-01", &["Ana"]);
    event.attributes.insert("price".to_string(), json!("500"));
    repo.create_event(&event).unwrap();

    let replacement = booked("evt-1", "2024-05-03", &["Ion"]);
    repo.update_event(&replacement).unwrap();

    let loaded = repo.get_event("evt-1").unwrap().unwrap();
    assert_eq!(loaded.start, "2024-05-03");
    assert_eq!(loaded.participants(), vec!["Ion"]);
    assert!(loaded.attributes.get("price").is_none());
}

#[test]
fn update_and_delete_missing_event_return_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::try_new(&conn).unwrap();

    let err = repo
        .update_event(&booked("ghost", "2024-05-01", &[]))
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == "ghost"));

    let err = repo.delete_event("ghost").unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == "ghost"));
}

#[test]
fn delete_removes_row() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::try_new(&conn).unwrap();

    repo.create_event(&booked("evt-1", "2024-05-01", &[])).unwrap();
    repo.delete_event("evt-1").unwrap();
    assert!(repo.get_event("evt-1").unwrap().is_none());
}

#[test]
fn list_orders_by_date_then_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::try_new(&conn).unwrap();

    repo.create_event(&booked("b", "2024-05-02", &[])).unwrap();
    repo.create_event(&booked("c", "2024-05-01", &[])).unwrap();
    repo.create_event(&booked("a", "2024-05-02", &[])).unwrap();

    let ids: Vec<String> = repo
        .list_events()
        .unwrap()
        .into_iter()
        .map(|event| event.id)
        .collect();
    assert_eq!(ids, vec!["c", "a", "b"]);
}

#[test]
fn events_by_date_filters_exactly_in_insertion_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteEventRepository::try_new(&conn).unwrap();

    repo.create_event(&booked("z", "2024-05-01", &["Ana"])).unwrap();
    repo.create_event(&booked("other-day", "2024-05-02", &["Ana"]))
        .unwrap();
    repo.create_event(&booked("a", "2024-05-01", &["Ion"])).unwrap();

    let rows = repo.events_by_date("2024-05-01").unwrap();
    let ids: Vec<&str> = rows.iter().map(|row| row.id.as_str()).collect();
    assert_eq!(ids, vec!["z", "a"]);
    assert!(rows[0]
        .attributes_blob
        .as_deref()
        .unwrap()
        .contains("Ana"));
}

#[test]
fn malformed_data_column_degrades_to_empty_attributes() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO events (id, title, start, allDay, color, data, createdAt, updatedAt)
         VALUES ('bad', 't', '2024-05-01', 1, NULL, '{oops', 'x', 'x'),
                ('num', 't', '2024-05-01', 0, NULL, 17, 'x', 'x');",
        [],
    )
    .unwrap();
    let repo = SqliteEventRepository::try_new(&conn).unwrap();

    let bad = repo.get_event("bad").unwrap().unwrap();
    assert!(bad.attributes.is_empty());
    assert!(bad.color.is_none());

    let num = repo.get_event("num").unwrap().unwrap();
    assert!(num.attributes.is_empty());
    assert!(!num.all_day);

    let rows = repo.events_by_date("2024-05-01").unwrap();
    assert_eq!(rows[0].attributes_blob.as_deref(), Some("{oops"));
    assert_eq!(rows[1].attributes_blob.as_deref(), Some("17"));
    assert_eq!(repo.list_events().unwrap().len(), 2);
}
