use cards_core::db::open_db_in_memory;
use cards_core::{
    CardFilter, CardService, CardServiceError, CardStatus, CardType, SqliteCardRepository,
};
use serde_json::json;

#[test]
fn create_then_partial_update_keeps_type_and_advances_updated_at() {
    let conn = open_db_in_memory().unwrap();
    let service = CardService::new(SqliteCardRepository::try_new(&conn).unwrap());

    let body = json!({ "title": "x", "type": "goal" });
    let created = service.create_card(&body).unwrap();
    let update = json!({ "status": "doing" });
    let updated = service.update_card(created.id, &update).unwrap();

    assert_eq!(updated.kind, CardType::Goal);
    assert_eq!(updated.status, CardStatus::Doing);
    assert!(updated.updated_at > updated.created_at);
}

#[test]
fn create_with_thirteen_tags_stores_twelve() {
    let conn = open_db_in_memory().unwrap();
    let service = CardService::new(SqliteCardRepository::try_new(&conn).unwrap());
    let tags: Vec<String> = "abcdefghijklm".chars().map(String::from).collect();

    let body = json!({ "title": "Ship v1", "tags": tags });
    service.create_card(&body).unwrap();

    let listed = service.list_cards(&CardFilter::default()).unwrap();
    assert_eq!(listed[0].tags.len(), 12);
    assert_eq!(listed[0].tags.last().map(String::as_str), Some("l"));
}

#[test]
fn created_card_matches_listed_card_for_sub_millisecond_due_date() {
    let conn = open_db_in_memory().unwrap();
    let service = CardService::new(SqliteCardRepository::try_new(&conn).unwrap());
    let body = json!({ "title": "x", "dueDate": "2024-05-01T10:00:00.123456Z" });

    let created = service.create_card(&body).unwrap();
    let listed = service.list_cards(&CardFilter::default()).unwrap();

    assert_eq!(created, listed[0]);
    let due = created.due_date.unwrap();
    assert_eq!(due.timestamp_millis(), 1_714_557_600_123);
    assert_eq!(due.timestamp_subsec_nanos(), 123_000_000);
}

#[test]
fn invalid_create_writes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let service = CardService::new(SqliteCardRepository::try_new(&conn).unwrap());

    let body = json!({ "title": "valid", "tags": ["ok", ""] });
    let err = service.create_card(&body).unwrap_err();
    match err {
        CardServiceError::Validation(err) => assert_eq!(err.field, "tags[1]"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(service.list_cards(&CardFilter::default()).unwrap().is_empty());
}

#[test]
fn invalid_update_leaves_card_untouched() {
    let conn = open_db_in_memory().unwrap();
    let service = CardService::new(SqliteCardRepository::try_new(&conn).unwrap());
    let created = service.create_card(&json!({ "title": "stable" })).unwrap();

    let body = json!({ "title": "renamed", "status": "blocked" });
    let err = service.update_card(created.id, &body).unwrap_err();
    assert!(matches!(err, CardServiceError::Validation(_)));

    let loaded = service.get_card(created.id).unwrap();
    assert_eq!(loaded, created);
}

#[test]
fn empty_update_still_refreshes_updated_at() {
    let conn = open_db_in_memory().unwrap();
    let service = CardService::new(SqliteCardRepository::try_new(&conn).unwrap());
    let created = service.create_card(&json!({ "title": "idle" })).unwrap();

    let updated = service.update_card(created.id, &json!({})).unwrap();
    assert_eq!(updated.title, created.title);
    assert!(updated.updated_at > created.updated_at);
}

#[test]
fn update_due_date_tri_state() {
    let conn = open_db_in_memory().unwrap();
    let service = CardService::new(SqliteCardRepository::try_new(&conn).unwrap());
    let body = json!({ "title": "due", "dueDate": "2024-06-01T00:00:00Z" });
    let created = service.create_card(&body).unwrap();
    let due = created.due_date;
    assert!(due.is_some());

    let content = json!({ "content": "notes" });
    let untouched = service.update_card(created.id, &content).unwrap();
    assert_eq!(untouched.due_date, due);

    let clear = json!({ "dueDate": null });
    let cleared = service.update_card(created.id, &clear).unwrap();
    assert_eq!(cleared.due_date, None);
    assert_eq!(cleared.content.as_deref(), Some("notes"));
}

#[test]
fn list_filters_after_retrieval() {
    let conn = open_db_in_memory().unwrap();
    let service = CardService::new(SqliteCardRepository::try_new(&conn).unwrap());
    let sync = json!({ "title": "Sync", "content": "Meeting notes", "type": "note" });
    let meeting = service.create_card(&sync).unwrap();
    let groceries = json!({ "title": "Groceries", "content": "milk" });
    service.create_card(&groceries).unwrap();
    let deploy = json!({ "title": "Deploy", "status": "done", "tags": ["ops"] });
    let done_task = service.create_card(&deploy).unwrap();

    let filter = CardFilter::from_params(Some("meeting"), None, None, None);
    let by_text = service.list_cards(&filter).unwrap();
    assert_eq!(by_text.len(), 1);
    assert_eq!(by_text[0].id, meeting.id);

    let filter = CardFilter::from_params(None, Some("task"), Some("done"), None);
    let by_type_and_status = service.list_cards(&filter).unwrap();
    assert_eq!(by_type_and_status.len(), 1);
    assert_eq!(by_type_and_status[0].id, done_task.id);

    let filter = CardFilter::from_params(None, None, None, Some("ops"));
    let by_tag = service.list_cards(&filter).unwrap();
    assert_eq!(by_tag.len(), 1);
    assert_eq!(by_tag[0].id, done_task.id);
}

#[test]
fn delete_missing_card_is_not_found_and_list_is_unaffected() {
    let conn = open_db_in_memory().unwrap();
    let service = CardService::new(SqliteCardRepository::try_new(&conn).unwrap());
    service.create_card(&json!({ "title": "survivor" })).unwrap();

    let err = service.delete_card(9_999).unwrap_err();
    assert!(matches!(err, CardServiceError::NotFound(9_999)));
    assert_eq!(service.list_cards(&CardFilter::default()).unwrap().len(), 1);
}

#[test]
fn get_missing_card_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = CardService::new(SqliteCardRepository::try_new(&conn).unwrap());
    let result = service.get_card(1);
    assert!(matches!(result, Err(CardServiceError::NotFound(1))));
}
