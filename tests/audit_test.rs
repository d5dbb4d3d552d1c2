use chrono::{TimeZone, Utc};
use crudstarter::{Actor, AuditStamp, AuditedRecord, Pageable, RecordStore, SeaOrmStore};
use sea_orm::{ActiveValue::Set, Condition, IntoActiveModel, Order};

mod common;
use common::setup_test_db;
use common::{note_entity, todo_entity};

#[tokio::test]
async fn test_store_stamps_creation_once() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let store = SeaOrmStore;
    let created_at = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
    let modified_at = Utc.with_ymd_and_hms(2024, 1, 2, 17, 30, 0).unwrap();

    let record = todo_entity::ActiveModel {
        title: Set("audited".to_string()),
        completed: Set(false),
        priority: Set(1),
        ..Default::default()
    };
    let created = store
        .save(&db, record, &AuditStamp::new(&Actor::new("alice"), created_at))
        .await
        .unwrap();

    let audit = created.audit_info();
    assert_eq!(audit.created_at, created_at);
    assert_eq!(audit.created_by, "alice");
    assert_eq!(audit.modified_at, Some(created_at));
    assert_eq!(audit.modified_by.as_deref(), Some("alice"));

    let mut record = created.into_active_model();
    record.completed = Set(true);
    let updated = store
        .save(&db, record, &AuditStamp::new(&Actor::new("bob"), modified_at))
        .await
        .unwrap();

    let audit = updated.audit_info();
    assert!(updated.completed);
    assert_eq!(audit.created_at, created_at);
    assert_eq!(audit.created_by, "alice");
    assert_eq!(audit.modified_at, Some(modified_at));
    assert_eq!(audit.modified_by.as_deref(), Some("bob"));

    let reloaded = RecordStore::<todo_entity::ActiveModel>::find_by_id(&store, &db, updated.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded, updated);
}

#[tokio::test]
async fn test_preassigned_key_is_still_inserted() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let store = SeaOrmStore;
    let id = uuid::Uuid::new_v4();

    let record = note_entity::ActiveModel {
        id: Set(id),
        body: Set("hello".to_string()),
        ..Default::default()
    };
    let created = store
        .save(&db, record, &AuditStamp::now(&Actor::new("alice")))
        .await
        .unwrap();
    assert_eq!(created.id, id);

    let found = RecordStore::<note_entity::ActiveModel>::find_by_id(&store, &db, id)
        .await
        .unwrap();
    assert!(found.is_some());
}

#[tokio::test]
async fn test_store_delete_reports_rows() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let store = SeaOrmStore;

    let record = todo_entity::ActiveModel {
        title: Set("short lived".to_string()),
        completed: Set(false),
        priority: Set(0),
        ..Default::default()
    };
    let created = store
        .save(&db, record, &AuditStamp::now(&Actor::new("alice")))
        .await
        .unwrap();

    let deleted = RecordStore::<todo_entity::ActiveModel>::delete_by_id(&store, &db, created.id)
        .await
        .unwrap();
    assert_eq!(deleted, 1);

    let deleted = RecordStore::<todo_entity::ActiveModel>::delete_by_id(&store, &db, created.id)
        .await
        .unwrap();
    assert_eq!(deleted, 0);
}

#[tokio::test]
async fn test_store_find_all_orders_and_pages() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let store = SeaOrmStore;

    for (title, priority) in [("c", 1), ("a", 1), ("b", 2)] {
        let record = todo_entity::ActiveModel {
            title: Set(title.to_string()),
            completed: Set(false),
            priority: Set(priority),
            ..Default::default()
        };
        store
            .save(&db, record, &AuditStamp::now(&Actor::new("alice")))
            .await
            .unwrap();
    }

    let page = RecordStore::<todo_entity::ActiveModel>::find_all(
        &store,
        &db,
        Condition::all(),
        vec![(todo_entity::Column::Priority, Order::Asc)],
        &Pageable::of(0, 2),
    )
    .await
    .unwrap();

    assert_eq!(page.total_elements, 3);
    assert_eq!(page.total_pages, 2);
    let titles: Vec<_> = page.content.iter().map(|todo| todo.title.as_str()).collect();
    // equal priorities keep primary key order
    assert_eq!(titles, vec!["c", "a"]);
}
