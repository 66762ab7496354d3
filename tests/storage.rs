use std::time::Duration;

use offlinist::repositories::{NewTask, TaskChanges, TaskRepository};
use offlinist::storage::LocalStorage;

async fn storage() -> LocalStorage {
    LocalStorage::in_memory().await.expect("in-memory storage")
}

#[tokio::test]
async fn test_create_assigns_id_and_defaults() {
    let storage = storage().await;

    let task = TaskRepository::create(
        &storage.conn,
        NewTask {
            title: "Buy milk".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert!(!task.id.is_empty());
    assert_eq!(task.title, "Buy milk");
    assert!(!task.completed);
    assert!(!task.synced);
    assert!(task.server_id.is_none());
    assert_eq!(task.created_at, task.updated_at);
}

#[tokio::test]
async fn test_create_keeps_provided_id() {
    let storage = storage().await;

    let task = TaskRepository::create(
        &storage.conn,
        NewTask {
            id: Some("task-1".to_string()),
            title: "Pinned id".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(task.id, "task-1");
    let found = TaskRepository::get_by_id(&storage.conn, "task-1").await.unwrap();
    assert!(found.is_some());
}

#[tokio::test]
async fn test_get_all_newest_first() {
    let storage = storage().await;

    for title in ["first", "second", "third"] {
        TaskRepository::create(
            &storage.conn,
            NewTask {
                title: title.to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        // Distinct created_at values keep the ordering deterministic
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let tasks = TaskRepository::get_all(&storage.conn).await.unwrap();
    let titles: Vec<&str> = tasks.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["third", "second", "first"]);
}

#[tokio::test]
async fn test_get_by_id_missing_returns_none() {
    let storage = storage().await;
    let found = TaskRepository::get_by_id(&storage.conn, "nope").await.unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn test_update_merges_and_preserves_unspecified_fields() {
    let storage = storage().await;

    let task = TaskRepository::create(
        &storage.conn,
        NewTask {
            title: "original".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    // Mark it synced with a server id, as the reconciler would
    let task = TaskRepository::update(
        &storage.conn,
        &task.id,
        TaskChanges {
            synced: Some(true),
            server_id: Some("42".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert!(task.synced);
    assert_eq!(task.server_id.as_deref(), Some("42"));
    assert_eq!(task.title, "original");

    // A title-only change must not touch completed or server_id
    let task = TaskRepository::update(
        &storage.conn,
        &task.id,
        TaskChanges {
            title: Some("renamed".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(task.title, "renamed");
    assert!(!task.completed);
    assert!(task.synced);
    assert_eq!(task.server_id.as_deref(), Some("42"));
}

#[tokio::test]
async fn test_update_bumps_updated_at_only() {
    let storage = storage().await;

    let task = TaskRepository::create(
        &storage.conn,
        NewTask {
            title: "timestamps".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;

    let updated = TaskRepository::update(
        &storage.conn,
        &task.id,
        TaskChanges {
            completed: Some(true),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(updated.created_at, task.created_at);
    assert!(updated.updated_at > task.updated_at);
}

#[tokio::test]
async fn test_update_missing_returns_none() {
    let storage = storage().await;

    let result = TaskRepository::update(
        &storage.conn,
        "nope",
        TaskChanges {
            title: Some("anything".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert!(result.is_none());
}

#[tokio::test]
async fn test_delete_reports_whether_a_row_was_removed() {
    let storage = storage().await;

    let task = TaskRepository::create(
        &storage.conn,
        NewTask {
            title: "to delete".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert!(TaskRepository::delete(&storage.conn, &task.id).await.unwrap());
    assert!(!TaskRepository::delete(&storage.conn, &task.id).await.unwrap());
    assert!(TaskRepository::get_by_id(&storage.conn, &task.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_get_unsynced_oldest_first_and_filtered() {
    let storage = storage().await;

    let old = TaskRepository::create(
        &storage.conn,
        NewTask {
            title: "old unsynced".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;

    let synced = TaskRepository::create(
        &storage.conn,
        NewTask {
            title: "already synced".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    TaskRepository::update(
        &storage.conn,
        &synced.id,
        TaskChanges {
            synced: Some(true),
            server_id: Some("7".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;

    let new = TaskRepository::create(
        &storage.conn,
        NewTask {
            title: "new unsynced".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let unsynced = TaskRepository::get_unsynced(&storage.conn).await.unwrap();
    let ids: Vec<&str> = unsynced.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec![old.id.as_str(), new.id.as_str()]);

    assert_eq!(TaskRepository::count_unsynced(&storage.conn).await.unwrap(), 2);
}
