mod common;

use common::engine;
use offlinist::entities::pending_action::ActionType;
use offlinist::gateway::TaskSnapshot;
use offlinist::network::NetworkStatus;
use offlinist::sync::{MutationError, TaskUpdate};

#[tokio::test]
async fn test_create_offline_queues_a_create_snapshot() {
    let engine = engine(NetworkStatus::offline()).await;
    let task = engine.service.create_task("Buy milk").await.unwrap();

    let actions = engine.service.pending_actions().await.unwrap();
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].action_type, ActionType::Create);
    assert_eq!(actions[0].entity_type, "task");
    assert_eq!(actions[0].entity_id, task.id);

    let snapshot = TaskSnapshot::from_payload(&actions[0].payload).unwrap();
    assert_eq!(snapshot.title, "Buy milk");
    assert!(snapshot.server_id.is_none());
}

#[tokio::test]
async fn test_create_online_queues_nothing() {
    let engine = engine(NetworkStatus::online()).await;
    let task = engine.service.create_task("Direct").await.unwrap();

    assert!(!task.synced);
    assert!(engine.service.pending_actions().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_missing_task_is_not_found() {
    let engine = engine(NetworkStatus::online()).await;

    let err = engine
        .service
        .update_task(
            "nope",
            TaskUpdate {
                title: Some("anything".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, MutationError::NotFound(_)));
}

#[tokio::test]
async fn test_update_without_content_change_preserves_synced() {
    let engine = engine(NetworkStatus::online()).await;
    let task = engine.service.create_task("Stable").await.unwrap();
    engine.service.sync().await.unwrap();

    engine.set_online(false);
    let task = engine
        .service
        .update_task(&task.id, TaskUpdate::default())
        .await
        .unwrap();

    // No content changed, so the row stays in sync and nothing is queued
    assert!(task.synced);
    assert!(engine.service.pending_actions().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_set_completed_marks_row_unsynced() {
    let engine = engine(NetworkStatus::online()).await;
    let task = engine.service.create_task("Tick me").await.unwrap();
    engine.service.sync().await.unwrap();

    let task = engine.service.set_completed(&task.id, true).await.unwrap();

    assert!(task.completed);
    assert!(!task.synced);
}

#[tokio::test]
async fn test_repeated_offline_edits_queue_one_action_each() {
    let engine = engine(NetworkStatus::offline()).await;
    let task = engine.service.create_task("Draft").await.unwrap();

    engine
        .service
        .update_task(
            &task.id,
            TaskUpdate {
                title: Some("Draft 2".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    engine.service.set_completed(&task.id, true).await.unwrap();

    let kinds: Vec<ActionType> = engine
        .service
        .pending_actions()
        .await
        .unwrap()
        .iter()
        .map(|a| a.action_type)
        .collect();
    assert_eq!(
        kinds,
        vec![ActionType::Create, ActionType::Update, ActionType::Update]
    );
}

#[tokio::test]
async fn test_offline_sequence_leaves_same_content_as_online() {
    let offline = engine(NetworkStatus::offline()).await;
    let online = engine(NetworkStatus::online()).await;

    for side in [&offline, &online] {
        let kept = side.service.create_task("kept").await.unwrap();
        let gone = side.service.create_task("gone").await.unwrap();
        side.service
            .update_task(
                &kept.id,
                TaskUpdate {
                    title: Some("kept v2".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        side.service.set_completed(&kept.id, true).await.unwrap();
        side.service.delete_task(&gone.id).await.unwrap();
    }

    // Same content either way; only sync bookkeeping may differ
    let content = |tasks: Vec<offlinist::entities::task::Model>| -> Vec<(String, bool)> {
        tasks.into_iter().map(|t| (t.title, t.completed)).collect()
    };
    let offline_tasks = content(offline.service.get_tasks().await.unwrap());
    let online_tasks = content(online.service.get_tasks().await.unwrap());
    assert_eq!(offline_tasks, online_tasks);
    assert_eq!(offline_tasks, vec![("kept v2".to_string(), true)]);
}

#[tokio::test]
async fn test_delete_missing_task_is_not_found() {
    let engine = engine(NetworkStatus::online()).await;
    let err = engine.service.delete_task("nope").await.unwrap_err();
    assert!(matches!(err, MutationError::NotFound(_)));
}

#[tokio::test]
async fn test_delete_never_synced_task_leaves_no_action() {
    let engine = engine(NetworkStatus::online()).await;
    let task = engine.service.create_task("Ephemeral").await.unwrap();

    engine.set_online(false);
    engine.service.delete_task(&task.id).await.unwrap();

    assert!(engine.service.get_task(&task.id).await.unwrap().is_none());
    assert!(engine.service.pending_actions().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_synced_task_queues_delete_regardless_of_connectivity() {
    let engine = engine(NetworkStatus::online()).await;
    let task = engine.service.create_task("Remote too").await.unwrap();
    engine.service.sync().await.unwrap();

    // Still online: the action is the only carrier of the remote-delete
    // intent once the row is gone, so it is queued either way
    engine.service.delete_task(&task.id).await.unwrap();

    let actions = engine.service.pending_actions().await.unwrap();
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].action_type, ActionType::Delete);

    let snapshot = TaskSnapshot::from_payload(&actions[0].payload).unwrap();
    assert_eq!(snapshot.server_id.as_deref(), Some("42"));
}
