use anyhow::Result;
use log::debug;

use crate::constants::TASK_ENTITY;
use crate::entities::pending_action::{self, ActionType};
use crate::entities::task;
use crate::gateway::TaskSnapshot;
use crate::repositories::{NewTask, PendingActionRepository, TaskChanges, TaskRepository};
use crate::sync::{MutationError, SyncService};

/// Content fields a caller may change on a task. Sync bookkeeping (`synced`,
/// `server_id`) is engine-managed and not part of this surface.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

impl SyncService {
    /// Retrieves all tasks from local storage, newest first.
    ///
    /// # Returns
    /// A vector of all `task::Model` objects in the local database
    ///
    /// # Errors
    /// Returns an error if local storage access fails
    pub async fn get_tasks(&self) -> Result<Vec<task::Model>> {
        let storage = self.storage.lock().await;
        TaskRepository::get_all(&storage.conn).await
    }

    /// Get a single task by id from local storage (fast)
    pub async fn get_task(&self, id: &str) -> Result<Option<task::Model>> {
        let storage = self.storage.lock().await;
        TaskRepository::get_by_id(&storage.conn, id).await
    }

    /// Queued pending actions in processing order (fast)
    pub async fn pending_actions(&self) -> Result<Vec<pending_action::Model>> {
        let storage = self.storage.lock().await;
        PendingActionRepository::get_all(&storage.conn).await
    }

    /// Creates a new task in local storage.
    ///
    /// The local write is the unit of success: the method returns as soon as
    /// the row is durable, whatever the connectivity. Offline, a CREATE
    /// action carrying the task snapshot is queued in the same breath; online,
    /// the scheduler is woken to push the row in the background.
    ///
    /// # Arguments
    /// * `title` - The title of the new task
    ///
    /// # Errors
    /// Returns an error if local storage fails
    pub async fn create_task(&self, title: &str) -> Result<task::Model, MutationError> {
        let task = {
            let storage = self.storage.lock().await;
            let task = TaskRepository::create(
                &storage.conn,
                NewTask {
                    title: title.to_string(),
                    ..Default::default()
                },
            )
            .await?;

            if !self.is_online() {
                let snapshot = TaskSnapshot::from(&task);
                PendingActionRepository::add(
                    &storage.conn,
                    ActionType::Create,
                    TASK_ENTITY,
                    &task.id,
                    &snapshot,
                )
                .await?;
                debug!("Queued CREATE for task {}", task.id);
            }
            task
            // Lock is dropped here; the wake below never holds it
        };

        if self.is_online() {
            self.request_sync();
        }

        Ok(task)
    }

    /// Applies content changes to a task.
    ///
    /// A content change also clears the `synced` flag in the same store
    /// write, since local state now diverges from the remote. Offline edits
    /// of a divergent task queue an UPDATE action with the post-update
    /// snapshot; repeated offline edits queue one action each, applied in
    /// order by the next sync (last snapshot wins).
    ///
    /// # Arguments
    /// * `id` - The task to change
    /// * `update` - Title and/or completion changes
    ///
    /// # Errors
    /// `MutationError::NotFound` if no task has this id; otherwise storage
    /// errors
    pub async fn update_task(
        &self,
        id: &str,
        update: TaskUpdate,
    ) -> Result<task::Model, MutationError> {
        let content_changed = update.title.is_some() || update.completed.is_some();

        let task = {
            let storage = self.storage.lock().await;
            let changes = TaskChanges {
                title: update.title,
                completed: update.completed,
                synced: if content_changed { Some(false) } else { None },
                server_id: None,
            };

            let Some(task) = TaskRepository::update(&storage.conn, id, changes).await? else {
                return Err(MutationError::NotFound(id.to_string()));
            };

            if !self.is_online() && !task.synced {
                let snapshot = TaskSnapshot::from(&task);
                PendingActionRepository::add(
                    &storage.conn,
                    ActionType::Update,
                    TASK_ENTITY,
                    &task.id,
                    &snapshot,
                )
                .await?;
                debug!("Queued UPDATE for task {}", task.id);
            }
            task
        };

        if self.is_online() {
            self.request_sync();
        }

        Ok(task)
    }

    /// Toggle completion state. Thin wrapper over [`Self::update_task`].
    pub async fn set_completed(
        &self,
        id: &str,
        completed: bool,
    ) -> Result<task::Model, MutationError> {
        self.update_task(
            id,
            TaskUpdate {
                completed: Some(completed),
                ..Default::default()
            },
        )
        .await
    }

    /// Removes a task from local storage.
    ///
    /// If the task ever reached the remote (it has a `server_id`), a DELETE
    /// action with a final snapshot is queued regardless of connectivity:
    /// with the row gone, that snapshot is the only carrier of the
    /// remote-delete intent. A never-synced task just disappears.
    ///
    /// # Errors
    /// `MutationError::NotFound` if no task has this id; otherwise storage
    /// errors
    pub async fn delete_task(&self, id: &str) -> Result<(), MutationError> {
        {
            let storage = self.storage.lock().await;
            let Some(task) = TaskRepository::get_by_id(&storage.conn, id).await? else {
                return Err(MutationError::NotFound(id.to_string()));
            };

            TaskRepository::delete(&storage.conn, id).await?;

            if task.server_id.is_some() {
                let snapshot = TaskSnapshot::from(&task);
                PendingActionRepository::add(
                    &storage.conn,
                    ActionType::Delete,
                    TASK_ENTITY,
                    &task.id,
                    &snapshot,
                )
                .await?;
                debug!("Queued DELETE for task {}", task.id);
            }
        }

        if self.is_online() {
            self.request_sync();
        }

        Ok(())
    }
}
