//! Task repository for database operations.

use anyhow::Result;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder,
};
use uuid::Uuid;

use crate::entities::task;

/// Fields accepted when inserting a task. The id is generated when absent.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub id: Option<String>,
    pub title: String,
    pub completed: bool,
    pub server_id: Option<String>,
}

/// Partial update merged over the current row. `None` fields are preserved,
/// including `synced` and `server_id`.
#[derive(Debug, Clone, Default)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub completed: Option<bool>,
    pub synced: Option<bool>,
    pub server_id: Option<String>,
}

/// Repository for task-related database operations.
pub struct TaskRepository;

impl TaskRepository {
    /// Get all tasks, newest first.
    pub async fn get_all<C>(conn: &C) -> Result<Vec<task::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(task::Entity::find()
            .order_by_desc(task::Column::CreatedAt)
            .all(conn)
            .await?)
    }

    /// Get a single task by id.
    pub async fn get_by_id<C>(conn: &C, id: &str) -> Result<Option<task::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(task::Entity::find().filter(task::Column::Id.eq(id)).one(conn).await?)
    }

    /// Tasks not yet acknowledged by the remote, oldest first.
    pub async fn get_unsynced<C>(conn: &C) -> Result<Vec<task::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(task::Entity::find()
            .filter(task::Column::Synced.eq(false))
            .order_by_asc(task::Column::CreatedAt)
            .all(conn)
            .await?)
    }

    /// Number of unsynced tasks.
    pub async fn count_unsynced<C>(conn: &C) -> Result<u64>
    where
        C: ConnectionTrait,
    {
        use sea_orm::PaginatorTrait;
        Ok(task::Entity::find()
            .filter(task::Column::Synced.eq(false))
            .count(conn)
            .await?)
    }

    /// Insert a new task with `synced = false` and both timestamps set to now.
    pub async fn create<C>(conn: &C, fields: NewTask) -> Result<task::Model>
    where
        C: ConnectionTrait,
    {
        let now = Utc::now();
        let model = task::ActiveModel {
            id: ActiveValue::Set(fields.id.unwrap_or_else(|| Uuid::new_v4().to_string())),
            title: ActiveValue::Set(fields.title),
            completed: ActiveValue::Set(fields.completed),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            synced: ActiveValue::Set(false),
            server_id: ActiveValue::Set(fields.server_id),
        };
        Ok(model.insert(conn).await?)
    }

    /// Merge `changes` over the current row and bump `updated_at`. Returns
    /// `None` for a missing id.
    pub async fn update<C>(conn: &C, id: &str, changes: TaskChanges) -> Result<Option<task::Model>>
    where
        C: ConnectionTrait,
    {
        let Some(current) = Self::get_by_id(conn, id).await? else {
            return Ok(None);
        };

        let mut model = current.into_active_model();
        if let Some(title) = changes.title {
            model.title = ActiveValue::Set(title);
        }
        if let Some(completed) = changes.completed {
            model.completed = ActiveValue::Set(completed);
        }
        if let Some(synced) = changes.synced {
            model.synced = ActiveValue::Set(synced);
        }
        if let Some(server_id) = changes.server_id {
            model.server_id = ActiveValue::Set(Some(server_id));
        }
        model.updated_at = ActiveValue::Set(Utc::now());

        Ok(Some(model.update(conn).await?))
    }

    /// Delete a task. True iff a row was removed.
    pub async fn delete<C>(conn: &C, id: &str) -> Result<bool>
    where
        C: ConnectionTrait,
    {
        let result = task::Entity::delete_by_id(id).exec(conn).await?;
        Ok(result.rows_affected > 0)
    }
}
