//! Pending-action repository for database operations.

use anyhow::{Context, Result};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder,
};
use serde::Serialize;
use uuid::Uuid;

use crate::entities::pending_action::{self, ActionType};

/// Repository for the pending-action queue.
pub struct PendingActionRepository;

impl PendingActionRepository {
    /// Append an action with a serialized payload snapshot and a zero retry count.
    pub async fn add<C, P>(
        conn: &C,
        action_type: ActionType,
        entity_type: &str,
        entity_id: &str,
        payload: &P,
    ) -> Result<pending_action::Model>
    where
        C: ConnectionTrait,
        P: Serialize + ?Sized,
    {
        let payload = serde_json::to_string(payload).context("serializing action payload")?;
        let model = pending_action::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            action_type: ActiveValue::Set(action_type),
            entity_type: ActiveValue::Set(entity_type.to_string()),
            entity_id: ActiveValue::Set(entity_id.to_string()),
            payload: ActiveValue::Set(payload),
            created_at: ActiveValue::Set(Utc::now()),
            retry_count: ActiveValue::Set(0),
        };
        Ok(model.insert(conn).await?)
    }

    /// All queued actions in creation order (FIFO).
    pub async fn get_all<C>(conn: &C) -> Result<Vec<pending_action::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(pending_action::Entity::find()
            .order_by_asc(pending_action::Column::CreatedAt)
            .all(conn)
            .await?)
    }

    /// Get a single action by id.
    pub async fn get_by_id<C>(conn: &C, id: &str) -> Result<Option<pending_action::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(pending_action::Entity::find()
            .filter(pending_action::Column::Id.eq(id))
            .one(conn)
            .await?)
    }

    /// Number of queued actions.
    pub async fn count<C>(conn: &C) -> Result<u64>
    where
        C: ConnectionTrait,
    {
        use sea_orm::PaginatorTrait;
        Ok(pending_action::Entity::find().count(conn).await?)
    }

    /// Remove an action. True iff a row was removed.
    pub async fn delete<C>(conn: &C, id: &str) -> Result<bool>
    where
        C: ConnectionTrait,
    {
        let result = pending_action::Entity::delete_by_id(id).exec(conn).await?;
        Ok(result.rows_affected > 0)
    }

    /// Bump an action's retry count by one, SQL-side.
    pub async fn increment_retry<C>(conn: &C, id: &str) -> Result<()>
    where
        C: ConnectionTrait,
    {
        pending_action::Entity::update_many()
            .col_expr(
                pending_action::Column::RetryCount,
                Expr::col(pending_action::Column::RetryCount).add(1),
            )
            .filter(pending_action::Column::Id.eq(id))
            .exec(conn)
            .await?;
        Ok(())
    }
}
