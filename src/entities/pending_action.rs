use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Mutation intent recorded while offline, drained FIFO by the sync service.
///
/// `payload` is an immutable snapshot of the entity at action-creation time;
/// `entity_id` may point at a task that no longer exists locally by the time
/// the action is processed.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pending_actions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub action_type: ActionType,
    pub entity_type: String,
    pub entity_id: String,
    pub payload: String,
    pub created_at: DateTimeUtc,
    pub retry_count: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum ActionType {
    #[sea_orm(string_value = "CREATE")]
    Create,
    #[sea_orm(string_value = "UPDATE")]
    Update,
    #[sea_orm(string_value = "DELETE")]
    Delete,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
