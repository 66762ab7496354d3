//! Remote gateway abstraction.
//!
//! This module defines the interface the reconciler pushes local state
//! through, along with the snapshot payload format and the error type shared
//! by implementations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::entities::task;

pub mod http;

pub use http::HttpGateway;

/// Common error type for gateway operations.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Remote answered with status {0}")]
    Status(u16),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Current snapshot payload format version.
pub const SNAPSHOT_VERSION: u32 = 1;

fn snapshot_version() -> u32 {
    SNAPSHOT_VERSION
}

/// Immutable picture of a task at a point in time.
///
/// This is the payload stored in pending actions and the record handed to
/// gateway calls. A deleted task can no longer be read locally, so the
/// snapshot carries everything a remote call needs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    #[serde(default = "snapshot_version")]
    pub version: u32,
    pub id: String,
    pub title: String,
    pub completed: bool,
    pub server_id: Option<String>,
}

impl TaskSnapshot {
    /// Parse a stored action payload.
    pub fn from_payload(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }
}

impl From<&task::Model> for TaskSnapshot {
    fn from(task: &task::Model) -> Self {
        TaskSnapshot {
            version: SNAPSHOT_VERSION,
            id: task.id.clone(),
            title: task.title.clone(),
            completed: task.completed,
            server_id: task.server_id.clone(),
        }
    }
}

/// Gateway trait every remote implementation must satisfy.
///
/// Failure is communicated, not interpreted: the reconciler treats every
/// error the same way (leave local state pending, try again later), so
/// implementations only need to be honest about success.
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// Create the task remotely; returns the server-assigned id.
    async fn create_task(&self, snapshot: &TaskSnapshot) -> Result<String, GatewayError>;

    /// Overwrite the remote task's content.
    async fn update_task(&self, remote_id: &str, snapshot: &TaskSnapshot)
        -> Result<(), GatewayError>;

    /// Delete the remote task. Deleting an already-gone resource succeeds.
    async fn delete_task(&self, remote_id: &str) -> Result<(), GatewayError>;
}
