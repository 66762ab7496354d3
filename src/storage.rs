//! Local storage: SQLite connection handling and schema bootstrap.

use std::path::Path;

use anyhow::{Context, Result};
use sea_orm::sea_query::Index;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema};

use crate::entities::{pending_action, task};

/// Local storage manager for task data.
///
/// Owns a single SQLite connection. All access goes through this handle,
/// which keeps every store and queue operation atomic with respect to
/// other callers.
pub struct LocalStorage {
    pub conn: DatabaseConnection,
}

impl LocalStorage {
    /// Open (creating if needed) a file-backed database.
    pub async fn open(path: &Path) -> Result<Self> {
        let url = format!("sqlite://{}?mode=rwc", path.display());
        Self::connect(&url)
            .await
            .with_context(|| format!("opening database at {}", path.display()))
    }

    /// Open a private in-memory database.
    pub async fn in_memory() -> Result<Self> {
        Self::connect("sqlite::memory:").await
    }

    async fn connect(url: &str) -> Result<Self> {
        let mut options = ConnectOptions::new(url.to_owned());
        // One pooled connection: serializes writers, and keeps an in-memory
        // database from vanishing with a reaped pool slot.
        options
            .min_connections(1)
            .max_connections(1)
            .sqlx_logging(false);

        let conn = Database::connect(options).await?;
        let storage = LocalStorage { conn };
        storage.init_schema().await?;

        Ok(storage)
    }

    /// Create tables and indexes if they do not exist.
    async fn init_schema(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        let schema = Schema::new(backend);

        let mut tasks = schema.create_table_from_entity(task::Entity);
        self.conn.execute(backend.build(tasks.if_not_exists())).await?;

        let mut actions = schema.create_table_from_entity(pending_action::Entity);
        self.conn.execute(backend.build(actions.if_not_exists())).await?;

        // get_unsynced() filters on `synced` every pass
        let mut synced_idx = Index::create();
        synced_idx
            .name("idx_tasks_synced")
            .table(task::Entity)
            .col(task::Column::Synced)
            .if_not_exists();
        self.conn.execute(backend.build(&synced_idx)).await?;

        Ok(())
    }
}
