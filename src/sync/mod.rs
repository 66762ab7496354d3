//! Synchronization service module.
//!
//! This module provides the [`SyncService`] struct, the single entry point
//! for task mutations and for reconciling local state with the remote task
//! service. Mutations always land in local storage first; when the engine is
//! offline they additionally queue a pending action carrying a snapshot of
//! the entity, and the reconciliation pass drains that queue once
//! connectivity returns.
//!
//! The service offers:
//! - Local-first task CRUD that never blocks on the network
//! - A pending-action queue drained in FIFO order with a bounded retry count
//! - A reconciliation pass (`sync()`) safe to invoke at any time
//! - Status reporting for UI surfaces (syncing flag, queue depths)

pub mod tasks;

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use log::{info, warn};
use tokio::sync::{watch, Mutex, Notify};

use crate::constants::RETRY_LIMIT;
use crate::entities::pending_action::{self, ActionType};
use crate::entities::task;
use crate::gateway::{RemoteGateway, TaskSnapshot};
use crate::network::NetworkStatus;
use crate::repositories::{PendingActionRepository, TaskChanges, TaskRepository};
use crate::storage::LocalStorage;

pub use tasks::TaskUpdate;

/// Error surfaced by mutation operations.
#[derive(Debug, thiserror::Error)]
pub enum MutationError {
    #[error("Task not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Aggregate result of one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Unsynced rows and queued actions successfully applied to the remote.
    pub synced: usize,
    /// Failed remote calls; each leaves local state pending for a later pass.
    pub errors: usize,
}

/// Point-in-time view of the engine for status surfaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncStatus {
    pub is_syncing: bool,
    pub last_sync_at: Option<DateTime<Utc>>,
    pub pending_actions: u64,
    pub unsynced_tasks: u64,
}

/// Service that keeps local task storage reconciled with the remote service.
///
/// The `SyncService` is the primary data access layer: reads come straight
/// from local storage, writes go to local storage first and reach the remote
/// asynchronously through the reconciliation pass. Offline operation is the
/// design center, not an error path: a mutation made while disconnected is
/// complete from the caller's point of view the moment the local write
/// commits.
///
/// # Features
/// - Gateway-agnostic remote access via trait abstraction
/// - Thread-safe: all shared state lives behind `Arc`ed locks
/// - Prevents concurrent sync passes via an in-flight flag
/// - Queues offline mutations as snapshot-carrying pending actions
/// - Bounded retries: an action is dropped once its retry count passes the
///   ceiling, so a permanently failing entry cannot block the queue head
///
/// # Example
/// ```rust,no_run
/// use offlinist::gateway::HttpGateway;
/// use offlinist::network::{NetworkMonitor, NetworkStatus};
/// use offlinist::storage::LocalStorage;
/// use offlinist::sync::SyncService;
/// use std::sync::Arc;
/// use std::time::Duration;
/// use tokio::sync::Mutex;
///
/// # async fn example() -> anyhow::Result<()> {
/// let storage = Arc::new(Mutex::new(LocalStorage::in_memory().await?));
/// let gateway = Arc::new(HttpGateway::new(
///     "https://tasks.example.com",
///     Duration::from_secs(10),
/// )?);
/// let monitor = NetworkMonitor::new(NetworkStatus::online());
/// let service = SyncService::new(storage, gateway, monitor.subscribe());
///
/// service.create_task("Buy milk").await?;
/// let report = service.sync().await?;
/// println!("synced {} items, {} errors", report.synced, report.errors);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SyncService {
    storage: Arc<Mutex<LocalStorage>>,
    gateway: Arc<dyn RemoteGateway>,
    network: watch::Receiver<NetworkStatus>,
    sync_in_progress: Arc<Mutex<bool>>,
    last_sync_at: Arc<Mutex<Option<DateTime<Utc>>>>,
    wake: Arc<Notify>,
}

impl SyncService {
    /// Creates a new `SyncService` over the given storage, gateway and
    /// connectivity subscription.
    ///
    /// The storage handle is shared, not owned: the process bootstrap decides
    /// its lifetime. The network receiver is read at every decision point, so
    /// connectivity changes take effect on the next operation.
    pub fn new(
        storage: Arc<Mutex<LocalStorage>>,
        gateway: Arc<dyn RemoteGateway>,
        network: watch::Receiver<NetworkStatus>,
    ) -> Self {
        Self {
            storage,
            gateway,
            network,
            sync_in_progress: Arc::new(Mutex::new(false)),
            last_sync_at: Arc::new(Mutex::new(None)),
            wake: Arc::new(Notify::new()),
        }
    }

    /// Checks if a reconciliation pass is currently in progress.
    pub async fn is_syncing(&self) -> bool {
        *self.sync_in_progress.lock().await
    }

    /// Current connectivity as seen by the engine.
    pub fn is_online(&self) -> bool {
        self.network.borrow().is_online()
    }

    /// Handle on the wake signal fired after online mutations. The scheduler
    /// loop awaits it to run an immediate pass instead of waiting out the
    /// countdown.
    pub fn wake_signal(&self) -> Arc<Notify> {
        self.wake.clone()
    }

    /// Point-in-time engine status: syncing flag, last completed pass and
    /// queue depths.
    pub async fn status(&self) -> Result<SyncStatus> {
        let (pending_actions, unsynced_tasks) = {
            let storage = self.storage.lock().await;
            (
                PendingActionRepository::count(&storage.conn).await?,
                TaskRepository::count_unsynced(&storage.conn).await?,
            )
        };

        Ok(SyncStatus {
            is_syncing: self.is_syncing().await,
            last_sync_at: *self.last_sync_at.lock().await,
            pending_actions,
            unsynced_tasks,
        })
    }

    /// Runs one reconciliation pass against the remote service.
    ///
    /// The pass pushes unsynced rows first, then drains the pending-action
    /// queue in FIFO order. Remote failures are absorbed into the report
    /// (they mark rows for a later pass or bump action retry counts), so the
    /// method only errors when local storage itself fails.
    ///
    /// While offline, or while another pass is in flight, this is a no-op
    /// returning an empty report.
    ///
    /// # Returns
    /// A [`SyncReport`] with counts of applied items and failed remote calls
    ///
    /// # Errors
    /// Returns an error only for local storage failures
    pub async fn sync(&self) -> Result<SyncReport> {
        // Check if a pass is already in progress and acquire the flag
        let mut sync_guard = self.sync_in_progress.lock().await;
        if *sync_guard {
            return Ok(SyncReport::default());
        }
        *sync_guard = true;

        // Release the lock before the pass; it would otherwise be held
        // across network calls
        drop(sync_guard);

        let result = self.perform_sync().await;

        // Release the in-flight flag
        {
            let mut sync_guard = self.sync_in_progress.lock().await;
            *sync_guard = false;
        }

        result
    }

    /// Internal reconciliation implementation
    async fn perform_sync(&self) -> Result<SyncReport> {
        if !self.is_online() {
            info!("⚠️  Offline - skipping sync");
            return Ok(SyncReport::default());
        }

        // One consistent view of store and queue for the whole pass. Rows
        // whose intent is already queued are left to the action phase, so a
        // single pass never submits the same row twice.
        let (unsynced, actions) = {
            let storage = self.storage.lock().await;
            (
                TaskRepository::get_unsynced(&storage.conn).await?,
                PendingActionRepository::get_all(&storage.conn).await?,
            )
        };

        info!(
            "🔄 Starting sync: {} unsynced tasks, {} pending actions",
            unsynced.len(),
            actions.len()
        );

        let mut report = SyncReport::default();
        let queued: HashSet<&str> = actions.iter().map(|a| a.entity_id.as_str()).collect();

        for task in unsynced.iter().filter(|t| !queued.contains(t.id.as_str())) {
            match self.push_task(task).await {
                Ok(()) => report.synced += 1,
                Err(e) => {
                    warn!("❌ Failed to push task {}: {e}", task.id);
                    report.errors += 1;
                }
            }
        }

        for action in &actions {
            match self.apply_action(action).await {
                Ok(()) => {
                    let storage = self.storage.lock().await;
                    PendingActionRepository::delete(&storage.conn, &action.id).await?;
                    report.synced += 1;
                }
                Err(e) => {
                    warn!(
                        "❌ Action {} ({:?} on {}) failed: {e}",
                        action.id, action.action_type, action.entity_id
                    );
                    report.errors += 1;

                    let storage = self.storage.lock().await;
                    PendingActionRepository::increment_retry(&storage.conn, &action.id).await?;
                    if action.retry_count + 1 > RETRY_LIMIT {
                        warn!(
                            "⚠️  Dropping action {} after {} failed attempts",
                            action.id,
                            action.retry_count + 1
                        );
                        PendingActionRepository::delete(&storage.conn, &action.id).await?;
                    }
                }
            }
        }

        info!(
            "✅ Sync finished: {} synced, {} errors",
            report.synced, report.errors
        );

        *self.last_sync_at.lock().await = Some(Utc::now());

        Ok(report)
    }

    /// Push one bare unsynced row to the remote.
    async fn push_task(&self, task: &task::Model) -> Result<()> {
        let snapshot = TaskSnapshot::from(task);
        match &task.server_id {
            None => {
                let remote_id = self.gateway.create_task(&snapshot).await?;
                self.mark_synced(&task.id, Some(remote_id)).await?;
            }
            Some(remote_id) => {
                self.gateway.update_task(remote_id, &snapshot).await?;
                self.mark_synced(&task.id, None).await?;
            }
        }
        Ok(())
    }

    /// Apply one queued action to the remote.
    ///
    /// The snapshot decides what happens: a CREATE whose snapshot already has
    /// a `server_id`, or an UPDATE/DELETE whose snapshot never got one, is
    /// vacuously applied since there is nothing left to tell the remote.
    async fn apply_action(&self, action: &pending_action::Model) -> Result<()> {
        let snapshot = TaskSnapshot::from_payload(&action.payload)?;

        match action.action_type {
            ActionType::Create => {
                if snapshot.server_id.is_none() {
                    let remote_id = self.gateway.create_task(&snapshot).await?;
                    self.mark_synced(&action.entity_id, Some(remote_id)).await?;
                }
            }
            ActionType::Update => {
                if let Some(remote_id) = &snapshot.server_id {
                    self.gateway.update_task(remote_id, &snapshot).await?;
                    self.mark_synced(&action.entity_id, None).await?;
                }
            }
            ActionType::Delete => {
                if let Some(remote_id) = &snapshot.server_id {
                    self.gateway.delete_task(remote_id).await?;
                }
            }
        }

        Ok(())
    }

    /// Mark the entity behind an applied step as in sync with the remote.
    /// The entity may have been deleted locally since; that is not an error.
    async fn mark_synced(&self, entity_id: &str, server_id: Option<String>) -> Result<()> {
        let storage = self.storage.lock().await;
        let changes = TaskChanges {
            synced: Some(true),
            server_id,
            ..Default::default()
        };
        TaskRepository::update(&storage.conn, entity_id, changes).await?;
        Ok(())
    }

    /// Fire-and-forget wake for the scheduler loop; never blocks the
    /// mutation path.
    fn request_sync(&self) {
        self.wake.notify_one();
    }
}
