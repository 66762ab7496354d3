//! Offlinist - An offline-first task store with remote reconciliation
//!
//! This library keeps a local task database fully usable without network
//! access and reconciles it with a remote service once connectivity
//! returns. Mutations made offline are recorded as pending actions and
//! replayed in order by the sync engine, with bounded retries for actions
//! that keep failing.
//!
//! # Modules
//!
//! The library is organized into several key modules:
//!
//! * [`config`] - Application configuration management
//! * [`storage`] - Local database and data persistence
//! * [`sync`] - Sync engine: reconciler and mutation operations
//! * [`gateway`] - Remote service interface and HTTP implementation
//! * [`scheduler`] - Automatic sync scheduling
//! * [`network`] - Connectivity status signalling

/// Configuration module for managing application settings
pub mod config;

/// Application constants and default values
pub mod constants;

/// SeaORM entity models for database tables
pub mod entities;

/// Remote gateway trait, snapshot payloads, and the HTTP implementation
pub mod gateway;

/// Logging setup for debugging and error tracking
pub mod logger;

/// Connectivity status and the monitor that broadcasts it
pub mod network;

/// Repository layer for database operations
pub mod repositories;

/// Auto-sync countdown state machine and its async driver
pub mod scheduler;

/// Local storage layer owning the database connection
pub mod storage;

/// Synchronization engine for keeping local and remote data in sync
pub mod sync;

// Re-export the types most callers need
pub use config::Config;
pub use gateway::{GatewayError, RemoteGateway, TaskSnapshot};
pub use network::{NetworkMonitor, NetworkStatus};
pub use storage::LocalStorage;
pub use sync::{MutationError, SyncReport, SyncService, SyncStatus, TaskUpdate};
