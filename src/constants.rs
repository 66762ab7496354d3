//! Constants used throughout the application
//!
//! This module centralizes fixed values and magic strings so engine, config
//! defaults and tests agree on them.

// Reconciliation
/// An action is dropped once its retry count passes this ceiling.
pub const RETRY_LIMIT: i32 = 5;
/// Entity tag recorded on queued actions.
pub const TASK_ENTITY: &str = "task";

// Scheduling
/// Default countdown between automatic sync passes, in seconds.
pub const AUTO_SYNC_INTERVAL_SECS: u32 = 5;

// Remote defaults
/// Base URL used when no config file sets one.
pub const DEFAULT_REMOTE_URL: &str = "https://jsonplaceholder.typicode.com";
/// Default per-request timeout for gateway calls, in seconds.
pub const REMOTE_TIMEOUT_SECS: u64 = 10;

// Storage
/// File name of the task database inside the platform data directory.
pub const DATABASE_FILE: &str = "offlinist.db";
/// File name of the log file inside the platform data directory.
pub const LOG_FILE: &str = "offlinist.log";

// CLI Messages
pub const CONFIG_GENERATED: &str = "✅ Generated default configuration file";
