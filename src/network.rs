//! Connectivity signal consumed by the sync engine and the scheduler.
//!
//! Producing the signal (OS callbacks, reachability probes) is out of scope;
//! whoever owns that feeds status changes into a [`NetworkMonitor`] and the
//! rest of the system reacts through watch subscriptions.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Point-in-time connectivity state.
///
/// `internet_reachable` stays `None` while reachability has not been probed;
/// only an explicit `Some(true)` makes the engine eligible to sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkStatus {
    pub connected: bool,
    pub internet_reachable: Option<bool>,
}

impl NetworkStatus {
    /// Connected with confirmed internet reachability.
    pub fn online() -> Self {
        NetworkStatus {
            connected: true,
            internet_reachable: Some(true),
        }
    }

    /// Disconnected.
    pub fn offline() -> Self {
        NetworkStatus {
            connected: false,
            internet_reachable: Some(false),
        }
    }

    /// Eligible to talk to the remote service.
    pub fn is_online(&self) -> bool {
        self.connected && self.internet_reachable == Some(true)
    }
}

impl Default for NetworkStatus {
    fn default() -> Self {
        Self::offline()
    }
}

/// Owner of the connectivity watch channel.
#[derive(Debug)]
pub struct NetworkMonitor {
    tx: watch::Sender<NetworkStatus>,
}

impl NetworkMonitor {
    pub fn new(initial: NetworkStatus) -> Self {
        let (tx, _rx) = watch::channel(initial);
        NetworkMonitor { tx }
    }

    /// Publish a status change to all subscribers.
    pub fn set_status(&self, status: NetworkStatus) {
        self.tx.send_replace(status);
    }

    pub fn subscribe(&self) -> watch::Receiver<NetworkStatus> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> NetworkStatus {
        *self.tx.borrow()
    }
}

impl Default for NetworkMonitor {
    fn default() -> Self {
        Self::new(NetworkStatus::default())
    }
}
