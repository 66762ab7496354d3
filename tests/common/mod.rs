//! Shared test harness: an in-memory engine and a scripted fake gateway.

// Each integration test binary compiles this module separately and not all
// of them use every helper.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::sync::Mutex as StdMutex;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use offlinist::gateway::{GatewayError, RemoteGateway, TaskSnapshot};
use offlinist::network::{NetworkMonitor, NetworkStatus};
use offlinist::storage::LocalStorage;
use offlinist::sync::SyncService;

/// Remote gateway double. Records every call in order and can be switched
/// into a failing mode; created tasks get ids counted up from 42.
pub struct FakeGateway {
    fail: AtomicBool,
    next_id: AtomicUsize,
    calls: StdMutex<Vec<String>>,
    gate: Option<Arc<Notify>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self {
            fail: AtomicBool::new(false),
            next_id: AtomicUsize::new(42),
            calls: StdMutex::new(Vec::new()),
            gate: None,
        }
    }

    /// A gateway whose calls park on the returned signal until notified.
    pub fn gated() -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let mut gateway = Self::new();
        gateway.gate = Some(gate.clone());
        (gateway, gate)
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Calls made so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    async fn check(&self) -> Result<(), GatewayError> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(GatewayError::Status(500));
        }
        Ok(())
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl RemoteGateway for FakeGateway {
    async fn create_task(&self, snapshot: &TaskSnapshot) -> Result<String, GatewayError> {
        self.check().await?;
        self.record(format!("CREATE {}", snapshot.title));
        Ok(self.next_id.fetch_add(1, Ordering::SeqCst).to_string())
    }

    async fn update_task(
        &self,
        remote_id: &str,
        snapshot: &TaskSnapshot,
    ) -> Result<(), GatewayError> {
        self.check().await?;
        self.record(format!("UPDATE {} {}", remote_id, snapshot.title));
        Ok(())
    }

    async fn delete_task(&self, remote_id: &str) -> Result<(), GatewayError> {
        self.check().await?;
        self.record(format!("DELETE {}", remote_id));
        Ok(())
    }
}

/// Everything a test needs to drive the engine: the service under test plus
/// handles on its storage, gateway and connectivity.
pub struct TestEngine {
    pub service: SyncService,
    pub storage: Arc<Mutex<LocalStorage>>,
    pub gateway: Arc<FakeGateway>,
    pub monitor: NetworkMonitor,
}

impl TestEngine {
    pub fn set_online(&self, online: bool) {
        let status = if online {
            NetworkStatus::online()
        } else {
            NetworkStatus::offline()
        };
        self.monitor.set_status(status);
    }
}

/// Build an engine over a fresh in-memory database.
pub async fn engine(status: NetworkStatus) -> TestEngine {
    engine_with(status, FakeGateway::new()).await
}

pub async fn engine_with(status: NetworkStatus, gateway: FakeGateway) -> TestEngine {
    let storage = Arc::new(Mutex::new(
        LocalStorage::in_memory().await.expect("in-memory storage"),
    ));
    let gateway = Arc::new(gateway);
    let monitor = NetworkMonitor::new(status);
    let service = SyncService::new(storage.clone(), gateway.clone(), monitor.subscribe());

    TestEngine {
        service,
        storage,
        gateway,
        monitor,
    }
}
