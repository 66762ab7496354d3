//! Auto-sync scheduling.
//!
//! The countdown logic lives in [`AutoSyncScheduler`], a plain state machine
//! driven by discrete events (ticks, connectivity changes, toggle changes) so
//! it can be tested without timers. [`run_auto_sync`] adapts wall-clock time
//! and the live engine signals onto the machine.

use std::time::Duration;

use log::{debug, error, info};
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};

use crate::network::NetworkStatus;
use crate::sync::SyncService;

/// Where the scheduler currently is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Not counting: offline, auto-sync disabled, or a sync in flight.
    Idle,
    /// Online and enabled; fires when the countdown reaches zero.
    Counting { remaining: u32 },
}

/// Countdown-driven trigger for periodic syncs.
///
/// Holds the conditions that gate auto-sync (connectivity, the enabled
/// toggle, sync-in-flight) and a seconds countdown. Any condition change
/// re-evaluates the state and restarts the countdown from the full interval.
#[derive(Debug)]
pub struct AutoSyncScheduler {
    state: SchedulerState,
    interval_secs: u32,
    online: bool,
    enabled: bool,
    syncing: bool,
}

impl AutoSyncScheduler {
    /// Create a scheduler with the given period. Starts offline, so the
    /// initial state is always `Idle` until connectivity is reported.
    pub fn new(interval_secs: u32, enabled: bool) -> Self {
        Self {
            state: SchedulerState::Idle,
            interval_secs,
            online: false,
            enabled,
            syncing: false,
        }
    }

    /// Advance one second. Returns true when the countdown expires; the
    /// countdown restarts at the full interval in the same step.
    pub fn tick(&mut self) -> bool {
        match self.state {
            SchedulerState::Idle => false,
            SchedulerState::Counting { remaining } => {
                if remaining <= 1 {
                    self.state = SchedulerState::Counting {
                        remaining: self.interval_secs,
                    };
                    true
                } else {
                    self.state = SchedulerState::Counting {
                        remaining: remaining - 1,
                    };
                    false
                }
            }
        }
    }

    pub fn set_online(&mut self, online: bool) {
        if self.online != online {
            self.online = online;
            self.reevaluate();
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            self.enabled = enabled;
            self.reevaluate();
        }
    }

    pub fn set_syncing(&mut self, syncing: bool) {
        if self.syncing != syncing {
            self.syncing = syncing;
            self.reevaluate();
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Seconds until the next fire, when counting.
    pub fn countdown(&self) -> Option<u32> {
        match self.state {
            SchedulerState::Idle => None,
            SchedulerState::Counting { remaining } => Some(remaining),
        }
    }

    // Every re-evaluation restarts the countdown at the full interval, so a
    // flap (offline and back, or a completed sync) never fires early.
    fn reevaluate(&mut self) {
        self.state = if self.online && self.enabled && !self.syncing {
            SchedulerState::Counting {
                remaining: self.interval_secs,
            }
        } else {
            SchedulerState::Idle
        };
    }
}

/// Drive the scheduler against real time and the engine's live signals.
///
/// Runs until the network watch channel closes (monitor dropped). Three
/// event sources feed the machine:
/// - a 1 s ticker advances the countdown,
/// - the connectivity watch updates the online condition,
/// - the engine's wake signal requests an immediate out-of-band pass
///   (fired by mutations made while online).
///
/// Sync passes are awaited in place, so a fire can never overlap the pass it
/// started; the in-flight guard inside [`SyncService::sync`] covers manual
/// callers on other tasks.
pub async fn run_auto_sync(
    service: SyncService,
    mut network: watch::Receiver<NetworkStatus>,
    interval_secs: u32,
    enabled: bool,
) {
    let wake = service.wake_signal();
    let mut machine = AutoSyncScheduler::new(interval_secs, enabled);
    machine.set_online(network.borrow().is_online());

    let mut ticker = interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(
        "🔄 Auto-sync scheduler started (every {}s, enabled: {})",
        interval_secs, enabled
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                machine.set_syncing(service.is_syncing().await);
                if machine.tick() {
                    debug!("Auto-sync countdown expired");
                    run_pass(&service).await;
                }
            }
            changed = network.changed() => {
                if changed.is_err() {
                    info!("Network monitor gone - stopping auto-sync scheduler");
                    break;
                }
                let online = network.borrow_and_update().is_online();
                machine.set_online(online);
            }
            _ = wake.notified() => {
                debug!("Sync requested by a local mutation");
                run_pass(&service).await;
            }
        }
    }
}

async fn run_pass(service: &SyncService) {
    match service.sync().await {
        Ok(report) if report.errors > 0 => {
            info!(
                "Sync pass finished with {} error(s), {} item(s) synced",
                report.errors, report.synced
            );
        }
        Ok(_) => {}
        Err(e) => error!("❌ Sync pass failed: {}", e),
    }
}
