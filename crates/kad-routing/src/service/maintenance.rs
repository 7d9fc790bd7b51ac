use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, info, warn};

use crate::domain::RoutingTable;
use crate::service::DhtService;

/// Lifecycle of a `DhtService`. Construction enters `Running`; the only
/// transition is to `Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    /// Background sweep active, mutations accepted
    Running,
    /// Sweep thread joined, mutations refused
    Stopped,
}

/// Cooperative stop flag the sweep thread sleeps on.
#[derive(Debug, Default)]
pub(crate) struct StopSignal {
    stopped: Mutex<bool>,
    wake: Condvar,
}

impl StopSignal {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Raise the flag. Returns false if it was already raised.
    pub(crate) fn stop(&self) -> bool {
        let mut stopped = self.stopped.lock();
        if *stopped {
            return false;
        }
        *stopped = true;
        self.wake.notify_all();
        true
    }

    pub(crate) fn is_stopped(&self) -> bool {
        *self.stopped.lock()
    }

    /// Sleep up to `timeout`, returning early once stopped.
    ///
    /// The flag is read before sleeping and again on wake-up; the return
    /// value is the flag after the sleep.
    pub(crate) fn wait(&self, timeout: Duration) -> bool {
        let deadline = Instant::now().checked_add(timeout);
        let mut stopped = self.stopped.lock();
        while !*stopped {
            match deadline {
                Some(deadline) => {
                    if self.wake.wait_until(&mut stopped, deadline).timed_out() {
                        break;
                    }
                }
                None => self.wake.wait(&mut stopped),
            }
        }
        *stopped
    }
}

/// One staleness sweep with logging. Shared by the thread and `refresh()`.
pub(crate) fn sweep(table: &RoutingTable, threshold: Duration) -> usize {
    let removed = table.refresh(threshold);
    if removed > 0 {
        debug!(removed, remaining = table.count(), "stale contacts removed");
    }
    removed
}

pub(crate) fn spawn_refresh_thread(
    table: Arc<RoutingTable>,
    signal: Arc<StopSignal>,
    interval: Duration,
    threshold: Duration,
) -> std::io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("dht-refresh".into())
        .spawn(move || {
            debug!(?interval, ?threshold, "refresh loop started");
            while !signal.wait(interval) {
                sweep(&table, threshold);
            }
            debug!("refresh loop exited");
        })
}

impl DhtService {
    /// Stop the background sweep, join it and refuse further mutations.
    ///
    /// Idempotent. A concurrent second caller blocks until the first has
    /// finished joining.
    pub fn shutdown(&self) {
        let mut worker = self.worker.lock();
        self.signal.stop();

        let Some(handle) = worker.take() else {
            return;
        };
        if handle.join().is_err() {
            warn!("refresh thread panicked");
        }
        self.table.close();

        info!(
            local_node_id = %self.table.local_node_id(),
            contacts = self.table.count(),
            "DHT service stopped"
        );
    }

    /// `Stopped` only once the sweep thread has been joined and the table
    /// closed; a raised stop signal alone still reports `Running`.
    pub fn state(&self) -> ServiceState {
        if self.table.is_closed() {
            ServiceState::Stopped
        } else {
            ServiceState::Running
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == ServiceState::Running
    }
}

impl Drop for DhtService {
    fn drop(&mut self) {
        self.shutdown();
    }
}
