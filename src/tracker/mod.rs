//! # Sweep Scheduler
//!
//! Background task that tracks every registered user once per interval.
//!
//! ```text
//!   Idle ──start()──▶ Running ──stop()──▶ Stopped
//!     └──────────────stop()──────────────────▲
//! ```
//!
//! `Stopped` is terminal. A sweep that is already running when `stop()` is
//! called finishes before the loop exits.

use crate::tracking::TrackingService;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info};

/// Lifecycle state of a [`Tracker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    Idle,
    Running,
    Stopped,
}

pub struct Tracker {
    service: TrackingService,
    interval: Duration,
    state: Mutex<TrackerState>,
    stop_tx: watch::Sender<bool>,
    handle: Mutex<Option<JoinHandle<()>>>,
    sweeps: Arc<AtomicU64>,
}

impl Tracker {
    pub fn new(service: TrackingService, interval: Duration) -> Self {
        let (stop_tx, _) = watch::channel(false);
        Self {
            service,
            interval,
            state: Mutex::new(TrackerState::Idle),
            stop_tx,
            handle: Mutex::new(None),
            sweeps: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Creates a tracker and starts it right away.
    pub fn spawn(service: TrackingService, interval: Duration) -> Self {
        let tracker = Self::new(service, interval);
        tracker.start();
        tracker
    }

    /// Starts the sweep loop. No-op unless the tracker is `Idle`.
    pub fn start(&self) {
        let mut state = self.state.lock();
        if *state != TrackerState::Idle {
            debug!(state = ?*state, "Tracker start ignored");
            return;
        }

        let task = sweep_loop(
            self.service.clone(),
            self.interval,
            self.stop_tx.subscribe(),
            self.sweeps.clone(),
        );
        *self.handle.lock() = Some(tokio::spawn(task));
        *state = TrackerState::Running;
        info!(interval_secs = self.interval.as_secs(), "Tracker started");
    }

    /// Asks the loop to exit. Does not wait; safe to call any number of times.
    pub fn stop(&self) {
        let mut state = self.state.lock();
        if *state == TrackerState::Stopped {
            return;
        }
        *state = TrackerState::Stopped;
        self.stop_tx.send_replace(true);
        info!("Tracker stopping");
    }

    /// Stops the loop and waits for it to exit.
    pub async fn shutdown(&self) {
        self.stop();
        let handle = self.handle.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!(error = %e, "Tracker task failed");
            }
        }
    }

    pub fn state(&self) -> TrackerState {
        *self.state.lock()
    }

    /// Number of sweeps finished since the tracker was created.
    pub fn sweeps_completed(&self) -> u64 {
        self.sweeps.load(Ordering::SeqCst)
    }
}

impl Drop for Tracker {
    fn drop(&mut self) {
        self.stop_tx.send_replace(true);
    }
}

async fn sweep_loop(
    service: TrackingService,
    interval: Duration,
    mut stop: watch::Receiver<bool>,
    sweeps: Arc<AtomicU64>,
) {
    loop {
        tokio::select! {
            biased;
            changed = stop.changed() => {
                if changed.is_err() || *stop.borrow() {
                    break;
                }
                continue;
            }
            _ = tokio::time::sleep(interval) => {}
        }

        let started = Instant::now();
        let users = service.all_users();
        let report = service.track_users(&users).await;
        drop(users);
        sweeps.fetch_add(1, Ordering::SeqCst);

        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            users = report.users,
            tracked = report.tracked,
            failed = report.failed(),
            "Sweep finished"
        );
    }
    debug!("Tracker loop exited");
}
