//! Controllable collaborator doubles for tests.
//!
//! Both doubles count their calls and can be told to fail for specific keys,
//! which is what the failure-isolation tests need.

use super::{LocationProvider, ProviderError, RewardOracle};
use crate::model::Location;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use uuid::Uuid;

/// Reports the same position for every user, except users marked as failing.
pub struct FixedLocationProvider {
    location: Mutex<Location>,
    failing: Mutex<HashSet<Uuid>>,
    delay: Mutex<Option<Duration>>,
    calls: AtomicUsize,
}

impl FixedLocationProvider {
    pub fn new(location: Location) -> Self {
        Self {
            location: Mutex::new(location),
            failing: Mutex::new(HashSet::new()),
            delay: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    /// Every fetch for `user_id` fails from now on.
    pub fn fail_for(&self, user_id: Uuid) {
        self.failing.lock().insert(user_id);
    }

    /// Every fetch sleeps for `delay` before answering.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    pub fn move_to(&self, location: Location) {
        *self.location.lock() = location;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LocationProvider for FixedLocationProvider {
    async fn current_location_of(&self, user_id: Uuid) -> Result<Location, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.lock().contains(&user_id) {
            return Err(ProviderError::Unavailable(format!("no fix for {}", user_id)));
        }
        Ok(*self.location.lock())
    }
}

/// Returns a fixed point value, except for attractions marked as failing.
pub struct CountingRewardOracle {
    points: u32,
    failing: Mutex<HashSet<Uuid>>,
    delay: Mutex<Option<Duration>>,
    calls: AtomicUsize,
}

impl CountingRewardOracle {
    pub fn new(points: u32) -> Self {
        Self {
            points,
            failing: Mutex::new(HashSet::new()),
            delay: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn fail_for(&self, attraction_id: Uuid) {
        self.failing.lock().insert(attraction_id);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RewardOracle for CountingRewardOracle {
    async fn points_for(&self, attraction_id: Uuid, _user_id: Uuid) -> Result<u32, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.lock().contains(&attraction_id) {
            return Err(ProviderError::Unavailable("reward central down".into()));
        }
        Ok(self.points)
    }
}
