//! Stand-ins for the GPS and reward services, used by the `tour-guide` binary.

use super::{LocationProvider, ProviderError, RewardOracle};
use crate::model::Location;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use uuid::Uuid;

const MAX_LATITUDE: f64 = 85.05112878;
const MAX_LONGITUDE: f64 = 180.0;
const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

/// SplitMix64 finalizer.
fn mix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Reports a uniformly random position for every request.
pub struct GpsSimulator {
    state: AtomicU64,
}

impl GpsSimulator {
    pub fn new(seed: u64) -> Self {
        Self {
            state: AtomicU64::new(seed),
        }
    }

    /// Seeded from a fresh random UUID.
    pub fn from_entropy() -> Self {
        Self::new(Uuid::new_v4().as_u64_pair().0)
    }

    fn next_unit(&self) -> f64 {
        let z = self
            .state
            .fetch_add(GOLDEN_GAMMA, Ordering::Relaxed)
            .wrapping_add(GOLDEN_GAMMA);
        (mix64(z) >> 11) as f64 / (1u64 << 53) as f64
    }

    fn next_in(&self, limit: f64) -> f64 {
        -limit + self.next_unit() * (2.0 * limit)
    }
}

#[async_trait]
impl LocationProvider for GpsSimulator {
    async fn current_location_of(&self, _user_id: Uuid) -> Result<Location, ProviderError> {
        Ok(Location::new(
            self.next_in(MAX_LATITUDE),
            self.next_in(MAX_LONGITUDE),
        ))
    }
}

/// Deterministic reward points in `1..=1000` per (attraction, user) pair.
pub struct SimulatedRewardCentral {
    latency: Duration,
}

impl SimulatedRewardCentral {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl RewardOracle for SimulatedRewardCentral {
    async fn points_for(&self, attraction_id: Uuid, user_id: Uuid) -> Result<u32, ProviderError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let (a_hi, a_lo) = attraction_id.as_u64_pair();
        let (u_hi, u_lo) = user_id.as_u64_pair();
        let h = mix64(a_hi ^ mix64(a_lo ^ mix64(u_hi ^ mix64(u_lo))));
        Ok((h % 1000) as u32 + 1)
    }
}
