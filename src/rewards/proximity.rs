//! Great-circle distance and the proximity predicates built on it.

use crate::model::{Attraction, Location, VisitedLocation};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Conversion factor from nautical miles to statute miles.
pub const STATUTE_MILES_PER_NAUTICAL_MILE: f64 = 1.15077945;

pub const DEFAULT_PROXIMITY_BUFFER_MILES: f64 = 10.0;
pub const DEFAULT_ATTRACTION_RANGE_MILES: f64 = 200.0;
pub const DEFAULT_NEARBY_COUNT: usize = 5;

/// Distance in statute miles between two points, by the spherical law of cosines.
///
/// Exactly `0.0` for identical points and symmetric in its arguments.
pub fn distance(a: Location, b: Location) -> f64 {
    if a == b {
        return 0.0;
    }
    let lat1 = a.latitude.to_radians();
    let lon1 = a.longitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let lon2 = b.longitude.to_radians();

    let cos_angle = lat1.sin() * lat2.sin() + lat1.cos() * lat2.cos() * (lon1 - lon2).cos();
    // Rounding can push nearly-equal points just past 1.0.
    let angle = cos_angle.clamp(-1.0, 1.0).acos();

    let nautical_miles = 60.0 * angle.to_degrees();
    STATUTE_MILES_PER_NAUTICAL_MILE * nautical_miles
}

/// Proximity thresholds and queries.
///
/// The reward buffer is adjustable at runtime and read on every check; the
/// attraction range and nearby count are fixed at construction.
#[derive(Debug)]
pub struct ProximityEngine {
    proximity_buffer_bits: AtomicU64,
    attraction_range_miles: f64,
    nearby_count: usize,
}

impl Default for ProximityEngine {
    fn default() -> Self {
        Self::new(
            DEFAULT_PROXIMITY_BUFFER_MILES,
            DEFAULT_ATTRACTION_RANGE_MILES,
            DEFAULT_NEARBY_COUNT,
        )
    }
}

impl ProximityEngine {
    pub fn new(proximity_buffer_miles: f64, attraction_range_miles: f64, nearby_count: usize) -> Self {
        Self {
            proximity_buffer_bits: AtomicU64::new(proximity_buffer_miles.max(0.0).to_bits()),
            attraction_range_miles,
            nearby_count,
        }
    }

    /// Current reward eligibility threshold, in miles.
    pub fn proximity_buffer(&self) -> f64 {
        f64::from_bits(self.proximity_buffer_bits.load(Ordering::Acquire))
    }

    /// Changes the reward eligibility threshold. Negative or NaN values become 0.
    pub fn set_proximity_buffer(&self, miles: f64) {
        let miles = miles.max(0.0);
        self.proximity_buffer_bits
            .store(miles.to_bits(), Ordering::Release);
        info!(proximity_buffer_miles = miles, "Proximity buffer updated");
    }

    pub fn attraction_range(&self) -> f64 {
        self.attraction_range_miles
    }

    pub fn nearby_count(&self) -> usize {
        self.nearby_count
    }

    /// Whether `attraction` is close enough to `location` to be worth showing.
    pub fn is_within_attraction_range(&self, attraction: &Attraction, location: Location) -> bool {
        distance(attraction.location(), location) <= self.attraction_range_miles
    }

    /// Whether `visited` is close enough to `attraction` to earn its reward.
    pub fn is_near_for_reward(&self, visited: &VisitedLocation, attraction: &Attraction) -> bool {
        distance(attraction.location(), visited.location) <= self.proximity_buffer()
    }

    /// The `k` attractions closest to `location`, nearest first.
    ///
    /// Equal distances keep catalog order.
    pub fn nearest_attractions(
        &self,
        attractions: &[Attraction],
        location: Location,
        k: usize,
    ) -> Vec<Attraction> {
        let mut by_distance: Vec<(f64, &Attraction)> = attractions
            .iter()
            .map(|a| (distance(location, a.location()), a))
            .collect();
        // `sort_by` is stable.
        by_distance.sort_by(|x, y| x.0.total_cmp(&y.0));
        by_distance
            .into_iter()
            .take(k)
            .map(|(_, a)| a.clone())
            .collect()
    }
}
