//! The tracking orchestrator: fetch a position, record it, update the ledger.

use super::{TrackingError, UserRegistry};
use crate::clients::UserClient;
use crate::model::{Attraction, Location, NearbyAttraction, User, UserReward, VisitedLocation};
use crate::providers::{LocationProvider, ProviderError};
use crate::rewards::{distance, LedgerContext, Priority};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, instrument, warn};

/// Tunables for the orchestrator.
#[derive(Debug, Clone)]
pub struct TrackingSettings {
    /// Upper bound on one location fetch.
    pub location_timeout: Duration,
    /// Maximum number of users tracked concurrently by one `track_users` call.
    pub fanout_limit: usize,
    /// Mailbox capacity of each user actor.
    pub mailbox_size: usize,
}

impl Default for TrackingSettings {
    fn default() -> Self {
        Self {
            location_timeout: Duration::from_secs(10),
            fanout_limit: 256,
            mailbox_size: 32,
        }
    }
}

/// One user that could not be tracked during a batch.
#[derive(Debug, Clone)]
pub struct SweepFailure {
    pub user: String,
    pub error: TrackingError,
}

/// Outcome of [`TrackingService::track_users`].
#[derive(Debug, Clone, Default)]
pub struct SweepReport {
    pub users: usize,
    pub tracked: usize,
    pub failures: Vec<SweepFailure>,
    /// Per-user tasks that panicked instead of returning.
    pub panicked: usize,
}

impl SweepReport {
    pub fn failed(&self) -> usize {
        self.failures.len() + self.panicked
    }
}

struct ServiceInner {
    registry: UserRegistry,
    locations: Arc<dyn LocationProvider>,
    ledger: LedgerContext,
    settings: TrackingSettings,
}

/// Entry point for everything that reads or moves users.
///
/// Cheap to clone; all clones share the same registry and collaborators.
#[derive(Clone)]
pub struct TrackingService {
    inner: Arc<ServiceInner>,
}

impl TrackingService {
    pub fn new(
        ledger: LedgerContext,
        locations: Arc<dyn LocationProvider>,
        settings: TrackingSettings,
    ) -> Self {
        let registry = UserRegistry::new(ledger.clone(), settings.mailbox_size);
        Self {
            inner: Arc::new(ServiceInner {
                registry,
                locations,
                ledger,
                settings,
            }),
        }
    }

    // --- Registry ---

    /// Registers a user. No-op (returns `false`) if the name is taken.
    pub fn add_user(&self, user: User) -> bool {
        self.inner.registry.add_user(user)
    }

    /// Looks a user up by name.
    pub fn user(&self, name: &str) -> Result<UserClient, TrackingError> {
        self.inner
            .registry
            .get(name)
            .ok_or_else(|| TrackingError::UnknownUser(name.to_string()))
    }

    pub fn all_users(&self) -> Vec<UserClient> {
        self.inner.registry.all()
    }

    pub fn user_count(&self) -> usize {
        self.inner.registry.len()
    }

    // --- Tracking ---

    /// Fetches the user's position, appends it to the history and waits for the
    /// reward ledger update.
    ///
    /// If the ledger update fails the visit stays recorded and the error is returned.
    /// If the actor cannot record the visit, nothing is recorded.
    #[instrument(skip(self, user), fields(user = %user.name()))]
    pub async fn track_user(
        &self,
        user: &UserClient,
        priority: Priority,
    ) -> Result<VisitedLocation, TrackingError> {
        let location = self.fetch_location(user).await?;
        let visited = VisitedLocation::new(user.id(), location, Utc::now());

        let history_len = user.record_visit(visited.clone()).await?;
        let added = user.update_rewards(priority).await?;
        debug!(history_len, added, "User tracked");

        Ok(visited)
    }

    async fn fetch_location(&self, user: &UserClient) -> Result<Location, TrackingError> {
        let timeout = self.inner.settings.location_timeout;
        let fetched = tokio::time::timeout(
            timeout,
            self.inner.locations.current_location_of(user.id()),
        )
        .await
        .unwrap_or(Err(ProviderError::Timeout {
            after_ms: timeout.as_millis() as u64,
        }));

        fetched.map_err(|source| TrackingError::LocationFetch {
            user: user.name().to_string(),
            source,
        })
    }

    /// Tracks every user in `users` concurrently.
    ///
    /// Failures are logged and collected into the report; they never stop the
    /// rest of the batch. No ordering is guaranteed between users.
    pub async fn track_users(&self, users: &[UserClient]) -> SweepReport {
        let mut report = SweepReport {
            users: users.len(),
            ..SweepReport::default()
        };
        let limiter = Arc::new(Semaphore::new(self.inner.settings.fanout_limit.max(1)));
        let mut tasks = JoinSet::new();

        for user in users {
            // Wait for a free slot before spawning so a huge population does not
            // turn into a huge number of parked tasks.
            let Ok(permit) = limiter.clone().acquire_owned().await else {
                break;
            };
            let service = self.clone();
            let user = user.clone();
            tasks.spawn(async move {
                let _permit = permit;
                let result = service.track_user(&user, Priority::Background).await;
                (user.name().to_string(), result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(_))) => report.tracked += 1,
                Ok((user, Err(error))) => {
                    warn!(user = %user, error = %error, retryable = error.is_retryable(), "Tracking failed");
                    report.failures.push(SweepFailure { user, error });
                }
                Err(e) => {
                    error!(error = %e, "Tracking task panicked");
                    report.panicked += 1;
                }
            }
        }

        report
    }

    /// The user's latest known position, tracking them once if they have none.
    pub async fn current_location(&self, user: &UserClient) -> Result<VisitedLocation, TrackingError> {
        match user.last_visit().await? {
            Some(visit) => Ok(visit),
            None => self.track_user(user, Priority::Interactive).await,
        }
    }

    /// Runs the reward ledger update for `user` without a new visit.
    pub async fn update_rewards(&self, user: &UserClient, priority: Priority) -> Result<usize, TrackingError> {
        Ok(user.update_rewards(priority).await?)
    }

    // --- Rewards & proximity ---

    pub async fn rewards_of(&self, user: &UserClient) -> Result<Vec<UserReward>, TrackingError> {
        Ok(user.rewards().await?)
    }

    /// The configured number of attractions closest to `location`, nearest first.
    pub fn nearby_attractions(&self, location: Location) -> Vec<Attraction> {
        let proximity = &self.inner.ledger.proximity;
        proximity.nearest_attractions(
            self.inner.ledger.catalog.list(),
            location,
            proximity.nearby_count(),
        )
    }

    /// Nearby attractions around the user's current position, with distance and
    /// the points each one would be worth to this user.
    ///
    /// A failed points lookup reports 0 points for that attraction.
    pub async fn nearby_attractions_info(
        &self,
        user: &UserClient,
    ) -> Result<Vec<NearbyAttraction>, TrackingError> {
        let user_location = self.current_location(user).await?.location;
        let mut nearby = Vec::new();

        for attraction in self.nearby_attractions(user_location) {
            let reward_points = match self
                .inner
                .ledger
                .oracle
                .points_for(attraction.id, user.id())
                .await
            {
                Ok(points) => points,
                Err(e) => {
                    warn!(user = %user.name(), attraction = %attraction.name, error = %e, "Reward lookup failed");
                    0
                }
            };
            nearby.push(NearbyAttraction {
                attraction_name: attraction.name.clone(),
                attraction_location: attraction.location(),
                user_location,
                distance_miles: distance(user_location, attraction.location()),
                reward_points,
            });
        }

        Ok(nearby)
    }

    /// Changes the reward eligibility threshold for all subsequent ledger updates.
    pub fn update_proximity_buffer(&self, miles: f64) {
        self.inner.ledger.proximity.set_proximity_buffer(miles);
    }

    pub fn proximity_buffer(&self) -> f64 {
        self.inner.ledger.proximity.proximity_buffer()
    }

    /// Closes the worker pool and stops every user actor.
    ///
    /// `UserClient` clones still held elsewhere fail their later calls.
    pub async fn shutdown(&self) {
        self.inner.ledger.pool.close();
        self.inner.registry.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AttractionCatalog, EmbeddedAttractionSource};
    use crate::clients::ActorClient;
    use crate::providers::mock::{CountingRewardOracle, FixedLocationProvider};
    use crate::rewards::{ProximityEngine, WorkerPool};
    use crate::user_actor::UserError;
    use uuid::Uuid;

    const DISNEYLAND: Location = Location {
        latitude: 33.817595,
        longitude: -117.922008,
    };

    async fn service_with(
        locations: Arc<FixedLocationProvider>,
        oracle: Arc<CountingRewardOracle>,
    ) -> TrackingService {
        let ledger = LedgerContext {
            catalog: AttractionCatalog::load(&EmbeddedAttractionSource).await.unwrap(),
            proximity: Arc::new(ProximityEngine::default()),
            oracle,
            pool: WorkerPool::new(16, 2, Duration::from_secs(60)),
            ledger_timeout: Duration::from_secs(30),
        };
        TrackingService::new(ledger, locations, TrackingSettings::default())
    }

    fn user(name: &str) -> User {
        User::new(Uuid::new_v4(), name, "000", &format!("{}@tourGuide.com", name))
    }

    #[tokio::test]
    async fn test_track_user_records_visit_and_rewards() {
        let locations = Arc::new(FixedLocationProvider::new(DISNEYLAND));
        let service = service_with(locations, Arc::new(CountingRewardOracle::new(42))).await;
        service.add_user(user("jon"));
        let jon = service.user("jon").unwrap();

        let visit = service.track_user(&jon, Priority::Interactive).await.unwrap();

        assert_eq!(visit.user_id, jon.id());
        assert_eq!(visit.location, DISNEYLAND);
        let rewards = service.rewards_of(&jon).await.unwrap();
        assert_eq!(rewards.len(), 1);
        assert_eq!(rewards[0].reward_points, 42);
    }

    #[tokio::test]
    async fn test_current_location_tracks_once_when_history_is_empty() {
        let locations = Arc::new(FixedLocationProvider::new(DISNEYLAND));
        let service = service_with(locations.clone(), Arc::new(CountingRewardOracle::new(1))).await;
        service.add_user(user("jon"));
        let jon = service.user("jon").unwrap();

        let first = service.current_location(&jon).await.unwrap();
        let second = service.current_location(&jon).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(locations.calls(), 1);
        assert_eq!(jon.snapshot().await.unwrap().visited_locations().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_user_is_reported() {
        let locations = Arc::new(FixedLocationProvider::new(DISNEYLAND));
        let service = service_with(locations, Arc::new(CountingRewardOracle::new(1))).await;

        let err = service.user("nobody").unwrap_err();

        assert_eq!(err, TrackingError::UnknownUser("nobody".into()));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_duplicate_name_is_not_registered_twice() {
        let locations = Arc::new(FixedLocationProvider::new(DISNEYLAND));
        let service = service_with(locations, Arc::new(CountingRewardOracle::new(1))).await;

        assert!(service.add_user(user("jon")));
        assert!(!service.add_user(user("jon")));
        assert_eq!(service.user_count(), 1);
    }

    #[tokio::test]
    async fn test_one_failing_user_does_not_stop_the_batch() {
        let locations = Arc::new(FixedLocationProvider::new(DISNEYLAND));
        let service = service_with(locations.clone(), Arc::new(CountingRewardOracle::new(1))).await;
        for i in 0..100 {
            service.add_user(user(&format!("internalUser{}", i)));
        }
        let broken = service.user("internalUser17").unwrap();
        locations.fail_for(broken.id());

        let report = service.track_users(&service.all_users()).await;

        assert_eq!(report.users, 100);
        assert_eq!(report.tracked, 99);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.failures[0].user, "internalUser17");
        assert!(matches!(
            report.failures[0].error,
            TrackingError::LocationFetch { .. }
        ));
        assert!(broken.last_visit().await.unwrap().is_none());
        let healthy = service.user("internalUser3").unwrap();
        assert_eq!(healthy.rewards().await.unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_location_fetch_times_out() {
        let locations = Arc::new(FixedLocationProvider::new(DISNEYLAND));
        locations.set_delay(Duration::from_secs(60));
        let service = service_with(locations, Arc::new(CountingRewardOracle::new(1))).await;
        service.add_user(user("jon"));
        let jon = service.user("jon").unwrap();

        let err = service.track_user(&jon, Priority::Interactive).await.unwrap_err();

        match &err {
            TrackingError::LocationFetch { user, source } => {
                assert_eq!(user, "jon");
                assert_eq!(*source, ProviderError::Timeout { after_ms: 10_000 });
            }
            other => panic!("expected location fetch error, got {:?}", other),
        }
        assert!(err.is_retryable());
        assert!(jon.last_visit().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unrecordable_visit_is_an_actor_error() {
        let locations = Arc::new(FixedLocationProvider::new(DISNEYLAND));
        let service = service_with(locations.clone(), Arc::new(CountingRewardOracle::new(1))).await;
        service.add_user(user("jon"));
        let jon = service.user("jon").unwrap();
        service.shutdown().await;

        let err = service.track_user(&jon, Priority::Interactive).await.unwrap_err();

        assert_eq!(locations.calls(), 1);
        assert!(matches!(
            err,
            TrackingError::Actor(UserError::ActorCommunicationError(_))
        ));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_nearby_attractions_are_nearest_first() {
        let locations = Arc::new(FixedLocationProvider::new(DISNEYLAND));
        let service = service_with(locations, Arc::new(CountingRewardOracle::new(1))).await;

        let nearby = service.nearby_attractions(DISNEYLAND);

        assert_eq!(nearby.len(), 5);
        assert_eq!(nearby[0].name, "Disneyland");
        let distances: Vec<f64> = nearby.iter().map(|a| distance(DISNEYLAND, a.location())).collect();
        assert!(distances.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test]
    async fn test_nearby_info_reports_zero_points_on_oracle_failure() {
        let locations = Arc::new(FixedLocationProvider::new(DISNEYLAND));
        let oracle = Arc::new(CountingRewardOracle::new(77));
        let service = service_with(locations, oracle.clone()).await;
        service.add_user(user("jon"));
        let jon = service.user("jon").unwrap();
        let closest = service.nearby_attractions(DISNEYLAND)[0].clone();
        oracle.fail_for(closest.id);

        let info = service.nearby_attractions_info(&jon).await.unwrap();

        assert_eq!(info.len(), 5);
        assert_eq!(info[0].attraction_name, closest.name);
        assert_eq!(info[0].reward_points, 0);
        assert_eq!(info[0].distance_miles, 0.0);
        assert_eq!(info[0].user_location, DISNEYLAND);
        assert!(info[1..].iter().all(|n| n.reward_points == 77));
    }

    #[tokio::test]
    async fn test_larger_buffer_applies_to_next_update() {
        let locations = Arc::new(FixedLocationProvider::new(DISNEYLAND));
        let service = service_with(locations, Arc::new(CountingRewardOracle::new(1))).await;
        service.add_user(user("jon"));
        let jon = service.user("jon").unwrap();
        service.track_user(&jon, Priority::Interactive).await.unwrap();
        assert_eq!(service.rewards_of(&jon).await.unwrap().len(), 1);

        service.update_proximity_buffer(10_000.0);
        let added = service.update_rewards(&jon, Priority::Interactive).await.unwrap();

        assert_eq!(service.proximity_buffer(), 10_000.0);
        assert_eq!(added, 25);
        assert_eq!(service.rewards_of(&jon).await.unwrap().len(), 26);
    }
}
