use crate::catalog::{
    AttractionCatalog, AttractionSource, CatalogError, EmbeddedAttractionSource,
    TomlAttractionSource,
};
use crate::lifecycle::Config;
use crate::model::User;
use crate::providers::{GpsSimulator, LocationProvider, RewardOracle, SimulatedRewardCentral};
use crate::rewards::{LedgerContext, ProximityEngine, WorkerPool};
use crate::tracker::Tracker;
use crate::tracking::{TrackingService, TrackingSettings};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// The external services the engine talks to.
pub struct Collaborators {
    pub locations: Arc<dyn LocationProvider>,
    pub oracle: Arc<dyn RewardOracle>,
    pub attractions: Arc<dyn AttractionSource>,
}

impl Collaborators {
    /// Simulated GPS and reward services, with the catalog named by the config.
    pub fn simulated(config: &Config) -> Self {
        let attractions: Arc<dyn AttractionSource> = match config.catalog_path() {
            Some(path) => Arc::new(TomlAttractionSource::new(path)),
            None => Arc::new(EmbeddedAttractionSource),
        };
        Self {
            locations: Arc::new(GpsSimulator::from_entropy()),
            oracle: Arc::new(SimulatedRewardCentral::new(config.oracle_latency())),
            attractions,
        }
    }
}

/// The main runtime orchestrator for the tour guide service.
///
/// `TourGuideSystem` is responsible for:
/// - **Dependency Wiring**: loading the catalog and building the ledger context,
///   worker pool and tracking service from one [`Config`]
/// - **Lifecycle Management**: starting the sweep scheduler and stopping it,
///   then every user actor, on shutdown
///
/// # Example
///
/// ```ignore
/// let config = Config::load_from_path("config/dev.toml");
/// let system = TourGuideSystem::start(&config, Collaborators::simulated(&config)).await?;
///
/// let user = system.tracking.user("internalUser0")?;
/// let visit = system.tracking.current_location(&user).await?;
///
/// system.shutdown().await;
/// ```
pub struct TourGuideSystem {
    /// Entry point for every user-facing operation
    pub tracking: TrackingService,

    /// Sweep scheduler; `None` when disabled in the config
    tracker: Option<Tracker>,
}

impl TourGuideSystem {
    /// Loads the catalog, wires the engine and starts the tracker if enabled.
    ///
    /// Fails only if the attraction catalog cannot be loaded.
    pub async fn start(config: &Config, collaborators: Collaborators) -> Result<Self, CatalogError> {
        // 1. Catalog (fatal if missing)
        let catalog = AttractionCatalog::load(collaborators.attractions.as_ref()).await?;

        // 2. Shared context injected into every user actor
        let ledger = LedgerContext {
            catalog,
            proximity: Arc::new(ProximityEngine::new(
                config.proximity_buffer_miles(),
                config.attraction_range_miles(),
                config.nearby_count(),
            )),
            oracle: collaborators.oracle,
            pool: WorkerPool::new(
                config.pool_capacity(),
                config.interactive_reserve(),
                config.queue_timeout(),
            ),
            ledger_timeout: config.ledger_timeout(),
        };
        info!(
            capacity = config.pool_capacity(),
            interactive_reserve = config.interactive_reserve(),
            "Worker pool ready"
        );

        let tracking = TrackingService::new(
            ledger,
            collaborators.locations,
            TrackingSettings {
                location_timeout: config.location_timeout(),
                fanout_limit: config.fanout_limit(),
                mailbox_size: config.mailbox_size(),
            },
        );

        let system = Self {
            tracking,
            tracker: None,
        };
        if config.seed_users() > 0 {
            system.seed_users(config.seed_users());
        }

        // 3. Scheduler last, so the first sweep sees the seeded users
        let tracker = config
            .tracker_enabled()
            .then(|| Tracker::spawn(system.tracking.clone(), config.tracker_interval()));

        Ok(Self { tracker, ..system })
    }

    /// Registers `count` demo users named `internalUser{i}`. Returns how many were new.
    pub fn seed_users(&self, count: usize) -> usize {
        let added = (0..count)
            .filter(|i| {
                let name = format!("internalUser{}", i);
                let email = format!("{}@tourGuide.com", name);
                self.tracking
                    .add_user(User::new(Uuid::new_v4(), &name, "000", &email))
            })
            .count();
        info!(added, total = self.tracking.user_count(), "Internal test users registered");
        added
    }

    pub fn tracker(&self) -> Option<&Tracker> {
        self.tracker.as_ref()
    }

    /// Gracefully shuts down the entire system.
    ///
    /// Does not wait for outstanding `UserClient` clones; their later calls fail.
    pub async fn shutdown(self) {
        info!("Shutting down system...");

        // =====================================================================
        // Step 1: Stop sweeping. A sweep in progress completes first.
        // =====================================================================
        if let Some(tracker) = &self.tracker {
            tracker.shutdown().await;
        }
        drop(self.tracker);

        // =====================================================================
        // Step 2: Close the pool and wait for every user actor
        // =====================================================================
        self.tracking.shutdown().await;

        info!("System shutdown complete.");
    }
}
