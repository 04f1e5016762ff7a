//! Configuration loading from TOML files
//!
//! Config file is selected via `--config <path>`, default `config/dev.toml`.
//! Every key is optional; missing sections fall back to the defaults below.

use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Deserialize)]
pub struct TrackerConfig {
    #[serde(default = "default_tracker_enabled")]
    pub enabled: bool,
    #[serde(default = "default_tracker_interval_secs")]
    pub interval_secs: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            enabled: default_tracker_enabled(),
            interval_secs: default_tracker_interval_secs(),
        }
    }
}

fn default_tracker_enabled() -> bool {
    true
}

fn default_tracker_interval_secs() -> u64 {
    300
}

#[derive(Debug, Clone, Deserialize)]
pub struct RewardsConfig {
    #[serde(default = "default_proximity_buffer_miles")]
    pub proximity_buffer_miles: f64,
    #[serde(default = "default_attraction_range_miles")]
    pub attraction_range_miles: f64,
    /// How many attractions `nearby_attractions` returns
    #[serde(default = "default_nearby_count")]
    pub nearby_count: usize,
    #[serde(default = "default_ledger_timeout_ms")]
    pub ledger_timeout_ms: u64,
}

impl Default for RewardsConfig {
    fn default() -> Self {
        Self {
            proximity_buffer_miles: default_proximity_buffer_miles(),
            attraction_range_miles: default_attraction_range_miles(),
            nearby_count: default_nearby_count(),
            ledger_timeout_ms: default_ledger_timeout_ms(),
        }
    }
}

fn default_proximity_buffer_miles() -> f64 {
    10.0
}

fn default_attraction_range_miles() -> f64 {
    200.0
}

fn default_nearby_count() -> usize {
    5
}

fn default_ledger_timeout_ms() -> u64 {
    30_000
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoolConfig {
    /// Fixed worker count. Derived from `expected_population` when unset.
    #[serde(default)]
    pub capacity: Option<usize>,
    #[serde(default = "default_expected_population")]
    pub expected_population: usize,
    /// Slots kept for interactive requests. Defaults to capacity / 8.
    #[serde(default)]
    pub interactive_reserve: Option<usize>,
    #[serde(default = "default_queue_timeout_ms")]
    pub queue_timeout_ms: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            capacity: None,
            expected_population: default_expected_population(),
            interactive_reserve: None,
            queue_timeout_ms: default_queue_timeout_ms(),
        }
    }
}

fn default_expected_population() -> usize {
    10_000
}

fn default_queue_timeout_ms() -> u64 {
    60_000
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackingConfig {
    #[serde(default = "default_fanout_limit")]
    pub fanout_limit: usize,
    #[serde(default = "default_location_timeout_ms")]
    pub location_timeout_ms: u64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            fanout_limit: default_fanout_limit(),
            location_timeout_ms: default_location_timeout_ms(),
        }
    }
}

fn default_fanout_limit() -> usize {
    256
}

fn default_location_timeout_ms() -> u64 {
    10_000
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActorConfig {
    #[serde(default = "default_mailbox_size")]
    pub mailbox_size: usize,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            mailbox_size: default_mailbox_size(),
        }
    }
}

fn default_mailbox_size() -> usize {
    32
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CatalogConfig {
    /// TOML attraction list. The built-in catalog is used when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SimulationConfig {
    #[serde(default)]
    pub oracle_latency_ms: u64,
    /// Number of `internalUser{i}` users registered at startup
    #[serde(default)]
    pub seed_users: usize,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub rewards: RewardsConfig,
    #[serde(default)]
    pub pool: PoolConfig,
    #[serde(default)]
    pub tracking: TrackingConfig,
    #[serde(default)]
    pub actor: ActorConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// Main configuration struct used throughout the application
#[derive(Debug, Clone)]
pub struct Config {
    tracker_enabled: bool,
    tracker_interval: Duration,
    proximity_buffer_miles: f64,
    attraction_range_miles: f64,
    nearby_count: usize,
    ledger_timeout: Duration,
    pool_capacity: usize,
    interactive_reserve: usize,
    queue_timeout: Duration,
    fanout_limit: usize,
    location_timeout: Duration,
    mailbox_size: usize,
    catalog_path: Option<PathBuf>,
    oracle_latency: Duration,
    seed_users: usize,
    config_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_toml(TomlConfig::default(), "default".to_string())
    }
}

impl Config {
    /// Worker count for a population when none is configured.
    pub fn derived_pool_capacity(expected_population: usize) -> usize {
        (expected_population / 100).clamp(16, 1024)
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let toml_config: TomlConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Ok(Self::from_toml(toml_config, path.display().to_string()))
    }

    /// Load configuration - tries the TOML file first, falls back to defaults
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        match Self::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %format!("{:#}", e), "Config not loaded, using defaults");
                Self::default()
            }
        }
    }

    fn from_toml(toml_config: TomlConfig, config_file: String) -> Self {
        let pool = toml_config.pool;
        let pool_capacity = pool
            .capacity
            .unwrap_or_else(|| Self::derived_pool_capacity(pool.expected_population))
            .max(1);
        let interactive_reserve = pool
            .interactive_reserve
            .unwrap_or(pool_capacity / 8)
            .min(pool_capacity - 1);

        Self {
            tracker_enabled: toml_config.tracker.enabled,
            tracker_interval: Duration::from_secs(toml_config.tracker.interval_secs),
            proximity_buffer_miles: toml_config.rewards.proximity_buffer_miles.max(0.0),
            attraction_range_miles: toml_config.rewards.attraction_range_miles,
            nearby_count: toml_config.rewards.nearby_count,
            ledger_timeout: Duration::from_millis(toml_config.rewards.ledger_timeout_ms),
            pool_capacity,
            interactive_reserve,
            queue_timeout: Duration::from_millis(pool.queue_timeout_ms),
            fanout_limit: toml_config.tracking.fanout_limit.max(1),
            location_timeout: Duration::from_millis(toml_config.tracking.location_timeout_ms),
            mailbox_size: toml_config.actor.mailbox_size.max(1),
            catalog_path: toml_config.catalog.path,
            oracle_latency: Duration::from_millis(toml_config.simulation.oracle_latency_ms),
            seed_users: toml_config.simulation.seed_users,
            config_file,
        }
    }

    pub fn tracker_enabled(&self) -> bool {
        self.tracker_enabled
    }

    pub fn tracker_interval(&self) -> Duration {
        self.tracker_interval
    }

    pub fn proximity_buffer_miles(&self) -> f64 {
        self.proximity_buffer_miles
    }

    pub fn attraction_range_miles(&self) -> f64 {
        self.attraction_range_miles
    }

    pub fn nearby_count(&self) -> usize {
        self.nearby_count
    }

    pub fn ledger_timeout(&self) -> Duration {
        self.ledger_timeout
    }

    pub fn pool_capacity(&self) -> usize {
        self.pool_capacity
    }

    pub fn interactive_reserve(&self) -> usize {
        self.interactive_reserve
    }

    pub fn queue_timeout(&self) -> Duration {
        self.queue_timeout
    }

    pub fn fanout_limit(&self) -> usize {
        self.fanout_limit
    }

    pub fn location_timeout(&self) -> Duration {
        self.location_timeout
    }

    pub fn mailbox_size(&self) -> usize {
        self.mailbox_size
    }

    pub fn catalog_path(&self) -> Option<&Path> {
        self.catalog_path.as_deref()
    }

    pub fn oracle_latency(&self) -> Duration {
        self.oracle_latency
    }

    pub fn seed_users(&self) -> usize {
        self.seed_users
    }

    pub fn config_file(&self) -> &str {
        &self.config_file
    }

    /// Builder method for tests to change the sweep interval
    pub fn with_tracker(mut self, enabled: bool, interval: Duration) -> Self {
        self.tracker_enabled = enabled;
        self.tracker_interval = interval;
        self
    }

    /// Builder method for tests to pin the pool size
    pub fn with_pool(mut self, capacity: usize, interactive_reserve: usize) -> Self {
        self.pool_capacity = capacity.max(1);
        self.interactive_reserve = interactive_reserve.min(self.pool_capacity - 1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.tracker_enabled());
        assert_eq!(config.tracker_interval(), Duration::from_secs(300));
        assert_eq!(config.proximity_buffer_miles(), 10.0);
        assert_eq!(config.attraction_range_miles(), 200.0);
        assert_eq!(config.nearby_count(), 5);
        assert_eq!(config.ledger_timeout(), Duration::from_secs(30));
        assert_eq!(config.fanout_limit(), 256);
        assert_eq!(config.mailbox_size(), 32);
        assert!(config.catalog_path().is_none());
        assert_eq!(config.config_file(), "default");
    }

    #[test]
    fn test_pool_capacity_follows_population() {
        assert_eq!(Config::derived_pool_capacity(0), 16);
        assert_eq!(Config::derived_pool_capacity(10_000), 100);
        assert_eq!(Config::derived_pool_capacity(100_000), 1000);
        assert_eq!(Config::derived_pool_capacity(10_000_000), 1024);

        let config = Config::default();
        assert_eq!(config.pool_capacity(), 100);
        assert_eq!(config.interactive_reserve(), 12);
    }

    #[test]
    fn test_explicit_pool_overrides_population() {
        let toml_config: TomlConfig = toml::from_str(
            r#"
[pool]
capacity = 4
interactive_reserve = 9
expected_population = 1000000
"#,
        )
        .unwrap();
        let config = Config::from_toml(toml_config, "inline".into());

        assert_eq!(config.pool_capacity(), 4);
        // The shared share never drops to zero.
        assert_eq!(config.interactive_reserve(), 3);
    }

    #[test]
    fn test_negative_buffer_is_clamped() {
        let toml_config: TomlConfig =
            toml::from_str("[rewards]\nproximity_buffer_miles = -3.0\n").unwrap();
        let config = Config::from_toml(toml_config, "inline".into());
        assert_eq!(config.proximity_buffer_miles(), 0.0);
    }
}
