//! External collaborators consumed by the tracking engine.
//!
//! The engine only sees these traits. The binary wires in the [`simulated`]
//! implementations; tests use the doubles in [`mock`].

pub mod mock;
pub mod simulated;

pub use simulated::{GpsSimulator, SimulatedRewardCentral};

use crate::model::Location;
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// Failures reported by an external collaborator.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProviderError {
    /// The collaborator could not answer.
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// The collaborator did not answer in time.
    #[error("provider timed out after {after_ms} ms")]
    Timeout { after_ms: u64 },

    /// The collaborator does not know this user.
    #[error("unknown user id {0}")]
    UnknownUser(Uuid),
}

impl ProviderError {
    /// Whether trying again later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProviderError::Timeout { .. } | ProviderError::Unavailable(_))
    }
}

/// Source of users' current geographic positions.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Current position of `user_id`. May be slow or fail.
    async fn current_location_of(&self, user_id: Uuid) -> Result<Location, ProviderError>;
}

/// Source of reward point values.
///
/// Assumed deterministic for a given (attraction, user) pair, but may be slow or fail.
#[async_trait]
pub trait RewardOracle: Send + Sync {
    async fn points_for(&self, attraction_id: Uuid, user_id: Uuid) -> Result<u32, ProviderError>;
}
