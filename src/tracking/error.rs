use crate::providers::ProviderError;
use crate::user_actor::UserError;
use thiserror::Error;

/// Errors surfaced by the tracking service.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TrackingError {
    /// No user is registered under this name.
    #[error("unknown user: {0}")]
    UnknownUser(String),

    /// The location provider failed or timed out for this user.
    #[error("location fetch for {user} failed: {source}")]
    LocationFetch { user: String, source: ProviderError },

    /// The user's actor failed a request: recording a visit, updating the
    /// reward ledger, or reading history or rewards.
    #[error(transparent)]
    Actor(#[from] UserError),
}

impl TrackingError {
    /// Whether the same request may succeed if sent again later.
    pub fn is_retryable(&self) -> bool {
        match self {
            TrackingError::UnknownUser(_) => false,
            TrackingError::LocationFetch { source, .. } => source.is_retryable(),
            TrackingError::Actor(e) => e.is_retryable(),
        }
    }
}
