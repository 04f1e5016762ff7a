//! Error types for the User actor.

use crate::rewards::PoolError;
use thiserror::Error;

/// Errors that can occur during user operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum UserError {
    /// The reward-ledger update ran past its deadline. Rewards added before
    /// the deadline are kept; running the update again finishes the job.
    #[error("reward ledger update timed out after {after_ms} ms ({added} rewards added)")]
    LedgerTimeout { after_ms: u64, added: usize },

    /// No worker-pool slot was available for the ledger update.
    #[error("worker pool: {0}")]
    Pool(#[from] PoolError),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl UserError {
    /// Whether the same request may succeed if sent again later.
    pub fn is_retryable(&self) -> bool {
        match self {
            UserError::LedgerTimeout { .. } => true,
            UserError::Pool(PoolError::Saturated { .. }) => true,
            UserError::Pool(PoolError::Closed) => false,
            UserError::ActorCommunicationError(_) => false,
        }
    }
}

impl From<String> for UserError {
    fn from(msg: String) -> Self {
        UserError::ActorCommunicationError(msg)
    }
}
