//! Reward computation: proximity math, the bounded worker pool, and the
//! per-user ledger updater.

pub mod ledger;
pub mod pool;
pub mod proximity;

pub use ledger::{update_rewards, LedgerContext};
pub use pool::{PoolError, PoolPermit, Priority, WorkerPool};
pub use proximity::{distance, ProximityEngine};
