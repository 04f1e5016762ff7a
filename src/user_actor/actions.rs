//! Actions accepted by the per-user actor.
//!
//! Every action runs with exclusive access to one user; see
//! [`impl ActorEntity for User`](super::entity).

use crate::model::{UserReward, VisitedLocation};
use crate::rewards::Priority;

#[derive(Debug, Clone)]
pub enum UserAction {
    /// Appends a visit to the history.
    RecordVisit(VisitedLocation),
    /// Runs the reward-ledger update over the whole history.
    UpdateRewards(Priority),
    /// Reads the most recent visit.
    LastVisit,
    /// Reads the reward ledger.
    Rewards,
}

/// Results from UserActions - variants match 1:1 with UserAction
#[derive(Debug, Clone)]
pub enum UserActionResult {
    Recorded { history_len: usize },
    RewardsUpdated { added: usize },
    LastVisit(Option<VisitedLocation>),
    Rewards(Vec<UserReward>),
}
