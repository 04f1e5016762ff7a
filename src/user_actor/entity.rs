//! ActorEntity trait implementation for the User domain type.
//!
//! The actor owning a [`User`] is the single writer of that user's history and
//! reward ledger, which gives per-user mutual exclusion without a global lock.

use super::actions::{UserAction, UserActionResult};
use super::error::UserError;
use crate::framework::ActorEntity;
use crate::model::User;
use crate::rewards::{self, LedgerContext};
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
impl ActorEntity for User {
    type Id = Uuid;
    type Action = UserAction;
    type ActionResult = UserActionResult;
    type Context = LedgerContext;
    type Error = UserError;

    fn id(&self) -> &Uuid {
        &self.id
    }

    async fn handle_action(
        &mut self,
        action: UserAction,
        ctx: &LedgerContext,
    ) -> Result<UserActionResult, UserError> {
        match action {
            UserAction::RecordVisit(visited) => {
                self.add_visited_location(visited);
                Ok(UserActionResult::Recorded {
                    history_len: self.visited_locations().len(),
                })
            }
            UserAction::UpdateRewards(priority) => {
                let added = rewards::update_rewards(self, priority, ctx).await?;
                Ok(UserActionResult::RewardsUpdated { added })
            }
            UserAction::LastVisit => Ok(UserActionResult::LastVisit(
                self.last_visited_location().cloned(),
            )),
            UserAction::Rewards => Ok(UserActionResult::Rewards(self.rewards().to_vec())),
        }
    }
}
