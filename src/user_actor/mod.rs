//! User-specific actor logic: actions, errors and the entity implementation.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::clients::UserClient;
use crate::framework::EntityActor;
use crate::model::User;

/// Creates the actor owning `user`, and its client.
pub fn new(user: User, mailbox_size: usize) -> (EntityActor<User>, UserClient) {
    let name = user.name.clone();
    let (actor, generic_client) = EntityActor::new(user, mailbox_size);
    let client = UserClient::new(generic_client, name);

    (actor, client)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AttractionCatalog, EmbeddedAttractionSource};
    use crate::model::{Location, VisitedLocation};
    use crate::providers::mock::CountingRewardOracle;
    use crate::rewards::{LedgerContext, Priority, ProximityEngine, WorkerPool};
    use chrono::Utc;
    use std::sync::Arc;
    use std::time::Duration;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_overlapping_updates_for_one_user_never_duplicate() {
        let oracle = Arc::new(CountingRewardOracle::new(9));
        oracle.set_delay(Duration::from_millis(2));
        let ctx = LedgerContext {
            catalog: AttractionCatalog::load(&EmbeddedAttractionSource).await.unwrap(),
            proximity: Arc::new(ProximityEngine::default()),
            oracle: oracle.clone(),
            pool: WorkerPool::new(8, 2, Duration::from_secs(5)),
            ledger_timeout: Duration::from_secs(5),
        };
        ctx.proximity.set_proximity_buffer(10_000.0);
        let user = User::new(Uuid::new_v4(), "jon", "000", "jon@tourGuide.com");
        let (actor, client) = new(user, 8);
        let handle = tokio::spawn(actor.run(ctx.clone()));

        client
            .record_visit(VisitedLocation::new(client.id(), Location::new(33.8, -117.9), Utc::now()))
            .await
            .unwrap();

        let mut tasks = Vec::new();
        for i in 0..6 {
            let client = client.clone();
            let priority = if i % 2 == 0 { Priority::Interactive } else { Priority::Background };
            tasks.push(tokio::spawn(async move { client.update_rewards(priority).await }));
        }
        let mut added = 0;
        for task in tasks {
            added += task.await.unwrap().unwrap();
        }

        let rewards = client.rewards().await.unwrap();
        assert_eq!(added, ctx.catalog.len());
        assert_eq!(rewards.len(), ctx.catalog.len());
        assert_eq!(oracle.calls(), ctx.catalog.len());

        drop(client);
        handle.await.unwrap();
    }
}
