//! The reward-ledger updater.
//!
//! Runs inside the owning user's actor, so it already has exclusive access to
//! the user for its whole duration.

use super::{Priority, ProximityEngine, WorkerPool};
use crate::catalog::AttractionCatalog;
use crate::model::{User, UserReward, VisitedLocation};
use crate::providers::RewardOracle;
use crate::user_actor::UserError;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Everything a ledger update needs. Injected into every user actor at `run()`.
#[derive(Clone)]
pub struct LedgerContext {
    pub catalog: AttractionCatalog,
    pub proximity: Arc<ProximityEngine>,
    pub oracle: Arc<dyn RewardOracle>,
    pub pool: WorkerPool,
    pub ledger_timeout: Duration,
}

/// Rewards every attraction the user has been near and has no reward for yet.
///
/// Holds one worker-pool slot while running. Oracle failures skip that
/// attraction and move on. Returns the number of rewards added.
pub async fn update_rewards(
    user: &mut User,
    priority: Priority,
    ctx: &LedgerContext,
) -> Result<usize, UserError> {
    let _permit = ctx.pool.acquire(priority).await?;

    let mut added = 0;
    let outcome = tokio::time::timeout(ctx.ledger_timeout, accumulate(user, ctx, &mut added)).await;

    match outcome {
        Ok(()) => {
            debug!(user = %user.name, added, rewards = user.rewards().len(), "Rewards updated");
            Ok(added)
        }
        Err(_) => Err(UserError::LedgerTimeout {
            after_ms: ctx.ledger_timeout.as_millis() as u64,
            added,
        }),
    }
}

async fn accumulate(user: &mut User, ctx: &LedgerContext, added: &mut usize) {
    let visited: Vec<VisitedLocation> = user.visited_locations().to_vec();

    for visit in &visited {
        for attraction in ctx.catalog.list() {
            if user.has_reward_for(&attraction.name)
                || !ctx.proximity.is_near_for_reward(visit, attraction)
            {
                continue;
            }
            match ctx.oracle.points_for(attraction.id, user.id).await {
                Ok(points) => {
                    if user.add_reward(UserReward::new(visit.clone(), attraction.clone(), points)) {
                        *added += 1;
                    }
                }
                Err(e) => {
                    warn!(
                        user = %user.name,
                        attraction = %attraction.name,
                        error = %e,
                        "Reward lookup failed, skipping attraction"
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AttractionCatalog, EmbeddedAttractionSource};
    use crate::model::Location;
    use crate::providers::mock::CountingRewardOracle;
    use crate::rewards::PoolError;
    use chrono::Utc;
    use uuid::Uuid;

    const DISNEYLAND: Location = Location {
        latitude: 33.817595,
        longitude: -117.922008,
    };

    async fn context(oracle: Arc<CountingRewardOracle>) -> LedgerContext {
        LedgerContext {
            catalog: AttractionCatalog::load(&EmbeddedAttractionSource).await.unwrap(),
            proximity: Arc::new(ProximityEngine::default()),
            oracle,
            pool: WorkerPool::new(4, 1, Duration::from_secs(1)),
            ledger_timeout: Duration::from_secs(5),
        }
    }

    fn user_at(location: Location) -> User {
        let mut user = User::new(Uuid::new_v4(), "jon", "000", "jon@tourGuide.com");
        user.add_visited_location(VisitedLocation::new(user.id, location, Utc::now()));
        user
    }

    #[tokio::test]
    async fn test_visit_near_attraction_earns_one_reward() {
        let oracle = Arc::new(CountingRewardOracle::new(250));
        let ctx = context(oracle.clone()).await;
        let mut user = user_at(DISNEYLAND);

        let added = update_rewards(&mut user, Priority::Interactive, &ctx).await.unwrap();

        assert_eq!(added, 1);
        assert_eq!(user.rewards()[0].attraction.name, "Disneyland");
        assert_eq!(user.rewards()[0].reward_points, 250);
        assert_eq!(user.visited_locations().len(), 1);
    }

    #[tokio::test]
    async fn test_update_is_idempotent() {
        let oracle = Arc::new(CountingRewardOracle::new(10));
        let ctx = context(oracle.clone()).await;
        let mut user = user_at(DISNEYLAND);
        // A second visit to the same place must not double-reward.
        user.add_visited_location(VisitedLocation::new(user.id, DISNEYLAND, Utc::now()));

        update_rewards(&mut user, Priority::Background, &ctx).await.unwrap();
        let rewards_after_first = user.rewards().len();
        let calls_after_first = oracle.calls();

        let added = update_rewards(&mut user, Priority::Background, &ctx).await.unwrap();

        assert_eq!(added, 0);
        assert_eq!(user.rewards().len(), rewards_after_first);
        assert_eq!(oracle.calls(), calls_after_first);
    }

    #[tokio::test]
    async fn test_huge_buffer_rewards_every_attraction() {
        let oracle = Arc::new(CountingRewardOracle::new(1));
        let ctx = context(oracle).await;
        ctx.proximity.set_proximity_buffer(10_000.0);
        let mut user = user_at(DISNEYLAND);

        update_rewards(&mut user, Priority::Interactive, &ctx).await.unwrap();

        assert_eq!(user.rewards().len(), ctx.catalog.len());
        let mut names: Vec<&str> = user.rewards().iter().map(|r| r.attraction.name.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), user.rewards().len());
    }

    #[tokio::test]
    async fn test_oracle_failure_skips_only_that_attraction() {
        let oracle = Arc::new(CountingRewardOracle::new(5));
        let ctx = context(oracle.clone()).await;
        ctx.proximity.set_proximity_buffer(10_000.0);
        let broken = ctx.catalog.list()[3].clone();
        oracle.fail_for(broken.id);
        let mut user = user_at(DISNEYLAND);

        let added = update_rewards(&mut user, Priority::Interactive, &ctx).await.unwrap();

        assert_eq!(added, ctx.catalog.len() - 1);
        assert!(!user.has_reward_for(&broken.name));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_oracle_surfaces_retryable_timeout() {
        let oracle = Arc::new(CountingRewardOracle::new(5));
        oracle.set_delay(Duration::from_secs(60));
        let ctx = context(oracle).await;
        let mut user = user_at(DISNEYLAND);

        let err = update_rewards(&mut user, Priority::Interactive, &ctx).await.unwrap_err();

        assert_eq!(err, UserError::LedgerTimeout { after_ms: 5000, added: 0 });
        assert!(err.is_retryable());
        assert!(user.rewards().is_empty());
        // The slot is released once the update gives up.
        assert_eq!(ctx.pool.available(), ctx.pool.capacity());
    }

    #[tokio::test(start_paused = true)]
    async fn test_saturated_pool_is_reported() {
        let oracle = Arc::new(CountingRewardOracle::new(5));
        let mut ctx = context(oracle).await;
        ctx.pool = WorkerPool::new(1, 0, Duration::from_millis(100));
        let _held = ctx.pool.acquire(Priority::Background).await.unwrap();
        let mut user = user_at(DISNEYLAND);

        let err = update_rewards(&mut user, Priority::Background, &ctx).await.unwrap_err();

        assert!(matches!(err, UserError::Pool(PoolError::Saturated { .. })));
        assert!(err.is_retryable());
    }
}
