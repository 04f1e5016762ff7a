//! # User Client
//!
//! High-level API for one user's actor. Wraps an `EntityClient<User>` and
//! exposes typed methods for each [`UserAction`].

use crate::clients::actor_client::ActorClient;
use crate::framework::{EntityClient, FrameworkError};
use crate::model::{User, UserReward, VisitedLocation};
use crate::rewards::Priority;
use crate::user_actor::{UserAction, UserActionResult, UserError};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Client for interacting with one User actor.
#[derive(Clone)]
pub struct UserClient {
    inner: EntityClient<User>,
    name: Arc<str>,
}

impl UserClient {
    pub fn new(inner: EntityClient<User>, name: impl Into<Arc<str>>) -> Self {
        Self {
            inner,
            name: name.into(),
        }
    }

    pub fn id(&self) -> Uuid {
        *self.inner.id()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for UserClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserClient")
            .field("id", self.inner.id())
            .field("name", &self.name)
            .finish()
    }
}

#[async_trait]
impl ActorClient<User> for UserClient {
    type Error = UserError;

    fn inner(&self) -> &EntityClient<User> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::EntityError(inner) => match inner.downcast::<UserError>() {
                Ok(user_error) => *user_error,
                Err(other) => UserError::ActorCommunicationError(other.to_string()),
            },
            other => UserError::ActorCommunicationError(other.to_string()),
        }
    }
}

impl UserClient {
    /// Appends a visit to the user's history. Returns the new history length.
    #[instrument(skip(self, visited), fields(user = %self.name))]
    pub async fn record_visit(&self, visited: VisitedLocation) -> Result<usize, UserError> {
        debug!("Sending request");
        match self
            .inner
            .perform_action(UserAction::RecordVisit(visited))
            .await
        {
            Ok(UserActionResult::Recorded { history_len }) => Ok(history_len),
            Ok(_) => unreachable!("RecordVisit action must return Recorded result"),
            Err(e) => Err(Self::map_error(e)),
        }
    }

    /// Runs the reward-ledger update and waits for it. Returns the number of rewards added.
    #[instrument(skip(self), fields(user = %self.name))]
    pub async fn update_rewards(&self, priority: Priority) -> Result<usize, UserError> {
        debug!("Sending request");
        match self
            .inner
            .perform_action(UserAction::UpdateRewards(priority))
            .await
        {
            Ok(UserActionResult::RewardsUpdated { added }) => Ok(added),
            Ok(_) => unreachable!("UpdateRewards action must return RewardsUpdated result"),
            Err(e) => Err(Self::map_error(e)),
        }
    }

    /// The user's most recent visit, if any.
    #[instrument(skip(self), fields(user = %self.name))]
    pub async fn last_visit(&self) -> Result<Option<VisitedLocation>, UserError> {
        match self.inner.perform_action(UserAction::LastVisit).await {
            Ok(UserActionResult::LastVisit(visit)) => Ok(visit),
            Ok(_) => unreachable!("LastVisit action must return LastVisit result"),
            Err(e) => Err(Self::map_error(e)),
        }
    }

    /// The user's reward ledger, in the order rewards were earned.
    #[instrument(skip(self), fields(user = %self.name))]
    pub async fn rewards(&self) -> Result<Vec<UserReward>, UserError> {
        match self.inner.perform_action(UserAction::Rewards).await {
            Ok(UserActionResult::Rewards(rewards)) => Ok(rewards),
            Ok(_) => unreachable!("Rewards action must return Rewards result"),
            Err(e) => Err(Self::map_error(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::mock::{create_mock_client, expect_action, expect_get};
    use crate::model::Location;
    use chrono::Utc;

    fn mock_user_client() -> (UserClient, tokio::sync::mpsc::Receiver<crate::framework::EntityRequest<User>>) {
        let (client, receiver) = create_mock_client::<User>(Uuid::new_v4(), 10);
        (UserClient::new(client, "jon"), receiver)
    }

    #[tokio::test]
    async fn test_record_visit_returns_history_length() {
        let (user_client, mut receiver) = mock_user_client();
        let visited = VisitedLocation::new(user_client.id(), Location::new(1.0, 2.0), Utc::now());

        let task = tokio::spawn(async move { user_client.record_visit(visited).await });

        let (action, responder) = expect_action(&mut receiver)
            .await
            .expect("Expected Action request");
        match action {
            UserAction::RecordVisit(v) => assert_eq!(v.location, Location::new(1.0, 2.0)),
            other => panic!("Expected RecordVisit, got {:?}", other),
        }
        responder
            .send(Ok(UserActionResult::Recorded { history_len: 4 }))
            .unwrap();

        assert_eq!(task.await.unwrap().unwrap(), 4);
    }

    #[tokio::test]
    async fn test_entity_error_keeps_its_type() {
        let (user_client, mut receiver) = mock_user_client();

        let task = tokio::spawn(async move { user_client.update_rewards(Priority::Background).await });

        let (action, responder) = expect_action(&mut receiver).await.unwrap();
        assert!(matches!(action, UserAction::UpdateRewards(Priority::Background)));
        responder
            .send(Err(FrameworkError::EntityError(Box::new(
                UserError::LedgerTimeout { after_ms: 10, added: 2 },
            ))))
            .unwrap();

        let err = task.await.unwrap().unwrap_err();
        assert_eq!(err, UserError::LedgerTimeout { after_ms: 10, added: 2 });
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_snapshot_uses_get() {
        let (user_client, mut receiver) = mock_user_client();
        let id = user_client.id();

        let task = tokio::spawn(async move { user_client.snapshot().await });

        let responder = expect_get(&mut receiver).await.expect("Expected Get request");
        responder
            .send(Ok(User::new(id, "jon", "000", "jon@tourGuide.com")))
            .unwrap();

        assert_eq!(task.await.unwrap().unwrap().id, id);
    }

    #[tokio::test]
    async fn test_closed_actor_is_communication_error() {
        let (user_client, receiver) = mock_user_client();
        drop(receiver);

        let err = user_client.rewards().await.unwrap_err();
        assert!(matches!(err, UserError::ActorCommunicationError(_)));
        assert!(!err.is_retryable());
    }
}
