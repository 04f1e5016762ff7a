//! # Mock Framework
//!
//! Utilities for testing clients in isolation, without spawning a real actor.
//!
//! Use [`create_mock_client`] to get a client and the receiving end of its mailbox.
//! The test then plays the actor: [`expect_get`] and [`expect_action`] pull the next
//! request off the mailbox and hand back the responder.
//!
//! ```rust,ignore
//! let (client, mut receiver) = create_mock_client::<User>(user_id, 10);
//! let user_client = UserClient::new(client, "jon");
//!
//! let task = tokio::spawn(async move { user_client.last_visit().await });
//!
//! let (action, responder) = expect_action(&mut receiver).await.unwrap();
//! assert!(matches!(action, UserAction::LastVisit));
//! responder.send(Ok(UserActionResult::LastVisit(None))).unwrap();
//!
//! assert!(task.await.unwrap().unwrap().is_none());
//! ```

use crate::framework::{ActorEntity, EntityClient, EntityRequest, Response};
use tokio::sync::mpsc;

/// Creates a client for entity `id` whose mailbox is exposed to the test.
pub fn create_mock_client<T: ActorEntity>(
    id: T::Id,
    buffer_size: usize,
) -> (EntityClient<T>, mpsc::Receiver<EntityRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (EntityClient::new(id, sender), receiver)
}

/// Waits for the next request and returns its responder if it is a `Get`.
///
/// Returns `None` if the mailbox closed or the next request was something else.
pub async fn expect_get<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<EntityRequest<T>>,
) -> Option<Response<T>> {
    match receiver.recv().await? {
        EntityRequest::Get { respond_to } => Some(respond_to),
        _ => None,
    }
}

/// Waits for the next request and returns the action and its responder if it is an `Action`.
///
/// Returns `None` if the mailbox closed or the next request was something else.
pub async fn expect_action<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<EntityRequest<T>>,
) -> Option<(T::Action, Response<T::ActionResult>)> {
    match receiver.recv().await? {
        EntityRequest::Action { action, respond_to } => Some((action, respond_to)),
        _ => None,
    }
}
