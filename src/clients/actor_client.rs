use crate::framework::{ActorEntity, EntityClient, FrameworkError};
use async_trait::async_trait;

/// Trait for entity-specific clients to inherit the standard operations.
///
/// Implementors provide access to the inner [`EntityClient`] and a mapping
/// from framework errors to their own error type; `snapshot` comes for free.
#[async_trait]
pub trait ActorClient<T: ActorEntity>: Send + Sync {
    /// The entity-specific error type.
    type Error: From<String> + Send + Sync;

    /// Access the inner generic EntityClient.
    fn inner(&self) -> &EntityClient<T>;

    /// Map framework errors to the entity-specific error type.
    fn map_error(e: FrameworkError) -> Self::Error;

    /// Fetch a point-in-time copy of the entity.
    #[tracing::instrument(skip(self))]
    async fn snapshot(&self) -> Result<T, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().get().await.map_err(Self::map_error)
    }
}
