//! # Core Actor Framework
//!
//! This module defines the generic building blocks for single-entity actors.
//!
//! ## Key Types
//!
//! - [`ActorEntity`]: The trait that every actor-owned entity must implement.
//! - [`EntityActor`]: The generic actor that owns exactly one entity.
//! - [`EntityClient`]: The generic client for communicating with that actor.
//! - [`FrameworkError`]: Common errors (e.g., ActorClosed, ActorDropped).

use async_trait::async_trait;
use std::fmt::{Debug, Display};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, warn};

// =============================================================================
// 1. THE ABSTRACTION
// =============================================================================

/// Trait that any entity must implement to be owned by an [`EntityActor`].
///
/// # Architecture Note
/// One actor owns one entity. All reads and writes of that entity go through the
/// actor's mailbox, so operations on the same entity are totally ordered while
/// different entities (different actors) run in parallel.
///
/// # Async & Context
/// This trait is `#[async_trait]` so hooks can await external collaborators.
/// The `Context` type is injected into every hook at `run()` time ("Late Binding"),
/// which keeps entity construction free of runtime dependencies.
#[async_trait]
pub trait ActorEntity: Clone + Send + Sync + 'static {
    /// The unique identifier for this entity (e.g., String, Uuid, u64).
    type Id: Clone + Send + Sync + Display + Debug;

    /// Enum representing entity-specific operations (e.g., `RecordVisit`).
    type Action: Send + Sync + Debug;

    /// The result type returned by actions.
    type ActionResult: Send + Sync + Debug;

    /// The runtime context (dependencies) injected into the actor.
    /// Use `()` if no dependencies are needed.
    type Context: Send + Sync;

    /// The error type for this entity.
    ///
    /// One error enum covers every action of the entity; clients recover the
    /// concrete type from [`FrameworkError::EntityError`] by downcasting.
    type Error: std::error::Error + Send + Sync + 'static;

    /// The identifier of this entity instance.
    fn id(&self) -> &Self::Id;

    /// Called once when the actor loop starts, before any message is handled.
    async fn on_start(&mut self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Handle an entity-specific action.
    async fn handle_action(
        &mut self,
        action: Self::Action,
        ctx: &Self::Context,
    ) -> Result<Self::ActionResult, Self::Error>;
}

// =============================================================================
// 2. THE GENERIC MESSAGES & ERRORS
// =============================================================================

/// Errors that can occur within the actor framework itself.
#[derive(Debug, thiserror::Error)]
pub enum FrameworkError {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped response channel")]
    ActorDropped,
    #[error("Entity error: {0}")]
    EntityError(Box<dyn std::error::Error + Send + Sync>),
}

/// Type alias for the one-shot response channel used by actors.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Internal message type sent to an [`EntityActor`].
///
/// - **Get**: Returns a snapshot (clone) of the entity.
/// - **Action**: Executes a custom [`ActorEntity::Action`] with exclusive access.
#[derive(Debug)]
pub enum EntityRequest<T: ActorEntity> {
    Get {
        respond_to: Response<T>,
    },
    Action {
        action: T::Action,
        respond_to: Response<T::ActionResult>,
    },
}

// =============================================================================
// 3. THE GENERIC ACTOR SERVER
// =============================================================================

/// The generic actor that owns a single entity.
///
/// **Concurrency Model**:
/// The actor processes its mailbox *sequentially*. While an action is being
/// handled (including any awaits inside it) no other request for the same
/// entity can observe or mutate it, so the entity needs no `Mutex`.
pub struct EntityActor<T: ActorEntity> {
    receiver: mpsc::Receiver<EntityRequest<T>>,
    entity: T,
}

impl<T: ActorEntity> EntityActor<T> {
    /// Creates a new `EntityActor` owning `entity`, and its associated client.
    ///
    /// `buffer_size` is the mailbox capacity. When the mailbox is full, client
    /// calls wait until there is space.
    pub fn new(entity: T, buffer_size: usize) -> (Self, EntityClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size.max(1));
        let client = EntityClient::new(entity.id().clone(), sender);
        let actor = Self { receiver, entity };
        (actor, client)
    }

    /// Runs the actor's event loop, processing messages until every client is dropped.
    pub async fn run(self, context: T::Context) {
        let (_never, shutdown) = watch::channel(false);
        self.run_until(context, shutdown).await;
    }

    /// Like [`run`](Self::run), but also exits once `shutdown` turns `true`
    /// (or its sender is dropped), even while clients are still alive.
    ///
    /// An action already being handled completes first. Requests still queued
    /// in the mailbox are dropped and their callers see [`FrameworkError::ActorDropped`].
    pub async fn run_until(mut self, context: T::Context, mut shutdown: watch::Receiver<bool>) {
        // Extract just the type name (e.g., "User" instead of "tour_guide::model::user::User")
        let entity_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        let id = self.entity.id().clone();
        debug!(entity_type, %id, "Actor started");

        if *shutdown.borrow_and_update() {
            debug!(entity_type, %id, "Shutdown before start");
            return;
        }

        if let Err(e) = self.entity.on_start(&context).await {
            warn!(entity_type, %id, error = %e, "on_start failed");
        }

        loop {
            let msg = tokio::select! {
                msg = self.receiver.recv() => msg,
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        debug!(entity_type, %id, "Shutdown signal");
                        break;
                    }
                    continue;
                }
            };
            let Some(msg) = msg else {
                break;
            };

            match msg {
                EntityRequest::Get { respond_to } => {
                    let _ = respond_to.send(Ok(self.entity.clone()));
                }
                EntityRequest::Action { action, respond_to } => {
                    debug!(entity_type, %id, ?action, "Action");
                    let result = self
                        .entity
                        .handle_action(action, &context)
                        .await
                        .map_err(|e| FrameworkError::EntityError(Box::new(e)));
                    if let Err(e) = &result {
                        warn!(entity_type, %id, error = %e, "Action failed");
                    }
                    let _ = respond_to.send(result);
                }
            }
        }

        debug!(entity_type, %id, "Shutdown");
    }
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

/// A type-safe, cheap-to-clone handle to one [`EntityActor`].
#[derive(Clone)]
pub struct EntityClient<T: ActorEntity> {
    id: T::Id,
    sender: mpsc::Sender<EntityRequest<T>>,
}

impl<T: ActorEntity> EntityClient<T> {
    pub fn new(id: T::Id, sender: mpsc::Sender<EntityRequest<T>>) -> Self {
        Self { id, sender }
    }

    /// Identifier of the entity behind this client.
    pub fn id(&self) -> &T::Id {
        &self.id
    }

    pub async fn get(&self) -> Result<T, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(EntityRequest::Get { respond_to })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn perform_action(&self, action: T::Action) -> Result<T::ActionResult, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(EntityRequest::Action { action, respond_to })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }
}

// =============================================================================
// 5. EXAMPLE USAGE (Test)
// =============================================================================
