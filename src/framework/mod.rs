//! Generic single-entity actor framework.
//!
//! This module provides the building blocks for giving every entity its own
//! mailbox and task, so that all access to one entity is serialized without locks.
//!
//! # Main Components
//!
//! - [`ActorEntity`] - Trait that entity types implement to be owned by an actor
//! - [`EntityActor`] - Generic actor that owns one entity
//! - [`EntityClient`] - Type-safe handle used to talk to the actor
//! - [`FrameworkError`] - Common error types
//!
//! # Testing
//!
//! See [`mock`] module for utilities to test clients without spawning full actors.

pub mod core;
pub mod mock;

// Re-export core types for convenience
pub use self::core::*;
