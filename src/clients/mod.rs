//! Type-safe wrappers around [`EntityClient`](crate::framework::EntityClient).

pub mod actor_client;
pub mod user_client;

pub use actor_client::*;
pub use user_client::*;
