//! Pure data structures for the tracking domain.
//!
//! [`User`] implements the [`ActorEntity`](crate::framework::ActorEntity) trait in
//! [`crate::user_actor`]; everything else is a plain value type.

pub mod attraction;
pub mod location;
pub mod user;

pub use attraction::*;
pub use location::*;
pub use user::*;
