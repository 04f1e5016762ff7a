//! Startup and shutdown: configuration, logging and wiring of the whole engine.

pub mod config;
pub mod system;
pub mod tracing;

pub use config::Config;
pub use system::{Collaborators, TourGuideSystem};
pub use self::tracing::setup_tracing;
