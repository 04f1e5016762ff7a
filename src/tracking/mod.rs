//! User registry and the tracking orchestrator.

pub mod error;
pub mod registry;
pub mod service;

pub use error::TrackingError;
pub use registry::UserRegistry;
pub use service::{SweepFailure, SweepReport, TrackingService, TrackingSettings};
