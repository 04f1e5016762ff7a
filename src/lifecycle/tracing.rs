//! # Observability & Tracing
//!
//! [`setup_tracing`] installs structured logging for the whole service.
//!
//! ## Configuration
//!
//! The subscriber uses a compact format that hides the crate/module prefix
//! (`with_target(false)`). Levels come from `RUST_LOG` and default to `info`.
//!
//! ## What Gets Traced
//!
//! - **Actor Lifecycle**: start and shutdown of every user actor (`debug`)
//! - **Client Calls**: each `UserClient` method runs in a span carrying the user name
//! - **Sweeps**: one `info` line per sweep with `elapsed_ms`, `users`, `tracked`, `failed`
//! - **Degraded Work**: skipped reward lookups and failed users log at `warn`
//!
//! ## Usage Examples
//!
//! ```bash
//! # Sweep summaries only
//! RUST_LOG=info cargo run
//!
//! # Every actor action with its payload
//! RUST_LOG=debug cargo run
//!
//! # Only the ledger
//! RUST_LOG=tour_guide::rewards=debug cargo run
//! ```
//!
//! ## Sweep Trace Example
//!
//! **With `RUST_LOG=info`**:
//!
//! ```text
//! INFO Attraction catalog loaded attractions=26
//! INFO Tracker started interval_secs=300
//! INFO Sweep finished elapsed_ms=412 users=100 tracked=100 failed=0
//! ```
//!
//! **With `RUST_LOG=debug`** (one user, abridged):
//!
//! ```text
//! DEBUG track_user{user=internalUser7}:record_visit{user=internalUser7}: Sending request
//! DEBUG Action entity_type="User" id=5f0c... action=RecordVisit(VisitedLocation { .. })
//! DEBUG track_user{user=internalUser7}:update_rewards{user=internalUser7}: Sending request
//! DEBUG Rewards updated user=internalUser7 added=1 rewards=1
//! DEBUG track_user{user=internalUser7}: User tracked history_len=1 added=1
//! ```

use tracing_subscriber::EnvFilter;

pub fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false) // Don't show module paths - entity_type and user fields carry the context
        .compact() // Compact format shows spans inline (e.g., "track_user:record_visit")
        .init();
}
