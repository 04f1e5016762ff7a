//! # Tour Guide
//!
//! > **Location tracking and reward engine for a travel companion service.**
//!
//! The engine records where users are, keeps a ledger of rewards for attractions
//! they came near, and sweeps the whole population on a fixed interval.
//!
//! ## Architecture Notes
//!
//! ### 1. One Actor per User
//! Every registered user is owned by an [`EntityActor`](framework::EntityActor) task.
//! All reads and writes of that user go through its mailbox, so a sweep and an
//! interactive request can never update the same ledger at the same time, while
//! different users proceed in parallel.
//!
//! ### 2. Late-Bound Context
//! The reward ledger's dependencies (catalog, proximity rules, reward oracle,
//! worker pool) travel in a [`LedgerContext`](rewards::LedgerContext) injected at
//! `run()` time, not stored in the entity.
//!
//! ### 3. Bounded, Prioritised Work
//! Ledger updates hold a slot of the [`WorkerPool`](rewards::WorkerPool). Part of
//! it is reserved for interactive requests so a population-wide sweep cannot
//! starve them. Every outbound call carries a timeout and every timeout is a
//! retryable error.
//!
//! ### 4. Observability
//! `tracing` with structured fields everywhere; see [`lifecycle::tracing`].
//!
//! ## Module Tour
//!
//! - [`framework`]: generic single-entity actor runtime and its test mocks
//! - [`model`]: users, locations, attractions, rewards
//! - [`user_actor`] / [`clients`]: the user actor and its typed client
//! - [`catalog`]: the read-only attraction list
//! - [`rewards`]: distance math, worker pool, ledger updater
//! - [`providers`]: GPS and reward collaborators (traits, simulators, test doubles)
//! - [`tracking`]: user registry and the tracking orchestrator
//! - [`tracker`]: the periodic sweep scheduler
//! - [`lifecycle`]: config, logging, startup and shutdown
//!
//! ## Running
//!
//! ```bash
//! RUST_LOG=info cargo run -- --config config/dev.toml
//! ```

pub mod catalog;
pub mod clients;
pub mod framework;
pub mod lifecycle;
pub mod model;
pub mod providers;
pub mod rewards;
pub mod tracker;
pub mod tracking;
pub mod user_actor;
