//! Nullable infrastructure for deterministic testing.
//!
//! All external dependencies of the KYC core (clock, id generation, record
//! storage, blob storage) are abstracted behind traits. This crate provides
//! implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically (advance time, inject write failures)
//! - Never touch the filesystem or network
//!
//! The in-memory stores double as the `memory` backend of the daemon.

pub mod clock;
pub mod ids;
pub mod store;

pub use clock::NullClock;
pub use ids::NullIdGenerator;
pub use store::{NullBlobStore, NullRecordStore};
