//! Abstract storage traits for the KYC gateway.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The rest of the codebase depends only on the traits.
//!
//! Implementations must tolerate concurrent independent reads and writes to
//! distinct keys. Multi-key transactions are not part of the contract.

pub mod blob;
pub mod error;
pub mod record;

pub use blob::{BlobStore, StoredBlob};
pub use error::StoreError;
pub use record::RecordStore;
