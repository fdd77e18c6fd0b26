//! LMDB storage backend for the KYC gateway.
//!
//! Implements the storage traits from `kyc-store` using the `heed` LMDB bindings.
//! All logical stores live as named databases within a single environment.

pub mod blob;
pub mod environment;
pub mod error;
pub mod record;

pub use blob::LmdbBlobStore;
pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use record::LmdbRecordStore;
