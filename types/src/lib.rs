//! Fundamental types for the KYC gateway.
//!
//! This crate defines the data model shared across every other crate in the
//! workspace: identifiers, timestamps and clocks, review statuses, per-field
//! review state, KYC records, protocol-issued tokens and the protocol metadata
//! that decides which fields a new record must track.

pub mod field;
pub mod ids;
pub mod metadata;
pub mod record;
pub mod state;
pub mod time;

pub use field::{FieldKind, FieldState, FieldValue};
pub use ids::{BlobId, ExternalId, IdGenerator, RecordId, UuidGenerator};
pub use metadata::ProtocolMetadata;
pub use record::{AuthToken, KycProfile, KycRecord, KycToken};
pub use state::{FieldStatus, KycStatus};
pub use time::{Clock, SystemClock, Timestamp};
