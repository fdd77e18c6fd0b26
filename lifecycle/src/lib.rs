//! KYC record lifecycle.
//!
//! Two pieces carry the state-machine semantics of the gateway:
//! 1. **Field reconciliation**: a batch of submitted fields (text or files) is
//!    merged into a staged copy of the record. Files are written to the blob
//!    store concurrently and the batch joins before anything is committed.
//! 2. **Lifecycle management**: creation with required-field seeding, updates
//!    that always reopen review, token refresh, and the read-only status
//!    projection returned to the mobile client.
//!
//! Reviewer decisions (`approved` / `rejected`) arrive through a side channel
//! and are never blocked or assumed monotonic here.

pub mod error;
pub mod manager;
pub mod projection;
pub mod reconciler;
pub mod submission;

pub use error::KycError;
pub use manager::KycLifecycle;
pub use projection::{CertificateStatus, IdentityStatus, StatusProjection};
pub use reconciler::FieldReconciler;
pub use submission::{SubmittedField, Submission};
