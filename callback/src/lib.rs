//! Callback adapter for the external verification protocol.
//!
//! The protocol drives the KYC flow (login, registration, data upload,
//! status polling) and calls back into this service through a small set of
//! hooks: find, create, update, query-status and SSO payload generation.
//! [`CallbackAdapter`] implements those hooks on top of the lifecycle
//! manager and turns every failure into a [`HookError`] instead of letting
//! it escape to the host process.

pub mod adapter;
pub mod error;
pub mod hooks;
pub mod record_locks;

pub use adapter::CallbackAdapter;
pub use error::HookError;
pub use hooks::{CreateKycRequest, KycCallbacks, SsoPayload, SsoRequest, UpdateKycRequest};
pub use record_locks::RecordLocks;
