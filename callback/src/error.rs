//! Protocol-level hook failures.

use kyc_lifecycle::KycError;
use thiserror::Error;

/// A failed hook call, reported back to the protocol caller.
#[derive(Debug, Error)]
pub enum HookError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("storage failure: {0}")]
    Storage(String),
}

impl From<KycError> for HookError {
    fn from(e: KycError) -> Self {
        match e {
            KycError::Validation(msg) => HookError::InvalidRequest(msg),
            KycError::NotFound(msg) => HookError::NotFound(msg),
            KycError::Storage(msg) => HookError::Storage(msg),
        }
    }
}
