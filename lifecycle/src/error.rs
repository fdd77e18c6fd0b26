use kyc_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KycError {
    /// Malformed or missing correlation data.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Unknown record or blob.
    #[error("not found: {0}")]
    NotFound(String),

    /// Persistence or blob write failure.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl From<StoreError> for KycError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(key) => KycError::NotFound(key),
            other => KycError::Storage(other.to_string()),
        }
    }
}
