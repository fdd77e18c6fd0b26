//! Blob storage trait for uploaded documents.

use crate::StoreError;
use kyc_types::BlobId;
use serde::{Deserialize, Serialize};

/// File bytes plus the metadata they were stored with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredBlob {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Storage for uploaded file bytes.
///
/// Every `store` call allocates a fresh id; identical content is not deduplicated.
pub trait BlobStore: Send + Sync {
    fn store(&self, name: &str, mime_type: &str, bytes: &[u8]) -> Result<BlobId, StoreError>;

    /// Fails with [`StoreError::NotFound`] when the id was never issued.
    fn retrieve(&self, id: &BlobId) -> Result<StoredBlob, StoreError>;
}
