//! LMDB implementation of BlobStore.
//!
//! Blob ids are a decimal sequence kept in the meta database. The counter bump
//! and the blob write share one write transaction, so ids are never reused.

use std::sync::Arc;

use heed::types::{Bytes, Str};
use heed::{Database, Env, RwTxn};

use kyc_store::{BlobStore, StoreError, StoredBlob};
use kyc_types::BlobId;

use crate::LmdbError;

const BLOB_SEQ_KEY: &str = "blob_seq";

pub struct LmdbBlobStore {
    pub(crate) env: Arc<Env>,
    pub(crate) blobs_db: Database<Str, Bytes>,
    pub(crate) meta_db: Database<Str, Bytes>,
}

impl LmdbBlobStore {
    fn next_seq(&self, wtxn: &mut RwTxn<'_>) -> Result<u64, LmdbError> {
        let current = match self.meta_db.get(wtxn, BLOB_SEQ_KEY)? {
            Some(bytes) => {
                let arr: [u8; 8] = bytes.try_into().map_err(|_| {
                    LmdbError::Serialization("blob_seq has unexpected byte length".to_string())
                })?;
                u64::from_le_bytes(arr)
            }
            None => 0,
        };
        let next = current + 1;
        self.meta_db
            .put(wtxn, BLOB_SEQ_KEY, &next.to_le_bytes())?;
        Ok(next)
    }

    fn put(&self, blob: &StoredBlob) -> Result<BlobId, LmdbError> {
        let bytes = bincode::serialize(blob)?;
        let mut wtxn = self.env.write_txn()?;
        let id = BlobId::new(self.next_seq(&mut wtxn)?.to_string());
        self.blobs_db.put(&mut wtxn, id.as_str(), &bytes)?;
        wtxn.commit()?;
        Ok(id)
    }
}

impl BlobStore for LmdbBlobStore {
    fn store(&self, name: &str, mime_type: &str, bytes: &[u8]) -> Result<BlobId, StoreError> {
        let blob = StoredBlob {
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            bytes: bytes.to_vec(),
        };
        let id = self.put(&blob)?;
        tracing::debug!(blob = %id, name, size = bytes.len(), "blob stored");
        Ok(id)
    }

    fn retrieve(&self, id: &BlobId) -> Result<StoredBlob, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let bytes = self
            .blobs_db
            .get(&rtxn, id.as_str())
            .map_err(LmdbError::from)?
            .ok_or_else(|| LmdbError::NotFound(format!("blob {id}")))?;
        Ok(bincode::deserialize(bytes).map_err(LmdbError::from)?)
    }
}
