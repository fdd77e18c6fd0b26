//! LMDB implementation of RecordStore.
//!
//! Records are stored as JSON under their internal id. A second database maps
//! external ids to internal ids; both are written in the same transaction.

use std::sync::Arc;

use heed::types::{Bytes, Str};
use heed::{Database, Env, RoTxn};

use kyc_store::{RecordStore, StoreError};
use kyc_types::{ExternalId, KycRecord, RecordId};

use crate::LmdbError;

pub struct LmdbRecordStore {
    pub(crate) env: Arc<Env>,
    pub(crate) records_db: Database<Str, Bytes>,
    pub(crate) external_index_db: Database<Str, Str>,
}

impl LmdbRecordStore {
    fn read(&self, rtxn: &RoTxn<'_>, id: &str) -> Result<Option<KycRecord>, LmdbError> {
        match self.records_db.get(rtxn, id)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(bytes)?)),
            None => Ok(None),
        }
    }

    fn write(&self, record: &KycRecord, must_be_new: bool) -> Result<(), LmdbError> {
        let bytes = serde_json::to_vec(record)?;
        let mut wtxn = self.env.write_txn()?;

        if must_be_new && self.records_db.get(&wtxn, record.id.as_str())?.is_some() {
            return Err(LmdbError::Duplicate(record.id.to_string()));
        }
        match self
            .external_index_db
            .get(&wtxn, record.external_id.as_str())?
        {
            Some(owner) if must_be_new || owner != record.id.as_str() => {
                return Err(LmdbError::Duplicate(record.external_id.to_string()));
            }
            _ => {}
        }

        self.records_db
            .put(&mut wtxn, record.id.as_str(), &bytes)?;
        self.external_index_db
            .put(&mut wtxn, record.external_id.as_str(), record.id.as_str())?;
        wtxn.commit()?;
        Ok(())
    }
}

impl RecordStore for LmdbRecordStore {
    fn create(&self, record: &KycRecord) -> Result<(), StoreError> {
        self.write(record, true).map_err(StoreError::from)
    }

    fn find_by_id(&self, id: &RecordId) -> Result<Option<KycRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        self.read(&rtxn, id.as_str()).map_err(StoreError::from)
    }

    fn find_by_external_id(
        &self,
        external_id: &ExternalId,
    ) -> Result<Option<KycRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let id = self
            .external_index_db
            .get(&rtxn, external_id.as_str())
            .map_err(LmdbError::from)?;
        match id {
            Some(id) => self.read(&rtxn, id).map_err(StoreError::from),
            None => Ok(None),
        }
    }

    fn save(&self, record: &KycRecord) -> Result<(), StoreError> {
        self.write(record, false).map_err(StoreError::from)
    }

    fn record_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self.records_db.len(&rtxn).map_err(LmdbError::from)?)
    }
}
