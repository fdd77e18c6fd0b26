//! KYC record storage trait.

use crate::StoreError;
use kyc_types::{ExternalId, KycRecord, RecordId};

/// Keyed storage for KYC records.
///
/// Records are addressable by internal id and by external id; both lookups
/// must resolve to the same record and must observe every completed `save`.
pub trait RecordStore: Send + Sync {
    /// Persist a new record.
    ///
    /// Fails with [`StoreError::Duplicate`] when either the internal id or the
    /// external id is already taken.
    fn create(&self, record: &KycRecord) -> Result<(), StoreError>;

    fn find_by_id(&self, id: &RecordId) -> Result<Option<KycRecord>, StoreError>;

    fn find_by_external_id(&self, external_id: &ExternalId)
        -> Result<Option<KycRecord>, StoreError>;

    /// Persist mutations of a record, inserting it when it is not yet present.
    fn save(&self, record: &KycRecord) -> Result<(), StoreError>;

    fn record_count(&self) -> Result<u64, StoreError>;
}
