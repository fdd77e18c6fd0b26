//! Nullable stores: thread-safe in-memory storage for testing.

use kyc_store::{BlobStore, RecordStore, StoreError, StoredBlob};
use kyc_types::{BlobId, ExternalId, KycRecord, RecordId};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

fn lock<T>(m: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    m.lock()
        .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))
}

#[derive(Default)]
struct RecordTables {
    by_id: HashMap<RecordId, KycRecord>,
    external_index: HashMap<ExternalId, RecordId>,
}

/// An in-memory record store.
/// Thread-safe for use with tokio's multi-threaded runtime.
///
/// Both tables sit behind one lock so the external-id index never disagrees
/// with the primary table.
#[derive(Default)]
pub struct NullRecordStore {
    tables: Mutex<RecordTables>,
}

impl NullRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for NullRecordStore {
    fn create(&self, record: &KycRecord) -> Result<(), StoreError> {
        let mut tables = lock(&self.tables)?;
        if tables.by_id.contains_key(&record.id) {
            return Err(StoreError::Duplicate(record.id.to_string()));
        }
        if tables.external_index.contains_key(&record.external_id) {
            return Err(StoreError::Duplicate(record.external_id.to_string()));
        }
        tables
            .external_index
            .insert(record.external_id.clone(), record.id.clone());
        tables.by_id.insert(record.id.clone(), record.clone());
        Ok(())
    }

    fn find_by_id(&self, id: &RecordId) -> Result<Option<KycRecord>, StoreError> {
        Ok(lock(&self.tables)?.by_id.get(id).cloned())
    }

    fn find_by_external_id(
        &self,
        external_id: &ExternalId,
    ) -> Result<Option<KycRecord>, StoreError> {
        let tables = lock(&self.tables)?;
        Ok(tables
            .external_index
            .get(external_id)
            .and_then(|id| tables.by_id.get(id))
            .cloned())
    }

    fn save(&self, record: &KycRecord) -> Result<(), StoreError> {
        let mut tables = lock(&self.tables)?;
        match tables.external_index.get(&record.external_id) {
            Some(owner) if owner != &record.id => {
                return Err(StoreError::Duplicate(record.external_id.to_string()));
            }
            _ => {}
        }
        tables
            .external_index
            .insert(record.external_id.clone(), record.id.clone());
        tables.by_id.insert(record.id.clone(), record.clone());
        Ok(())
    }

    fn record_count(&self) -> Result<u64, StoreError> {
        Ok(lock(&self.tables)?.by_id.len() as u64)
    }
}

/// An in-memory blob store.
///
/// Ids are a decimal sequence starting at 1. Writes for names registered via
/// [`NullBlobStore::fail_writes_named`] fail with a backend error, which lets
/// tests exercise partial upload failures.
pub struct NullBlobStore {
    blobs: Mutex<HashMap<BlobId, StoredBlob>>,
    next_id: AtomicU64,
    failing_names: Mutex<HashSet<String>>,
}

impl NullBlobStore {
    pub fn new() -> Self {
        Self {
            blobs: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            failing_names: Mutex::new(HashSet::new()),
        }
    }

    /// Make every future write of a blob with this stored name fail.
    pub fn fail_writes_named(&self, name: impl Into<String>) {
        if let Ok(mut names) = self.failing_names.lock() {
            names.insert(name.into());
        }
    }

    pub fn blob_count(&self) -> usize {
        self.blobs.lock().map(|b| b.len()).unwrap_or_default()
    }
}

impl Default for NullBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlobStore for NullBlobStore {
    fn store(&self, name: &str, mime_type: &str, bytes: &[u8]) -> Result<BlobId, StoreError> {
        if lock(&self.failing_names)?.contains(name) {
            return Err(StoreError::Backend(format!("write of blob '{name}' refused")));
        }
        let id = BlobId::new(self.next_id.fetch_add(1, Ordering::SeqCst).to_string());
        lock(&self.blobs)?.insert(
            id.clone(),
            StoredBlob {
                name: name.to_string(),
                mime_type: mime_type.to_string(),
                bytes: bytes.to_vec(),
            },
        );
        Ok(id)
    }

    fn retrieve(&self, id: &BlobId) -> Result<StoredBlob, StoreError> {
        lock(&self.blobs)?
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("blob {id}")))
    }
}
