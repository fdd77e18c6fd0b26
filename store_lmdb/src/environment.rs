//! LMDB environment setup.

use std::path::Path;
use std::sync::Arc;

use heed::types::{Bytes, Str};
use heed::{Database, Env, EnvOpenOptions};

use crate::blob::LmdbBlobStore;
use crate::record::LmdbRecordStore;
use crate::LmdbError;

/// Number of named databases in the environment.
const MAX_DBS: u32 = 4;

/// Wraps the LMDB environment and all database handles.
pub struct LmdbEnvironment {
    env: Arc<Env>,
    /// record id -> JSON-encoded `KycRecord`.
    records_db: Database<Str, Bytes>,
    /// external id -> record id.
    external_index_db: Database<Str, Str>,
    /// blob id -> bincode-encoded `StoredBlob`.
    blobs_db: Database<Str, Bytes>,
    /// Counters and other bookkeeping.
    meta_db: Database<Str, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given directory.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;

        // SAFETY: the environment is opened once per process for this path and
        // the data files are not modified by anything else while it is open.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let records_db = env.create_database(&mut wtxn, Some("records"))?;
        let external_index_db = env.create_database(&mut wtxn, Some("external_index"))?;
        let blobs_db = env.create_database(&mut wtxn, Some("blobs"))?;
        let meta_db = env.create_database(&mut wtxn, Some("meta"))?;
        wtxn.commit()?;

        tracing::info!(path = %path.display(), "LMDB environment opened");

        Ok(Self {
            env: Arc::new(env),
            records_db,
            external_index_db,
            blobs_db,
            meta_db,
        })
    }

    pub fn record_store(&self) -> LmdbRecordStore {
        LmdbRecordStore {
            env: Arc::clone(&self.env),
            records_db: self.records_db,
            external_index_db: self.external_index_db,
        }
    }

    pub fn blob_store(&self) -> LmdbBlobStore {
        LmdbBlobStore {
            env: Arc::clone(&self.env),
            blobs_db: self.blobs_db,
            meta_db: self.meta_db,
        }
    }
}
