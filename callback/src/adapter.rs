//! [`KycCallbacks`] implementation backed by the lifecycle manager.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info_span, warn, Instrument};

use kyc_lifecycle::{KycError, KycLifecycle, StatusProjection};
use kyc_store::StoredBlob;
use kyc_types::{BlobId, ExternalId, KycRecord, KycToken, RecordId};

use crate::error::HookError;
use crate::hooks::{CreateKycRequest, KycCallbacks, SsoPayload, SsoRequest, UpdateKycRequest};
use crate::record_locks::RecordLocks;

/// Bridges protocol hooks to [`KycLifecycle`].
///
/// Mutations of one record run one at a time: update and token refresh take
/// the record's lock and re-read the stored copy before applying changes, so
/// a stale record handed in by the caller cannot overwrite a newer write.
/// Creation is locked on the external id, which makes get-or-create safe
/// against concurrent logins of the same identity.
pub struct CallbackAdapter {
    lifecycle: Arc<KycLifecycle>,
    locks: RecordLocks,
}

impl CallbackAdapter {
    pub fn new(lifecycle: Arc<KycLifecycle>) -> Self {
        Self {
            lifecycle,
            locks: RecordLocks::new(),
        }
    }

    /// Resolve a record by its own id.
    pub async fn find_record(&self, id: &RecordId) -> Result<Option<KycRecord>, HookError> {
        self.lifecycle
            .find_by_id(id)
            .map_err(|e| reject("find_record", e))
    }

    /// Store a refreshed token for the record owned by `external_id`.
    pub async fn refresh_token(
        &self,
        external_id: &ExternalId,
        token: KycToken,
    ) -> Result<KycRecord, HookError> {
        let span = info_span!("hook", name = "refresh_token", record = %external_id);
        async {
            let current = self
                .lifecycle
                .find_by_external_id(external_id)
                .map_err(|e| reject("refresh_token", e))?
                .ok_or_else(|| {
                    reject(
                        "refresh_token",
                        KycError::NotFound(format!("no kyc record for {external_id}")),
                    )
                })?;
            let _guard = self.locks.lock(record_key(&current.id).as_str()).await;
            let current = self.reload(&current).map_err(|e| reject("refresh_token", e))?;
            self.lifecycle
                .refresh_token(&current, token)
                .map_err(|e| reject("refresh_token", e))
        }
        .instrument(span)
        .await
    }

    /// Fetch an uploaded document.
    pub async fn load_document(&self, id: &BlobId) -> Result<StoredBlob, HookError> {
        self.lifecycle
            .load_blob(id)
            .map_err(|e| reject("load_document", e))
    }

    /// Latest stored copy of `record`, or `record` itself when it was never
    /// persisted.
    fn reload(&self, record: &KycRecord) -> Result<KycRecord, KycError> {
        Ok(self
            .lifecycle
            .find_by_id(&record.id)?
            .unwrap_or_else(|| record.clone()))
    }
}

#[async_trait]
impl KycCallbacks for CallbackAdapter {
    async fn find_kyc_by_id(&self, kyc_id: &ExternalId) -> Result<Option<KycRecord>, HookError> {
        self.lifecycle
            .find_by_external_id(kyc_id)
            .map_err(|e| reject("find_kyc_by_id", e))
    }

    async fn create_kyc(&self, request: CreateKycRequest) -> Result<KycRecord, HookError> {
        let profile = request.kyc_profile;
        let span = info_span!("hook", name = "create_kyc", record = %profile.id);
        async {
            let _guard = self.locks.lock(external_key(&profile.id).as_str()).await;
            if let Some(existing) = self
                .lifecycle
                .find_by_external_id(&profile.id)
                .map_err(|e| reject("create_kyc", e))?
            {
                debug!(record = %existing.id, "kyc record already exists");
                return Ok(existing);
            }
            self.lifecycle
                .create_kyc(&profile, request.ref_id)
                .map_err(|e| reject("create_kyc", e))
        }
        .instrument(span)
        .await
    }

    async fn update_kyc(&self, request: UpdateKycRequest) -> Result<KycRecord, HookError> {
        let UpdateKycRequest {
            kyc_record,
            kyc_profile,
            kyc_token,
            user_raw_data,
        } = request;
        let span = info_span!("hook", name = "update_kyc", record = %kyc_record.id);
        async {
            let _guard = self.locks.lock(record_key(&kyc_record.id).as_str()).await;
            let current = self.reload(&kyc_record).map_err(|e| reject("update_kyc", e))?;
            self.lifecycle
                .update_kyc(&current, &kyc_profile, kyc_token, user_raw_data)
                .await
                .map_err(|e| reject("update_kyc", e))
        }
        .instrument(span)
        .await
    }

    async fn query_kyc_status(&self, record: &KycRecord) -> Result<StatusProjection, HookError> {
        Ok(self.lifecycle.query_status(record))
    }

    async fn generate_sso_payload(&self, request: SsoRequest) -> Result<SsoPayload, HookError> {
        Ok(SsoPayload {
            id: request.kyc_record.id,
        })
    }
}

fn record_key(id: &RecordId) -> String {
    format!("record:{id}")
}

fn external_key(id: &ExternalId) -> String {
    format!("external:{id}")
}

fn reject(hook: &'static str, error: KycError) -> HookError {
    warn!(hook, %error, "hook failed");
    HookError::from(error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kyc_lifecycle::Submission;
    use kyc_nullables::{NullBlobStore, NullClock, NullIdGenerator, NullRecordStore};
    use kyc_store::RecordStore;
    use kyc_types::{KycProfile, KycStatus, ProtocolMetadata};

    fn adapter() -> (CallbackAdapter, Arc<NullRecordStore>) {
        let records = Arc::new(NullRecordStore::new());
        let lifecycle = KycLifecycle::new(
            records.clone(),
            Arc::new(NullBlobStore::new()),
            Arc::new(NullClock::new(100)),
            Arc::new(NullIdGenerator::new()),
            ProtocolMetadata::new(["onfido"], ["email", "selfie"]),
        );
        (CallbackAdapter::new(Arc::new(lifecycle)), records)
    }

    fn profile(id: &str) -> KycProfile {
        KycProfile {
            id: ExternalId::new(id),
            ..KycProfile::default()
        }
    }

    fn token(access: &str) -> KycToken {
        KycToken {
            access_token: access.into(),
            refresh_token: None,
            expires_in: 60,
            extra: serde_json::Map::new(),
        }
    }

    #[tokio::test]
    async fn create_is_get_or_create() {
        let (adapter, records) = adapter();
        let request = CreateKycRequest {
            kyc_profile: profile("ext1"),
            ref_id: None,
        };
        let first = adapter.create_kyc(request.clone()).await.unwrap();
        let second = adapter.create_kyc(request).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(records.record_count().unwrap(), 1);
    }

    #[tokio::test]
    async fn find_returns_none_for_unknown() {
        let (adapter, _) = adapter();
        let found = adapter.find_kyc_by_id(&ExternalId::new("nobody")).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn update_applies_to_latest_stored_copy() {
        let (adapter, _) = adapter();
        let stale = adapter
            .create_kyc(CreateKycRequest {
                kyc_profile: profile("ext1"),
                ref_id: None,
            })
            .await
            .unwrap();

        adapter
            .update_kyc(UpdateKycRequest {
                kyc_record: stale.clone(),
                kyc_profile: profile("ext1"),
                kyc_token: token("t1"),
                user_raw_data: Submission::new().text("email", "a@b.c"),
            })
            .await
            .unwrap();
        let updated = adapter
            .update_kyc(UpdateKycRequest {
                kyc_record: stale,
                kyc_profile: profile("ext1"),
                kyc_token: token("t2"),
                user_raw_data: Submission::new().cert("onfido", "ok"),
            })
            .await
            .unwrap();

        assert_eq!(updated.identity("email").unwrap().text(), Some("a@b.c"));
        assert_eq!(updated.cert("onfido").unwrap().text(), Some("ok"));
        assert_eq!(updated.status, Some(KycStatus::InReview));
    }

    #[tokio::test]
    async fn update_error_maps_to_invalid_request() {
        let (adapter, _) = adapter();
        let rec = adapter
            .create_kyc(CreateKycRequest {
                kyc_profile: profile("ext1"),
                ref_id: None,
            })
            .await
            .unwrap();
        let err = adapter
            .update_kyc(UpdateKycRequest {
                kyc_record: rec,
                kyc_profile: profile("ext2"),
                kyc_token: token("t"),
                user_raw_data: Submission::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, HookError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn refresh_token_for_unknown_identity_is_not_found() {
        let (adapter, _) = adapter();
        let err = adapter
            .refresh_token(&ExternalId::new("ghost"), token("t"))
            .await
            .unwrap_err();
        assert!(matches!(err, HookError::NotFound(_)));
    }

    #[tokio::test]
    async fn sso_payload_carries_record_id() {
        let (adapter, _) = adapter();
        let rec = adapter
            .create_kyc(CreateKycRequest {
                kyc_profile: profile("ext1"),
                ref_id: None,
            })
            .await
            .unwrap();
        let payload = adapter
            .generate_sso_payload(SsoRequest {
                kyc_profile: None,
                kyc_record: rec.clone(),
                kyc_token: None,
                payload: serde_json::json!({}),
            })
            .await
            .unwrap();
        assert_eq!(payload.id, rec.id);
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            serde_json::json!({ "_id": "rec-1" })
        );
    }

    #[tokio::test]
    async fn missing_document_is_not_found() {
        let (adapter, _) = adapter();
        let err = adapter.load_document(&BlobId::new("404")).await.unwrap_err();
        assert!(matches!(err, HookError::NotFound(_)));
    }
}
