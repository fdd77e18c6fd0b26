//! KYC lifecycle manager: creation, updates, token refresh and status queries.

use std::sync::Arc;

use tracing::info;

use kyc_store::{BlobStore, RecordStore, StoredBlob};
use kyc_types::{
    AuthToken, BlobId, Clock, ExternalId, IdGenerator, KycProfile, KycRecord, KycStatus,
    KycToken, ProtocolMetadata, RecordId,
};

use crate::error::KycError;
use crate::projection::StatusProjection;
use crate::reconciler::FieldReconciler;
use crate::submission::Submission;

/// Orchestrates the life of KYC records.
///
/// Status transitions owned here:
/// - creation leaves the status unset;
/// - every completed update sets `inreview`, whatever the previous status,
///   so a resubmission always reopens review.
///
/// `approved` and `rejected` are written by the reviewer side channel; no
/// operation here refuses to run because of them.
pub struct KycLifecycle {
    records: Arc<dyn RecordStore>,
    blobs: Arc<dyn BlobStore>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    metadata: ProtocolMetadata,
    reconciler: FieldReconciler,
}

impl KycLifecycle {
    pub fn new(
        records: Arc<dyn RecordStore>,
        blobs: Arc<dyn BlobStore>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        metadata: ProtocolMetadata,
    ) -> Self {
        let reconciler = FieldReconciler::new(Arc::clone(&blobs));
        Self {
            records,
            blobs,
            clock,
            ids,
            metadata,
            reconciler,
        }
    }

    /// Create and persist a record for `profile`, seeded with every required
    /// slug at `missing`.
    ///
    /// This does not check for an existing record; get-or-create belongs to
    /// the caller (see `find_by_external_id`). A second create for the same
    /// identity fails in the store with a duplicate-key error.
    pub fn create_kyc(
        &self,
        profile: &KycProfile,
        ref_id: Option<String>,
    ) -> Result<KycRecord, KycError> {
        if profile.id.is_empty() {
            return Err(KycError::Validation("profile id is empty".to_string()));
        }
        let record = KycRecord::new(
            self.ids.next_id(),
            profile,
            ref_id,
            &self.metadata,
            self.clock.now(),
        );
        self.records.create(&record)?;
        info!(record = %record.id, external = %record.external_id, "kyc record created");
        Ok(record)
    }

    /// Merge `submission` into `record`, store the token, reopen review and
    /// persist the result with a single save.
    ///
    /// Nothing is saved when reconciliation fails.
    pub async fn update_kyc(
        &self,
        record: &KycRecord,
        profile: &KycProfile,
        token: KycToken,
        submission: Submission,
    ) -> Result<KycRecord, KycError> {
        if profile.id.is_empty() {
            return Err(KycError::Validation("profile id is empty".to_string()));
        }
        if profile.id != record.external_id {
            return Err(KycError::Validation(format!(
                "profile {} does not belong to record {}",
                profile.id, record.id
            )));
        }

        let field_count = submission.len();
        let mut staged = self.reconciler.reconcile(record, submission).await?;

        staged.auth_token = Some(AuthToken::issue(token, self.clock.now()));
        staged.status = Some(KycStatus::InReview);
        staged.sync_profile(profile);

        self.records.save(&staged)?;
        info!(
            record = %staged.id,
            fields = field_count,
            previous = ?record.status,
            "kyc record updated, review reopened"
        );
        Ok(staged)
    }

    /// Store a token received outside an update, e.g. when a notification
    /// delivery hands back a refreshed one.
    ///
    /// An identical token is a no-op and does not touch the store.
    pub fn refresh_token(
        &self,
        record: &KycRecord,
        token: KycToken,
    ) -> Result<KycRecord, KycError> {
        let token = token.without_expiry();
        if record.auth_token.as_ref().map(|t| &t.token) == Some(&token) {
            return Ok(record.clone());
        }
        let mut updated = record.clone();
        updated.auth_token = Some(AuthToken::issue(token, self.clock.now()));
        self.records.save(&updated)?;
        info!(record = %updated.id, "kyc token refreshed");
        Ok(updated)
    }

    /// Status view of `record`. Pure read.
    pub fn query_status(&self, record: &KycRecord) -> StatusProjection {
        StatusProjection::from_record(record)
    }

    pub fn find_by_external_id(
        &self,
        external_id: &ExternalId,
    ) -> Result<Option<KycRecord>, KycError> {
        Ok(self.records.find_by_external_id(external_id)?)
    }

    pub fn find_by_id(&self, id: &RecordId) -> Result<Option<KycRecord>, KycError> {
        Ok(self.records.find_by_id(id)?)
    }

    /// Fetch uploaded document bytes.
    pub fn load_blob(&self, id: &BlobId) -> Result<StoredBlob, KycError> {
        Ok(self.blobs.retrieve(id)?)
    }
}
