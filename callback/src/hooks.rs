//! The hook contract required by the verification protocol.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use kyc_lifecycle::{StatusProjection, Submission};
use kyc_types::{ExternalId, KycProfile, KycRecord, KycToken, RecordId};

use crate::error::HookError;

#[derive(Clone, Debug)]
pub struct CreateKycRequest {
    pub kyc_profile: KycProfile,
    pub ref_id: Option<String>,
}

#[derive(Clone, Debug)]
pub struct UpdateKycRequest {
    pub kyc_record: KycRecord,
    pub kyc_profile: KycProfile,
    pub kyc_token: KycToken,
    pub user_raw_data: Submission,
}

#[derive(Clone, Debug)]
pub struct SsoRequest {
    pub kyc_profile: Option<KycProfile>,
    pub kyc_record: KycRecord,
    pub kyc_token: Option<KycToken>,
    pub payload: serde_json::Value,
}

/// Minimal projection handed to single-sign-on consumers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SsoPayload {
    #[serde(rename = "_id")]
    pub id: RecordId,
}

/// Hooks invoked by the verification protocol.
#[async_trait]
pub trait KycCallbacks: Send + Sync {
    /// Look a record up by the identity-provider id the protocol knows it by.
    async fn find_kyc_by_id(&self, kyc_id: &ExternalId) -> Result<Option<KycRecord>, HookError>;

    async fn create_kyc(&self, request: CreateKycRequest) -> Result<KycRecord, HookError>;

    async fn update_kyc(&self, request: UpdateKycRequest) -> Result<KycRecord, HookError>;

    async fn query_kyc_status(&self, record: &KycRecord) -> Result<StatusProjection, HookError>;

    async fn generate_sso_payload(&self, request: SsoRequest) -> Result<SsoPayload, HookError>;
}
