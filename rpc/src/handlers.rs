//! RPC request handlers.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{FromRequest, Path, Request, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::{async_trait, Json};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use kyc_callback::{
    CallbackAdapter, CreateKycRequest, KycCallbacks, SsoPayload, SsoRequest, UpdateKycRequest,
};
use kyc_lifecycle::StatusProjection;
use kyc_types::{BlobId, ExternalId, KycProfile, KycRecord, KycToken, RecordId};

use crate::error::RpcError;
use crate::ingest::{flatten, UploadedFile};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub callbacks: Arc<CallbackAdapter>,
}

impl AppState {
    pub fn new(callbacks: Arc<CallbackAdapter>) -> Self {
        Self { callbacks }
    }

    async fn record(&self, id: &RecordId) -> Result<KycRecord, RpcError> {
        self.callbacks
            .find_record(id)
            .await?
            .ok_or_else(|| RpcError::NotFound(format!("kyc record {id}")))
    }
}

/// JSON body whose rejections use the `{err, msg}` error shape.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = RpcError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

// ── Requests ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct FindRequest {
    pub id: ExternalId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    pub kyc_profile: KycProfile,
    #[serde(default)]
    pub ref_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    pub record_id: RecordId,
    pub kyc_profile: KycProfile,
    pub kyc_token: KycToken,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    #[serde(default)]
    pub files: Vec<UploadedFile>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRequest {
    pub record_id: RecordId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SsoBody {
    pub record_id: RecordId,
    #[serde(default)]
    pub kyc_profile: Option<KycProfile>,
    #[serde(default)]
    pub kyc_token: Option<KycToken>,
    #[serde(default)]
    pub payload: serde_json::Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequest {
    pub external_id: ExternalId,
    pub kyc_token: KycToken,
}

// ── Handlers ─────────────────────────────────────────────────────────────

pub async fn hello() -> &'static str {
    "hello"
}

pub async fn find_kyc(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<FindRequest>,
) -> Result<Json<KycRecord>, RpcError> {
    state
        .callbacks
        .find_kyc_by_id(&req.id)
        .await?
        .map(Json)
        .ok_or_else(|| RpcError::NotFound(format!("no kyc record for {}", req.id)))
}

pub async fn create_kyc(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateRequest>,
) -> Result<Json<KycRecord>, RpcError> {
    let record = state
        .callbacks
        .create_kyc(CreateKycRequest {
            kyc_profile: req.kyc_profile,
            ref_id: req.ref_id,
        })
        .await?;
    Ok(Json(record))
}

pub async fn update_kyc(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<UpdateRequest>,
) -> Result<Json<KycRecord>, RpcError> {
    let user_raw_data = flatten(req.fields, req.files)?;
    let kyc_record = state.record(&req.record_id).await?;
    let record = state
        .callbacks
        .update_kyc(UpdateKycRequest {
            kyc_record,
            kyc_profile: req.kyc_profile,
            kyc_token: req.kyc_token,
            user_raw_data,
        })
        .await?;
    Ok(Json(record))
}

pub async fn query_status(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<StatusRequest>,
) -> Result<Json<StatusProjection>, RpcError> {
    let record = state.record(&req.record_id).await?;
    Ok(Json(state.callbacks.query_kyc_status(&record).await?))
}

pub async fn sso_payload(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<SsoBody>,
) -> Result<Json<SsoPayload>, RpcError> {
    let kyc_record = state.record(&req.record_id).await?;
    let payload = state
        .callbacks
        .generate_sso_payload(SsoRequest {
            kyc_profile: req.kyc_profile,
            kyc_record,
            kyc_token: req.kyc_token,
            payload: req.payload,
        })
        .await?;
    Ok(Json(payload))
}

pub async fn refresh_token(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<TokenRequest>,
) -> Result<Json<KycRecord>, RpcError> {
    let record = state
        .callbacks
        .refresh_token(&req.external_id, req.kyc_token)
        .await?;
    Ok(Json(record))
}

pub async fn download_blob(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, RpcError> {
    let blob = state.callbacks.load_document(&BlobId::new(id)).await?;
    let disposition = format!("inline; filename=\"{}\"", blob.name.replace('"', ""));
    Ok((
        [
            (header::CONTENT_TYPE, blob.mime_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        blob.bytes,
    )
        .into_response())
}
