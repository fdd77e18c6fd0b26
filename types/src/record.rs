//! The KYC record and the protocol-shaped inputs that feed it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::field::{FieldKind, FieldState};
use crate::ids::{ExternalId, RecordId};
use crate::metadata::ProtocolMetadata;
use crate::state::{FieldStatus, KycStatus};
use crate::time::Timestamp;

/// Identity profile supplied by the verification protocol on every call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KycProfile {
    /// Identity-provider id; becomes the record's external id.
    pub id: ExternalId,
    #[serde(default)]
    pub smart_contract_id: String,
    #[serde(default)]
    pub root_hash: String,
    #[serde(default)]
    pub is_synching: bool,
}

/// Key under which a stored token carries its absolute expiry.
const EXPIRES_AT_KEY: &str = "expires_at";

/// Access-token bundle as issued by the protocol.
///
/// Fields other than the ones named here are kept verbatim in `extra`,
/// except `expires_at`: the expiry is owned by [`AuthToken`] and a stale
/// copy echoed back by the protocol is dropped.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawKycToken")]
pub struct KycToken {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Lifetime in seconds, counted from the moment the token is received.
    pub expires_in: u64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl KycToken {
    /// Drop any `expires_at` carried in the extra fields.
    pub fn without_expiry(mut self) -> Self {
        self.extra.remove(EXPIRES_AT_KEY);
        self
    }
}

#[derive(Deserialize)]
struct RawKycToken {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    expires_in: u64,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

impl From<RawKycToken> for KycToken {
    fn from(raw: RawKycToken) -> Self {
        KycToken {
            access_token: raw.access_token,
            refresh_token: raw.refresh_token,
            expires_in: raw.expires_in,
            extra: raw.extra,
        }
        .without_expiry()
    }
}

/// A received token plus its absolute expiry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuthToken {
    #[serde(flatten)]
    pub token: KycToken,
    pub expires_at: Timestamp,
}

impl AuthToken {
    /// Stamp a token received at `received_at`. The expiry is fixed here and
    /// never recomputed.
    pub fn issue(token: KycToken, received_at: Timestamp) -> Self {
        let expires_at = received_at.plus_secs(token.expires_in);
        Self {
            token: token.without_expiry(),
            expires_at,
        }
    }
}

/// Per-user KYC state.
///
/// Field maps are only written through [`KycRecord::put_field`], which keys
/// every entry by its own slug.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KycRecord {
    pub id: RecordId,
    pub external_id: ExternalId,
    #[serde(default)]
    pub ref_id: Option<String>,
    #[serde(default)]
    pub root_hash: String,
    #[serde(default)]
    pub smart_contract_id: String,
    #[serde(default)]
    pub is_synching: bool,
    /// `None` until the first update.
    #[serde(default)]
    pub status: Option<KycStatus>,
    identities: BTreeMap<String, FieldState>,
    certs: BTreeMap<String, FieldState>,
    #[serde(default)]
    pub auth_token: Option<AuthToken>,
    pub created_at: Timestamp,
}

impl KycRecord {
    /// Build a new record for `profile`, seeding every required slug as `missing`.
    pub fn new(
        id: RecordId,
        profile: &KycProfile,
        ref_id: Option<String>,
        metadata: &ProtocolMetadata,
        created_at: Timestamp,
    ) -> Self {
        let seed = |slugs: &[String]| {
            slugs
                .iter()
                .map(|slug| (slug.clone(), FieldState::missing(slug.clone())))
                .collect::<BTreeMap<_, _>>()
        };
        Self {
            id,
            external_id: profile.id.clone(),
            ref_id,
            root_hash: profile.root_hash.clone(),
            smart_contract_id: profile.smart_contract_id.clone(),
            is_synching: profile.is_synching,
            status: None,
            identities: seed(&metadata.required_fields),
            certs: seed(&metadata.certs),
            auth_token: None,
            created_at,
        }
    }

    pub fn identities(&self) -> &BTreeMap<String, FieldState> {
        &self.identities
    }

    pub fn certs(&self) -> &BTreeMap<String, FieldState> {
        &self.certs
    }

    pub fn identity(&self, slug: &str) -> Option<&FieldState> {
        self.identities.get(slug)
    }

    pub fn cert(&self, slug: &str) -> Option<&FieldState> {
        self.certs.get(slug)
    }

    fn map_mut(&mut self, kind: FieldKind) -> &mut BTreeMap<String, FieldState> {
        match kind {
            FieldKind::Identity => &mut self.identities,
            FieldKind::Certificate => &mut self.certs,
        }
    }

    /// Insert or overwrite a field, keyed by its slug.
    pub fn put_field(&mut self, kind: FieldKind, state: FieldState) -> Option<FieldState> {
        self.map_mut(kind).insert(state.slug.clone(), state)
    }

    /// Record a reviewer decision on an existing field.
    ///
    /// Returns `false` when the slug is unknown.
    pub fn set_review(
        &mut self,
        kind: FieldKind,
        slug: &str,
        status: FieldStatus,
        comment: impl Into<String>,
    ) -> bool {
        match self.map_mut(kind).get_mut(slug) {
            Some(field) => {
                field.status = status;
                field.comment = comment.into();
                true
            }
            None => false,
        }
    }

    /// Mirror the protocol-side profile attributes onto this record.
    pub fn sync_profile(&mut self, profile: &KycProfile) {
        self.root_hash = profile.root_hash.clone();
        self.smart_contract_id = profile.smart_contract_id.clone();
        self.is_synching = profile.is_synching;
    }
}
