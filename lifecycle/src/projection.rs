//! Read-only status view returned to the mobile client.

use serde::{Deserialize, Serialize};

use kyc_types::{FieldStatus, KycRecord, KycStatus, Timestamp};

/// Guidance shown to the user while their data is being processed.
pub const REVIEW_MESSAGE: &str = "This process usually takes 2 working days";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityStatus {
    pub slug: String,
    pub status: FieldStatus,
    pub comment: String,
}

/// Certificate entries carry no reviewer comment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateStatus {
    pub slug: String,
    pub status: FieldStatus,
}

/// `{status, message, createdDate, identities, certificates, allowResubmit}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusProjection {
    pub status: Option<KycStatus>,
    pub message: String,
    pub created_date: Timestamp,
    pub identities: Vec<IdentityStatus>,
    pub certificates: Vec<CertificateStatus>,
    pub allow_resubmit: bool,
}

impl StatusProjection {
    /// Flatten a record into its status view. Entries are ordered by slug.
    pub fn from_record(record: &KycRecord) -> Self {
        let identities = record
            .identities()
            .values()
            .map(|f| IdentityStatus {
                slug: f.slug.clone(),
                status: f.status,
                comment: f.comment.clone(),
            })
            .collect();
        let certificates = record
            .certs()
            .values()
            .map(|f| CertificateStatus {
                slug: f.slug.clone(),
                status: f.status,
            })
            .collect();
        Self {
            status: record.status,
            message: REVIEW_MESSAGE.to_string(),
            created_date: record.created_at,
            identities,
            certificates,
            allow_resubmit: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kyc_types::{
        ExternalId, FieldKind, FieldState, KycProfile, ProtocolMetadata, RecordId,
    };

    #[test]
    fn flattens_identities_with_comments_and_certs_without() {
        let profile = KycProfile {
            id: ExternalId::new("ext"),
            smart_contract_id: String::new(),
            root_hash: String::new(),
            is_synching: false,
        };
        let mut rec = KycRecord::new(
            RecordId::new("r1"),
            &profile,
            None,
            &ProtocolMetadata::new(["b"], Vec::<String>::new()),
            Timestamp::new(1_234),
        );
        rec.put_field(FieldKind::Identity, FieldState::received_text("a", "value"));

        let view = StatusProjection::from_record(&rec);
        assert_eq!(
            view.identities,
            vec![IdentityStatus {
                slug: "a".into(),
                status: FieldStatus::Received,
                comment: String::new(),
            }]
        );
        assert_eq!(
            view.certificates,
            vec![CertificateStatus {
                slug: "b".into(),
                status: FieldStatus::Missing,
            }]
        );
        assert!(view.allow_resubmit);
        assert_eq!(view.created_date, Timestamp::new(1_234));
        assert!(view.status.is_none());

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["allowResubmit"], true);
        assert_eq!(json["createdDate"], 1_234);
        assert!(json["certificates"][0].get("comment").is_none());
    }
}
