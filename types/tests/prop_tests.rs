use proptest::prelude::*;

use kyc_types::{
    AuthToken, ExternalId, FieldKind, FieldState, FieldStatus, KycProfile, KycRecord, KycToken,
    ProtocolMetadata, RecordId, Timestamp,
};

fn slug() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,11}"
}

fn profile() -> KycProfile {
    KycProfile {
        id: ExternalId::new("ext"),
        smart_contract_id: String::new(),
        root_hash: String::new(),
        is_synching: false,
    }
}

proptest! {
    /// Timestamp ordering: new(a) <= new(b) iff a <= b.
    #[test]
    fn timestamp_ordering(a in 0u64..u64::MAX, b in 0u64..u64::MAX) {
        let ta = Timestamp::new(a);
        let tb = Timestamp::new(b);
        prop_assert_eq!(ta <= tb, a <= b);
        prop_assert_eq!(ta == tb, a == b);
    }

    /// Token expiry is always receipt time plus the advertised lifetime.
    #[test]
    fn token_expiry_is_receipt_plus_ttl(received in 0u64..4_000_000_000, ttl in 0u64..10_000_000) {
        let token = KycToken {
            access_token: "a".into(),
            refresh_token: None,
            expires_in: ttl,
            extra: serde_json::Map::new(),
        };
        let issued = AuthToken::issue(token, Timestamp::new(received));
        prop_assert_eq!(issued.expires_at.as_secs(), received + ttl);
    }

    /// Seeding: a new record holds exactly the configured slugs, all missing.
    #[test]
    fn seeding_matches_metadata(
        certs in prop::collection::btree_set(slug(), 0..6),
        fields in prop::collection::btree_set(slug(), 0..6),
    ) {
        let meta = ProtocolMetadata::new(certs.clone(), fields.clone());
        let rec = KycRecord::new(RecordId::new("r"), &profile(), None, &meta, Timestamp::EPOCH);
        prop_assert!(rec.certs().keys().cloned().eq(certs.into_iter()));
        prop_assert!(rec.identities().keys().cloned().eq(fields.into_iter()));
        prop_assert!(rec.certs().values().all(|f| f.status == FieldStatus::Missing));
        prop_assert!(rec.identities().values().all(|f| f.status == FieldStatus::Missing));
    }

    /// Every entry written through put_field is keyed by its own slug.
    #[test]
    fn slug_always_equals_key(writes in prop::collection::vec((slug(), any::<bool>(), ".{0,8}"), 0..20)) {
        let mut rec = KycRecord::new(RecordId::new("r"), &profile(), None, &ProtocolMetadata::default(), Timestamp::EPOCH);
        for (slug, is_cert, value) in writes {
            let kind = if is_cert { FieldKind::Certificate } else { FieldKind::Identity };
            rec.put_field(kind, FieldState::received_text(slug, value));
        }
        for (key, field) in rec.identities().iter().chain(rec.certs().iter()) {
            prop_assert_eq!(key, &field.slug);
        }
    }
}
