//! End-to-end behaviour of the lifecycle manager over the in-memory stores.

use std::sync::Arc;

use proptest::prelude::*;

use kyc_lifecycle::{CertificateStatus, IdentityStatus, KycLifecycle, Submission};
use kyc_nullables::{NullBlobStore, NullClock, NullIdGenerator, NullRecordStore};
use kyc_store::{BlobStore, RecordStore};
use kyc_types::{
    ExternalId, FieldKind, FieldState, FieldStatus, KycProfile, KycStatus, KycToken,
    ProtocolMetadata, Timestamp,
};

struct Env {
    lifecycle: KycLifecycle,
    records: Arc<NullRecordStore>,
    blobs: Arc<NullBlobStore>,
}

fn env_with(metadata: ProtocolMetadata, now: u64) -> Env {
    let records = Arc::new(NullRecordStore::new());
    let blobs = Arc::new(NullBlobStore::new());
    let lifecycle = KycLifecycle::new(
        records.clone(),
        blobs.clone(),
        Arc::new(NullClock::new(now)),
        Arc::new(NullIdGenerator::new()),
        metadata,
    );
    Env {
        lifecycle,
        records,
        blobs,
    }
}

fn env() -> Env {
    env_with(ProtocolMetadata::new(["onfido"], ["email", "selfie"]), 1_700_000_000)
}

fn profile(id: &str) -> KycProfile {
    KycProfile {
        id: ExternalId::new(id),
        smart_contract_id: "sc".into(),
        root_hash: "root".into(),
        is_synching: false,
    }
}

fn token(expires_in: u64) -> KycToken {
    KycToken {
        access_token: "access".into(),
        refresh_token: None,
        expires_in,
        extra: serde_json::Map::new(),
    }
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap()
}

#[test]
fn lookup_by_external_id_returns_created_record() {
    let env = env();
    let created = env.lifecycle.create_kyc(&profile("ext-9"), None).unwrap();
    env.records.save(&created).unwrap();
    let found = env
        .lifecycle
        .find_by_external_id(&ExternalId::new("ext-9"))
        .unwrap()
        .unwrap();
    assert_eq!(found.id, created.id);
}

#[test]
fn required_fields_are_seeded_as_missing() {
    let env = env();
    let rec = env.lifecycle.create_kyc(&profile("ext"), None).unwrap();
    let identity_slugs: Vec<&str> = rec.identities().keys().map(String::as_str).collect();
    let cert_slugs: Vec<&str> = rec.certs().keys().map(String::as_str).collect();
    assert_eq!(identity_slugs, vec!["email", "selfie"]);
    assert_eq!(cert_slugs, vec!["onfido"]);
    assert!(rec
        .identities()
        .values()
        .chain(rec.certs().values())
        .all(|f| f.status == FieldStatus::Missing));
}

#[tokio::test]
async fn file_round_trip_through_blob_store() {
    let env = env();
    let rec = env.lifecycle.create_kyc(&profile("ext123"), None).unwrap();
    let bytes = vec![0x89, b'P', b'N', b'G', 1, 2, 3];
    let updated = env
        .lifecycle
        .update_kyc(
            &rec,
            &profile("ext123"),
            token(3600),
            Submission::new().file("selfie", "photo.png", "image/png", bytes.clone()),
        )
        .await
        .unwrap();

    let selfie = updated.identity("selfie").unwrap();
    assert!(selfie.is_file());
    let blob_id = selfie.blob_id().unwrap();
    let blob = env.blobs.retrieve(blob_id).unwrap();
    assert_eq!(blob.name, "ext123_selfie.png");
    assert_eq!(blob.mime_type, "image/png");
    assert_eq!(blob.bytes, bytes);

    let via_lifecycle = env.lifecycle.load_blob(blob_id).unwrap();
    assert_eq!(via_lifecycle, blob);
}

#[tokio::test]
async fn token_expiry_is_fixed_at_receipt() {
    let env = env_with(ProtocolMetadata::default(), 5_000);
    let rec = env.lifecycle.create_kyc(&profile("ext"), None).unwrap();
    let updated = env
        .lifecycle
        .update_kyc(&rec, &profile("ext"), token(3600), Submission::new())
        .await
        .unwrap();
    assert_eq!(
        updated.auth_token.unwrap().expires_at,
        Timestamp::new(5_000 + 3600)
    );
}

#[test]
fn status_projection_shape() {
    let env = env_with(ProtocolMetadata::new(["b"], Vec::<String>::new()), 0);
    let mut rec = env.lifecycle.create_kyc(&profile("ext"), None).unwrap();
    rec.put_field(FieldKind::Identity, FieldState::received_text("a", "x"));

    let view = env.lifecycle.query_status(&rec);
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
}

#[tokio::test]
async fn concurrent_updates_to_distinct_records_do_not_interfere() {
    let env = Arc::new(env());
    let mut handles = Vec::new();
    for i in 0..16 {
        let env = Arc::clone(&env);
        handles.push(tokio::spawn(async move {
            let ext = format!("ext-{i}");
            let rec = env.lifecycle.create_kyc(&profile(&ext), None).unwrap();
            env.lifecycle
                .update_kyc(
                    &rec,
                    &profile(&ext),
                    token(60),
                    Submission::new()
                        .text("email", format!("{i}@example.org"))
                        .file("selfie", "me.jpg", "image/jpeg", vec![i as u8; 8]),
                )
                .await
                .unwrap()
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }
    assert_eq!(env.records.record_count().unwrap(), 16);
    assert_eq!(env.blobs.blob_count(), 16);
    for i in 0..16 {
        let rec = env
            .lifecycle
            .find_by_external_id(&ExternalId::new(format!("ext-{i}")))
            .unwrap()
            .unwrap();
        assert_eq!(
            rec.identity("email").unwrap().text(),
            Some(format!("{i}@example.org").as_str())
        );
    }
}

fn prior_status() -> impl Strategy<Value = Option<KycStatus>> {
    prop_oneof![
        Just(None),
        Just(Some(KycStatus::Received)),
        Just(Some(KycStatus::InReview)),
        Just(Some(KycStatus::Approved)),
        Just(Some(KycStatus::Rejected)),
    ]
}

fn submission() -> impl Strategy<Value = Submission> {
    prop::collection::btree_map(
        "[a-z]{1,8}",
        (any::<bool>(), any::<bool>(), "[a-z0-9]{0,6}"),
        1..6,
    )
    .prop_map(|entries| {
        entries
            .into_iter()
            .fold(Submission::new(), |sub, (slug, (is_file, is_cert, value))| {
                if is_file {
                    sub.file(slug, format!("{value}.png"), "image/png", value.into_bytes())
                } else if is_cert {
                    sub.cert(slug, value)
                } else {
                    sub.text(slug, value)
                }
            })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Any non-empty resubmission moves the record to `inreview`, whatever it was.
    #[test]
    fn resubmission_always_reopens_review(prior in prior_status(), sub in submission()) {
        let rt = runtime();
        let env = env();
        let mut rec = env.lifecycle.create_kyc(&profile("ext"), None).unwrap();
        rec.status = prior;
        env.records.save(&rec).unwrap();

        let updated = rt
            .block_on(env.lifecycle.update_kyc(&rec, &profile("ext"), token(60), sub))
            .unwrap();
        prop_assert_eq!(updated.status, Some(KycStatus::InReview));
    }

    /// After any update, every field sits under its own slug and every
    /// submitted slug is `received`.
    #[test]
    fn updated_fields_keep_slug_identity(sub in submission()) {
        let rt = runtime();
        let env = env();
        let rec = env.lifecycle.create_kyc(&profile("ext"), None).unwrap();
        let submitted: Vec<String> = sub.slugs().map(str::to_string).collect();

        let updated = rt
            .block_on(env.lifecycle.update_kyc(&rec, &profile("ext"), token(60), sub))
            .unwrap();
        for (key, field) in updated.identities().iter().chain(updated.certs().iter()) {
            prop_assert_eq!(key, &field.slug);
            if field.is_file() {
                prop_assert!(env.blobs.retrieve(field.blob_id().unwrap()).is_ok());
            }
        }
        for slug in submitted {
            let received = updated
                .identity(&slug)
                .into_iter()
                .chain(updated.cert(&slug))
                .any(|f| f.status == FieldStatus::Received);
            prop_assert!(received, "slug {} not received", slug);
        }
    }
}
