//! Flattening of uploaded form data into a [`Submission`].
//!
//! Text fields arrive as `name -> value`. A `[cer]` prefix marks a
//! certificate; everything else is an identity. `accessToken` and
//! `slugList` carry correlation data and are never stored as fields.
//! Files arrive with base64 bytes and replace a text field of the same slug.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;

use kyc_lifecycle::{Submission, SubmittedField};
use kyc_types::FieldKind;

use crate::error::RpcError;

pub const CERTIFICATE_PREFIX: &str = "[cer]";

pub const RESERVED_KEYS: [&str; 2] = ["accessToken", "slugList"];

/// One uploaded file as described by the transport.
#[derive(Clone, Debug, Deserialize)]
pub struct UploadedFile {
    pub fieldname: String,
    pub originalname: String,
    #[serde(default)]
    pub mimetype: String,
    /// Base64-encoded content.
    pub buffer: String,
}

pub fn flatten(
    fields: BTreeMap<String, String>,
    files: Vec<UploadedFile>,
) -> Result<Submission, RpcError> {
    let mut submission = Submission::new();

    for (name, value) in fields {
        if RESERVED_KEYS.contains(&name.as_str()) {
            continue;
        }
        let (slug, kind) = match name.strip_prefix(CERTIFICATE_PREFIX) {
            Some(slug) => (slug.to_string(), FieldKind::Certificate),
            None => (name, FieldKind::Identity),
        };
        if slug.is_empty() {
            return Err(RpcError::InvalidRequest("field with empty slug".to_string()));
        }
        submission.insert(slug, SubmittedField::Text { value, kind });
    }

    for file in files {
        if file.fieldname.is_empty() {
            return Err(RpcError::InvalidRequest("file with empty fieldname".to_string()));
        }
        let bytes = STANDARD.decode(file.buffer.as_bytes()).map_err(|e| {
            RpcError::InvalidRequest(format!("file {} is not valid base64: {e}", file.fieldname))
        })?;
        submission.insert(
            file.fieldname,
            SubmittedField::File {
                original_name: file.originalname,
                mime_type: file.mimetype,
                bytes,
            },
        );
    }

    Ok(submission)
}
