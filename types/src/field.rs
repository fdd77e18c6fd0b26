//! Per-field review state.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::BlobId;
use crate::state::FieldStatus;

/// Which of a record's two field maps a slug belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Required personal data (name, address, selfie, ...).
    Identity,
    /// Certificate or attestation issued by a third party.
    Certificate,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity => f.write_str("identity"),
            Self::Certificate => f.write_str("certificate"),
        }
    }
}

/// What a field currently holds: literal text or a reference to stored file bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Blob(BlobId),
}

/// Review state of one identity or certificate field.
///
/// Serialized as `{slug, status, value, isFile, comment}`; `isFile` is derived
/// from the value so a text value can never be mistaken for a blob handle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "FieldStateRepr", try_from = "FieldStateRepr")]
pub struct FieldState {
    pub slug: String,
    pub status: FieldStatus,
    pub value: Option<FieldValue>,
    /// Reviewer remark; set when the field is rejected.
    pub comment: String,
}

impl FieldState {
    /// A required field that has not been uploaded yet.
    pub fn missing(slug: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            status: FieldStatus::Missing,
            value: None,
            comment: String::new(),
        }
    }

    /// A freshly received text field.
    pub fn received_text(slug: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            status: FieldStatus::Received,
            value: Some(FieldValue::Text(value.into())),
            comment: String::new(),
        }
    }

    /// A freshly received file field, referencing bytes held by the blob store.
    pub fn received_file(slug: impl Into<String>, blob: BlobId) -> Self {
        Self {
            slug: slug.into(),
            status: FieldStatus::Received,
            value: Some(FieldValue::Blob(blob)),
            comment: String::new(),
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self.value, Some(FieldValue::Blob(_)))
    }

    /// The blob handle, when this field holds a file.
    pub fn blob_id(&self) -> Option<&BlobId> {
        match &self.value {
            Some(FieldValue::Blob(id)) => Some(id),
            _ => None,
        }
    }

    /// The literal text, when this field holds text.
    pub fn text(&self) -> Option<&str> {
        match &self.value {
            Some(FieldValue::Text(s)) => Some(s),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FieldStateRepr {
    slug: String,
    status: FieldStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<String>,
    #[serde(default)]
    is_file: bool,
    #[serde(default)]
    comment: String,
}

impl From<FieldState> for FieldStateRepr {
    fn from(state: FieldState) -> Self {
        let is_file = state.is_file();
        let value = state.value.map(|v| match v {
            FieldValue::Text(s) => s,
            FieldValue::Blob(id) => id.as_str().to_string(),
        });
        Self {
            slug: state.slug,
            status: state.status,
            value,
            is_file,
            comment: state.comment,
        }
    }
}

impl TryFrom<FieldStateRepr> for FieldState {
    type Error = String;

    fn try_from(repr: FieldStateRepr) -> Result<Self, Self::Error> {
        let value = match (repr.value, repr.is_file) {
            (Some(v), true) => Some(FieldValue::Blob(BlobId::new(v))),
            (Some(v), false) => Some(FieldValue::Text(v)),
            (None, true) => {
                return Err(format!("field '{}' is marked as file but has no blob id", repr.slug))
            }
            (None, false) => None,
        };
        Ok(Self {
            slug: repr.slug,
            status: repr.status,
            value,
            comment: repr.comment,
        })
    }
}
