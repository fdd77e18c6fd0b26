//! Submitted field batches, as handed over by the transport layer.

use std::collections::btree_map;
use std::collections::BTreeMap;

use kyc_types::FieldKind;

/// One submitted value.
///
/// Whether a text field is an identity or a certificate is decided by the
/// caller (the transport's naming convention) and carried here as `kind`.
/// Files always land in the identity map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmittedField {
    Text {
        value: String,
        kind: FieldKind,
    },
    File {
        original_name: String,
        mime_type: String,
        bytes: Vec<u8>,
    },
}

/// A batch of submitted fields keyed by slug.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Submission {
    fields: BTreeMap<String, SubmittedField>,
}

impl Submission {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the value for `slug`.
    pub fn insert(&mut self, slug: impl Into<String>, field: SubmittedField) -> &mut Self {
        self.fields.insert(slug.into(), field);
        self
    }

    pub fn text(mut self, slug: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(
            slug,
            SubmittedField::Text {
                value: value.into(),
                kind: FieldKind::Identity,
            },
        );
        self
    }

    pub fn cert(mut self, slug: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(
            slug,
            SubmittedField::Text {
                value: value.into(),
                kind: FieldKind::Certificate,
            },
        );
        self
    }

    pub fn file(
        mut self,
        slug: impl Into<String>,
        original_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        self.insert(
            slug,
            SubmittedField::File {
                original_name: original_name.into(),
                mime_type: mime_type.into(),
                bytes: bytes.into(),
            },
        );
        self
    }

    pub fn get(&self, slug: &str) -> Option<&SubmittedField> {
        self.fields.get(slug)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl IntoIterator for Submission {
    type Item = (String, SubmittedField);
    type IntoIter = btree_map::IntoIter<String, SubmittedField>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}
