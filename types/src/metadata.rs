//! Protocol metadata: the slugs every new record must track.

use serde::{Deserialize, Serialize};

/// Required-field declarations published by the verification protocol.
///
/// Every slug listed here is present in a new record from the moment it is
/// created, initialised to `missing`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolMetadata {
    /// Certificate slugs.
    #[serde(default)]
    pub certs: Vec<String>,
    /// Required identity slugs.
    #[serde(default)]
    pub required_fields: Vec<String>,
}

impl ProtocolMetadata {
    pub fn new(
        certs: impl IntoIterator<Item = impl Into<String>>,
        required_fields: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            certs: certs.into_iter().map(Into::into).collect(),
            required_fields: required_fields.into_iter().map(Into::into).collect(),
        }
    }
}
