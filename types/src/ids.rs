//! Identifier newtypes and id generation.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id!(
    /// Internal record identifier, assigned once at creation.
    RecordId
);

string_id!(
    /// Identity-provider-issued identifier. Unique per record.
    ExternalId
);

string_id!(
    /// Handle returned by a blob store for stored file bytes.
    BlobId
);

/// Source of fresh record identifiers.
///
/// Injected into the lifecycle manager so that tests can use a deterministic
/// sequence while production uses random UUIDs.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> RecordId;
}

/// Random UUID v4 identifiers.
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> RecordId {
        RecordId(uuid::Uuid::new_v4().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn uuid_generator_yields_distinct_ids() {
        let gen = UuidGenerator;
        let ids: HashSet<RecordId> = (0..1000).map(|_| gen.next_id()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = ExternalId::new("ext123");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"ext123\"");
        let back: ExternalId = serde_json::from_str("\"ext123\"").unwrap();
        assert_eq!(back, id);
    }
}
