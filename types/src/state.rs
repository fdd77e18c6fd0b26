//! Review status enums for records and individual fields.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Overall review status of a KYC record.
///
/// A freshly created record has no status at all (`Option::None` on the
/// record) until its first data update moves it to [`KycStatus::InReview`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KycStatus {
    /// Data received by the service.
    Received,
    /// Data submitted and waiting for a reviewer.
    InReview,
    /// Approved by the reviewer.
    Approved,
    /// Rejected by the reviewer; the client is expected to resubmit.
    Rejected,
}

impl KycStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::InReview => "inreview",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for KycStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Review status of a single identity or certificate field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldStatus {
    /// Required but never uploaded (or the upload failed). The client re-uploads.
    Missing,
    /// Uploaded and waiting for review.
    Received,
    /// Accepted by the reviewer.
    Approved,
    /// Refused by the reviewer; a comment explains why and the client updates it.
    Rejected,
}

impl FieldStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Received => "received",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for FieldStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
