//! Nullable id generator: sequential, predictable record ids.

use kyc_types::{IdGenerator, RecordId};
use std::sync::atomic::{AtomicU64, Ordering};

/// Hands out `rec-1`, `rec-2`, ... in call order.
pub struct NullIdGenerator {
    prefix: String,
    next: AtomicU64,
}

impl NullIdGenerator {
    pub fn new() -> Self {
        Self::with_prefix("rec")
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl Default for NullIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for NullIdGenerator {
    fn next_id(&self) -> RecordId {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        RecordId::new(format!("{}-{}", self.prefix, n))
    }
}
