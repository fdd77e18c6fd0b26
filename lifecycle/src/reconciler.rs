//! Field reconciliation: merges a submitted batch into a staged record.
//!
//! Text values are written straight into the staged field maps. File values
//! are written to the blob store on blocking worker threads, one task per
//! slug, and the batch joins on all of them. The staged record is handed back
//! only when every write succeeded, so a caller that commits it with a single
//! `save` never persists a half-applied batch.

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, warn};

use kyc_store::BlobStore;
use kyc_types::{ExternalId, FieldKind, FieldState, KycRecord};

use crate::error::KycError;
use crate::submission::{SubmittedField, Submission};

/// MIME type used when neither the extension nor the transport names one.
pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// Extension of an uploaded file name: the segment after the first `.` and
/// before any further `.`. Empty when the name has no `.`.
pub fn file_extension(original_name: &str) -> &str {
    original_name.split('.').nth(1).unwrap_or("")
}

/// Name under which an uploaded file is stored: `{externalId}_{slug}.{ext}`,
/// or `{externalId}_{slug}` when there is no extension.
pub fn stored_file_name(external_id: &ExternalId, slug: &str, extension: &str) -> String {
    if extension.is_empty() {
        format!("{external_id}_{slug}")
    } else {
        format!("{external_id}_{slug}.{extension}")
    }
}

/// MIME type recorded for an uploaded file.
///
/// Uploads are document images, so the extension decides (`image/{ext}`).
/// Without an extension the transport-supplied type is kept.
pub fn stored_mime_type(extension: &str, transport_mime: &str) -> String {
    if !extension.is_empty() {
        format!("image/{extension}")
    } else if !transport_mime.is_empty() {
        transport_mime.to_string()
    } else {
        FALLBACK_MIME_TYPE.to_string()
    }
}

/// Merges submitted fields into records, persisting file bytes on the way.
pub struct FieldReconciler {
    blobs: Arc<dyn BlobStore>,
}

impl FieldReconciler {
    pub fn new(blobs: Arc<dyn BlobStore>) -> Self {
        Self { blobs }
    }

    /// Apply `submission` to a copy of `record` and return the copy.
    ///
    /// Slugs absent from the submission keep their current state. If any file
    /// write fails the whole batch fails with [`KycError::Storage`] after every
    /// other write has finished; blobs written by sibling slugs stay in the
    /// blob store unreferenced.
    pub async fn reconcile(
        &self,
        record: &KycRecord,
        submission: Submission,
    ) -> Result<KycRecord, KycError> {
        let mut staged = record.clone();
        let mut uploads = JoinSet::new();

        for (slug, field) in submission {
            match field {
                SubmittedField::Text { value, kind } => {
                    staged.put_field(kind, FieldState::received_text(slug, value));
                }
                SubmittedField::File {
                    original_name,
                    mime_type,
                    bytes,
                } => {
                    let extension = file_extension(&original_name);
                    let name = stored_file_name(&record.external_id, &slug, extension);
                    let mime = stored_mime_type(extension, &mime_type);
                    let blobs = Arc::clone(&self.blobs);
                    uploads.spawn_blocking(move || {
                        let result = blobs.store(&name, &mime, &bytes);
                        (slug, name, result)
                    });
                }
            }
        }

        let mut failed = Vec::new();
        let mut first_error = None;
        while let Some(joined) = uploads.join_next().await {
            match joined {
                Ok((slug, name, Ok(blob))) => {
                    debug!(record = %record.id, %slug, %blob, %name, "file field stored");
                    staged.put_field(FieldKind::Identity, FieldState::received_file(slug, blob));
                }
                Ok((slug, name, Err(e))) => {
                    warn!(record = %record.id, %slug, %name, error = %e, "file field write failed");
                    first_error.get_or_insert_with(|| e.to_string());
                    failed.push(slug);
                }
                Err(e) => {
                    warn!(record = %record.id, error = %e, "file upload task aborted");
                    first_error.get_or_insert_with(|| e.to_string());
                    failed.push("<aborted upload>".to_string());
                }
            }
        }

        if !failed.is_empty() {
            failed.sort();
            return Err(KycError::Storage(format!(
                "could not store files for [{}]: {}",
                failed.join(", "),
                first_error.unwrap_or_default()
            )));
        }

        Ok(staged)
    }
}
