use std::fmt;

use placar_blob::BlobPut;
use placar_core::{EntityKind, ImageRecord};
use serde::Serialize;
use tracing::{info, warn};

use super::Migrator;
use crate::naming::{unique_object_name, upload_content_type};
use crate::{FetchedBytes, ImageRef};

/// Where a record is in its migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStage {
    Pending,
    Fetching,
    Uploading,
    Persisting,
    Done,
    Skipped,
}

impl RecordStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStage::Pending => "pending",
            RecordStage::Fetching => "fetching",
            RecordStage::Uploading => "uploading",
            RecordStage::Persisting => "persisting",
            RecordStage::Done => "done",
            RecordStage::Skipped => "skipped",
        }
    }
}

impl fmt::Display for RecordStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Field now points at `url`.
    Migrated { url: String },
    /// Not a legacy reference; field untouched.
    Skipped,
    /// Field untouched. `stage` is where it went wrong.
    Failed { stage: RecordStage, reason: String },
}

impl RecordOutcome {
    pub fn stage(&self) -> RecordStage {
        match self {
            RecordOutcome::Migrated { .. } => RecordStage::Done,
            RecordOutcome::Skipped => RecordStage::Skipped,
            RecordOutcome::Failed { stage, .. } => *stage,
        }
    }
}

enum Step {
    Pending,
    Fetching { url: String, filename: String },
    Uploading { filename: String, fetched: FetchedBytes },
    Persisting { url: String, key: String },
    Finished(RecordOutcome),
}

impl Step {
    fn failed(stage: RecordStage, reason: impl ToString) -> Self {
        Step::Finished(RecordOutcome::Failed {
            stage,
            reason: reason.to_string(),
        })
    }
}

impl Migrator {
    /// Move one record's image into the object store.
    pub async fn migrate_record(&self, kind: EntityKind, record: &ImageRecord) -> RecordOutcome {
        let mut step = Step::Pending;
        loop {
            step = match step {
                Step::Pending => self.plan(record),
                Step::Fetching { url, filename } => {
                    info!(kind = %kind, id = %record.id, url = %url, "fetching legacy image");
                    match self.source.fetch(&url, self.blobs.max_blob_bytes()).await {
                        Ok(fetched) => Step::Uploading { filename, fetched },
                        Err(err) => Step::failed(RecordStage::Fetching, err),
                    }
                }
                Step::Uploading { filename, fetched } => {
                    let name = unique_object_name(&filename, kind, &record.id);
                    let content_type = upload_content_type(fetched.content_type.as_deref(), &filename);
                    let put = BlobPut::new(kind.category(), name).with_content_type(content_type);
                    match self.blobs.upload(put, fetched.data).await {
                        Ok(receipt) => Step::Persisting {
                            url: receipt.url,
                            key: receipt.key,
                        },
                        Err(err) => Step::failed(RecordStage::Uploading, err),
                    }
                }
                Step::Persisting { url, key } => match self.records.set_image(kind, &record.id, &url).await {
                    Ok(()) => {
                        info!(kind = %kind, id = %record.id, url = %url, "record migrated");
                        Step::Finished(RecordOutcome::Migrated { url })
                    }
                    Err(err) => {
                        warn!(kind = %kind, id = %record.id, key = %key, "uploaded object left unreferenced");
                        Step::failed(RecordStage::Persisting, err)
                    }
                },
                Step::Finished(outcome) => {
                    if let RecordOutcome::Failed { stage, reason } = &outcome {
                        warn!(kind = %kind, id = %record.id, stage = %stage, reason = %reason, "record migration failed");
                    }
                    return outcome;
                }
            };
        }
    }

    /// Only legacy references are touched, which makes reruns no-ops.
    fn plan(&self, record: &ImageRecord) -> Step {
        let Some(image) = record.image.as_deref() else {
            return Step::Finished(RecordOutcome::Skipped);
        };
        match self.classifier.parse(image) {
            ImageRef::Legacy(legacy) => match legacy.key {
                Some(key) => Step::Fetching {
                    url: legacy.url,
                    filename: key.filename,
                },
                None => Step::failed(
                    RecordStage::Pending,
                    format!("Cannot derive a filename from {}", legacy.url),
                ),
            },
            _ => Step::Finished(RecordOutcome::Skipped),
        }
    }
}
