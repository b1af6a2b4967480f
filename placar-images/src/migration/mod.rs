//! Migration of legacy-hosted images into the object store.
//!
//! All job shapes share one sequential loop: records are listed per kind and
//! handled one at a time, each going through
//! `Pending -> Fetching -> Uploading -> Persisting -> Done | Failed(stage)`
//! (or `Skipped` when the reference is not legacy). Per-record failures are
//! counted and never stop the run; only a failure to list records does.

use std::sync::Arc;

use placar_blob::BlobAdapter;
use placar_core::{EntityKind, RecordStore, RecordStoreError};
use thiserror::Error;

use crate::{Classifier, ImageSource};

mod bulk;
mod events;
mod record;
mod registry;
mod report;
mod rewrite;

pub use events::MigrationEvent;
pub use record::{RecordOutcome, RecordStage};
pub use registry::{JobGuard, JobRegistry};
pub use report::{MigrationCounts, MigrationReport, RewriteCounts, RewriteReport};

/// Job-level failure. Aborts the remaining work.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Failed to list {kind} records: {source}")]
    Listing {
        kind: EntityKind,
        #[source]
        source: RecordStoreError,
    },
}

pub type MigrationResult<T> = Result<T, MigrationError>;

pub struct Migrator {
    records: Arc<dyn RecordStore>,
    source: Arc<dyn ImageSource>,
    blobs: BlobAdapter,
    classifier: Classifier,
}

impl Migrator {
    pub fn new(records: Arc<dyn RecordStore>, source: Arc<dyn ImageSource>, blobs: BlobAdapter) -> Self {
        let classifier = Classifier::for_layout(blobs.layout());
        Self {
            records,
            source,
            blobs,
            classifier,
        }
    }

    async fn list(&self, kind: EntityKind) -> MigrationResult<Vec<placar_core::ImageRecord>> {
        self.records
            .list(kind)
            .await
            .map_err(|source| MigrationError::Listing { kind, source })
    }
}
