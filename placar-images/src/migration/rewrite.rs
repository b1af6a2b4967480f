use std::sync::Arc;

use placar_core::EntityKind;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use super::{JobGuard, MigrationResult, Migrator, RewriteReport};
use crate::ImageRef;

impl Migrator {
    /// Point every non-object-store reference at the object-store URL its
    /// filename would have. Nothing is fetched, uploaded or verified.
    #[instrument(skip_all)]
    pub async fn rewrite_urls(&self, cancel: &CancellationToken) -> MigrationResult<RewriteReport> {
        let mut report = RewriteReport::default();

        for kind in EntityKind::ALL {
            let records = self.list(kind).await?;
            report.counts_mut(kind).total = records.len() as u32;

            for record in &records {
                if cancel.is_cancelled() {
                    warn!(kind = %kind, "url rewrite cancelled");
                    report.cancelled = true;
                    return Ok(report);
                }

                let Some(url) = record.image.as_deref().and_then(|image| self.rewrite_target(kind, image)) else {
                    report.counts_mut(kind).skipped += 1;
                    continue;
                };

                match self.records.set_image(kind, &record.id, &url).await {
                    Ok(()) => {
                        info!(kind = %kind, id = %record.id, url = %url, "reference rewritten");
                        report.counts_mut(kind).updated += 1;
                    }
                    Err(err) => {
                        warn!(kind = %kind, id = %record.id, error = %err, "reference rewrite failed");
                        report.counts_mut(kind).failed += 1;
                    }
                }
            }
        }

        info!(updated = report.total_updated(), cancelled = report.cancelled, "url rewrite finished");
        Ok(report)
    }

    /// [`Migrator::rewrite_urls`] on its own task, independent of the caller.
    pub fn spawn_rewrite(self: &Arc<Self>, job: JobGuard) -> JoinHandle<MigrationResult<RewriteReport>> {
        let migrator = Arc::clone(self);
        tokio::spawn(async move {
            let result = migrator.rewrite_urls(job.token()).await;
            if let Err(err) = &result {
                error!(job_id = job.id(), error = %err, "url rewrite aborted");
            }
            result
        })
    }

    fn rewrite_target(&self, kind: EntityKind, image: &str) -> Option<String> {
        let parsed = self.classifier.parse(image);
        match parsed {
            ImageRef::Local(_) | ImageRef::Legacy(_) => {
                let filename = parsed.filename()?;
                let key = self.blobs.layout().object_key(kind.category(), filename);
                Some(self.blobs.public_url(&key))
            }
            ImageRef::ObjectStore(_) | ImageRef::Unknown(_) => None,
        }
    }
}
