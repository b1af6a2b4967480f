use std::sync::Arc;

use placar_core::EntityKind;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use super::{JobGuard, MigrationEvent, MigrationReport, MigrationResult, Migrator, RecordOutcome};

const EVENT_BUFFER: usize = 64;

impl Migrator {
    /// Bulk job: migrate everything, then report once.
    #[instrument(skip_all)]
    pub async fn migrate_all(&self, cancel: &CancellationToken) -> MigrationResult<MigrationReport> {
        let report = self.run(cancel, None).await?;
        info!(
            migrated = report.total_migrated(),
            failed = report.total_failed(),
            cancelled = report.cancelled,
            "migration finished"
        );
        Ok(report)
    }

    /// Bulk job on its own task. Dropping the handle does not stop the work;
    /// the job stays registered until it finishes or is cancelled.
    pub fn spawn_all(self: &Arc<Self>, job: JobGuard) -> JoinHandle<MigrationResult<MigrationReport>> {
        let migrator = Arc::clone(self);
        tokio::spawn(async move {
            let result = migrator.migrate_all(job.token()).await;
            if let Err(err) = &result {
                error!(job_id = job.id(), error = %err, "migration aborted");
            }
            result
        })
    }

    /// Streaming job: same work, reported as events in processing order. The
    /// stream ends with a `complete` event or a fatal `error` event.
    pub fn migrate_streaming(self: &Arc<Self>, job: JobGuard) -> ReceiverStream<MigrationEvent> {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let migrator = Arc::clone(self);

        tokio::spawn(async move {
            let last = match migrator.run(job.token(), Some(&tx)).await {
                Ok(report) => MigrationEvent::Complete {
                    message: summary(&report),
                    result: report,
                },
                Err(err) => {
                    error!(job_id = job.id(), error = %err, "migration aborted");
                    MigrationEvent::error(format!("Migration aborted: {err}"), true)
                }
            };
            let _ = tx.send(last).await;
            drop(job);
        });

        ReceiverStream::new(rx)
    }

    async fn run(
        &self,
        cancel: &CancellationToken,
        events: Option<&mpsc::Sender<MigrationEvent>>,
    ) -> MigrationResult<MigrationReport> {
        let mut report = MigrationReport::default();

        for kind in EntityKind::ALL {
            let records = self.list(kind).await?;
            let total = records.len();
            report.counts_mut(kind).total = total as u32;
            info!(kind = %kind, total, "migrating records");
            emit(events, MigrationEvent::log(format!("Found {total} {} records", noun(kind)))).await;

            if kind == EntityKind::TeamBanner && total == 0 {
                emit(events, MigrationEvent::progress(0, 0, "No teams to migrate")).await;
            }

            for (index, record) in records.iter().enumerate() {
                if cancel.is_cancelled() {
                    warn!(kind = %kind, processed = index, "migration cancelled");
                    report.cancelled = true;
                    emit(events, MigrationEvent::log("Migration cancelled")).await;
                    return Ok(report);
                }

                let outcome = self.migrate_record(kind, record).await;
                let counts = report.counts_mut(kind);
                match &outcome {
                    RecordOutcome::Migrated { url } => {
                        counts.attempted += 1;
                        counts.succeeded += 1;
                        emit(
                            events,
                            MigrationEvent::log(format!("Migrated {} -> {url}", record.display_name())),
                        )
                        .await;
                    }
                    RecordOutcome::Failed { stage, reason } => {
                        counts.attempted += 1;
                        counts.failed += 1;
                        emit(
                            events,
                            MigrationEvent::error(
                                format!("Failed to migrate {} ({stage}): {reason}", record.display_name()),
                                false,
                            ),
                        )
                        .await;
                    }
                    RecordOutcome::Skipped => {}
                }

                if kind == EntityKind::TeamBanner {
                    let processed = index + 1;
                    emit(
                        events,
                        MigrationEvent::progress(processed, total, format!("{processed}/{total} teams processed")),
                    )
                    .await;
                }
            }
        }

        Ok(report)
    }
}

/// A closed receiver only means nobody is watching; the job keeps going.
async fn emit(events: Option<&mpsc::Sender<MigrationEvent>>, event: MigrationEvent) {
    if let Some(tx) = events {
        let _ = tx.send(event).await;
    }
}

fn noun(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::TeamBanner => "team",
        EntityKind::ShopItem => "item",
    }
}

fn summary(report: &MigrationReport) -> String {
    let mut message = format!(
        "Migration complete: {} migrated, {} failed",
        report.total_migrated(),
        report.total_failed()
    );
    if report.cancelled {
        message.push_str(" (cancelled)");
    }
    message
}
