//! Wiring for the Placar image service: configuration in, [`PlacarApp`] out.

pub mod config;
pub mod firestore;

use std::sync::Arc;

use anyhow::{bail, Result};
use placar_axum::{PlacarApp, PlacarState};
use placar_blob::{BlobAdapter, BlobStore, DisabledStore, S3Config, S3Store, StorageLayout};
use placar_core::{MemoryRecordStore, PlacarConfig, PlacarConfigSnapshot, RecordStore};
use placar_images::{
    HttpImageSource, HttpProbe, HttpSettings, ImageProxy, ImageSource, LegacySource, Migrator, Resolver,
};
use tracing::{info, warn};

pub use firestore::{FirestoreRecordStore, FirestoreSettings};

/// Build from the process environment.
pub async fn build() -> Result<PlacarApp> {
    build_with(config::load()).await
}

/// Build from an explicit configuration. Missing defaults are filled in.
pub async fn build_with(mut config: PlacarConfig) -> Result<PlacarApp> {
    config::apply_defaults(&mut config);
    let snapshot = config.snapshot();

    let s3 = S3Config::from_config(&snapshot);
    let credentials = s3.diagnostics();
    let store: Arc<dyn BlobStore> = if s3.bucket.is_some() {
        Arc::new(S3Store::connect(&s3).await?)
    } else {
        warn!(missing = ?credentials.missing, "object store not configured, uploads are disabled");
        Arc::new(DisabledStore::new(&credentials.missing))
    };
    let blobs = BlobAdapter::from_arc(store, StorageLayout::from_config(&snapshot));

    let legacy = LegacySource::from_config(&snapshot);
    if !legacy.is_configured() {
        warn!("legacy.owner/legacy.repo not set, legacy fallbacks will be unusable");
    }

    let http = HttpSettings::from_config(&snapshot);
    let probe = Arc::new(HttpProbe::new(http.clone(), legacy.clone())?);
    let source: Arc<dyn ImageSource> = Arc::new(HttpImageSource::new(http, legacy.clone())?);
    let records = record_store(&snapshot)?;

    let resolver = Resolver::new(blobs.clone(), legacy, probe);
    let proxy = ImageProxy::new(Arc::new(resolver), source.clone());
    let migrator = Migrator::new(records, source, blobs.clone());

    info!(store = blobs.store_name(), ready = credentials.ready, "placar image service configured");
    Ok(PlacarApp::new(PlacarState::new(proxy, migrator, blobs, credentials)))
}

fn record_store(config: &PlacarConfigSnapshot) -> Result<Arc<dyn RecordStore>> {
    match config.get_or("records.backend", "firestore").as_str() {
        "firestore" => Ok(Arc::new(FirestoreRecordStore::from_config(config)?)),
        "memory" => {
            warn!("records.backend=memory, migrations will not persist");
            Ok(Arc::new(MemoryRecordStore::new()))
        }
        other => bail!("Unknown records.backend '{other}' (expected firestore or memory)"),
    }
}
