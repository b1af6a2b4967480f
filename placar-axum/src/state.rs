use std::sync::Arc;

use placar_blob::{BlobAdapter, CredentialReport};
use placar_images::{Classifier, ImageProxy, JobRegistry, Migrator};

/// Everything the handlers need, built once at startup and injected.
#[derive(Clone)]
pub struct PlacarState {
    pub proxy: Arc<ImageProxy>,
    pub migrator: Arc<Migrator>,
    pub blobs: BlobAdapter,
    pub classifier: Classifier,
    /// Computed at startup; never contains secret values.
    pub credentials: CredentialReport,
    pub jobs: JobRegistry,
}

impl PlacarState {
    pub fn new(
        proxy: ImageProxy,
        migrator: Migrator,
        blobs: BlobAdapter,
        credentials: CredentialReport,
    ) -> Self {
        let classifier = Classifier::for_layout(blobs.layout());
        Self {
            proxy: Arc::new(proxy),
            migrator: Arc::new(migrator),
            blobs,
            classifier,
            credentials,
            jobs: JobRegistry::new(),
        }
    }
}
