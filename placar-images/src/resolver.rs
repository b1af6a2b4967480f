use std::sync::Arc;

use placar_blob::BlobAdapter;
use placar_core::Category;
use serde::Serialize;
use tracing::{debug, warn};

use crate::derive::category_for_folder;
use crate::{Classifier, ImageRef, LegacySource, LivenessProbe, ObjectRef};

/// Where a resolved URL points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    ObjectStore,
    LegacyFallback,
    PassThrough,
}

/// What the resolver knows about the URL's reachability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStatus {
    /// Exists in the store and answered the liveness probe.
    Verified,
    /// Probed and failed, with nothing better to offer.
    Unreachable,
    /// Returned without probing.
    Unchecked,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub url: String,
    pub source: ResolutionSource,
    pub status: ResolutionStatus,
}

impl Resolution {
    fn new(url: impl Into<String>, source: ResolutionSource, status: ResolutionStatus) -> Self {
        Self {
            url: url.into(),
            source,
            status,
        }
    }
}

/// Turns a filename or a stored reference into the best URL available right now.
///
/// The object store is preferred; the legacy URL is the optimistic fallback and
/// is never probed here.
pub struct Resolver {
    blobs: BlobAdapter,
    legacy: LegacySource,
    probe: Arc<dyn LivenessProbe>,
    classifier: Classifier,
}

impl Resolver {
    pub fn new(blobs: BlobAdapter, legacy: LegacySource, probe: Arc<dyn LivenessProbe>) -> Self {
        let classifier = Classifier::for_layout(blobs.layout());
        Self {
            blobs,
            legacy,
            probe,
            classifier,
        }
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn legacy(&self) -> &LegacySource {
        &self.legacy
    }

    pub fn blobs(&self) -> &BlobAdapter {
        &self.blobs
    }

    /// Category of a bare filename: explicit hint, then a known folder in the
    /// path, then the text heuristic.
    pub fn category_for(file: &str, hint: Option<Category>) -> Category {
        if let Some(category) = hint {
            return category;
        }
        let folder = file.trim_matches('/').rsplit_once('/').map(|(dir, _)| dir);
        folder
            .and_then(|dir| dir.rsplit('/').next())
            .and_then(category_for_folder)
            .unwrap_or_else(|| Category::infer(file))
    }

    /// Resolve a bare filename. Both the metadata check and the liveness probe
    /// must pass for the object-store URL to win.
    pub async fn resolve_file(&self, file: &str, hint: Option<Category>) -> Resolution {
        let category = Self::category_for(file, hint);
        let filename = file.trim().rsplit('/').next().unwrap_or_default();
        let key = self.blobs.layout().object_key(category, filename);

        if self.object_exists(&key).await {
            let url = self.blobs.public_url(&key);
            if self.probe.is_live(&url).await {
                return Resolution::new(url, ResolutionSource::ObjectStore, ResolutionStatus::Verified);
            }
            debug!(key = %key, "object exists but is not publicly reachable yet");
        }

        Resolution::new(
            self.legacy.url_for(category, filename),
            ResolutionSource::LegacyFallback,
            ResolutionStatus::Unchecked,
        )
    }

    /// Resolve a stored reference.
    pub async fn resolve_reference(&self, reference: &str) -> Resolution {
        match self.classifier.parse(reference) {
            ImageRef::ObjectStore(object) => {
                if self.probe.is_live(&object.url).await {
                    return Resolution::new(object.url, ResolutionSource::ObjectStore, ResolutionStatus::Verified);
                }
                match self.legacy_fallback(&object) {
                    Some(url) => Resolution::new(url, ResolutionSource::LegacyFallback, ResolutionStatus::Unchecked),
                    None => Resolution::new(object.url, ResolutionSource::ObjectStore, ResolutionStatus::Unreachable),
                }
            }
            ImageRef::Legacy(legacy) => {
                Resolution::new(legacy.url, ResolutionSource::PassThrough, ResolutionStatus::Unchecked)
            }
            ImageRef::Local(local) if self.legacy.is_configured() => Resolution::new(
                self.legacy.url_for_path(&local.path),
                ResolutionSource::LegacyFallback,
                ResolutionStatus::Unchecked,
            ),
            other => Resolution::new(other.raw(), ResolutionSource::PassThrough, ResolutionStatus::Unchecked),
        }
    }

    /// Legacy URL of an object-store reference: reverse of the prefix mapping.
    pub fn legacy_fallback(&self, object: &ObjectRef) -> Option<String> {
        let key = object.key.as_ref()?;
        let category = object
            .object_key
            .as_deref()
            .and_then(|object_key| self.blobs.layout().category_of_key(object_key))
            .or(key.category)?;
        Some(self.legacy.url_for(category, &key.filename))
    }

    /// [`Resolver::legacy_fallback`] for a URL that may not be object-store at all.
    pub fn legacy_fallback_for_url(&self, url: &str) -> Option<String> {
        match self.classifier.parse(url) {
            ImageRef::ObjectStore(object) => self.legacy_fallback(&object),
            _ => None,
        }
    }

    pub async fn is_live(&self, url: &str) -> bool {
        self.probe.is_live(url).await
    }

    async fn object_exists(&self, key: &str) -> bool {
        match self.blobs.exists(key).await {
            Ok(exists) => exists,
            Err(err) => {
                warn!(key, error = %err, "object metadata check failed, treating as absent");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_from_hint_folder_or_text() {
        assert_eq!(Resolver::category_for("chest.png", Some(Category::Item)), Category::Item);
        assert_eq!(Resolver::category_for("itens/x.png", None), Category::Item);
        assert_eq!(Resolver::category_for("public/banners-duplas/x.png", None), Category::Banner);
        assert_eq!(Resolver::category_for("joao-e-maria_banner.png", None), Category::Banner);
        assert_eq!(Resolver::category_for("loja_espada.png", None), Category::Item);
        assert_eq!(Resolver::category_for("x.png", None), Category::Banner);
    }
}
