//! URL classification and the tagged [`ImageRef`] produced from it.
//!
//! Stored records carry plain strings. They are classified once, here, by host
//! fragment, and the resulting variant is threaded through resolution and
//! migration instead of re-inspecting the string at every step.

use std::fmt;

use placar_blob::{StorageLayout, S3_HOST_SUFFIX};
use serde::Serialize;

use crate::derive::{decode, derive_key, local_path, strip_suffixes, url_path, DerivedKey};
use crate::LEGACY_RAW_HOST;

/// Backend a reference belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    ObjectStore,
    Legacy,
    Local,
    Unknown,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::ObjectStore => "object_store",
            Backend::Legacy => "legacy",
            Backend::Local => "local",
            Backend::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A path served from the app's own `public/` folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalRef {
    pub raw: String,
    /// Path relative to `public/`.
    pub path: String,
    pub key: Option<DerivedKey>,
}

/// A raw-content URL on the legacy host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyRef {
    pub url: String,
    pub key: Option<DerivedKey>,
}

/// An object-store URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    pub url: String,
    /// Bucket named by the URL, when its shape reveals one.
    pub bucket: Option<String>,
    /// Decoded object key.
    pub object_key: Option<String>,
    pub key: Option<DerivedKey>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    Local(LocalRef),
    Legacy(LegacyRef),
    ObjectStore(ObjectRef),
    /// Blank, `data:` or foreign URLs. Treated as final and passed through.
    Unknown(String),
}

impl ImageRef {
    pub fn backend(&self) -> Backend {
        match self {
            ImageRef::Local(_) => Backend::Local,
            ImageRef::Legacy(_) => Backend::Legacy,
            ImageRef::ObjectStore(_) => Backend::ObjectStore,
            ImageRef::Unknown(_) => Backend::Unknown,
        }
    }

    /// The string as it was stored.
    pub fn raw(&self) -> &str {
        match self {
            ImageRef::Local(local) => &local.raw,
            ImageRef::Legacy(legacy) => &legacy.url,
            ImageRef::ObjectStore(object) => &object.url,
            ImageRef::Unknown(raw) => raw,
        }
    }

    pub fn key(&self) -> Option<&DerivedKey> {
        match self {
            ImageRef::Local(local) => local.key.as_ref(),
            ImageRef::Legacy(legacy) => legacy.key.as_ref(),
            ImageRef::ObjectStore(object) => object.key.as_ref(),
            ImageRef::Unknown(_) => None,
        }
    }

    pub fn filename(&self) -> Option<&str> {
        self.key().map(|key| key.filename.as_str())
    }
}

/// Pure, total classifier over host fragments.
#[derive(Debug, Clone)]
pub struct Classifier {
    object_store_fragments: Vec<String>,
    legacy_fragments: Vec<String>,
    /// Public base URLs whose remainder is an object key.
    public_bases: Vec<String>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            object_store_fragments: vec![S3_HOST_SUFFIX.to_string()],
            legacy_fragments: vec![LEGACY_RAW_HOST.to_string()],
            public_bases: Vec::new(),
        }
    }
}

impl Classifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also recognize the layout's public base (CDN or S3-compatible host).
    pub fn for_layout(layout: &StorageLayout) -> Self {
        let mut classifier = Self::default();
        if let Some(base) = &layout.public_base_url {
            classifier = classifier.with_public_base(base);
        }
        classifier
    }

    pub fn with_public_base(mut self, base: &str) -> Self {
        let base = base.trim().trim_end_matches('/');
        if let Some(host) = host_of(base) {
            let host = host.to_lowercase();
            if !host.is_empty() && !self.object_store_fragments.contains(&host) {
                self.object_store_fragments.push(host);
            }
            self.public_bases.push(base.to_lowercase());
        }
        self
    }

    /// Object-store fragments are checked first, so a string matching both
    /// kinds is an object-store reference.
    pub fn classify(&self, reference: &str) -> Backend {
        let trimmed = reference.trim();
        if trimmed.is_empty() {
            return Backend::Unknown;
        }

        let lower = trimmed.to_lowercase();
        if self.object_store_fragments.iter().any(|f| lower.contains(f.as_str())) {
            return Backend::ObjectStore;
        }
        if self.legacy_fragments.iter().any(|f| lower.contains(f.as_str())) {
            return Backend::Legacy;
        }
        if lower.starts_with("data:") || lower.starts_with("//") || lower.contains("://") {
            return Backend::Unknown;
        }
        Backend::Local
    }

    pub fn parse(&self, reference: &str) -> ImageRef {
        let backend = self.classify(reference);
        let trimmed = reference.trim();
        let key = derive_key(trimmed, backend);

        match backend {
            Backend::Local => ImageRef::Local(LocalRef {
                raw: trimmed.to_string(),
                path: local_path(trimmed).to_string(),
                key,
            }),
            Backend::Legacy => ImageRef::Legacy(LegacyRef {
                url: trimmed.to_string(),
                key,
            }),
            Backend::ObjectStore => {
                let (bucket, object_key) = self.split_object_url(trimmed);
                ImageRef::ObjectStore(ObjectRef {
                    url: trimmed.to_string(),
                    bucket,
                    object_key,
                    key,
                })
            }
            Backend::Unknown => ImageRef::Unknown(reference.to_string()),
        }
    }

    /// Bucket and key of an object-store URL in any of its shapes:
    /// configured public base, `{bucket}.s3[.{region}].amazonaws.com/{key}` or
    /// `s3[.{region}].amazonaws.com/{bucket}/{key}`.
    fn split_object_url(&self, url: &str) -> (Option<String>, Option<String>) {
        let lower = url.to_lowercase();
        let clean = strip_suffixes(url);
        for base in &self.public_bases {
            if lower.starts_with(base.as_str()) {
                let rest = clean.get(base.len()..).unwrap_or("").trim_start_matches('/');
                return (None, decode_key(rest));
            }
        }

        let host = host_of(clean).unwrap_or("").to_lowercase();
        let path = url_path(clean);

        if host.starts_with("s3.") || host.starts_with("s3-") {
            let (bucket, key) = match path.split_once('/') {
                Some((bucket, key)) => (bucket, key),
                None => (path, ""),
            };
            let bucket = (!bucket.is_empty()).then(|| bucket.to_string());
            return (bucket, decode_key(key));
        }

        let bucket = [".s3.", ".s3-"]
            .iter()
            .find_map(|marker| host.find(marker))
            .map(|index| host[..index].to_string());
        (bucket, decode_key(path))
    }
}

fn decode_key(path: &str) -> Option<String> {
    if path.is_empty() {
        return None;
    }
    let decoded: Vec<String> = path.split('/').map(decode).collect();
    Some(decoded.join("/"))
}

fn host_of(url: &str) -> Option<&str> {
    let index = url.find("://")?;
    let rest = &url[index + 3..];
    let end = rest.find('/').unwrap_or(rest.len());
    Some(&rest[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use placar_core::Category;

    #[test]
    fn classifies_by_host_fragment() {
        let classifier = Classifier::new();
        assert_eq!(classifier.classify("https://placar.s3.amazonaws.com/itens/a.png"), Backend::ObjectStore);
        assert_eq!(
            classifier.classify("https://raw.githubusercontent.com/o/r/main/public/itens/a.png"),
            Backend::Legacy
        );
        assert_eq!(classifier.classify("/itens/a.png"), Backend::Local);
        assert_eq!(classifier.classify("banner.png"), Backend::Local);
        assert_eq!(classifier.classify("https://example.com/a.png"), Backend::Unknown);
        assert_eq!(classifier.classify("data:image/png;base64,AAAA"), Backend::Unknown);
        assert_eq!(classifier.classify("   "), Backend::Unknown);
    }

    #[test]
    fn object_store_wins_when_both_match() {
        let classifier = Classifier::new();
        let both = "https://raw.githubusercontent.com/o/r/main/public/mirror/amazonaws.com/a.png";
        assert_eq!(classifier.classify(both), Backend::ObjectStore);
    }

    #[test]
    fn parses_virtual_host_urls() {
        let parsed = Classifier::new().parse("https://placar.s3.sa-east-1.amazonaws.com/itens/chest.png");
        let ImageRef::ObjectStore(object) = parsed else {
            panic!("expected object-store reference");
        };
        assert_eq!(object.bucket.as_deref(), Some("placar"));
        assert_eq!(object.object_key.as_deref(), Some("itens/chest.png"));
        assert_eq!(object.key.unwrap().category, Some(Category::Item));
    }

    #[test]
    fn parses_path_style_urls() {
        let parsed = Classifier::new().parse("https://s3.amazonaws.com/placar/banners_dupla/ana%20e%20bia.png");
        let ImageRef::ObjectStore(object) = parsed else {
            panic!("expected object-store reference");
        };
        assert_eq!(object.bucket.as_deref(), Some("placar"));
        assert_eq!(object.object_key.as_deref(), Some("banners_dupla/ana e bia.png"));
    }

    #[test]
    fn public_base_is_an_object_store() {
        let layout = StorageLayout::new("placar").with_public_base_url("https://cdn.placar.app/media");
        let classifier = Classifier::for_layout(&layout);
        let parsed = classifier.parse("https://cdn.placar.app/media/itens/chest.png");

        assert_eq!(parsed.backend(), Backend::ObjectStore);
        let ImageRef::ObjectStore(object) = parsed else {
            panic!("expected object-store reference");
        };
        assert_eq!(object.object_key.as_deref(), Some("itens/chest.png"));
        assert_eq!(object.bucket, None);
    }

    #[test]
    fn local_refs_keep_public_relative_path() {
        let parsed = Classifier::new().parse("/public/banners-duplas/ana.png");
        let ImageRef::Local(local) = &parsed else {
            panic!("expected local reference");
        };
        assert_eq!(local.path, "banners-duplas/ana.png");
        assert_eq!(parsed.filename(), Some("ana.png"));
    }

    #[test]
    fn unknown_keeps_raw_string() {
        let parsed = Classifier::new().parse("https://example.com/a.png");
        assert_eq!(parsed, ImageRef::Unknown("https://example.com/a.png".into()));
        assert_eq!(parsed.key(), None);
    }
}
