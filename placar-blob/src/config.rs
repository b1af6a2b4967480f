use placar_core::{Category, PlacarConfigSnapshot};
use serde::Serialize;

/// Bucket prefix for team banners. Differs from the legacy `banners-duplas` folder
/// and must stay that way: stored URLs depend on it.
pub const BUCKET_BANNER_PREFIX: &str = "banners_dupla/";

/// Bucket prefix for shop items.
pub const BUCKET_ITEM_PREFIX: &str = "itens/";

/// Host suffix shared by every S3 URL shape.
pub const S3_HOST_SUFFIX: &str = "amazonaws.com";

pub const DEFAULT_REGION: &str = "us-east-1";

/// Where objects live inside the bucket and how their public URLs look.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageLayout {
    pub bucket: String,
    pub region: String,
    pub banner_prefix: String,
    pub item_prefix: String,
    /// Overrides `https://{bucket}.s3.amazonaws.com` (CDN or S3-compatible store).
    pub public_base_url: Option<String>,
}

impl StorageLayout {
    pub fn new<S: Into<String>>(bucket: S) -> Self {
        Self {
            bucket: bucket.into(),
            region: DEFAULT_REGION.to_string(),
            banner_prefix: BUCKET_BANNER_PREFIX.to_string(),
            item_prefix: BUCKET_ITEM_PREFIX.to_string(),
            public_base_url: None,
        }
    }

    pub fn from_config(config: &PlacarConfigSnapshot) -> Self {
        let mut layout = Self::new(config.get_or("s3.bucket", ""));
        layout.region = config.get_or("s3.region", DEFAULT_REGION);
        if let Some(prefix) = config.get("s3.prefix.banner") {
            layout.banner_prefix = normalize_prefix(prefix);
        }
        if let Some(prefix) = config.get("s3.prefix.item") {
            layout.item_prefix = normalize_prefix(prefix);
        }
        layout.public_base_url = config
            .get("s3.public_base_url")
            .map(|url| url.trim_end_matches('/').to_string());
        layout
    }

    pub fn with_region<S: Into<String>>(mut self, region: S) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_prefixes(mut self, banner: &str, item: &str) -> Self {
        self.banner_prefix = normalize_prefix(banner);
        self.item_prefix = normalize_prefix(item);
        self
    }

    pub fn with_public_base_url<S: Into<String>>(mut self, url: S) -> Self {
        self.public_base_url = Some(url.into().trim_end_matches('/').to_string());
        self
    }

    pub fn prefix(&self, category: Category) -> &str {
        match category {
            Category::Banner => &self.banner_prefix,
            Category::Item => &self.item_prefix,
        }
    }

    pub fn object_key(&self, category: Category, filename: &str) -> String {
        format!("{}{}", self.prefix(category), filename)
    }

    /// Category owning a key, judged by its prefix.
    pub fn category_of_key(&self, key: &str) -> Option<Category> {
        if key.starts_with(&self.banner_prefix) {
            Some(Category::Banner)
        } else if key.starts_with(&self.item_prefix) {
            Some(Category::Item)
        } else {
            None
        }
    }

    /// Base every public object URL starts with.
    pub fn public_base(&self) -> String {
        match &self.public_base_url {
            Some(base) => base.clone(),
            None => format!("https://{}.s3.{}", self.bucket, S3_HOST_SUFFIX),
        }
    }

    pub fn public_url(&self, key: &str) -> String {
        let encoded: Vec<String> = key
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        format!("{}/{}", self.public_base(), encoded.join("/"))
    }

    pub fn is_configured(&self) -> bool {
        !self.bucket.trim().is_empty()
    }
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}/")
    }
}

/// Connection settings for the S3 client.
#[derive(Clone, Default)]
pub struct S3Config {
    pub bucket: Option<String>,
    pub region: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub endpoint_url: Option<String>,
}

impl std::fmt::Debug for S3Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Config")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id.as_ref().map(|_| "<set>"))
            .field("secret_access_key", &self.secret_access_key.as_ref().map(|_| "<set>"))
            .field("endpoint_url", &self.endpoint_url)
            .finish()
    }
}

impl S3Config {
    pub fn from_config(config: &PlacarConfigSnapshot) -> Self {
        Self {
            bucket: config.get_string("s3.bucket"),
            region: config.get_string("s3.region"),
            access_key_id: config.get_string("s3.access_key_id"),
            secret_access_key: config.get_string("s3.secret_access_key"),
            endpoint_url: config.get_string("s3.endpoint_url"),
        }
    }

    pub fn region(&self) -> &str {
        self.region.as_deref().unwrap_or(DEFAULT_REGION)
    }

    pub fn has_static_credentials(&self) -> bool {
        self.access_key_id.is_some() && self.secret_access_key.is_some()
    }

    /// Report which pieces are present. Never includes secret values.
    pub fn diagnostics(&self) -> CredentialReport {
        let mut missing = Vec::new();
        if self.bucket.is_none() {
            missing.push("s3.bucket");
        }
        if self.access_key_id.is_none() {
            missing.push("s3.access_key_id");
        }
        if self.secret_access_key.is_none() {
            missing.push("s3.secret_access_key");
        }

        CredentialReport {
            bucket_configured: self.bucket.is_some(),
            region: self.region().to_string(),
            region_configured: self.region.is_some(),
            access_key_id_configured: self.access_key_id.is_some(),
            secret_access_key_configured: self.secret_access_key.is_some(),
            endpoint_url: self.endpoint_url.clone(),
            ready: missing.is_empty(),
            missing,
        }
    }
}

/// Outcome of the credential check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialReport {
    pub bucket_configured: bool,
    pub region: String,
    pub region_configured: bool,
    pub access_key_id_configured: bool,
    pub secret_access_key_configured: bool,
    pub endpoint_url: Option<String>,
    pub missing: Vec<&'static str>,
    pub ready: bool,
}
