//! # Configuration
//!
//! A minimal string key/value store. Typed settings (`StorageLayout`, `S3Config`,
//! `LegacySource`, ...) are built from a [`PlacarConfigSnapshot`] by the crates
//! that own them.
//!
//! ```rust
//! use placar_core::PlacarConfig;
//! let mut config = PlacarConfig::new();
//!
//! config.set("s3.bucket", "placar-imagens");
//! assert_eq!(config.get("s3.bucket"), Some("placar-imagens"));
//! ```
//!
//! ## Environment overlay
//! Variables carrying the prefix are lowered and `__` becomes `.`:
//!
//! ```bash
//! export PLACAR__S3__BUCKET=placar-imagens   # → s3.bucket
//! ```
//!
//! A few well-known names (`AWS_ACCESS_KEY_ID`, `GITHUB_TOKEN`, ...) are accepted
//! as aliases so existing deployments keep working.

use std::collections::HashMap;

/// Prefix of environment variables read by [`PlacarConfig::load_env`].
pub const ENV_PREFIX: &str = "PLACAR__";

/// Standard environment names mapped onto config keys.
const ENV_ALIASES: &[(&str, &str)] = &[
    ("AWS_ACCESS_KEY_ID", "s3.access_key_id"),
    ("AWS_SECRET_ACCESS_KEY", "s3.secret_access_key"),
    ("AWS_REGION", "s3.region"),
    ("AWS_S3_BUCKET_NAME", "s3.bucket"),
    ("GITHUB_TOKEN", "legacy.token"),
    ("HTTP_HOST", "http.host"),
    ("HTTP_PORT", "http.port"),
];

#[derive(Debug, Default, Clone)]
pub struct PlacarConfig {
    values: HashMap<String, String>,
}

impl PlacarConfig {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.insert(key.into(), value.into());
    }

    /// Set a key only when it is not already present.
    pub fn set_default<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.entry(key.into()).or_insert_with(|| value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Overlay the process environment. Aliases are applied first so an explicit
    /// `PLACAR__` variable always wins.
    pub fn load_env(&mut self) {
        self.load_vars(std::env::vars());
    }

    /// Overlay an arbitrary set of variables (the environment, a test fixture...).
    pub fn load_vars<I>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut prefixed = Vec::new();

        for (key, value) in vars {
            if value.trim().is_empty() {
                continue;
            }
            if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                let normalized = stripped.to_lowercase().replace("__", ".");
                prefixed.push((normalized, value));
            } else if let Some((_, target)) = ENV_ALIASES.iter().find(|(alias, _)| *alias == key) {
                self.set(*target, value);
            }
        }

        for (key, value) in prefixed {
            self.set(key, value);
        }
    }

    pub fn snapshot(&self) -> PlacarConfigSnapshot {
        PlacarConfigSnapshot::new(self.values.clone())
    }
}

/// Read-only view handed to the builders of typed settings.
#[derive(Debug, Clone, Default)]
pub struct PlacarConfigSnapshot {
    map: HashMap<String, String>,
}

impl PlacarConfigSnapshot {
    pub(crate) fn new(map: HashMap<String, String>) -> Self {
        Self { map }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map
            .get(key)
            .map(|s| s.as_str())
            .filter(|s| !s.trim().is_empty())
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get(key).map(str::to_string)
    }

    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or(default).to_string()
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.trim().parse::<u64>().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn prefixed_vars_are_normalized() {
        let mut config = PlacarConfig::new();
        config.load_vars(vars(&[("PLACAR__S3__PREFIX__BANNER", "b/"), ("UNRELATED", "x")]));
        assert_eq!(config.get("s3.prefix.banner"), Some("b/"));
        assert!(!config.has("unrelated"));
    }

    #[test]
    fn prefixed_vars_win_over_aliases() {
        let mut config = PlacarConfig::new();
        config.load_vars(vars(&[
            ("PLACAR__S3__REGION", "sa-east-1"),
            ("AWS_REGION", "us-east-1"),
        ]));
        assert_eq!(config.get("s3.region"), Some("sa-east-1"));
    }

    #[test]
    fn blank_values_are_ignored() {
        let mut config = PlacarConfig::new();
        config.set_default("s3.region", "us-east-1");
        config.load_vars(vars(&[("AWS_REGION", "  ")]));
        assert_eq!(config.snapshot().get("s3.region"), Some("us-east-1"));
    }

    #[test]
    fn typed_getters() {
        let mut config = PlacarConfig::new();
        config.set("probe.timeout_ms", "2500");
        let snap = config.snapshot();
        assert_eq!(snap.get_u64("probe.timeout_ms"), Some(2500));
        assert_eq!(snap.get_or("missing", "d"), "d");
    }
}
