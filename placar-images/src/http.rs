use std::time::Duration;

use placar_core::PlacarConfigSnapshot;
use reqwest::{Client, RequestBuilder};

use crate::{LegacySource, LEGACY_RAW_HOST};

pub const DEFAULT_USER_AGENT: &str = "placar-image-proxy/1.0";
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 15_000;

/// Outbound HTTP settings shared by the probe and the fetcher.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub user_agent: String,
    pub probe_timeout: Duration,
    pub fetch_timeout: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            probe_timeout: Duration::from_millis(DEFAULT_PROBE_TIMEOUT_MS),
            fetch_timeout: Duration::from_millis(DEFAULT_FETCH_TIMEOUT_MS),
        }
    }
}

impl HttpSettings {
    pub fn from_config(config: &PlacarConfigSnapshot) -> Self {
        Self {
            user_agent: config.get_or("http.user_agent", DEFAULT_USER_AGENT),
            probe_timeout: Duration::from_millis(
                config.get_u64("probe.timeout_ms").unwrap_or(DEFAULT_PROBE_TIMEOUT_MS),
            ),
            fetch_timeout: Duration::from_millis(
                config.get_u64("fetch.timeout_ms").unwrap_or(DEFAULT_FETCH_TIMEOUT_MS),
            ),
        }
    }

    pub fn client(&self) -> reqwest::Result<Client> {
        Client::builder().user_agent(self.user_agent.clone()).build()
    }
}

/// Adds the legacy bearer token, and only for legacy hosts.
pub(crate) fn authorize(request: RequestBuilder, url: &str, legacy: &LegacySource) -> RequestBuilder {
    match legacy.token() {
        Some(token) if url.to_lowercase().contains(LEGACY_RAW_HOST) => request.bearer_auth(token),
        _ => request,
    }
}

pub(crate) fn is_absolute(url: &str) -> bool {
    let lower = url.trim_start().to_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
