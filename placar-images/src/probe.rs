use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::http::{authorize, is_absolute};
use crate::{HttpSettings, LegacySource};

/// Header-only reachability check: is this URL publicly fetchable right now?
#[async_trait]
pub trait LivenessProbe: Send + Sync {
    /// Single attempt. Any failure, including a timeout, is "not live".
    async fn is_live(&self, url: &str) -> bool;
}

/// `HEAD` request bounded by the probe timeout.
pub struct HttpProbe {
    client: Client,
    settings: HttpSettings,
    legacy: LegacySource,
}

impl HttpProbe {
    pub fn new(settings: HttpSettings, legacy: LegacySource) -> reqwest::Result<Self> {
        Ok(Self {
            client: settings.client()?,
            settings,
            legacy,
        })
    }
}

#[async_trait]
impl LivenessProbe for HttpProbe {
    async fn is_live(&self, url: &str) -> bool {
        if !is_absolute(url) {
            return false;
        }

        let request = self.client.head(url).timeout(self.settings.probe_timeout);
        match authorize(request, url, &self.legacy).send().await {
            Ok(response) => {
                let live = response.status().is_success();
                debug!(url, status = response.status().as_u16(), live, "liveness probe");
                live
            }
            Err(err) => {
                debug!(url, error = %err, timeout = err.is_timeout(), "liveness probe failed");
                false
            }
        }
    }
}
