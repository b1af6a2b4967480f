//! Transport-agnostic image proxy.
//!
//! ```text
//! Resolving ─► Validating ─► Redirect
//!                 │   ▲
//!                 ▼   │ (once)
//!              Fallback ─► Fetching ─► Stream | NotFound | Failed
//! ```

use std::sync::Arc;

use placar_blob::ByteStream;
use placar_core::Category;
use tracing::{debug, instrument, warn};

use crate::derive::url_path;
use crate::naming::proxy_content_type;
use crate::{Backend, FetchError, ImageSource, ResolutionStatus, Resolver};

/// Inbound request, already parsed from the transport's parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyRequest {
    Url(String),
    File { name: String, category: Option<Category> },
}

impl ProxyRequest {
    /// `url` wins over `file`; blank values count as absent. `None` when
    /// neither is usable.
    pub fn from_params(url: Option<&str>, file: Option<&str>, category: Option<&str>) -> Option<Self> {
        if let Some(url) = present(url) {
            return Some(ProxyRequest::Url(url.to_string()));
        }
        present(file).map(|name| ProxyRequest::File {
            name: name.to_string(),
            category: category.and_then(Category::from_hint),
        })
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyState {
    Resolving,
    Validating { url: String, status: ResolutionStatus },
    Fallback { url: String },
    Fetching { url: String },
    Redirect { url: String },
}

impl ProxyState {
    pub fn name(&self) -> &'static str {
        match self {
            ProxyState::Resolving => "resolving",
            ProxyState::Validating { .. } => "validating",
            ProxyState::Fallback { .. } => "fallback",
            ProxyState::Fetching { .. } => "fetching",
            ProxyState::Redirect { .. } => "redirect",
        }
    }
}

/// Body to stream back to the client.
pub struct ProxiedImage {
    pub content_type: String,
    pub content_length: Option<u64>,
    pub body: ByteStream,
}

impl std::fmt::Debug for ProxiedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxiedImage")
            .field("content_type", &self.content_type)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub enum ProxyOutcome {
    Redirect(String),
    Stream(ProxiedImage),
    BadRequest(String),
    NotFound(String),
    Failed(String),
}

pub struct ImageProxy {
    resolver: Arc<Resolver>,
    source: Arc<dyn ImageSource>,
}

impl ImageProxy {
    pub fn new(resolver: Arc<Resolver>, source: Arc<dyn ImageSource>) -> Self {
        Self { resolver, source }
    }

    pub fn resolver(&self) -> &Arc<Resolver> {
        &self.resolver
    }

    #[instrument(skip(self))]
    pub async fn handle(&self, request: Option<ProxyRequest>) -> ProxyOutcome {
        let Some(request) = request else {
            return ProxyOutcome::BadRequest("Missing url or file parameter".to_string());
        };

        let mut state = ProxyState::Resolving;
        let mut fallback_tried = false;

        loop {
            debug!(state = state.name(), "proxy transition");
            state = match state {
                ProxyState::Resolving => {
                    let resolution = match &request {
                        ProxyRequest::Url(url) => self.resolver.resolve_reference(url).await,
                        ProxyRequest::File { name, category } => {
                            self.resolver.resolve_file(name, *category).await
                        }
                    };
                    match resolution.status {
                        ResolutionStatus::Verified => ProxyState::Redirect { url: resolution.url },
                        status => ProxyState::Validating {
                            url: resolution.url,
                            status,
                        },
                    }
                }
                ProxyState::Validating { url, status } => self.validate(url, status).await,
                ProxyState::Fallback { url } if !fallback_tried => {
                    fallback_tried = true;
                    match self.resolver.legacy_fallback_for_url(&url) {
                        Some(legacy) => ProxyState::Validating {
                            url: legacy,
                            status: ResolutionStatus::Unchecked,
                        },
                        None => ProxyState::Fetching { url },
                    }
                }
                ProxyState::Fallback { url } => ProxyState::Fetching { url },
                ProxyState::Fetching { url } => return self.fetch(&url).await,
                ProxyState::Redirect { url } => return ProxyOutcome::Redirect(url),
            };
        }
    }

    async fn validate(&self, url: String, status: ResolutionStatus) -> ProxyState {
        match self.resolver.classifier().classify(&url) {
            Backend::ObjectStore => {
                if status != ResolutionStatus::Unreachable && self.resolver.is_live(&url).await {
                    ProxyState::Redirect { url }
                } else {
                    ProxyState::Fallback { url }
                }
            }
            // The browser cannot send the token, so private sources are streamed.
            Backend::Legacy if self.resolver.legacy().has_token() => ProxyState::Fetching { url },
            Backend::Legacy => {
                if self.resolver.is_live(&url).await {
                    ProxyState::Redirect { url }
                } else {
                    ProxyState::Fetching { url }
                }
            }
            Backend::Local | Backend::Unknown => ProxyState::Fetching { url },
        }
    }

    async fn fetch(&self, url: &str) -> ProxyOutcome {
        match self.source.open(url).await {
            Ok(image) => {
                let filename = url_path(url).rsplit('/').next();
                ProxyOutcome::Stream(ProxiedImage {
                    content_type: proxy_content_type(image.content_type.as_deref(), filename),
                    content_length: image.content_length,
                    body: image.body,
                })
            }
            Err(err @ (FetchError::Status { .. } | FetchError::InvalidUrl(_))) => {
                debug!(url, error = %err, "upstream has no such image");
                ProxyOutcome::NotFound("Image not found".to_string())
            }
            Err(err) => {
                warn!(url, error = %err, "image fetch failed");
                ProxyOutcome::Failed("Failed to fetch image".to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_param_wins() {
        let request = ProxyRequest::from_params(Some(" https://a/b.png "), Some("c.png"), None);
        assert_eq!(request, Some(ProxyRequest::Url("https://a/b.png".into())));
    }

    #[test]
    fn file_param_carries_category_hint() {
        let request = ProxyRequest::from_params(Some(""), Some("chest.png"), Some("itens"));
        assert_eq!(
            request,
            Some(ProxyRequest::File {
                name: "chest.png".into(),
                category: Some(Category::Item),
            })
        );
    }

    #[test]
    fn nothing_usable() {
        assert_eq!(ProxyRequest::from_params(None, Some("  "), Some("item")), None);
    }
}
