use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use placar_images::{ProxyOutcome, ProxyRequest};
use serde::Deserialize;

use crate::PlacarState;

pub const PROXY_CACHE_CONTROL: &str = "public, max-age=86400, s-maxage=86400";

#[derive(Debug, Default, Deserialize)]
pub struct ProxyQuery {
    pub url: Option<String>,
    pub file: Option<String>,
    pub category: Option<String>,
}

/// `GET /api/image-proxy?url=..|file=..[&category=..]`
///
/// Errors are plain text, unlike the JSON errors of the other routes.
pub async fn image_proxy(State(state): State<PlacarState>, Query(query): Query<ProxyQuery>) -> Response {
    let request = ProxyRequest::from_params(
        query.url.as_deref(),
        query.file.as_deref(),
        query.category.as_deref(),
    );

    match state.proxy.handle(request).await {
        ProxyOutcome::Redirect(location) => (StatusCode::FOUND, [(header::LOCATION, location)]).into_response(),
        ProxyOutcome::Stream(image) => {
            let mut response = (
                [
                    (header::CONTENT_TYPE, image.content_type),
                    (header::CACHE_CONTROL, PROXY_CACHE_CONTROL.to_string()),
                    (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*".to_string()),
                ],
                Body::from_stream(image.body),
            )
                .into_response();
            if let Some(length) = image.content_length {
                response.headers_mut().insert(header::CONTENT_LENGTH, length.into());
            }
            response
        }
        ProxyOutcome::BadRequest(message) => (StatusCode::BAD_REQUEST, message).into_response(),
        ProxyOutcome::NotFound(message) => (StatusCode::NOT_FOUND, message).into_response(),
        ProxyOutcome::Failed(message) => (StatusCode::INTERNAL_SERVER_ERROR, message).into_response(),
    }
}
