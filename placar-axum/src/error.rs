use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use placar_blob::BlobError;
use placar_core::PlacarError;
use placar_images::MigrationError;
use tracing::error;

#[derive(Debug)]
pub struct PlacarAxumError(pub anyhow::Error);

impl From<anyhow::Error> for PlacarAxumError {
    fn from(e: anyhow::Error) -> Self {
        Self(e)
    }
}

impl From<PlacarError> for PlacarAxumError {
    fn from(e: PlacarError) -> Self {
        Self(e.into_anyhow())
    }
}

impl From<BlobError> for PlacarAxumError {
    fn from(e: BlobError) -> Self {
        let placar = match &e {
            BlobError::NotFound { key } => PlacarError::not_found(format!("Object not found: {key}")),
            BlobError::Invalid { message } => PlacarError::bad_request(message.clone()),
            BlobError::TooLarge { .. } => PlacarError::unprocessable(e.to_string()),
            BlobError::NotConfigured { .. } => PlacarError::unavailable(e.to_string()),
            BlobError::Backend { .. } | BlobError::Io { .. } => PlacarError::bad_gateway("Object store request failed"),
        };
        placar.with_source(e.into()).into()
    }
}

impl From<MigrationError> for PlacarAxumError {
    fn from(e: MigrationError) -> Self {
        error!(error = %e, "migration job aborted");
        PlacarError::general_error(e.to_string()).with_source(e.into()).into()
    }
}

impl From<tokio::task::JoinError> for PlacarAxumError {
    fn from(e: tokio::task::JoinError) -> Self {
        error!(error = %e, "job task did not complete");
        PlacarError::general_error("Job task did not complete").with_source(e.into()).into()
    }
}

impl IntoResponse for PlacarAxumError {
    fn into_response(self) -> Response {
        // Keep status and fields when a PlacarError sits anywhere in the chain
        let placar = match PlacarError::find_in(&self.0) {
            Some(placar) => placar.sanitize_for_client(),
            None => PlacarError::general_error(self.0.to_string()),
        };
        let status = StatusCode::from_u16(placar.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(placar.to_json())).into_response()
    }
}
