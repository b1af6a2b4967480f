use axum::{
    body::Body,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use futures::StreamExt;
use placar_images::{MigrationEvent, MigrationReport, RewriteReport};
use serde_json::{json, Value};

use crate::{PlacarAxumError, PlacarState};

pub const NDJSON: &str = "application/x-ndjson";

/// `POST /api/migrate-images`: one summary once everything ran. Partial
/// failures are in the payload; the status stays 200. The job runs on its own
/// task, so a client that goes away does not stop it.
pub async fn migrate_all(State(state): State<PlacarState>) -> Result<Json<MigrationReport>, PlacarAxumError> {
    let job = state.jobs.start("migrate-images");
    let report = state.migrator.spawn_all(job).await??;
    Ok(Json(report))
}

/// `POST /api/migrate-images/stream`: one JSON event per line.
pub async fn migrate_stream(State(state): State<PlacarState>) -> Response {
    let job = state.jobs.start("migrate-images-stream");
    let lines = state.migrator.migrate_streaming(job).map(encode_line);

    (
        [
            (header::CONTENT_TYPE, NDJSON),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(lines),
    )
        .into_response()
}

fn encode_line(event: MigrationEvent) -> Result<Bytes, serde_json::Error> {
    let mut line = serde_json::to_vec(&event)?;
    line.push(b'\n');
    Ok(Bytes::from(line))
}

/// `POST /api/migrate-images/rewrite-urls`
pub async fn rewrite_urls(State(state): State<PlacarState>) -> Result<Json<RewriteReport>, PlacarAxumError> {
    let job = state.jobs.start("rewrite-urls");
    let report = state.migrator.spawn_rewrite(job).await??;
    Ok(Json(report))
}

/// `POST /api/migrate-images/cancel`
pub async fn cancel(State(state): State<PlacarState>) -> Json<Value> {
    Json(json!({ "cancelled": state.jobs.cancel_all() }))
}
