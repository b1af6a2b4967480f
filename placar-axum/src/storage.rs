use axum::{
    extract::{Query, State},
    Json,
};
use placar_core::PlacarError;
use placar_images::ImageRef;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::{PlacarAxumError, PlacarState};

/// `GET /api/storage/diagnostics`
pub async fn diagnostics(State(state): State<PlacarState>) -> Json<Value> {
    let layout = state.blobs.layout();
    Json(json!({
        "store": state.blobs.store_name(),
        "credentials": state.credentials,
        "layout": {
            "bucket": layout.bucket,
            "region": layout.region,
            "bannerPrefix": layout.banner_prefix,
            "itemPrefix": layout.item_prefix,
            "publicBaseUrl": layout.public_base(),
        },
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct ObjectQuery {
    pub key: Option<String>,
    pub url: Option<String>,
}

/// `DELETE /api/storage/objects?key=..|url=..`
pub async fn delete_object(
    State(state): State<PlacarState>,
    Query(query): Query<ObjectQuery>,
) -> Result<Json<Value>, PlacarAxumError> {
    let key = object_key(&state, &query)?;
    state.blobs.delete(&key).await?;
    info!(key = %key, "object deleted on request");
    Ok(Json(json!({ "deleted": key })))
}

fn object_key(state: &PlacarState, query: &ObjectQuery) -> Result<String, PlacarError> {
    let non_blank = |value: &Option<String>| value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(str::to_string);

    if let Some(key) = non_blank(&query.key) {
        return Ok(key.trim_start_matches('/').to_string());
    }
    let Some(url) = non_blank(&query.url) else {
        return Err(PlacarError::bad_request("Missing key or url parameter"));
    };
    match state.classifier.parse(&url) {
        ImageRef::ObjectStore(object) => {
            let own = &state.blobs.layout().bucket;
            if let Some(bucket) = object.bucket.as_deref().filter(|b| !b.eq_ignore_ascii_case(own)) {
                return Err(
                    PlacarError::bad_request(format!("Object belongs to bucket '{bucket}', not '{own}'"))
                        .with_data(json!({ "bucket": bucket, "configuredBucket": own })),
                );
            }
            object
                .object_key
                .ok_or_else(|| PlacarError::bad_request(format!("No object key in {url}")))
        }
        _ => Err(PlacarError::bad_request(format!("Not an object-store URL: {url}"))),
    }
}
