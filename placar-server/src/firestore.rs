//! Firestore REST implementation of [`RecordStore`].
//!
//! Documents are listed page by page (`nextPageToken`) and a migration writes a
//! single field with `updateMask.fieldPaths`, so concurrent edits to other
//! fields of the same document are left alone.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use placar_core::{EntityKind, ImageRecord, PlacarConfigSnapshot, RecordStore, RecordStoreError};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

const PAGE_SIZE: u32 = 300;
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Clone)]
pub struct FirestoreSettings {
    pub base_url: String,
    pub project_id: String,
    pub token: Option<String>,
    pub teams_collection: String,
    pub items_collection: String,
    pub banner_field: String,
    pub image_field: String,
    pub label_field: String,
}

impl std::fmt::Debug for FirestoreSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirestoreSettings")
            .field("base_url", &self.base_url)
            .field("project_id", &self.project_id)
            .field("token", &self.token.as_ref().map(|_| "<set>"))
            .field("teams_collection", &self.teams_collection)
            .field("items_collection", &self.items_collection)
            .finish_non_exhaustive()
    }
}

impl FirestoreSettings {
    pub fn from_config(config: &PlacarConfigSnapshot) -> Result<Self> {
        let project_id = config
            .get_string("firestore.project_id")
            .ok_or_else(|| anyhow!("Missing 'firestore.project_id' for records.backend=firestore"))?;

        Ok(Self {
            base_url: config
                .get_or("firestore.base_url", "https://firestore.googleapis.com/v1")
                .trim_end_matches('/')
                .to_string(),
            project_id,
            token: config.get_string("firestore.token"),
            teams_collection: config.get_or("firestore.collection.teams", "duplas"),
            items_collection: config.get_or("firestore.collection.items", "itens"),
            banner_field: config.get_or("firestore.field.banner", "banner"),
            image_field: config.get_or("firestore.field.image", "imagem"),
            label_field: config.get_or("firestore.field.label", "nome"),
        })
    }

    pub fn collection(&self, kind: EntityKind) -> &str {
        match kind {
            EntityKind::TeamBanner => &self.teams_collection,
            EntityKind::ShopItem => &self.items_collection,
        }
    }

    /// Document field holding the image reference.
    pub fn image_field(&self, kind: EntityKind) -> &str {
        match kind {
            EntityKind::TeamBanner => &self.banner_field,
            EntityKind::ShopItem => &self.image_field,
        }
    }

    pub fn documents_url(&self, kind: EntityKind) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents/{}",
            self.base_url,
            urlencoding::encode(&self.project_id),
            urlencoding::encode(self.collection(kind))
        )
    }

    fn list_url(&self, kind: EntityKind, page_token: Option<&str>) -> String {
        let mut url = format!("{}?pageSize={PAGE_SIZE}", self.documents_url(kind));
        if let Some(token) = page_token {
            url.push_str("&pageToken=");
            url.push_str(&urlencoding::encode(token));
        }
        url
    }

    fn patch_url(&self, kind: EntityKind, id: &str) -> String {
        format!(
            "{}/{}?updateMask.fieldPaths={}&currentDocument.exists=true",
            self.documents_url(kind),
            urlencoding::encode(id),
            urlencoding::encode(self.image_field(kind))
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    documents: Vec<Document>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Document {
    /// Full resource name, `projects/.../documents/{collection}/{id}`.
    name: String,
    #[serde(default)]
    fields: HashMap<String, Value>,
}

impl Document {
    fn string_field(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)?
            .get("stringValue")?
            .as_str()
            .filter(|value| !value.trim().is_empty())
    }

    fn into_record(self, image_field: &str, label_field: &str) -> ImageRecord {
        let id = self.name.rsplit('/').next().unwrap_or_default().to_string();
        let mut record = ImageRecord::new(id, self.string_field(image_field));
        if let Some(label) = self.string_field(label_field) {
            record = record.with_label(label);
        }
        record
    }
}

pub struct FirestoreRecordStore {
    client: Client,
    settings: FirestoreSettings,
}

impl FirestoreRecordStore {
    pub fn new(settings: FirestoreSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client, settings })
    }

    pub fn from_config(config: &PlacarConfigSnapshot) -> Result<Self> {
        Self::new(FirestoreSettings::from_config(config)?)
    }

    pub fn settings(&self) -> &FirestoreSettings {
        &self.settings
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.settings.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn list_page(&self, kind: EntityKind, page_token: Option<&str>) -> Result<ListResponse, RecordStoreError> {
        let url = self.settings.list_url(kind, page_token);
        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|e| RecordStoreError::Unavailable(format!("Firestore list request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RecordStoreError::Backend(format!("Firestore list error {status}: {body}")));
        }

        response
            .json::<ListResponse>()
            .await
            .map_err(|e| RecordStoreError::Backend(format!("Failed to parse Firestore listing: {e}")))
    }
}

#[async_trait]
impl RecordStore for FirestoreRecordStore {
    async fn list(&self, kind: EntityKind) -> Result<Vec<ImageRecord>, RecordStoreError> {
        let image_field = self.settings.image_field(kind);
        let mut records = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self.list_page(kind, page_token.as_deref()).await?;
            records.extend(
                page.documents
                    .into_iter()
                    .map(|doc| doc.into_record(image_field, &self.settings.label_field)),
            );

            match page.next_page_token.filter(|token| !token.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(kind = kind.name_prefix(), count = records.len(), "firestore listing complete");
        Ok(records)
    }

    async fn set_image(&self, kind: EntityKind, id: &str, image: &str) -> Result<(), RecordStoreError> {
        let field = self.settings.image_field(kind);
        let body = json!({ "fields": { field: { "stringValue": image } } });

        let response = self
            .authorize(self.client.patch(self.settings.patch_url(kind, id)))
            .json(&body)
            .send()
            .await
            .map_err(|e| RecordStoreError::Unavailable(format!("Firestore patch request failed: {e}")))?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(RecordStoreError::NotFound {
                kind,
                id: id.to_string(),
            }),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(RecordStoreError::Backend(format!("Firestore patch error {status}: {body}")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use placar_core::PlacarConfig;

    fn settings() -> FirestoreSettings {
        let mut config = PlacarConfig::new();
        config.set("firestore.project_id", "placar-escolar");
        FirestoreSettings::from_config(&config.snapshot()).unwrap()
    }

    #[test]
    fn project_id_is_required() {
        assert!(FirestoreSettings::from_config(&PlacarConfig::new().snapshot()).is_err());
    }

    #[test]
    fn urls_per_kind() {
        let settings = settings();
        assert_eq!(
            settings.documents_url(EntityKind::TeamBanner),
            "https://firestore.googleapis.com/v1/projects/placar-escolar/databases/(default)/documents/duplas"
        );
        assert_eq!(
            settings.list_url(EntityKind::ShopItem, Some("a b")),
            "https://firestore.googleapis.com/v1/projects/placar-escolar/databases/(default)/documents/itens?pageSize=300&pageToken=a%20b"
        );
        assert!(settings
            .patch_url(EntityKind::ShopItem, "i1")
            .ends_with("/itens/i1?updateMask.fieldPaths=imagem&currentDocument.exists=true"));
    }

    #[test]
    fn documents_become_records() {
        let page: ListResponse = serde_json::from_value(json!({
            "documents": [
                {
                    "name": "projects/p/databases/(default)/documents/duplas/t1",
                    "fields": {
                        "nome": {"stringValue": "Ana e Bia"},
                        "banner": {"stringValue": "/banners-duplas/ana.png"},
                        "pontos": {"integerValue": "12"}
                    }
                },
                {
                    "name": "projects/p/databases/(default)/documents/duplas/t2",
                    "fields": {"banner": {"stringValue": "  "}}
                }
            ],
            "nextPageToken": "next"
        }))
        .unwrap();

        assert_eq!(page.next_page_token.as_deref(), Some("next"));
        let records: Vec<ImageRecord> = page
            .documents
            .into_iter()
            .map(|doc| doc.into_record("banner", "nome"))
            .collect();

        assert_eq!(
            records[0],
            ImageRecord::new("t1", Some("/banners-duplas/ana.png")).with_label("Ana e Bia")
        );
        assert_eq!(records[1], ImageRecord::new("t2", None));
    }

    #[test]
    fn empty_collection_has_no_documents_key() {
        let page: ListResponse = serde_json::from_value(json!({})).unwrap();
        assert!(page.documents.is_empty());
        assert!(page.next_page_token.is_none());
    }

    #[test]
    fn debug_hides_token() {
        let mut settings = settings();
        settings.token = Some("ya29.secret".into());
        assert!(!format!("{settings:?}").contains("ya29"));
    }
}
