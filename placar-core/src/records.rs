//! Record persistence seam.
//!
//! Migrations only ever touch one field per entity: the banner of a team or the
//! image of a shop item. A [`RecordStore`] lists those records and overwrites the
//! field in place, one write per record, with no history kept.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::EntityKind;

/// The slice of a persisted entity the image subsystem cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: String,
    /// Human-readable name (team or item name), used in progress messages.
    pub label: Option<String>,
    /// The image reference; `None` when the field is absent or empty.
    pub image: Option<String>,
}

impl ImageRecord {
    pub fn new(id: impl Into<String>, image: Option<&str>) -> Self {
        Self {
            id: id.into(),
            label: None,
            image: image.map(str::to_string),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Label for logs, falling back to the id.
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Error)]
pub enum RecordStoreError {
    #[error("Record store unavailable: {0}")]
    Unavailable(String),

    #[error("Record not found: {kind}/{id}")]
    NotFound { kind: EntityKind, id: String },

    #[error("Record store backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Enumerate records of one kind, in the backend's listing order.
    async fn list(&self, kind: EntityKind) -> Result<Vec<ImageRecord>, RecordStoreError>;

    /// Overwrite the image field of one record.
    async fn set_image(&self, kind: EntityKind, id: &str, image: &str) -> Result<(), RecordStoreError>;
}

/// In-process store. Keeps insertion order per kind.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: RwLock<HashMap<EntityKind, Vec<ImageRecord>>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, kind: EntityKind, record: ImageRecord) {
        let mut records = self.records.write().await;
        let bucket = records.entry(kind).or_default();
        match bucket.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record,
            None => bucket.push(record),
        }
    }

    pub async fn get(&self, kind: EntityKind, id: &str) -> Option<ImageRecord> {
        let records = self.records.read().await;
        records
            .get(&kind)
            .and_then(|bucket| bucket.iter().find(|r| r.id == id))
            .cloned()
    }

    pub async fn image_of(&self, kind: EntityKind, id: &str) -> Option<String> {
        self.get(kind, id).await.and_then(|r| r.image)
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn list(&self, kind: EntityKind) -> Result<Vec<ImageRecord>, RecordStoreError> {
        let records = self.records.read().await;
        Ok(records.get(&kind).cloned().unwrap_or_default())
    }

    async fn set_image(&self, kind: EntityKind, id: &str, image: &str) -> Result<(), RecordStoreError> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(&kind)
            .and_then(|bucket| bucket.iter_mut().find(|r| r.id == id))
            .ok_or_else(|| RecordStoreError::NotFound {
                kind,
                id: id.to_string(),
            })?;
        record.image = Some(image.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lists_in_insertion_order() {
        let store = MemoryRecordStore::new();
        store.insert(EntityKind::ShopItem, ImageRecord::new("b", Some("x.png"))).await;
        store.insert(EntityKind::ShopItem, ImageRecord::new("a", None)).await;

        let ids: Vec<_> = store
            .list(EntityKind::ShopItem)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert!(store.list(EntityKind::TeamBanner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn set_image_overwrites_in_place() {
        let store = MemoryRecordStore::new();
        store.insert(EntityKind::TeamBanner, ImageRecord::new("t1", Some("old.png"))).await;

        store.set_image(EntityKind::TeamBanner, "t1", "new.png").await.unwrap();
        assert_eq!(store.image_of(EntityKind::TeamBanner, "t1").await.as_deref(), Some("new.png"));
    }

    #[tokio::test]
    async fn set_image_on_missing_record_fails() {
        let store = MemoryRecordStore::new();
        let err = store.set_image(EntityKind::TeamBanner, "nope", "x").await.unwrap_err();
        assert!(matches!(err, RecordStoreError::NotFound { .. }));
    }
}
