#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use placar_blob::{once_stream, BlobAdapter, MemoryBlobStore, StorageLayout};
use placar_images::{FetchError, FetchedImage, ImageSource, LegacySource, LivenessProbe};

pub const BUCKET: &str = "placar";

pub fn layout() -> StorageLayout {
    StorageLayout::new(BUCKET)
}

pub fn legacy() -> LegacySource {
    LegacySource::new("org", "repo", "main")
}

pub fn legacy_url(folder: &str, filename: &str) -> String {
    format!("https://raw.githubusercontent.com/org/repo/main/public/{folder}/{filename}")
}

pub fn bucket_url(key: &str) -> String {
    format!("https://{BUCKET}.s3.amazonaws.com/{key}")
}

pub fn adapter(store: &Arc<MemoryBlobStore>) -> BlobAdapter {
    BlobAdapter::from_arc(store.clone(), layout())
}

/// Answers "live" for a fixed set of URLs and records every call.
#[derive(Default)]
pub struct ScriptedProbe {
    live: Mutex<HashSet<String>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_live(self, url: impl Into<String>) -> Self {
        self.live.lock().unwrap().insert(url.into());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LivenessProbe for ScriptedProbe {
    async fn is_live(&self, url: &str) -> bool {
        self.calls.lock().unwrap().push(url.to_string());
        self.live.lock().unwrap().contains(url)
    }
}

enum Scripted {
    Body(&'static [u8], Option<&'static str>),
    Status(u16),
    Unreachable,
}

/// Serves canned responses; unknown URLs answer 404.
#[derive(Default)]
pub struct ScriptedSource {
    responses: Mutex<HashMap<String, Scripted>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(self, url: impl Into<String>, body: &'static [u8], content_type: Option<&'static str>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(url.into(), Scripted::Body(body, content_type));
        self
    }

    pub fn with_status(self, url: impl Into<String>, status: u16) -> Self {
        self.responses.lock().unwrap().insert(url.into(), Scripted::Status(status));
        self
    }

    pub fn with_network_error(self, url: impl Into<String>) -> Self {
        self.responses.lock().unwrap().insert(url.into(), Scripted::Unreachable);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageSource for ScriptedSource {
    async fn open(&self, url: &str) -> Result<FetchedImage, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        match self.responses.lock().unwrap().get(url) {
            Some(Scripted::Body(body, content_type)) => Ok(FetchedImage {
                content_type: content_type.map(str::to_string),
                content_length: Some(body.len() as u64),
                body: once_stream(Bytes::from_static(body)),
            }),
            Some(Scripted::Status(status)) => Err(FetchError::Status {
                url: url.to_string(),
                status: *status,
            }),
            Some(Scripted::Unreachable) => Err(FetchError::network(url, "connection refused")),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}
