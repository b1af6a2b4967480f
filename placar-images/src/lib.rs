//! # placar-images: one logical image, three historical homes
//!
//! Image references stored on teams and shop items may point at the app's own
//! `public/` folder, at the legacy raw-content host, or at the object store.
//! This crate classifies them, finds the best reachable URL, proxies requests,
//! and migrates legacy images into the bucket.
//!
//! ```text
//! Classifier ─► ImageRef ─► Resolver ─► ImageProxy
//!                  │
//!                  └──────► Migrator (bulk | streaming | rewrite)
//! ```
//!
//! Folder conventions differ between homes and are kept apart on purpose:
//!
//! | category | bucket prefix    | legacy folder            |
//! |----------|------------------|--------------------------|
//! | banner   | `banners_dupla/` | `public/banners-duplas/` |
//! | item     | `itens/`         | `public/itens/`          |
//!
//! ```rust
//! use placar_images::{Backend, Classifier};
//!
//! let classifier = Classifier::new();
//! let parsed = classifier.parse("https://raw.githubusercontent.com/org/repo/main/public/itens/chest.png");
//! assert_eq!(parsed.backend(), Backend::Legacy);
//! assert_eq!(parsed.filename(), Some("chest.png"));
//! ```

mod derive;
mod fetch;
mod http;
mod image_ref;
mod legacy;
pub mod migration;
pub mod naming;
mod probe;
pub mod proxy;
mod resolver;

pub use derive::{category_for_folder, derive_key, DerivedKey};
pub use fetch::{FetchError, FetchedBytes, FetchedImage, HttpImageSource, ImageSource};
pub use http::{HttpSettings, DEFAULT_FETCH_TIMEOUT_MS, DEFAULT_PROBE_TIMEOUT_MS, DEFAULT_USER_AGENT};
pub use image_ref::{Backend, Classifier, ImageRef, LegacyRef, LocalRef, ObjectRef};
pub use legacy::{
    LegacySource, LEGACY_BANNER_FOLDER, LEGACY_ITEM_FOLDER, LEGACY_PUBLIC_DIR, LEGACY_RAW_BASE, LEGACY_RAW_HOST,
};
pub use migration::{
    JobGuard, JobRegistry, MigrationError, MigrationEvent, MigrationReport, Migrator, RecordOutcome, RecordStage,
    RewriteReport,
};
pub use probe::{HttpProbe, LivenessProbe};
pub use proxy::{ImageProxy, ProxiedImage, ProxyOutcome, ProxyRequest, ProxyState};
pub use resolver::{Resolution, ResolutionSource, ResolutionStatus, Resolver};
