//! placar-core: framework-agnostic core for the Placar image services.
//!
//! Holds the pieces every other crate agrees on: the two image categories and the
//! entities that reference them, status-coded errors, the string key/value
//! configuration store and the record persistence seam used by migrations.

pub mod config;
pub mod domain;
pub mod errors;
pub mod records;

pub use config::{PlacarConfig, PlacarConfigSnapshot};
pub use domain::{Category, EntityKind};
pub use errors::{ErrorKind, PlacarError, PlacarResult};
pub use records::{ImageRecord, MemoryRecordStore, RecordStore, RecordStoreError};
