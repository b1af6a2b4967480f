//! # placar-blob: object-store infrastructure for Placar images
//!
//! Images end up in one bucket, split by category prefix:
//!
//! ```text
//! banners_dupla/<filename>   team banners
//! itens/<filename>           shop items
//! ```
//!
//! ```text
//! ┌─────────────────┐
//! │ Resolver / Jobs │  ← speak in categories and filenames
//! ├─────────────────┤
//! │   BlobAdapter   │  ← layout, limits, public URLs
//! ├─────────────────┤
//! │   BlobStore     │  ← S3, memory, disabled
//! └─────────────────┘
//! ```
//!
//! ```rust
//! use placar_blob::prelude::*;
//! use placar_core::Category;
//!
//! # #[tokio::main]
//! # async fn main() -> BlobResult<()> {
//! let adapter = BlobAdapter::new(MemoryBlobStore::new(), StorageLayout::new("placar"));
//! let receipt = adapter
//!     .upload(BlobPut::new(Category::Item, "chest.png"), bytes::Bytes::from_static(b"png"))
//!     .await?;
//! assert_eq!(receipt.url, "https://placar.s3.amazonaws.com/itens/chest.png");
//! # Ok(())
//! # }
//! ```

pub mod adapter;
mod config;
mod error;
mod memory_store;
mod s3_store;
pub mod store;
mod types;

pub use adapter::{BlobAdapter, BlobConfig};
pub use config::{
    CredentialReport, S3Config, StorageLayout, BUCKET_BANNER_PREFIX, BUCKET_ITEM_PREFIX, DEFAULT_REGION,
    S3_HOST_SUFFIX,
};
pub use error::{BlobError, BlobResult};
pub use memory_store::MemoryBlobStore;
pub use s3_store::S3Store;
pub use store::{BlobStore, DisabledStore, ObjectHead, PutResult};
pub use types::{collect_stream, collect_stream_limited, once_stream, BlobPut, ByteStream, UploadReceipt};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        BlobAdapter, BlobError, BlobPut, BlobResult, BlobStore, ByteStream, MemoryBlobStore, StorageLayout,
        UploadReceipt,
    };
}
