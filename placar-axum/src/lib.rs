//! placar-axum: HTTP surface for the Placar image subsystem.
//!
//! | method | path                                | handler                    |
//! |--------|-------------------------------------|----------------------------|
//! | GET    | `/api/image-proxy`                  | [`proxy::image_proxy`]     |
//! | POST   | `/api/migrate-images`               | [`migrate::migrate_all`]   |
//! | POST   | `/api/migrate-images/stream`        | [`migrate::migrate_stream`]|
//! | POST   | `/api/migrate-images/rewrite-urls`  | [`migrate::rewrite_urls`]  |
//! | POST   | `/api/migrate-images/cancel`        | [`migrate::cancel`]        |
//! | GET    | `/api/storage/diagnostics`          | [`storage::diagnostics`]   |
//! | DELETE | `/api/storage/objects`              | [`storage::delete_object`] |
//! | GET    | `/health`                           | `ok`                       |

pub mod app;
pub mod migrate;
pub mod proxy;
pub mod state;
pub mod storage;
mod error;

pub use app::PlacarApp;
pub use error::PlacarAxumError;
pub use state::PlacarState;
