use axum::routing::{delete, get, post};
use axum::Router;
use tokio::net::{TcpListener, ToSocketAddrs};
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::{migrate, proxy, storage, PlacarState};

#[derive(Clone)]
pub struct PlacarApp {
    pub state: PlacarState,
    pub router: Router<()>,
}

impl PlacarApp {
    pub fn new(state: PlacarState) -> Self {
        let router = Router::new()
            .route("/api/image-proxy", get(proxy::image_proxy))
            .route("/api/migrate-images", post(migrate::migrate_all))
            .route("/api/migrate-images/stream", post(migrate::migrate_stream))
            .route("/api/migrate-images/rewrite-urls", post(migrate::rewrite_urls))
            .route("/api/migrate-images/cancel", post(migrate::cancel))
            .route("/api/storage/diagnostics", get(storage::diagnostics))
            .route("/api/storage/objects", delete(storage::delete_object))
            .route("/health", get(|| async { "ok" }))
            .with_state(state.clone())
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            );

        Self { state, router }
    }

    pub fn use_router(mut self, path: &str, router: Router<()>) -> Self {
        self.router = self.router.nest(path, router);
        self
    }

    pub async fn listen<A>(self, addr: A) -> anyhow::Result<()>
    where
        A: ToSocketAddrs,
    {
        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, self.router).await?;
        Ok(())
    }
}
