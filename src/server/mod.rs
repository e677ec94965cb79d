//! Mock storage server speaking the same HTTP contract as
//! [`StorageClient`](crate::StorageClient).
//!
//! The server keeps everything in a [`Store`] passed to the handlers as
//! router state; nothing survives a restart.

mod handlers;
mod store;

use std::future::Future;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;

pub use store::{Store, StoreError};

/// Builds the storage API router around `store`.
pub fn router(store: Arc<Store>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/buckets", get(handlers::list_buckets))
        .route("/buckets/:bucket", post(handlers::create_bucket))
        .route("/objects", post(handlers::put_object))
        .route("/objects/get", post(handlers::get_object))
        .route("/objects/:bucket", get(handlers::list_objects))
        .with_state(store)
}

/// Serves the storage API on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, store: Arc<Store>, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "storage server listening");
    }
    axum::serve(listener, router(store))
        .with_graceful_shutdown(shutdown)
        .await
}
