//! The remote authority: a small REST service keeping the collection in one JSON file.

use std::net::SocketAddr;

use axum::routing::get;
use axum::Router;
use snafu::ResultExt as _;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::{ApplicationError, BindAddressSnafu, WebServerSnafu};

pub use error::*;
pub use state::*;
pub use storage::*;

mod error;
mod state;
mod storage;
mod videos;

pub type Result<T, E = ApiError> = std::result::Result<T, E>;

pub fn router(app: App) -> Router {
    Router::new()
        .route("/api/videos", get(videos::list).post(videos::replace))
        .route("/api/health", get(videos::health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(app)
}

pub async fn serve(address: SocketAddr, app: App) -> std::result::Result<(), ApplicationError> {
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .context(BindAddressSnafu { address })?;

    tracing::info!("listening on http://{}", address);
    tracing::info!("endpoints: GET /api/videos, POST /api/videos, GET /api/health");

    axum::serve(listener, router(app)).await.context(WebServerSnafu)
}
