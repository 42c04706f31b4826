use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use axum::extract::DefaultBodyLimit;
use axum::routing::{any, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tracing::info;

pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

const BODY_LIMIT: usize = 2 * 1024 * 1024;

/// API routes plus, when `static_dir` exists, the built frontend with an
/// `index.html` fallback for client-side routes.
pub async fn create_app(state: AppState, static_dir: Option<&Path>) -> Router {
    let cors = CorsLayer::permissive();

    let router = Router::new()
        .route("/health", get(handlers::health))
        .route("/api/news", get(handlers::news))
        .route("/api/news/kr", get(handlers::news))
        .route("/api/topics", get(handlers::topics))
        .route("/api/embed", post(handlers::embed))
        .route("/api/*rest", any(handlers::not_found));

    let router = match static_dir.filter(|dir| dir.is_dir()) {
        Some(dir) => {
            info!("🗂️ Serving static files from {}", dir.display());
            let index = ServeFile::new(dir.join("index.html"));
            router.fallback_service(ServeDir::new(dir).fallback(index))
        }
        None => router.fallback(handlers::not_found),
    };

    router
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(cors)
        .with_state(Arc::new(state))
}

pub async fn serve(app: Router, addr: SocketAddr) -> nt_core::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("🌐 Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

pub mod prelude {
    pub use nt_core::{Error, NewsDigest, Result};
    pub use crate::{create_app, serve, AppState};
}
