// HTTP surface
//
// - Handlers: upload form, /process, result downloads
// - Results: per-request durable outputs with expiry
//
// Each request gets its own scratch directory and its own result id, so
// concurrent uploads never share a file.

pub mod handlers;
pub mod results;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::error::Result;
use crate::workflow::Workflow;

pub use results::{ResultStore, StoredResult};

/// Shared application state passed to axum handlers
#[derive(Clone)]
pub struct AppState {
    pub workflow: Arc<Workflow>,
    pub results: Arc<ResultStore>,
}

/// Build the router with all routes
pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/process", post(handlers::process))
        .route("/results/{id}", get(handlers::download))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Handle returned by `start()`; keeps background tasks alive
pub struct ServerHandle {
    pub port: u16,
    server: tokio::task::JoinHandle<()>,
    cleanup: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    /// Stop serving and cancel the cleanup task
    pub fn shutdown(self) {
        self.server.abort();
        self.cleanup.abort();
    }
}

/// Bind the listener and start serving in the background
pub async fn start(config: ServerConfig, workflow: Workflow) -> Result<ServerHandle> {
    let results = Arc::new(
        ResultStore::new(&config.results_dir, Duration::from_secs(config.result_ttl_secs)).await?,
    );
    let cleanup = results::start_cleanup_task(
        Arc::clone(&results),
        Duration::from_secs(config.cleanup_interval_secs.max(1)),
    );

    let state = AppState {
        workflow: Arc::new(workflow),
        results,
    };
    let router = build_router(state, config.max_upload_mb * 1024 * 1024);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    info!("Listening on http://{}", local_addr);

    let server = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!("Server stopped: {}", e);
        }
    });

    Ok(ServerHandle {
        port: local_addr.port(),
        server,
        cleanup,
    })
}
