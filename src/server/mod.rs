//! HTTP job service around the summarizer.
//!
//! - `POST /kickoff` - validate a screenshot, fetch a UI dump, summarize and store it
//! - `GET /status/{kickoff_id}` - return a stored summary
//! - `GET /health` - liveness check
//!
//! Error responses share one shape: `{"error": "<message>"}`.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use state::AppState;

/// Build the Axum router with all routes and middleware
pub fn build_router(state: Arc<AppState,>,) -> Router {
    Router::new()
        .route("/kickoff", post(routes::kickoff,),)
        .route("/status/{kickoff_id}", get(routes::status,),)
        .route("/health", get(routes::health,),)
        .fallback(routes::not_found,)
        .layer(DefaultBodyLimit::max(state.config.max_body_size(),),)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            state.config.timeout(),
        ),)
        .layer(TraceLayer::new_for_http(),)
        .with_state(state,)
}

/// Start the HTTP server and block until Ctrl+C or SIGTERM.
///
/// Logging is expected to be initialized by the caller.
pub async fn start_server(config: ServerConfig,) -> anyhow::Result<(),> {
    let addr: SocketAddr = config.socket_addr()?;
    let state = Arc::new(AppState::new(config,)?,);

    tracing::info!("Starting uidump-reader server on {}", addr);
    tracing::info!(
        "Timeout: {}s, Max body: {}MB, Image validation: {}",
        state.config.timeout_secs,
        state.config.max_body_size_mb,
        state.config.validate_image
    );
    tracing::info!(
        "Job store: max {} entries, ttl {}s",
        state.config.store_max_entries,
        state.config.store_ttl_secs
    );

    let app = build_router(state,);
    let listener = tokio::net::TcpListener::bind(addr,).await?;
    axum::serve(listener, app,)
        .with_graceful_shutdown(shutdown_signal(),)
        .await?;

    tracing::info!("Server shutdown complete");
    Ok((),)
}

/// Shutdown signal handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler",);
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate(),)
            .expect("Failed to install signal handler",)
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<(),>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
