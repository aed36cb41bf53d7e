//! In-memory stub of the chat backend.
//!
//! Serves every endpoint the client uses so the terminal client and the
//! HTTP tests can run without the crawler, the answering engine or a
//! database:
//! - `GET /sessions`, `GET /session/{id}`
//! - `POST /process-url`, `POST /load-url`
//! - `POST /ask`
//! - `GET /health`

pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::StubState;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Start the stub backend on `port`.
///
/// # Errors
/// Returns an error if the port cannot be bound.
pub async fn run_server<F>(
    state: Arc<StubState>,
    port: u16,
    shutdown_signal: F,
) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("urlchat stub backend listening on http://{}", addr);
    serve(listener, state, shutdown_signal).await
}

/// Serve the stub backend on an already bound listener.
///
/// The server stops accepting connections when `shutdown_signal` completes.
///
/// # Errors
/// Returns an error if accepting connections fails.
pub async fn serve<F>(
    listener: TcpListener,
    state: Arc<StubState>,
    shutdown_signal: F,
) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app: Router = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
}
