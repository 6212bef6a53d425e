//! proxy
//!
//! HTTP server exposing the `/api/...` routes and forwarding them to the
//! backend service.
//!
//! # Routes
//!
//! | Path | Method | Backend |
//! |---|---|---|
//! | `/api/commits` | GET | same path, query relayed unchanged |
//! | `/api/changelogs` | GET | same path, query relayed unchanged |
//! | `/api/changelogs` | POST | same path, JSON body relayed |
//! | `/api/changelogs/status/{id}` | GET | same path |
//! | `/healthz` | GET | not forwarded |
//!
//! # Design
//!
//! Handlers are stateless. The backend URL is resolved once at startup and
//! carried in [`ProxyState`]; nothing is read from the environment per
//! request.
//!
//! # Example
//!
//! ```no_run
//! use changelog_portal::proxy::{serve, ProxyState};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let state = ProxyState::new("http://localhost:3001", None)?;
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//! serve(listener, state, CancellationToken::new()).await?;
//! # Ok(())
//! # }
//! ```

pub mod routes;
pub mod upstream;

use std::time::Duration;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

pub use upstream::{Upstream, UpstreamError};

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct ProxyState {
    pub upstream: Upstream,
}

impl ProxyState {
    /// Create state forwarding to `backend_url`.
    pub fn new(backend_url: &str, timeout: Option<Duration>) -> Result<Self, UpstreamError> {
        Ok(Self {
            upstream: Upstream::new(backend_url, timeout)?,
        })
    }
}

/// Build the router with all routes.
pub fn router(state: ProxyState) -> Router {
    Router::new()
        .route("/api/commits", get(routes::list_commits))
        .route(
            "/api/changelogs",
            get(routes::list_changelogs).post(routes::submit_changelog),
        )
        .route("/api/changelogs/status/{id}", get(routes::changelog_status))
        .route("/healthz", get(routes::health))
        .with_state(state)
}

/// Serve the proxy on `listener` until `shutdown` is cancelled.
pub async fn serve(
    listener: TcpListener,
    state: ProxyState,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(%addr, backend = %state.upstream.base_url(), "proxy listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    tracing::info!("proxy stopped");
    Ok(())
}
