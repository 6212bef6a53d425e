//! serve command - Run the API proxy server

use anyhow::{Context as _, Result};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::cli::Context;
use crate::proxy::{self, ProxyState};
use crate::ui::output;

/// Serve the proxy routes until Ctrl-C.
pub fn serve(ctx: &Context) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(serve_async(ctx))
}

async fn serve_async(ctx: &Context) -> Result<()> {
    let settings = &ctx.settings;
    let state = ProxyState::new(&settings.backend_url, settings.request_timeout)
        .context("Invalid backend URL")?;

    let listener = TcpListener::bind(settings.bind)
        .await
        .with_context(|| format!("Failed to bind {}", settings.bind))?;
    let addr = listener.local_addr()?;

    output::print(
        format!(
            "Serving on http://{} (backend {})",
            addr, settings.backend_url
        ),
        ctx.verbosity,
    );

    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
            return;
        }
        tracing::info!("shutdown requested");
        trigger.cancel();
    });

    proxy::serve(listener, state, shutdown)
        .await
        .context("Proxy server failed")
}
