//! Server initialization.

use crate::app::AppState;
use crate::http;
use anyhow::Context;
use range_config::{Config, Paths};
use report_sink::ReportSink;
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Run the server until Ctrl-C.
pub async fn run_server(config: Config, paths: Paths) -> anyhow::Result<()> {
    paths.ensure_dirs().context("creating runtime directories")?;

    let bind_addr = config.bind_addr()?;
    let reports = ReportSink::open(paths.reports_dir()).context("opening report directory")?;

    info!(
        bind = %bind_addr,
        reports = %paths.reports_dir().display(),
        key_required = config.api_key.is_some(),
        max_attempts = config.rate_limit.max_attempts,
        window_secs = config.rate_limit.window_secs,
        "Configuration loaded"
    );

    let state = AppState::new(config, reports);
    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("binding {bind_addr}"))?;
    info!("Listening on http://{}", listener.local_addr()?);

    serve(listener, state, shutdown_signal()).await?;

    info!("Server stopped");
    Ok(())
}

/// Serve the router on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = http::router(state);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(err) => {
            warn!(error = %err, "Cannot listen for Ctrl-C, running until killed");
            std::future::pending::<()>().await;
        }
    }
}
