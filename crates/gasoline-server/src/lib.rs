//! The gasoline daemon (spec §5): owns the capture pipeline, the
//! checkpoint/verification/snapshot stores, the alert pipeline and its
//! background sweeps, the SSE registry, and the HTTP surface that
//! exposes all of it over MCP. Structured the way
//! `turbomcp-server` separates transport, routing and handler state,
//! collapsed into one process per spec §5 ("a single daemon owns every
//! subsystem").

pub mod alert_log;
pub mod background;
pub mod config;
pub mod dispatcher;
pub mod http;
pub mod resources;
pub mod screenshot;
pub mod state;
pub mod tools;

pub use config::ServerConfig;
pub use dispatcher::Dispatcher;
pub use state::AppState;

/// Build the daemon state, spawn its background sweeps, and serve the
/// HTTP surface until a shutdown signal arrives (spec §6: "exit code 0
/// on graceful shutdown") or the listener errors.
pub async fn serve(config: ServerConfig) -> gasoline_core::GasolineResult<()> {
    let addr = config.bind_addr();
    let state = AppState::new(config)?;
    let _background = background::spawn(state.clone());

    let app = http::router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| gasoline_core::GasolineError::internal(err))?;

    tracing::info!(%addr, "gasoline daemon listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| gasoline_core::GasolineError::internal(err))?;
    tracing::info!("gasoline daemon shut down gracefully");
    Ok(())
}

/// Resolves on Ctrl-C or, on Unix, `SIGTERM` (the signal `--stop`
/// sends) — whichever arrives first.
async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        let Ok(mut signal) = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) else {
            return;
        };
        signal.recv().await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
