use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

use readym_launcher::{
    build_app,
    config::Args,
    error::ServerError,
    handlers::assets,
    housekeeping,
    rate_limit::RateLimiter,
    state::AppState,
    telemetry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init();
    let args = Args::parse();

    assets::check_static_dir(&args.static_dir);

    let rate_limiter = args
        .rate_limit_config()
        .map(|cfg| Arc::new(RateLimiter::new(cfg)));

    match &rate_limiter {
        Some(limiter) => {
            let cfg = limiter.config();
            info!(
                max_requests = cfg.max_requests,
                window_ms = cfg.window.as_millis() as u64,
                standard_headers = cfg.standard_headers,
                "rate limiting enabled"
            );
            tokio::spawn(housekeeping::sweeper(Arc::clone(limiter), cfg.window));
        }
        None => info!("rate limiting disabled"),
    }

    let state = Arc::new(AppState {
        static_dir: args.static_dir.clone(),
        rate_limiter,
    });
    let app = build_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.listen_port()));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    let port = listener.local_addr().map_err(ServerError::Serve)?.port();

    info!("ReadyM Launcher P2P server running on port {port}");
    info!("Access the launcher at http://localhost:{port}");

    // peer address is the rate limiter's client key
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(ServerError::Serve)?;

    info!("server stopped");
    Ok(())
}

// Ctrl-C or SIGTERM, whichever comes first
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = sigterm => {}
    }

    info!("shutdown signal received, draining connections");
}
