use std::net::SocketAddr;
use std::process::ExitCode;
use std::time::Duration;

use axum_server::Handle;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use poll_backend::config::Config;
use poll_backend::state::AppState;
use poll_backend::{db, routes};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .init();

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("startup failed: {e}");
            eprintln!("startup failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let pool = db::create_pool(&config.database).await?;
    db::run_migrations(&pool).await?;

    let state = AppState::new(pool.clone(), &config);
    let app = routes::api_router(state, config.request_timeout);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("listening on {addr}");

    let handle = Handle::new();
    tokio::spawn(shutdown_signal(handle.clone(), config.shutdown_grace));

    axum_server::bind(addr)
        .handle(handle)
        .serve(app.into_make_service())
        .await?;

    pool.close().await;
    info!("server exiting");
    Ok(())
}

/// Waits for SIGINT/SIGTERM, then stops accepting connections and drains
/// in-flight requests within the configured grace window.
async fn shutdown_signal(handle: Handle, grace: Duration) {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(_) => std::future::pending().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("shutdown signal received, draining in-flight requests");
    handle.graceful_shutdown(Some(grace));
}
