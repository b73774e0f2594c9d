use tokio::net::TcpListener;
use tracing::info;

pub mod board;
pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod gist;
pub mod svg;
pub mod templates;
pub mod tribute;
pub mod util;

use config::Config;
use endpoints::{router, AppState};
use error::Result;

/// Serve the tribute functions until Ctrl+C / SIGTERM.
pub async fn run(config: Config) -> Result<()> {
    let address = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&address).await?;
    info!("Tribute functions listening on {address}");
    serve(listener, config).await
}

/// Serve on an already-bound listener.
pub async fn serve(listener: TcpListener, config: Config) -> Result<()> {
    let credential = if config.token().is_some() { "present" } else { "missing" };
    info!(
        gist = %config.gist.id,
        file = %config.gist.file_name,
        credential,
        "Starting tribute functions"
    );
    let app = router(AppState::new(config)?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
