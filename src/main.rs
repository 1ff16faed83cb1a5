use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tokio::signal;

use form2telegram::config::Settings;
use form2telegram::parameters::create_parameter_store;
use form2telegram::server::{create_app, AppState};
use form2telegram::telegram::TelegramClient;
use form2telegram::telemetry::init_telemetry;
use form2telegram::triggers::RedisSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::new()?;

    // Held until exit so pending spans are flushed
    let _telemetry = init_telemetry(&settings.otel)?;
    tracing::info!("Configuration loaded");

    let parameters = create_parameter_store(&settings).await;
    let api = Arc::new(TelegramClient::new(&settings.telegram)?);

    let state = AppState::new(settings.clone(), parameters, api);
    tracing::info!(
        backend = state.parameters.backend_name(),
        "Application state initialized"
    );

    let redis_subscriber = Arc::new(RedisSubscriber::new(settings.redis.clone(), state.bus.clone()));
    let shutdown_signal = redis_subscriber.shutdown_signal();

    let subscriber = redis_subscriber.clone();
    let redis_handle = tokio::spawn(async move {
        if let Err(e) = subscriber.start().await {
            tracing::error!(error = %e, "Redis trigger failed");
        }
    });

    let app = create_app(state);

    let addr = settings.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal_handler(shutdown_signal))
        .await?;

    tracing::info!("Waiting for background tasks to finish...");
    let _ = redis_handle.await;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal_handler(shutdown_tx: tokio::sync::broadcast::Sender<()>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }

    let _ = shutdown_tx.send(());
}
