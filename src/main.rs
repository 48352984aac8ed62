use anyhow::Context;
use dotenvy::dotenv;
use tokio::signal;
use xs_config::ServerConfig;
use xs_website::logging::{init_tracing, shutdown_tracer};
use xs_website::metrics::{init_metrics, metrics_app};
use xs_website::router::init_router;
use xs_website::state::init_app_state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    init_tracing()?;
    let metrics_handle = init_metrics()?;

    let server_config = ServerConfig::from_env();
    let state = init_app_state().await?;

    if server_config.run_migrations {
        xs_db::run_migrations(&state.db).await?;
    }

    tokio::fs::create_dir_all(&state.storage_config.base_dir)
        .await
        .with_context(|| {
            format!(
                "Failed to create upload directory {}",
                state.storage_config.base_dir.display()
            )
        })?;

    let mut app = init_router(state);
    if let Some(handle) = metrics_handle {
        app = app.merge(metrics_app(handle));
    }

    let address = server_config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    tracing::info!(%address, "server listening");
    tracing::info!("Swagger UI available at http://{}/swagger-ui", address);
    tracing::info!("Scalar UI available at http://{}/scalar", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    shutdown_tracer();
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
