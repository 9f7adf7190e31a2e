//! Property Cache - listing service entry point.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use property_cache::properties::seed_sample_properties;
use property_cache::{create_router, spawn_cleanup_task, AppState, Config};

/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Connect the database and the cache backend
/// 4. Optionally seed sample data and warm the query cache
/// 5. Start the expiry sweep when the in-process cache is used
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "property_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Property Cache service");

    let config = Config::from_env();
    info!(
        "Configuration loaded: port={}, database={}, cache={}, fail_open={}",
        config.server_port,
        config.database_url,
        config.redis_url.as_deref().unwrap_or("in-process"),
        config.cache_fail_open
    );

    let state = AppState::from_config(&config)
        .await
        .context("failed to initialize storage")?;

    if config.seed_sample_data {
        let created = seed_sample_properties(&state.repository, &state.writer)
            .await
            .context("failed to seed sample properties")?;
        info!(created, "Sample properties seeded");
    }

    if config.warm_cache_on_startup {
        let report = state
            .query
            .warm_cache()
            .await
            .context("failed to warm the query cache")?;
        info!(properties = report.properties_cached, "Query cache warmed");
    }

    let sweep = state.local_store.clone().map(|store| {
        info!("Background expiry sweep started");
        spawn_cleanup_task(store, Duration::from_secs(config.cleanup_interval.max(1)))
    });

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(sweep))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then stops the sweep.
async fn shutdown_signal(sweep: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    if let Some(handle) = sweep {
        handle.abort();
        warn!("Expiry sweep aborted");
    }
}
