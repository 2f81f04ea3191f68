use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use medtracker_core::{Catalog, CoreConfig};

/// Main entry point for the Medical Tracker service
///
/// Serves the REST prediction API (with Swagger UI) until interrupted.
///
/// # Environment Variables
/// - `MEDTRACKER_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `MEDTRACKER_CATALOG_FILE`: YAML catalog replacing the built-in conditions
///
/// The REST service only scores symptoms; it keeps no history, so the storage and remote
/// settings used by the CLI are not read here.
///
/// # Errors
/// Returns an error if the configuration is invalid, the address cannot be bound, or the HTTP
/// server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("medtracker_run=info".parse()?)
                .add_directive("medtracker_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = CoreConfig::from_env_values(
        None,
        None,
        None,
        std::env::var("MEDTRACKER_CATALOG_FILE").ok(),
    )?;
    let rest_addr =
        std::env::var("MEDTRACKER_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let catalog = Arc::new(Catalog::load(cfg.catalog_file()));
    tracing::info!("-- Loaded {} conditions", catalog.len());

    let app = api_rest::router(catalog);

    tracing::info!("++ Starting Medical Tracker REST on {}", rest_addr);
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("-- Medical Tracker REST stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
