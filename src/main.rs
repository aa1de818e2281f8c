use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use linkbridge::config::AppConfig;
use linkbridge::handlers;
use linkbridge::services::graph::facebook::FacebookGraph;
use linkbridge::state::AppState;
use linkbridge::store::JsonStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env()?;

    let store = JsonStore::new(config.data_dir.clone());
    tracing::info!(data_dir = %config.data_dir.display(), "using JSON store");

    let graph = FacebookGraph::new(
        config.app_id.clone(),
        config.app_secret.clone(),
        &config.graph_api_version,
    );
    tracing::info!(
        graph_api_version = %config.graph_api_version,
        cors_origin = %config.cors_origin,
        "Graph API client ready"
    );

    let state = Arc::new(AppState {
        config: config.clone(),
        store,
        graph: Box::new(graph),
    });

    let app = handlers::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
