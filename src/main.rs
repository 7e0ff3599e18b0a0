use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use entity_gateway::config::AppConfig;
use entity_gateway::entity::{EntityRegistry, EntitySpec};
use entity_gateway::session::MemorySessionStore;
use entity_gateway::store::MemoryStore;
use entity_gateway::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up GATEWAY_ACCESS_TOKEN etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env();
    tracing::info!("Starting entity gateway in {:?} mode", config.environment);
    if config.security.access_token.is_empty() {
        tracing::warn!("GATEWAY_ACCESS_TOKEN is not set; every guarded request will be rejected");
    }

    let specs = match &config.server.entities_file {
        Some(path) => load_entity_specs(path)?,
        None => Vec::new(),
    };
    let registry = Arc::new(
        EntityRegistry::builder()
            .entities(specs)
            .build()
            .context("invalid entity declarations")?,
    );
    tracing::info!("Serving entities: {:?}", {
        let mut names: Vec<_> = registry.names().collect();
        names.sort();
        names
    });

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(
        config,
        Arc::clone(&registry),
        Arc::new(MemoryStore::new(registry)),
        Arc::new(MemorySessionStore::new()),
    );

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Entity gateway listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await.context("server error")?;
    Ok(())
}

fn load_entity_specs(path: &Path) -> anyhow::Result<Vec<EntitySpec>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read entities file {}", path.display()))?;
    serde_yaml::from_str(&text).with_context(|| format!("failed to parse entities file {}", path.display()))
}
