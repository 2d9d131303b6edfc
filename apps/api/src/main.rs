mod artifacts;
mod config;
mod content;
mod db;
mod errors;
mod models;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::http::HeaderValue;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::artifacts::registry::ArtifactRegistry;
use crate::artifacts::store::DiskStore;
use crate::config::Config;
use crate::db::{create_pool, init_schema};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let crate_target = env!("CARGO_PKG_NAME").replace('-', "_");
            EnvFilter::new(format!("{}={}", crate_target, &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Portfolio API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize SQLite and create tables on first boot
    let db = create_pool(&config.database_url).await?;
    init_schema(&db).await?;

    // Initialize the resume artifact store and registry
    let store = Arc::new(DiskStore::new(config.upload_dir.clone()));
    let artifacts = Arc::new(ArtifactRegistry::new(db.clone(), store));
    info!(
        "Resume artifact store rooted at {}",
        config.upload_dir.display()
    );

    let state = AppState { db, artifacts };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(&config)?);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// CORS policy from config: an explicit origin list, or permissive when
/// `CORS_ORIGINS` is `*`.
fn build_cors_layer(config: &Config) -> Result<CorsLayer> {
    if config.allow_any_origin() {
        return Ok(CorsLayer::permissive());
    }

    let origins = config
        .cors_origin_list()
        .into_iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any))
}
