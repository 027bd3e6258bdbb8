mod admin;
mod analytics;
mod config;
mod db;
mod errors;
mod health;
mod llm_client;
mod routes;
mod scoring;
mod state;
mod storage;

#[cfg(test)]
mod testing;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analytics::dispatch::EventDispatcher;
use crate::analytics::store::{EventStore, PgEventStore, TableRef};
use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::scoring::adapter::ScoringAdapter;
use crate::state::AppState;
use crate::storage::S3ObjectStore;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting screening API v{}", env!("CARGO_PKG_VERSION"));

    // Event store: the pool connects on first use
    let pool = create_pool(&config.database_url)?;
    let table = TableRef::new(&config.events_namespace, &config.events_table);
    info!("Event table: {table}");
    let events: Arc<dyn EventStore> = Arc::new(PgEventStore::new(pool, table));

    // Object store (S3 / MinIO)
    let s3 = build_s3_client(&config).await;
    let storage = Arc::new(S3ObjectStore::new(
        s3,
        config.s3_bucket.clone(),
        config.provision_region.clone(),
    ));
    info!("S3 client initialized (bucket: {})", config.s3_bucket);

    // Scoring
    let llm = LlmClient::new(config.anthropic_api_key.clone(), config.scoring_model.clone())?;
    info!("LLM client initialized (model: {})", config.scoring_model);
    if config.fallback_seed.is_some() {
        info!("Fallback scoring uses a fixed seed");
    }
    let scoring = Arc::new(ScoringAdapter::new(
        Arc::new(llm),
        config.scoring_params(),
        config.fallback_seed,
    ));

    let state = AppState {
        dispatcher: EventDispatcher::new(Arc::clone(&events)),
        events,
        storage,
        scoring,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "screening-static",
    );

    let shared = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new(config.provision_region.clone()))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    // MinIO and most S3-compatible endpoints only serve path-style URLs.
    let s3_config = aws_sdk_s3::config::Builder::from(&shared)
        .force_path_style(true)
        .build();

    aws_sdk_s3::Client::from_conf(s3_config)
}
