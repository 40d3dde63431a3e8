use std::sync::Arc;

use anyhow::Context;
use marquee_core::config::{Config, LogFormat};
use marquee_metadata::aggregate::Aggregator;
use marquee_metadata::extras::ExtrasCache;
use marquee_metadata::gemini::GeminiClient;
use marquee_metadata::provider::TextGenerator;
use marquee_metadata::tmdb::TmdbClient;
use marquee_metadata::youtube::YouTubeClient;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let config = Config::from_env().context("invalid configuration")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    info!(db_path = %config.db_path, region = %config.region, "connecting to database");
    let extras = ExtrasCache::open(&config)
        .await
        .context("failed to open extras store")?;
    info!("migrations complete");

    let http = reqwest::Client::builder()
        .user_agent(concat!("marquee/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("failed to build http client")?;

    let tmdb = TmdbClient::new(&config.tmdb, &config.region, http.clone());
    let youtube = YouTubeClient::new(&config.youtube, &config.region, http.clone());
    if youtube.is_fallback() {
        warn!("YOUTUBE_API_KEY not set; trailers and playlists fall back to search links");
    }
    let writer = GeminiClient::from_config(&config.gemini, http)
        .map(|c| Arc::new(c) as Arc<dyn TextGenerator>);
    if writer.is_none() {
        warn!("GEMINI_API_KEY not set; review generation is disabled");
    }

    let aggregator = Arc::new(Aggregator::new(
        &config,
        Arc::new(tmdb),
        Arc::new(youtube),
        extras,
    ));

    // Spawn home feed warmup
    if let Some(every) = config.warmup_interval {
        info!(every_secs = every.as_secs(), "scheduling home feed warmup");
        marquee_server::warmup::spawn(aggregator.clone(), every);
    }

    let app_state = marquee_server::state::AppState::new(aggregator, writer);
    let app = marquee_server::routes::build_router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .context("failed to bind")?;
    info!(addr = %config.bind_addr, "server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
