use anyhow::Result;
use clap::Parser;
use infrastructure::{AppConfig, GeminiVisionExtractor, LocalImageStore, PostgresReadingRepository};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_server::{api, state::AppState};
use application::ReadingLifecycleService;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration directory (expects <dir>/default.toml, optional)
    #[arg(long, default_value = "config")]
    config_dir: String,

    /// API Port (overrides config when set)
    #[arg(long)]
    api_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new("info,api_server=debug"))
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenv::dotenv().ok();
    let args = Args::parse();
    info!("Meter Reading Intake API starting...");

    let config = AppConfig::load(&args.config_dir)
        .map_err(|e| anyhow::anyhow!("failed to load configuration: {}", e))?;
    let api_port = args.api_port.unwrap_or(config.server.api_port);

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;
    info!("Connecting to database...");
    let pool = sqlx::PgPool::connect(&database_url).await?;

    info!("Running database migrations...");
    sqlx::migrate!("../../migrations").run(&pool).await?;
    info!("Migrations applied");

    let extraction_timeout = Duration::from_secs(config.gemini.extraction_timeout_secs);
    let extractor = GeminiVisionExtractor::new(
        config.gemini.api_key.clone(),
        config.gemini.model.clone(),
        extraction_timeout,
    )
    .map_err(|e| anyhow::anyhow!("failed to build extractor: {}", e))?;

    let readings = ReadingLifecycleService::new(
        Arc::new(PostgresReadingRepository::new(pool)),
        Arc::new(extractor),
        Arc::new(LocalImageStore::new(config.server.uploads_dir.clone())),
    )
    .with_extraction_timeout(extraction_timeout);

    let state = Arc::new(AppState::new(
        readings,
        config.server.public_base_url.clone(),
    ));

    let app = api::create_router(state, &config.server.uploads_dir);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], api_port));
    info!("API listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
