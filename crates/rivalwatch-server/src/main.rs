use anyhow::{Context, Result};
use rand::distributions::Alphanumeric;
use rand::Rng;
use rivalwatch_ai::{OpenAIProvider, TextGenerator};
use rivalwatch_enrich::{CompanyDataProvider, CompanyEnrichClient};
use rivalwatch_storage::IntelStore;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use rivalwatch_server::app;
use rivalwatch_server::config::ServerConfig;
use rivalwatch_server::state::AppState;

#[allow(clippy::print_stderr)]
fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  rivalwatch-server [config.toml]             Start the server");
    eprintln!("  rivalwatch-server migrate [config.toml]     Apply database migrations and exit");
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env 不存在时忽略
    dotenv::dotenv().ok();

    rivalwatch_common::id::init(1, 1);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("rivalwatch=info".parse()?))
        .init();

    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        Some("migrate") => run_migrate(args.get(2).map(String::as_str)).await,
        Some("--help" | "-h") => {
            print_usage();
            Ok(())
        }
        other => run_server(other).await,
    }
}

async fn open_store(config: &ServerConfig) -> Result<IntelStore> {
    let db_url = config.database.connection_url();
    IntelStore::new(&db_url, Path::new(&config.database.data_dir))
        .await
        .with_context(|| format!("Failed to open database {}", config.database.redacted_url()))
}

/// Applies pending migrations without starting the HTTP server.
async fn run_migrate(config_path: Option<&str>) -> Result<()> {
    let config = ServerConfig::resolve(config_path)?;
    open_store(&config).await?;
    tracing::info!(db = %config.database.redacted_url(), "Migrations applied");
    Ok(())
}

fn random_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(48)
        .map(char::from)
        .collect()
}

fn build_enricher(config: &ServerConfig) -> Result<Option<Arc<dyn CompanyDataProvider>>> {
    let Some(api_key) = config.enrichment.api_key.clone().filter(|_| config.enrichment_enabled())
    else {
        tracing::warn!("COMPANY_ENRICH_API_KEY not set, company enrichment disabled");
        return Ok(None);
    };
    let client = CompanyEnrichClient::new(
        api_key,
        config.enrichment.base_url.clone(),
        Some(config.enrichment.timeout_secs),
    )?;
    Ok(Some(Arc::new(client)))
}

fn build_generator(config: &ServerConfig) -> Result<Option<Arc<dyn TextGenerator>>> {
    let Some(api_key) = config.ai.api_key.clone().filter(|_| config.ai_enabled()) else {
        tracing::warn!("OPENAI_API_KEY not set, AI summaries fall back to placeholder text");
        return Ok(None);
    };
    let provider = OpenAIProvider::new(
        api_key,
        Some(config.ai.model.clone()),
        config.ai.base_url.clone(),
        Some(config.ai.timeout_secs),
        config.ai.max_tokens,
        config.ai.temperature,
    )?;
    Ok(Some(Arc::new(provider)))
}

async fn run_server(config_path: Option<&str>) -> Result<()> {
    let config = ServerConfig::resolve(config_path)?;

    tracing::info!(
        http_port = config.http_port,
        data_dir = %config.database.data_dir,
        db = %config.database.redacted_url(),
        enrichment = config.enrichment_enabled(),
        ai = config.ai_enabled(),
        "rivalwatch-server starting"
    );

    let jwt_secret = match config.auth.secret_key.clone() {
        Some(secret) => secret,
        None => {
            tracing::warn!("SECRET_KEY not set, using a random secret; sessions end on restart");
            random_secret()
        }
    };

    let store = Arc::new(open_store(&config).await?);
    let enricher = build_enricher(&config)?;
    let generator = build_generator(&config)?;
    let http_port = config.http_port;
    let state = AppState::new(store, config, jwt_secret, enricher, generator);

    let http_addr: SocketAddr = format!("0.0.0.0:{http_port}").parse()?;
    let app = app::build_http_app(state);
    let listener = tokio::net::TcpListener::bind(http_addr)
        .await
        .with_context(|| format!("Failed to bind {http_addr}"))?;

    tracing::info!(http = %http_addr, "Server started");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        signal::ctrl_c().await.ok();
        tracing::info!("Shutting down gracefully");
    })
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}
