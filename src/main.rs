use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use camionback::{
    config::Config,
    database::Database,
    distance::{CityPairCache, DistanceMatrixClient, DistanceResolver, RouteSource},
    web::{AppState, WebServer},
};

#[derive(Parser)]
#[command(name = "camionback")]
#[command(version)]
#[command(about = "Backend service for the CamionBack logistics marketplace")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Listening IP address
    #[arg(short = 'H', long, value_name = "IP")]
    host: Option<String>,

    /// Listening port
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Database URL (overrides config file)
    #[arg(short = 'd', long, value_name = "URL")]
    database_url: Option<String>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging with specified level
    let log_filter = if cli.log_level == "trace" {
        format!("camionback={},tower_http=trace", cli.log_level)
    } else {
        format!("camionback={}", cli.log_level)
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CamionBack backend v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration from specified file
    std::env::set_var("CONFIG_FILE", &cli.config);
    let mut config = Config::load()?;
    info!("Configuration loaded from: {}", cli.config);

    // Override config with CLI arguments
    if let Some(host) = cli.host {
        config.web.host = host;
    }
    if let Some(port) = cli.port {
        config.web.port = port;
    }
    if let Some(database_url) = cli.database_url {
        config.database.url = database_url;
    }

    info!("Using database: {}", config.database.url);

    let database = Database::new(&config.database).await?;
    database.migrate().await?;
    info!("Database connection established and migrations applied");

    // Distance resolver: an absent routing credential is a degraded mode,
    // not a startup failure.
    let route_source: Option<Arc<dyn RouteSource>> = match DistanceMatrixClient::new(&config.routing)
    {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            warn!("Routing integration disabled: {}", e);
            None
        }
    };
    let cache = CityPairCache::new(config.routing.cache_ttl_days);
    let resolver = Arc::new(DistanceResolver::new(route_source, cache));
    info!("Distance resolver initialized");

    let state = AppState::new(config, database, resolver);
    let web_server = WebServer::new(state)?;

    info!(
        "Starting web server on {}:{}",
        web_server.host(),
        web_server.port()
    );
    web_server.serve().await?;

    Ok(())
}
