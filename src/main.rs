//! # Rights Screener Main Driver
//!
//! ## Purpose
//! Main entry point for the rights screener server. Orchestrates startup of
//! all pipeline components and serves the screening API.
//!
//! ## Input/Output Specification
//! - **Input**: Configuration files, command line arguments, environment
//!   variables
//! - **Output**: Running web server with the screening API endpoints
//! - **Initialization**: Loads corpora, builds indexes, starts the server
//!
//! ## Architecture Flow
//! 1. Parse command line arguments and load configuration
//! 2. Initialize logging and tracing
//! 3. Load both reference corpora (fatal on failure)
//! 4. Build embedding indexes and the screening engine
//! 5. Start web API server
//! 6. Handle shutdown signals gracefully

use clap::{Arg, Command};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use rights_screener::{
    api::ApiServer,
    config::Config,
    corpus::CorpusStore,
    errors::{Result, ScreenerError},
    gateway::GeminiBackend,
    screener::ScreeningEngine,
    AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("rights-screener-server")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Legal Search Team")
        .about("Retrieval-augmented screening of incident descriptions against constitutional articles")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config.toml"),
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("Server port")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("check-corpus")
                .long("check-corpus")
                .help("Validate the reference corpora and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let config_path = matches.get_one::<String>("config").expect("has default");
    let mut config = Config::from_file(config_path)?;

    if let Some(port) = matches.get_one::<u16>("port") {
        config.server.port = *port;
    }

    let config = Arc::new(config);
    init_logging(&config)?;

    info!("Starting Rights Screener v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded from: {}", config_path);

    // Corpus load is fatal: the system cannot operate without reference law
    let store = Arc::new(CorpusStore::load(
        &config.corpus.articles_path,
        &config.corpus.cases_path,
    )?);
    info!(
        articles = store.articles().len(),
        cases = store.cases().len(),
        "Reference corpora loaded"
    );

    if matches.get_flag("check-corpus") {
        info!("Corpus check passed");
        return Ok(());
    }

    if config.reasoning.api_key.is_none() {
        warn!("No reasoning API key configured; backend calls will likely fail");
    }

    let backend = Box::new(GeminiBackend::new(&config.reasoning)?);
    let engine = Arc::new(ScreeningEngine::new(&config, store, backend));

    let app_state = AppState {
        config: config.clone(),
        engine,
        started_at: chrono::Utc::now(),
    };

    // bind() hands back a Send driver future, so it can run on its own task
    let server = ApiServer::new(app_state).bind()?;
    let server_handle = tokio::spawn(server);

    info!(
        "Rights Screener started on {}:{}",
        config.server.host, config.server.port
    );

    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Received SIGINT, shutting down gracefully...");
        }
        result = server_handle => {
            if let Ok(Err(e)) = result {
                error!("Server error: {}", e);
            }
            warn!("Server stopped unexpectedly");
        }
    }

    info!("Rights Screener shut down successfully");
    Ok(())
}

/// Initialize logging and tracing
fn init_logging(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .map_err(|_| ScreenerError::Config {
            message: format!("Invalid log level: {}", config.logging.level),
        })?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.logging.json_format {
        builder.json().init();
    } else {
        builder.init();
    }

    info!("Logging initialized with level: {}", config.logging.level);
    Ok(())
}
