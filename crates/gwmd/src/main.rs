//! gwmd - Gateway Manager Daemon
//!
//! REST API for managing gateways and the devices attached to them.
//!
//! Usage:
//!   gwmd [OPTIONS] [config.toml]
//!
//! Without a config file or `MONGO_URI` the daemon serves from an in-memory
//! store, which is handy for demos and local testing.

mod config;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use gwm_api::{create_router, AppState};
use gwm_core::{GatewayDraft, GatewayService, GatewayStore, MemoryStore};
use gwm_mongo::MongoStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, LogFormat, Overrides, StoreBackend};

const DEFAULT_LOG_FILTER: &str =
    "gwmd=info,gwm_api=info,gwm_core=info,gwm_mongo=info,tower_http=info";

#[derive(Parser)]
#[command(name = "gwmd")]
#[command(version, about = "Gateway manager daemon")]
struct Args {
    /// Server config file (TOML)
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "GWM_HOST")]
    host: Option<std::net::IpAddr>,

    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// MongoDB connection string; selects the MongoDB store
    #[arg(long, env = "MONGO_URI")]
    mongo_uri: Option<String>,

    /// MongoDB database name
    #[arg(long, env = "GWM_DATABASE")]
    database: Option<String>,

    /// MongoDB collection name
    #[arg(long, env = "GWM_COLLECTION")]
    collection: Option<String>,

    /// JSON file with an array of gateways to load at startup
    #[arg(long, value_name = "FILE")]
    seed: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            host: self.host,
            port: self.port,
            log_format: self.log_format,
            mongo_uri: self.mongo_uri.clone(),
            database: self.database.clone(),
            collection: self.collection.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    config.apply(args.overrides());

    init_logging(config.server.log_format);
    tracing::info!("Starting gwmd (Gateway Manager Daemon)");
    if let Some(path) = &args.config {
        tracing::info!("Loaded config from: {}", path.display());
    }

    let store = open_store(&config).await?;
    let state = AppState::new(store).with_request_timeout(config.request_timeout());

    if let Some(path) = &args.seed {
        seed_store(state.service(), path).await?;
    }

    let app = create_router(state);

    let addr = config.listen_addr();
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_logging(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

async fn open_store(config: &Config) -> anyhow::Result<Arc<dyn GatewayStore>> {
    match config.store.backend {
        StoreBackend::Memory => {
            tracing::info!("No database configured, using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Mongodb => {
            let mongo = config.mongo();
            let store = MongoStore::connect(&mongo).await.with_context(|| {
                format!("Failed to connect to MongoDB database {}", mongo.database)
            })?;
            Ok(Arc::new(store))
        }
    }
}

/// Load seed gateways from a JSON file, skipping serials already stored
async fn seed_store(service: &GatewayService, path: &Path) -> anyhow::Result<()> {
    let drafts = load_seed_file(path)?;
    let inserted = service
        .seed(&drafts)
        .await
        .with_context(|| format!("Failed to seed gateways from {}", path.display()))?;

    tracing::info!(
        "Seeded {} of {} gateways from {}",
        inserted,
        drafts.len(),
        path.display()
    );
    Ok(())
}

fn load_seed_file(path: &Path) -> anyhow::Result<Vec<GatewayDraft>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file {}", path.display()))?;
    let drafts = serde_json::from_str(&content).with_context(|| {
        format!("Seed file {} is not a JSON array of gateways", path.display())
    })?;
    Ok(drafts)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}
