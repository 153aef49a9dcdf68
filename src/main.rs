use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use validator::Validate;

use shopscrape::config::LoggingConfig;
use shopscrape::session::{DEFAULT_MAX_PRODUCTS, DEFAULT_PAGES};
use shopscrape::web::{create_router, AppState, ScrapeOutcome};
use shopscrape::{cache, snapshot};
use shopscrape::{AppConfig, PluginManager, ProxyConfig, ScrapeSession, SessionRequest};

#[derive(Parser)]
#[command(name = "shopscrape", about = "Proxy-routed product listing scraper", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory holding default.toml, {RUN_MODE}.toml and local.toml
    #[arg(long, default_value = "config", global = true)]
    config: PathBuf,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP API
    Serve,

    /// Run one scrape session and print the result
    Scrape {
        /// Proxy entry as scheme=endpoint, e.g. http=http://10.0.0.1:3128 (repeatable)
        #[arg(long = "proxy", required = true)]
        proxies: Vec<String>,

        #[arg(long, default_value_t = DEFAULT_PAGES)]
        pages: u32,

        #[arg(long, default_value_t = DEFAULT_MAX_PRODUCTS)]
        max_products: usize,
    },
}

fn init_tracing(verbose: u8, logging: &LoggingConfig) -> Option<WorkerGuard> {
    let default_filter = match verbose {
        0 => "shopscrape=info,tower_http=info,warn",
        1 => "shopscrape=debug,tower_http=debug,info",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let stdout = if logging.json {
        fmt::layer().json().boxed()
    } else {
        fmt::layer().compact().with_target(false).boxed()
    };

    let (file, guard) = match &logging.directory {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "shopscrape.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout)
        .with(file)
        .init();

    guard
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutting down...");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("Failed to load configuration from {:?}", cli.config))?;
    let _guard = init_tracing(cli.verbose, &config.logging);

    snapshot::ensure_dirs(&config.storage).await?;
    let cache = cache::connect(&config.cache).await?;
    let plugins = PluginManager::from_config(&config).await;

    match cli.command {
        Command::Serve => {
            let addr = format!("{}:{}", config.server.host, config.server.port);
            let listener = TcpListener::bind(&addr)
                .await
                .with_context(|| format!("Failed to bind {}", addr))?;

            info!("Starting Shopscrape on {}", addr);
            let app = create_router(AppState::new(config, cache, plugins));
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }

        Command::Scrape {
            proxies,
            pages,
            max_products,
        } => {
            let proxy = proxies
                .iter()
                .map(|p| ProxyConfig::parse_pair(p))
                .collect::<shopscrape::Result<ProxyConfig>>()?;
            let request = SessionRequest {
                pages,
                max_products,
            };
            request.validate()?;

            let session = ScrapeSession::with_proxy(&config, &proxy, cache, plugins)?;
            let summary = session.run(&request).await?;

            println!("{}", ScrapeOutcome::new(summary.scraped_count, max_products).message);
            println!("Snapshot: {:?}", config.storage.snapshot_path());
        }
    }

    Ok(())
}
