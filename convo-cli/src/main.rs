//! CLI entry point for convo

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use convo_core::config::{config_warnings, Config, ConfigLoader};
use convo_core::logging::init_logging;
use convo_core::session::{SessionReaper, SessionStore};
use convo_core::utils::mask_secret;
use convo_manager::{run_server, AppState, ChatService};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "convo")]
#[command(about = "Chat session context server")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration directory
    #[arg(short, long, global = true)]
    config_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// Address to bind, overrides server.host
        #[arg(long)]
        host: Option<String>,
        /// Port to bind, overrides server.port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let config_loader = if let Some(dir) = cli.config_dir {
        ConfigLoader::with_dir(dir)
    } else {
        ConfigLoader::new()
    };

    match cli.command {
        Commands::Serve { host, port } => run_serve(&config_loader, host, port).await,
        Commands::Config => run_config(&config_loader),
    }
}

async fn run_serve(loader: &ConfigLoader, host: Option<String>, port: Option<u16>) -> Result<()> {
    let mut config = loader.load()?;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let _log_guard = init_logging(&config.logging);
    info!("Config directory: {}", loader.config_dir().display());
    for warning in config_warnings(&config) {
        warn!("{}", warning);
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "invalid listen address {}:{}",
                config.server.host, config.server.port
            )
        })?;

    let store = Arc::new(SessionStore::new(config.sessions.clone()));
    let generator = convo_providers::from_config(&config.generator)?;
    info!("Using reply generator: {}", generator.name());
    let service = Arc::new(ChatService::new(Arc::clone(&store), generator));

    let reaper = config.sessions.reap_interval().map(|interval| {
        let reaper = SessionReaper::new(Arc::clone(&store), interval);
        let cancel = reaper.cancellation_token();
        (cancel, reaper.spawn())
    });

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            // Keep the sender alive so the server is not shut down by accident.
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl-C, shutting down");
        let _ = shutdown_tx.send(());
    });

    let state = AppState::new(service, config.server.clone());
    let result = run_server(state, addr, shutdown_rx).await;

    if let Some((cancel, handle)) = reaper {
        cancel.cancel();
        let _ = handle.await;
    }

    result
}

fn run_config(loader: &ConfigLoader) -> Result<()> {
    let mut config: Config = loader.load()?;
    for warning in config_warnings(&config) {
        eprintln!("{} {}", style("warning:").yellow().bold(), warning);
    }
    config.generator.api_key = mask_secret(&config.generator.api_key);

    println!("{}", style("convo configuration").bold().cyan());
    println!("Config file: {}\n", loader.config_path().display());
    println!("{}", serde_json::to_string_pretty(&config)?);

    Ok(())
}
