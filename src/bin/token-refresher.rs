use std::path::Path;
use std::time::Duration;

use clap::arg;
use clap::command;
use clap::Parser;
use token_refresher::config::loader;
use token_refresher::server;
use token_refresher::server::routes::PluginState;
use token_refresher::utils::logging;
use anyhow::Result;
use token_refresher::utils::logging::LogLevel;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "token-refresher.yaml")]
    config: String,
    #[arg(long, env = "LOG_LEVEL" , value_enum)]
    log_level: Option<LogLevel>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load YAML settings, init logging
    // -------------------------------

    let args = Args::parse();
    let service_config = loader::file_to_config(Path::new(&args.config))?;
    logging::run(&service_config, args.log_level);
    let settings = &service_config.settings;

    // -------------------------------
    // 2. Prepare plugin state, optionally initialized from file
    // -------------------------------

    let shutdown = CancellationToken::new();
    let plugin_state = PluginState::new(
        Duration::from_millis(settings.refresh_timeout_ms),
        shutdown.clone(),
    );
    if let Some(path) = &settings.plugin_config_path {
        let raw = loader::read_plugin_config(path)?;
        plugin_state.initialize(&raw).await?;
        info!("plugin initialized from {}", path);
    }

    // -------------------------------
    // 3. Stop on ctrl-c, cancelling in-flight refreshes
    // -------------------------------

    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("shutting down");
                signal_shutdown.cancel();
            }
            Err(e) => error!("cannot listen for shutdown signal: {}", e),
        }
    });

    // -------------------------------
    // 4. Serve host requests
    // -------------------------------

    info!("Service starting...");
    server::server::start(settings, plugin_state, shutdown).await
}
