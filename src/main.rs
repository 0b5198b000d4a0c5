//! Minimal HTTP/1.1 server.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────┐
//!                    │                     SERVER                       │
//!                    │                                                  │
//!   Client Request   │  ┌──────────┐    ┌──────────┐    ┌───────────┐   │
//!   ─────────────────┼─▶│   net    │───▶│  http    │───▶│  routing  │   │
//!                    │  │ listener │    │ request  │    │  router   │   │
//!                    │  └──────────┘    └──────────┘    └─────┬─────┘   │
//!                    │                                        │         │
//!   Client Response  │  ┌──────────┐    ┌──────────┐          ▼         │
//!   ◀────────────────┼──│  http    │◀───│ encoding │◀──── Response      │
//!                    │  │ response │    │  (gzip)  │    (files, echo)   │
//!                    │  └──────────┘    └──────────┘                    │
//!                    │                                                  │
//!                    │   config · observability · lifecycle             │
//!                    └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use file_echo_server::config::{load_config, validate_config, ConfigError, ServerConfig};
use file_echo_server::lifecycle::{shutdown_signal, Shutdown};
use file_echo_server::net::Listener;
use file_echo_server::observability::init_logging;
use file_echo_server::HttpServer;

#[derive(Parser)]
#[command(name = "file-echo-server")]
#[command(about = "Minimal HTTP/1.1 server with echo and file routes", long_about = None)]
struct Cli {
    /// Directory served under /files/
    #[arg(long)]
    directory: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address, overrides the configuration file
    #[arg(short, long)]
    bind: Option<String>,
}

impl Cli {
    fn into_config(self) -> Result<ServerConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ServerConfig::default(),
        };
        if let Some(directory) = self.directory {
            config.files.directory = directory;
        }
        if let Some(bind) = self.bind {
            config.listener.bind_address = bind;
        }
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config()?;

    init_logging(&config.observability)?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_connections = config.listener.max_connections,
        directory = %config.files.directory.display(),
        "Configuration loaded"
    );

    let listener = Listener::bind(&config.listener).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_shutdown.trigger();
    });

    let server = HttpServer::new(config);
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
