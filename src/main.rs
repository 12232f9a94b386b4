use anyhow::{bail, Context, Result};
use clap::Parser;
use gridlock::cli::{Cli, Commands};
use gridlock::config::{ClientConfig, ServerConfig};
use gridlock::network::{Client, Server};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing, RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let overrides = cli.command.raw_options();

    match cli.command {
        Commands::Serve { config, .. } => {
            let server_config = ServerConfig::load(config.as_deref(), overrides)
                .context("Invalid server configuration")?;
            let server = Server::bind(Arc::new(server_config)).await?;

            server
                .run_until(async {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        warn!("Failed to listen for Ctrl-C: {}", e);
                        std::future::pending::<()>().await;
                    }
                })
                .await?;
        }
        Commands::InitConfig { path, force } => {
            let path = match path {
                Some(path) => path,
                None => ServerConfig::default_config_file()?,
            };
            if path.exists() && !force {
                bail!(
                    "Config file {} already exists, use --force to overwrite",
                    path.display()
                );
            }
            ServerConfig::default()
                .save(&path)
                .context("Failed to write config file")?;
            println!("Wrote default configuration to {}", path.display());
        }
        Commands::Connect { .. } => {
            let client_config =
                ClientConfig::from_raw(&overrides).context("Invalid client configuration")?;
            let mut client = Client::connect(&client_config).await?;

            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let status = client.play(stdin).await?;
            info!("Game finished: {}", status);
        }
    }

    Ok(())
}
