mod api;
mod config;
mod events;
mod provider;
mod ui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::Config;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rosachat")]
#[command(version)]
#[command(about = "Terminal chat client for the ROSA assistant backend", long_about = None)]
struct Cli {
    /// Backend base URL (overrides the config file)
    #[arg(long)]
    backend: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the backend health report and exit
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(backend) = cli.backend {
        config.backend_url = backend;
    }

    match cli.command {
        Some(Commands::Health) => print_health(&config).await,
        None => {
            init_tracing(&config)?;
            ui::run(config).await
        }
    }
}

async fn print_health(config: &Config) -> Result<()> {
    let api = api::ApiClient::new(config.backend_url.clone());
    let report = api
        .health()
        .await
        .with_context(|| format!("backend at {} is unreachable", config.backend_url))?;

    println!("Status:   {}", report.status);
    println!("Provider: {}", report.provider);
    if !report.cli_tools.is_empty() {
        println!("CLI tools:");
        for (tool, version) in &report.cli_tools {
            println!("  {}: {}", tool, version.lines().next().unwrap_or_default());
        }
    }
    Ok(())
}

/// Diagnostics go to a file; the TUI owns the terminal.
fn init_tracing(config: &Config) -> Result<()> {
    let path = config.log_path()?;
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_env("ROSACHAT_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(file)
        .with_ansi(false)
        .init();
    Ok(())
}
