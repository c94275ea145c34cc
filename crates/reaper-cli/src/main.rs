//! upload-reaper: deletes forum uploads nothing refers to any more.
//!
//! Configuration is read from the environment, optionally via a `.env` file.

use anyhow::Context;
use clap::{Parser, Subcommand};
use reaper_cli::{build_reaper, setup_database};
use reaper_core::Config;
use reaper_infra::init_telemetry;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "upload-reaper", about = "Orphan upload reaper")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run cleanup on a fixed interval until interrupted
    Run,
    /// Run a single cleanup cycle and print its summary
    Once,
    /// Print the resolved site settings and ignore list
    Settings,
}

#[derive(Serialize)]
struct SettingsReport<'a> {
    settings: &'a reaper_core::ReaperSettings,
    effective_grace_period_hours: i64,
    ignored_urls: &'a [String],
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    init_telemetry("upload-reaper", &config.environment, config.log_format)
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    let pool = setup_database(&config).await?;
    let reaper = build_reaper(&config, pool).await?;

    match cli.command {
        Commands::Run => {
            let handle = reaper.start();
            tokio::signal::ctrl_c()
                .await
                .context("Failed to listen for shutdown signal")?;
            tracing::info!("Shutdown signal received, stopping reaper");
            handle.abort();
        }
        Commands::Once => {
            let summary = reaper.run_once().await.context("Cleanup cycle failed")?;
            print_json(&summary)?;
        }
        Commands::Settings => {
            let (settings, ignore_list) = reaper
                .resolve_settings()
                .await
                .context("Failed to resolve site settings")?;
            print_json(&SettingsReport {
                settings: &settings,
                effective_grace_period_hours: settings.effective_grace_period_hours(),
                ignored_urls: ignore_list.urls(),
            })?;
        }
    }

    Ok(())
}
