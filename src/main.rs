mod commands;

use clap::Parser;
use color_eyre::Result;
use crewtech_kv::{Config, KvClient};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "crewtech-kv")]
#[command(about = "CrewTech key-value store client with local fallback")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/crewtech-kv/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: commands::Command,
}

/// Log to a daily file so stdout only carries command output.
fn init_logging() -> Option<WorkerGuard> {
  let log_dir = dirs::data_dir()
    .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))?
    .join("crewtech-kv")
    .join("logs");

  let appender = tracing_appender::rolling::daily(log_dir, "crewtech-kv.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("crewtech_kv=info"));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(writer)
    .with_ansi(false)
    .init();

  Some(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;
  let _guard = init_logging();

  let args = Args::parse();

  // Load configuration
  let config = Config::load(args.config.as_deref())?;

  let client = KvClient::from_config(&config)?;
  let output = commands::execute(&client, args.command).await?;
  println!("{}", serde_json::to_string_pretty(&output)?);

  Ok(())
}
