mod app;
mod event;
mod ui;

use clap::Parser;
use color_eyre::Result;
use jobscout::api::JobId;
use jobscout::{config, logging};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "jobscout")]
#[command(about = "Search remote developer jobs from the terminal")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/jobscout/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Initial search text
  #[arg(short, long)]
  search: Option<String>,

  /// Job to open on start
  #[arg(short, long)]
  job: Option<JobId>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let config = config::Config::load(args.config.as_deref())?;

  // Logs go to a file; the terminal belongs to the UI
  let _guard = logging::init(&config.log, &config.log_dir()?)?;

  // Initialize and run the app
  let mut app = app::App::new(&config, args.search, args.job)?;
  app.run().await?;

  Ok(())
}
