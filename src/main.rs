//! Job board dashboard CLI - fetch role dashboards from the job board backend
//!
//! Loads the job seeker or employer dashboard, optionally following it with
//! auto-refresh until interrupted.

use clap::Parser;

use jobdash::app;
use jobdash::cli::{Cli, RunConfig};
use jobdash::logging::init_logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match RunConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };

    init_logging(config.verbosity);

    if let Err(e) = app::run(config).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
