mod config;
mod error;
mod report;
mod state;
mod types;
mod ui;
mod views;

#[cfg(test)]
mod test_support;

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::error::Result;
use crate::state::MarketStore;
use crate::ui::App;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    // The terminal UI owns stdout, so logs go to a file.
    let log_file = match OpenOptions::new().create(true).append(true).open(&cfg.log_file) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Cannot open log file {}: {e}", cfg.log_file.display());
            std::process::exit(1);
        }
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        eprintln!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    info!(
        template = %cfg.template_path.display(),
        output_dir = %cfg.output_dir.display(),
        image_width_in = cfg.image_width_in,
        grid_rows = cfg.grid_rows,
        "Starting report builder",
    );
    if !cfg.template_path.exists() {
        warn!(
            "Template {} does not exist yet; report generation will fail until it does",
            cfg.template_path.display()
        );
    }

    let store = MarketStore::new();
    let mut app = App::new(&cfg, store);
    ui::run(&cfg, &mut app).await?;

    info!("Report builder exited");
    Ok(())
}
