//! Serve command - run the HTTP API.

use std::path::PathBuf;

use colored::Colorize;
use horizon::{Horizon, HorizonConfig};

use crate::server::{app, state::AppState};

pub fn run(
    mut config: HorizonConfig,
    port: u16,
    models: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(dir) = models {
        config.model_dir = dir;
    }
    if !config.model_dir.is_dir() {
        eprintln!(
            "{} model directory {} not found; pretrained prediction will fail",
            "Warning:".yellow(),
            config.model_dir.display()
        );
    }

    println!();
    println!(
        "{} {}",
        "Starting horizon API at".cyan().bold(),
        format!("http://localhost:{}/api", port).white().bold()
    );
    println!();
    println!("  Models: {}", config.model_dir.display());
    println!();
    println!("Press {} to stop the server", "Ctrl+C".yellow().bold());
    println!();

    let state = AppState::new(Horizon::with_config(config));

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(app::run_server(state, port))?;

    Ok(())
}
