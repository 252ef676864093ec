//! Horizon CLI - exoplanet survey harmonization and classification.

mod cli;
mod commands;
mod logging;
mod server;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = match commands::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Serve { port, models } => commands::serve::run(config, port, models),

        Commands::Harmonize { file, output, json } => {
            commands::harmonize::run(config, file, output, json, cli.verbose)
        }

        Commands::Train {
            file,
            backend,
            n_estimators,
            max_depth,
            learning_rate,
            num_leaves,
            save,
            json,
        } => commands::train::run(
            config,
            file,
            backend,
            horizon::Hyperparameters {
                n_estimators,
                max_depth,
                learning_rate,
                num_leaves,
            },
            save,
            json,
        ),

        Commands::Predict {
            file,
            model,
            models,
            output,
        } => commands::predict::run(config, file, model, models, output, cli.verbose),

        Commands::Sample { name, output } => commands::sample::run(config, name.into(), output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
