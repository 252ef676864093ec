//! Train command - fit a backend on an export and report held-out metrics.

use std::path::PathBuf;

use colored::Colorize;
use horizon::model::artifact;
use horizon::{Horizon, HorizonConfig, Hyperparameters};

use crate::cli::BackendChoice;

pub fn run(
    config: HorizonConfig,
    file: PathBuf,
    backend: BackendChoice,
    hyperparameters: Hyperparameters,
    save: Option<PathBuf>,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let horizon = Horizon::with_config(config);
    let (dataset, _source) = horizon.harmonize_file(&file)?;

    if !json_output {
        println!(
            "{} {} on {} rows ({})",
            "Training".cyan().bold(),
            backend.as_str().white().bold(),
            dataset.row_count(),
            dataset.feature_names.join(", ")
        );
    }

    let outcome = horizon.train(&dataset, backend.as_str(), &hyperparameters)?;

    if let Some(ref path) = save {
        artifact::save(&outcome.model, path)?;
    }

    let result = &outcome.result;
    if json_output {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    println!();
    println!(
        "Split: {} train / {} test, {} objective, {} rounds",
        result.train_rows,
        result.test_rows,
        result.objective,
        result.rounds
    );
    if let Some(best) = result.best_iteration {
        println!("Best iteration: {}", best);
    }
    println!(
        "Accuracy: {}",
        format!("{:.4}", result.accuracy).green().bold()
    );
    if let Some(auc) = result.auc_score {
        println!("AUC: {}", format!("{:.4}", auc).green().bold());
    }

    println!();
    println!("{}", "Confusion matrix (rows = actual):".yellow().bold());
    let labels = &result.confusion_matrix.labels;
    print!("  {:16}", "");
    for label in labels {
        print!("{:>16}", label.label());
    }
    println!();
    for (label, row) in labels.iter().zip(&result.confusion_matrix.matrix) {
        print!("  {:16}", label.label());
        for count in row {
            print!("{:>16}", count);
        }
        println!();
    }

    if let Some(path) = save {
        println!();
        println!(
            "{} {}",
            "Saved model to".green().bold(),
            path.display().to_string().white()
        );
    }

    Ok(())
}
