//! Predict command - classify an export with a pretrained or supplied model.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;

use colored::Colorize;
use horizon::dispatch::PredictionSource;
use horizon::export::{self, PREDICTIONS_FILE_NAME};
use horizon::{Horizon, HorizonConfig, TargetClass};

pub fn run(
    mut config: HorizonConfig,
    file: PathBuf,
    model: Option<PathBuf>,
    models: Option<PathBuf>,
    output: Option<PathBuf>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }
    if let Some(dir) = models {
        config.model_dir = dir;
    }

    let horizon = Horizon::with_config(config);
    let (dataset, _source) = horizon.harmonize_file(&file)?;

    let batch = match model {
        Some(path) => {
            let bytes = fs::read(&path)?;
            horizon.predict_with_supplied(&dataset, &bytes)?
        }
        None => horizon.predict_pretrained(&dataset)?,
    };

    let output_path = output.unwrap_or_else(|| file.with_file_name(PREDICTIONS_FILE_NAME));
    export::write_predictions(
        &dataset.unscaled,
        &batch.predictions,
        BufWriter::new(File::create(&output_path)?),
    )?;

    let source = match batch.source {
        PredictionSource::Pretrained { model } => format!("pretrained {} model", model),
        PredictionSource::Supplied => "supplied model".to_string(),
    };
    println!(
        "{} {} rows with the {}",
        "Classified".cyan().bold(),
        batch.count.to_string().white().bold(),
        source
    );

    for class in TargetClass::ALL {
        let count = batch.predictions.iter().filter(|p| **p == class).count();
        println!("  {:16} {}", class.label(), count);
    }

    if verbose {
        println!();
        println!("{}", "First rows:".yellow().bold());
        for (record, class) in batch.display_rows.iter().zip(&batch.predictions).take(5) {
            println!("  {} -> {}", serde_json::to_string(record)?, class.label());
        }
    }

    println!();
    println!(
        "{} {}",
        "Saved to".green().bold(),
        output_path.display().to_string().white()
    );

    Ok(())
}
