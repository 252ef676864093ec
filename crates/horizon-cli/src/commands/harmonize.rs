//! Harmonize command - write the canonical table and print a summary.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use colored::Colorize;
use horizon::export::{self, PROCESSED_FILE_NAME};
use horizon::harmonize::FeatureKind;
use horizon::{Horizon, HorizonConfig, UploadSummary};

pub fn run(
    config: HorizonConfig,
    file: PathBuf,
    output: Option<PathBuf>,
    json_output: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let horizon = Horizon::with_config(config);
    let (dataset, source) = horizon.harmonize_file(&file)?;

    let output_path = output.unwrap_or_else(|| file.with_file_name(PROCESSED_FILE_NAME));
    export::write_frame(&dataset.canonical, BufWriter::new(File::create(&output_path)?))?;

    if json_output {
        let summary = UploadSummary {
            source,
            report: dataset.report.clone(),
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let report = &dataset.report;
    println!(
        "{} {}",
        "Harmonized".cyan().bold(),
        file.display().to_string().white()
    );
    println!();
    println!(
        "Header at line {} ({} preamble lines skipped)",
        report.header_line.to_string().white().bold(),
        report.header_line
    );
    println!("Target column: {}", report.target_column.white().bold());
    if let Some(ref id) = report.identifier_column {
        println!("Identifier column: {}", id);
    }
    println!(
        "Rows: {} kept, {} dropped for unknown labels",
        report.kept_rows.to_string().green(),
        report.dropped_rows.to_string().yellow()
    );
    println!(
        "Features: {} ({} cells imputed)",
        dataset.feature_names.join(", ").white(),
        report.imputed_cells()
    );

    if verbose {
        println!();
        println!("{}", "Columns:".yellow().bold());
        for mapping in &report.features {
            let median = mapping
                .median
                .map(|m| format!("{:.4}", m))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  {:16} -> {:12} {:8} missing={:<6} median={}",
                mapping.source,
                mapping.canonical,
                format!("{:?}", mapping.kind),
                mapping.missing,
                median
            );
        }
    }

    let excluded = report.excluded_features();
    if !excluded.is_empty() {
        println!(
            "{} not used as model input: {}",
            "Note:".yellow(),
            excluded.join(", ")
        );
    }
    if report.features.iter().any(|f| f.kind == FeatureKind::Empty) {
        println!("{} some selected columns were entirely empty", "Note:".yellow());
    }

    println!();
    println!(
        "{} {}",
        "Saved to".green().bold(),
        output_path.display().to_string().white()
    );

    Ok(())
}
