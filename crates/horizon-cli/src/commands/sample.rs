//! Sample command - download one of the mission catalogs.

use std::fs;
use std::path::PathBuf;

use colored::Colorize;
use horizon::HorizonConfig;
use horizon::samples::{SampleDataset, SampleFetcher};

pub fn run(
    config: HorizonConfig,
    sample: SampleDataset,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let fetcher = SampleFetcher::with_urls(config.sample_urls)?;

    println!(
        "{} {} from {}",
        "Downloading".cyan().bold(),
        sample.to_string().white().bold(),
        fetcher.url(sample)
    );
    let bytes = fetcher.fetch(sample)?;

    let output_path = output.unwrap_or_else(|| PathBuf::from(sample.file_name()));
    fs::write(&output_path, &bytes)?;

    println!(
        "{} {} ({} bytes)",
        "Saved to".green().bold(),
        output_path.display().to_string().white(),
        bytes.len()
    );
    Ok(())
}
