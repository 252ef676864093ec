//! CSV downloads of harmonized data and predictions.

use std::io::Write;

use crate::error::{HorizonError, Result};
use crate::schema::{Frame, TargetClass};
use crate::training::BackendKind;

/// Download name of the processed (canonical) dataset.
pub const PROCESSED_FILE_NAME: &str = "processed_data.csv";

/// Download name of the prediction report.
pub const PREDICTIONS_FILE_NAME: &str = "orbital_horizon_predictions.csv";

/// Download name of a trained model artifact.
pub fn model_file_name(backend: BackendKind) -> String {
    format!("trained_{}_model.json", backend)
}

/// Write a frame as CSV with a header row.
pub fn write_frame<W: Write>(frame: &Frame, writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(frame.column_names())?;
    for row in 0..frame.row_count() {
        csv.write_record(frame.columns().iter().map(|c| c.values.cell(row)))?;
    }
    flush(csv)
}

/// A frame rendered as CSV bytes.
pub fn frame_csv(frame: &Frame) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_frame(frame, &mut buf)?;
    Ok(buf)
}

/// The unscaled table joined with predictions, as CSV.
///
/// Two columns are appended: `prediction` (ordinal) and `prediction_label`.
pub fn write_predictions<W: Write>(
    unscaled: &Frame,
    predictions: &[TargetClass],
    writer: W,
) -> Result<()> {
    if predictions.len() != unscaled.row_count() {
        return Err(HorizonError::Prediction(format!(
            "{} predictions for {} rows",
            predictions.len(),
            unscaled.row_count()
        )));
    }

    let mut csv = csv::Writer::from_writer(writer);
    let mut header: Vec<&str> = unscaled.column_names();
    header.extend(["prediction", "prediction_label"]);
    csv.write_record(&header)?;

    for (row, class) in predictions.iter().enumerate() {
        let mut record: Vec<String> = unscaled.columns().iter().map(|c| c.values.cell(row)).collect();
        record.push(class.ordinal().to_string());
        record.push(class.label().to_string());
        csv.write_record(&record)?;
    }
    flush(csv)
}

/// Prediction report as CSV bytes.
pub fn predictions_csv(unscaled: &Frame, predictions: &[TargetClass]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_predictions(unscaled, predictions, &mut buf)?;
    Ok(buf)
}

fn flush<W: Write>(mut csv: csv::Writer<W>) -> Result<()> {
    csv.flush()
        .map_err(|e| HorizonError::Persistence(format!("Failed to write CSV: {}", e)))
}
