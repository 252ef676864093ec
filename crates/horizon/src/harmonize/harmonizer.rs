//! The schema harmonizer.

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use super::impute::impute_median;
use super::report::{FeatureKind, FeatureMapping, HarmonizationReport};
use crate::error::{HorizonError, Result};
use crate::input::{DataTable, LocatedTable};
use crate::schema::vocabulary::{
    CANONICAL_ORDER, FEATURE_KEYWORDS, IDENTIFIER_ALIASES, TARGET_ALIASES, TARGET_COLUMN,
    canonical_name, encode_label,
};
use crate::schema::{Column, ColumnRole, ColumnValues, Frame, TargetClass};

/// Rows shown in the report previews.
const PREVIEW_ROWS: usize = 5;

/// Output of a successful harmonization.
#[derive(Debug, Clone, PartialEq)]
pub struct HarmonizedDataset {
    /// Model-ready table: canonical features, `target`, identifier.
    pub canonical: Frame,
    /// Display table: original feature headers, `target`, identifier.
    pub unscaled: Frame,
    /// Feature columns of the canonical table, in order.
    pub feature_names: Vec<String>,
    pub report: HarmonizationReport,
}

impl HarmonizedDataset {
    /// Number of rows in both tables.
    pub fn row_count(&self) -> usize {
        self.canonical.row_count()
    }

    /// Encoded targets.
    pub fn targets(&self) -> &[TargetClass] {
        self.canonical.target().unwrap_or(&[])
    }
}

/// A selected feature column read from the surviving rows.
struct SelectedFeature {
    source: String,
    canonical: String,
    parsed: ParsedColumn,
}

enum ParsedColumn {
    Numeric { values: Vec<f64>, median: f64, missing: usize },
    Text(Vec<String>),
    Empty { missing: usize },
}

/// Maps a located survey table onto the canonical schema.
///
/// Harmonization is a pure function of the input table and the static
/// vocabularies in [`crate::schema::vocabulary`].
#[derive(Debug, Clone, Default)]
pub struct SchemaHarmonizer;

impl SchemaHarmonizer {
    /// Create a harmonizer.
    pub fn new() -> Self {
        Self
    }

    /// Harmonize a located table, recording its header offset in the report.
    pub fn harmonize_located(&self, located: &LocatedTable) -> Result<HarmonizedDataset> {
        let mut dataset = self.harmonize(&located.table)?;
        dataset.report.header_line = located.header_line;
        Ok(dataset)
    }

    /// Harmonize a parsed table.
    pub fn harmonize(&self, table: &DataTable) -> Result<HarmonizedDataset> {
        // Feature selection, in keyword order.
        let feature_columns: Vec<&str> = FEATURE_KEYWORDS
            .iter()
            .copied()
            .filter(|k| table.has_column(k))
            .collect();

        let target_column = TARGET_ALIASES
            .iter()
            .copied()
            .find(|t| table.has_column(t))
            .ok_or_else(|| HorizonError::NoTargetColumn {
                expected: TARGET_ALIASES.join(", "),
            })?;

        let identifier_column = IDENTIFIER_ALIASES.iter().copied().find(|c| table.has_column(c));

        // Target encoding; rows with unknown labels are dropped, order kept.
        let labels = table.column_by_name(target_column).unwrap_or_default();
        let mut kept_rows = Vec::with_capacity(labels.len());
        let mut targets = Vec::with_capacity(labels.len());
        for (row, label) in labels.iter().enumerate() {
            match encode_label(label) {
                Some(class) => {
                    kept_rows.push(row);
                    targets.push(class);
                }
                None => debug!(row, label = %label, "dropping row with unknown label"),
            }
        }
        let dropped_rows = table.row_count() - kept_rows.len();

        let selected: Vec<SelectedFeature> = feature_columns
            .iter()
            .map(|&source| SelectedFeature {
                source: source.to_string(),
                canonical: canonical_name(source).to_string(),
                parsed: parse_column(table, source, &kept_rows),
            })
            .collect();

        let row_count = kept_rows.len();
        let target_values = ColumnValues::Target(targets.clone());
        let identifier_values = identifier_column.map(|name| {
            let index = table.column_index(name).unwrap_or_default();
            let values = kept_rows
                .iter()
                .map(|&row| table.get(row, index).unwrap_or("").to_string())
                .collect();
            (name, ColumnValues::Text(values))
        });

        // Canonical table: numeric features only, first source wins on collisions.
        let mut canonical_features: IndexMap<String, Vec<f64>> = IndexMap::new();
        let mut in_canonical = vec![false; selected.len()];
        for (i, feature) in selected.iter().enumerate() {
            let ParsedColumn::Numeric { values, .. } = &feature.parsed else {
                continue;
            };
            if canonical_features.contains_key(&feature.canonical) {
                warn!(
                    source = %feature.source,
                    canonical = %feature.canonical,
                    "canonical name already taken, dropping column"
                );
                continue;
            }
            canonical_features.insert(feature.canonical.clone(), values.clone());
            in_canonical[i] = true;
        }
        // Only names with a slot in the canonical order survive projection.
        for (i, feature) in selected.iter().enumerate() {
            if in_canonical[i] && !CANONICAL_ORDER.contains(&feature.canonical.as_str()) {
                in_canonical[i] = false;
            }
        }

        let mut canonical = Frame::with_rows(row_count);
        for &name in CANONICAL_ORDER {
            if let Some(values) = canonical_features.swap_remove(name) {
                canonical.push(Column::new(
                    name,
                    ColumnRole::Feature,
                    ColumnValues::Numeric(values),
                ));
            }
        }
        canonical.push(Column::new(TARGET_COLUMN, ColumnRole::Target, target_values.clone()));
        if let Some((name, values)) = &identifier_values {
            canonical.push(Column::new(*name, ColumnRole::Identifier, values.clone()));
        }

        // Unscaled table keeps the original headers for display and dispatch.
        let mut unscaled = Frame::with_rows(row_count);
        for feature in &selected {
            let values = match &feature.parsed {
                ParsedColumn::Numeric { values, .. } => ColumnValues::Numeric(values.clone()),
                ParsedColumn::Text(values) => ColumnValues::Text(values.clone()),
                ParsedColumn::Empty { .. } => continue,
            };
            unscaled.push(Column::new(feature.source.as_str(), ColumnRole::Feature, values));
        }
        unscaled.push(Column::new(TARGET_COLUMN, ColumnRole::Target, target_values));
        if let Some((name, values)) = identifier_values {
            unscaled.push(Column::new(name, ColumnRole::Identifier, values));
        }

        let feature_names = canonical.feature_names();
        let unscaled_features = unscaled.feature_names();

        let features: Vec<FeatureMapping> = selected
            .iter()
            .zip(&in_canonical)
            .map(|(feature, &in_canonical)| {
                let (kind, missing, median) = match &feature.parsed {
                    ParsedColumn::Numeric { median, missing, .. } => {
                        (FeatureKind::Numeric, *missing, Some(*median))
                    }
                    ParsedColumn::Text(values) => (
                        FeatureKind::Text,
                        values.iter().filter(|v| DataTable::is_null_value(v)).count(),
                        None,
                    ),
                    ParsedColumn::Empty { missing } => (FeatureKind::Empty, *missing, None),
                };
                FeatureMapping {
                    source: feature.source.clone(),
                    canonical: feature.canonical.clone(),
                    kind,
                    missing,
                    median,
                    in_canonical,
                }
            })
            .collect();

        for mapping in features.iter().filter(|f| f.kind == FeatureKind::Empty) {
            warn!(column = %mapping.source, "column has no values, omitted");
        }

        let missing_counts = canonical
            .columns()
            .iter()
            .map(|c| {
                let missing = match &c.values {
                    ColumnValues::Numeric(v) => v.iter().filter(|x| x.is_nan()).count(),
                    ColumnValues::Text(v) => v.iter().filter(|s| DataTable::is_null_value(s)).count(),
                    ColumnValues::Target(_) => 0,
                };
                (c.name.clone(), missing)
            })
            .collect();

        let report = HarmonizationReport {
            header_line: 0,
            target_column: target_column.to_string(),
            identifier_column: identifier_column.map(str::to_string),
            input_rows: table.row_count(),
            dropped_rows,
            kept_rows: row_count,
            features,
            missing_counts,
            temperature_columns: feature_names
                .iter()
                .filter(|c| c.to_lowercase().contains("teff"))
                .cloned()
                .collect(),
            radius_columns: feature_names
                .iter()
                .filter(|c| c.to_lowercase().contains("rad"))
                .cloned()
                .collect(),
            extracted_raw: unscaled.head_records(PREVIEW_ROWS, &unscaled_features),
            extracted_normalized: canonical.head_records(PREVIEW_ROWS, &feature_names),
            targets_raw: kept_rows
                .iter()
                .take(PREVIEW_ROWS)
                .map(|&row| labels[row].trim().to_string())
                .collect(),
            targets_numeric: targets.iter().take(PREVIEW_ROWS).map(|c| c.ordinal()).collect(),
        };

        info!(
            target_column,
            features = feature_names.len(),
            rows = row_count,
            dropped = dropped_rows,
            "harmonized dataset"
        );

        Ok(HarmonizedDataset {
            canonical,
            unscaled,
            feature_names,
            report,
        })
    }
}

/// Read one source column over the surviving rows and impute if numeric.
fn parse_column(table: &DataTable, name: &str, rows: &[usize]) -> ParsedColumn {
    let index = table.column_index(name).unwrap_or_default();
    let raw: Vec<&str> = rows
        .iter()
        .map(|&row| table.get(row, index).unwrap_or(""))
        .collect();

    let mut numeric = Vec::with_capacity(raw.len());
    for cell in &raw {
        match DataTable::parse_numeric(cell) {
            Ok(value) => numeric.push(value),
            Err(()) => return ParsedColumn::Text(raw.iter().map(|s| s.to_string()).collect()),
        }
    }

    match impute_median(&numeric) {
        Some(imputed) => ParsedColumn::Numeric {
            values: imputed.values,
            median: imputed.median,
            missing: imputed.filled,
        },
        None => ParsedColumn::Empty {
            missing: numeric.len(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> DataTable {
        DataTable::new(
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
            b',',
        )
    }

    #[test]
    fn test_kepler_columns_are_renamed_and_ordered() {
        let t = table(
            &["kepoi_name", "koi_period", "koi_disposition", "koi_prad"],
            &[
                &["K1", "10.5", "CONFIRMED", "2.0"],
                &["K2", "3.2", "FALSE POSITIVE", "1.1"],
                &["K3", "7.7", "CANDIDATE", "0.9"],
            ],
        );
        let ds = SchemaHarmonizer::new().harmonize(&t).unwrap();
        assert_eq!(
            ds.canonical.column_names(),
            vec!["pl_rade", "pl_orbper", "target", "kepoi_name"]
        );
        assert_eq!(
            ds.unscaled.column_names(),
            vec!["koi_prad", "koi_period", "target", "kepoi_name"]
        );
        let ordinals: Vec<u8> = ds.targets().iter().map(|c| c.ordinal()).collect();
        assert_eq!(ordinals, vec![2, 0, 1]);
        assert_eq!(ds.feature_names, vec!["pl_rade", "pl_orbper"]);
        assert_eq!(ds.report.target_column, "koi_disposition");
        assert_eq!(ds.report.identifier_column.as_deref(), Some("kepoi_name"));
    }

    #[test]
    fn test_unknown_labels_drop_rows() {
        let t = table(
            &["disposition", "pl_rade"],
            &[
                &["CONFIRMED", "1.0"],
                &["confirmed", "2.0"],
                &["MYSTERY", "3.0"],
                &["PC", "4.0"],
            ],
        );
        let ds = SchemaHarmonizer::new().harmonize(&t).unwrap();
        assert_eq!(ds.row_count(), 2);
        assert_eq!(ds.report.dropped_rows, 2);
        assert_eq!(ds.canonical.numeric("pl_rade"), Some(&[1.0, 4.0][..]));
        assert_eq!(ds.unscaled.numeric("pl_rade"), Some(&[1.0, 4.0][..]));
    }

    #[test]
    fn test_missing_values_take_median_of_surviving_rows() {
        let t = table(
            &["disposition", "pl_rade", "pl_orbper"],
            &[
                &["CONFIRMED", "1.0", ""],
                &["CANDIDATE", "", "4.0"],
                &["REFUTED", "3.0", "2.0"],
                &["UNKNOWN", "100.0", "100.0"],
            ],
        );
        let ds = SchemaHarmonizer::new().harmonize(&t).unwrap();
        assert_eq!(ds.canonical.numeric("pl_rade"), Some(&[1.0, 2.0, 3.0][..]));
        assert_eq!(ds.canonical.numeric("pl_orbper"), Some(&[3.0, 4.0, 2.0][..]));
        assert!(ds.report.missing_counts.values().all(|&m| m == 0));
        assert_eq!(ds.report.features[0].median, Some(2.0));
        assert_eq!(ds.report.imputed_cells(), 2);
    }

    #[test]
    fn test_no_target_column() {
        let t = table(&["pl_rade"], &[&["1.0"]]);
        let err = SchemaHarmonizer::new().harmonize(&t).unwrap_err();
        assert!(matches!(err, HorizonError::NoTargetColumn { .. }));
    }

    #[test]
    fn test_target_priority_order() {
        let t = table(
            &["disposition", "tfopwg_disp", "pl_rade"],
            &[&["CONFIRMED", "FP", "1.0"]],
        );
        let ds = SchemaHarmonizer::new().harmonize(&t).unwrap();
        assert_eq!(ds.report.target_column, "tfopwg_disp");
        assert_eq!(ds.targets(), &[TargetClass::FalsePositive]);
    }

    #[test]
    fn test_text_feature_stays_out_of_canonical() {
        let t = table(
            &["disposition", "ra", "dec"],
            &[&["CONFIRMED", "19h12m", "10.0"], &["PC", "18h01m", "-5.0"]],
        );
        let ds = SchemaHarmonizer::new().harmonize(&t).unwrap();
        assert_eq!(ds.feature_names, vec!["dec"]);
        assert!(ds.unscaled.has_column("ra"));
        assert_eq!(ds.report.excluded_features(), vec!["ra"]);
    }

    #[test]
    fn test_all_missing_column_is_omitted() {
        let t = table(
            &["disposition", "pl_rade", "pl_eqt"],
            &[&["CONFIRMED", "1.0", ""], &["PC", "2.0", "nan"]],
        );
        let ds = SchemaHarmonizer::new().harmonize(&t).unwrap();
        assert!(!ds.canonical.has_column("pl_eqt"));
        assert!(!ds.unscaled.has_column("pl_eqt"));
        assert_eq!(ds.report.features[1].kind, FeatureKind::Empty);
    }

    #[test]
    fn test_collision_keeps_first_source() {
        let t = table(
            &["disposition", "pl_rade", "koi_prad"],
            &[&["CONFIRMED", "5.0", "1.0"]],
        );
        let ds = SchemaHarmonizer::new().harmonize(&t).unwrap();
        // koi_prad precedes pl_rade in keyword order.
        assert_eq!(ds.canonical.numeric("pl_rade"), Some(&[1.0][..]));
        assert_eq!(ds.feature_names, vec!["pl_rade"]);
        assert!(ds.unscaled.has_column("koi_prad"));
        assert!(ds.unscaled.has_column("pl_rade"));
        assert_eq!(ds.report.excluded_features(), vec!["pl_rade"]);
    }

    #[test]
    fn test_tess_duration_maps_to_canonical_duration() {
        let t = table(
            &["tfopwg_disp", "pl_trandurh", "st_teff", "st_rad"],
            &[&["KP", "2.5", "5700", "1.0"], &["FA", "1.5", "6100", "1.2"]],
        );
        let ds = SchemaHarmonizer::new().harmonize(&t).unwrap();
        assert_eq!(ds.feature_names, vec!["pl_trandur", "st_teff", "st_rad"]);
        assert!(ds.unscaled.has_column("pl_trandurh"));
        assert_eq!(ds.report.temperature_columns, vec!["st_teff"]);
        assert_eq!(ds.report.radius_columns, vec!["st_rad"]);
        assert_eq!(ds.report.targets_raw, vec!["KP", "FA"]);
        assert_eq!(ds.report.targets_numeric, vec![2, 0]);
    }

    #[test]
    fn test_harmonize_is_deterministic() {
        let t = table(
            &["disposition", "pl_rade", "pl_name"],
            &[&["CONFIRMED", "", "a"], &["PC", "2.0", "b"], &["FP", "4.0", "c"]],
        );
        let harmonizer = SchemaHarmonizer::new();
        assert_eq!(harmonizer.harmonize(&t).unwrap(), harmonizer.harmonize(&t).unwrap());
    }
}
