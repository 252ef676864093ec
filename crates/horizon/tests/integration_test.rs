//! Integration tests for horizon.

use std::io::Write;

use tempfile::NamedTempFile;

use horizon::dispatch::{MemoryStore, PredictionSource};
use horizon::schema::vocabulary::encode_label;
use horizon::training::Hyperparameters;
use horizon::{
    GradientBoostedModel, Horizon, HorizonConfig, HorizonError, ModelDispatcher, PretrainedModel,
    Session, TargetClass,
};

/// Helper to create a temporary file with given content.
fn create_test_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");
    file
}

fn preamble(lines: usize) -> String {
    (0..lines)
        .map(|i| format!("# NASA Exoplanet Archive export note {}\n", i))
        .collect()
}

/// A Kepler cumulative export with `rows` objects cycling through all labels.
fn kepler_export(rows: usize) -> String {
    let labels = ["CONFIRMED", "FALSE POSITIVE", "CANDIDATE"];
    let mut text = preamble(3);
    text.push_str("kepoi_name,koi_disposition,koi_prad,koi_period,koi_steff\n");
    for i in 0..rows {
        let class = i % 3;
        text.push_str(&format!(
            "K{:05}.01,{},{:.2},{:.3},{}\n",
            i,
            labels[class],
            1.0 + class as f64 * 4.0 + (i % 5) as f64 * 0.1,
            10.0 + (i % 7) as f64,
            5000 + (i % 11) * 10
        ));
    }
    text
}

/// A TESS objects-of-interest export.
fn tess_export(rows: usize) -> String {
    let labels = ["PC", "FP", "KP", "APC"];
    let mut text = preamble(5);
    text.push_str("tic_id,tfopwg_disp,pl_trandurh,pl_rade,pl_orbper\n");
    for i in 0..rows {
        text.push_str(&format!(
            "{},{},{:.2},{:.2},{:.2}\n",
            100 + i,
            labels[i % 4],
            2.0 + (i % 3) as f64,
            1.0 + (i % 4) as f64 * 3.0,
            5.0 + (i % 6) as f64
        ));
    }
    text
}

/// A K2 planets-and-candidates export.
fn k2_export(rows: usize) -> String {
    let labels = ["CONFIRMED", "CANDIDATE", "FALSE POSITIVE", "REFUTED"];
    let mut text = preamble(2);
    text.push_str("pl_name,disposition,pl_rade,pl_orbper,st_teff\n");
    for i in 0..rows {
        text.push_str(&format!(
            "K2-{} b,{},{:.2},{:.2},{}\n",
            i,
            labels[i % 4],
            1.0 + (i % 4) as f64 * 2.5,
            3.0 + (i % 5) as f64,
            4800 + (i % 9) * 25
        ));
    }
    text
}

fn quick() -> Hyperparameters {
    Hyperparameters {
        n_estimators: Some(10),
        ..Default::default()
    }
}

// =============================================================================
// Header location and harmonization
// =============================================================================

#[test]
fn test_kepler_preamble_scenario() {
    let mut content = preamble(12);
    content.push_str("koi_disposition,koi_prad,koi_period\n");
    content.push_str("CONFIRMED,2.26,9.49\n");
    content.push_str("FALSE POSITIVE,33.46,19.90\n");
    content.push_str("CANDIDATE,1.09,1.74\n");

    let (dataset, source) = Horizon::new()
        .harmonize_bytes("cumulative.csv", content.as_bytes())
        .expect("Harmonization failed");

    assert_eq!(source.header_line, 12);
    assert_eq!(dataset.report.header_line, 12);
    assert_eq!(dataset.canonical.column_names(), vec!["pl_rade", "pl_orbper", "target"]);
    assert_eq!(dataset.unscaled.column_names(), vec!["koi_prad", "koi_period", "target"]);
    assert_eq!(
        dataset.targets(),
        &[TargetClass::Confirmed, TargetClass::FalsePositive, TargetClass::Candidate]
    );
    let ordinals: Vec<u8> = dataset.targets().iter().map(|t| t.ordinal()).collect();
    assert_eq!(ordinals, vec![2, 0, 1]);
}

#[test]
fn test_header_beyond_scan_bound() {
    let mut content = preamble(8);
    content.push_str("koi_disposition,koi_prad\nCONFIRMED,1.0\n");

    let config = HorizonConfig {
        max_scan_rows: 5,
        ..Default::default()
    };
    let err = Horizon::with_config(config)
        .harmonize_bytes("late.csv", content.as_bytes())
        .unwrap_err();
    assert!(matches!(err, HorizonError::HeaderNotFound { .. }));

    // The default bound reaches it.
    let (dataset, _) = Horizon::new().harmonize_bytes("late.csv", content.as_bytes()).unwrap();
    assert_eq!(dataset.report.header_line, 8);
}

#[test]
fn test_tab_separated_export() {
    let content = "koi_disposition\tkoi_prad\nCONFIRMED\t1.5\nCANDIDATE\t2.5\n";
    let (dataset, source) = Horizon::new().harmonize_bytes("k.tsv", content.as_bytes()).unwrap();
    assert_eq!(source.format, "tsv");
    assert_eq!(dataset.canonical.numeric("pl_rade"), Some(&[1.5, 2.5][..]));
}

#[test]
fn test_harmonization_is_idempotent() {
    let content = kepler_export(40);
    let horizon = Horizon::new();
    let (first, _) = horizon.harmonize_bytes("a.csv", content.as_bytes()).unwrap();
    let (second, _) = horizon.harmonize_bytes("a.csv", content.as_bytes()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_imputed_values_are_medians_of_surviving_rows() {
    // The UNKNOWN row carries an extreme radius that must not shift the median.
    let content = "koi_disposition,koi_prad\n\
                   CONFIRMED,1.0\n\
                   UNKNOWN,1000.0\n\
                   CANDIDATE,\n\
                   FALSE POSITIVE,3.0\n\
                   CONFIRMED,4.0\n";
    let file = create_test_file(content);
    let (dataset, _) = Horizon::new().harmonize_file(file.path()).unwrap();

    assert_eq!(dataset.report.dropped_rows, 1);
    assert_eq!(dataset.canonical.numeric("pl_rade"), Some(&[1.0, 3.0, 3.0, 4.0][..]));
    assert_eq!(dataset.unscaled.numeric("koi_prad"), Some(&[1.0, 3.0, 3.0, 4.0][..]));
    assert_eq!(dataset.report.missing_counts["pl_rade"], 0);
}

#[test]
fn test_every_target_is_ordinal() {
    let (dataset, _) = Horizon::new()
        .harmonize_bytes("tess.csv", tess_export(30).as_bytes())
        .unwrap();
    assert_eq!(dataset.row_count(), 30);
    assert!(dataset.targets().iter().all(|t| t.ordinal() <= 2));
}

// =============================================================================
// Training
// =============================================================================

#[test]
fn test_three_labels_train_multiclass() {
    let horizon = Horizon::new();
    let (dataset, _) = horizon.harmonize_bytes("k.csv", kepler_export(90).as_bytes()).unwrap();

    for backend in ["xgb", "lgbm"] {
        let outcome = horizon.train(&dataset, backend, &quick()).unwrap();
        assert_eq!(outcome.result.objective, "multiclass");
        assert_eq!(outcome.result.classes.len(), 3);
        assert!(outcome.result.roc.is_none());
        assert_eq!(outcome.result.history.datasets().count(), 2);
    }
}

#[test]
fn test_two_labels_train_binary_with_roc() {
    let content: String = kepler_export(90)
        .lines()
        .filter(|line| !line.contains("CANDIDATE"))
        .map(|line| format!("{}\n", line))
        .collect();
    let horizon = Horizon::new();
    let (dataset, _) = horizon.harmonize_bytes("k.csv", content.as_bytes()).unwrap();

    let outcome = horizon.train(&dataset, "xgb", &quick()).unwrap();
    assert_eq!(outcome.result.objective, "binary");
    let roc = outcome.result.roc.expect("binary run has a ROC curve");
    assert_eq!((roc.fpr[0], roc.tpr[0]), (0.0, 0.0));
    assert_eq!(outcome.result.auc_score, Some(roc.auc));
    assert!(outcome.result.history.series("validation_1", "logloss").is_some());
}

#[test]
fn test_training_history_same_shape_for_both_backends() {
    let horizon = Horizon::new();
    let (dataset, _) = horizon.harmonize_bytes("k2.csv", k2_export(60).as_bytes()).unwrap();

    let xgb = horizon.train(&dataset, "xgb", &quick()).unwrap().result.history;
    let lgbm = horizon.train(&dataset, "lgbm", &quick()).unwrap().result.history;
    for history in [&xgb, &lgbm] {
        let datasets: Vec<&str> = history.datasets().collect();
        assert_eq!(datasets.len(), 2);
        for name in datasets {
            assert_eq!(history.metrics(name).len(), 2);
        }
    }
}

// =============================================================================
// Dispatch
// =============================================================================

fn trained(horizon: &Horizon, content: &str) -> GradientBoostedModel {
    let (dataset, _) = horizon.harmonize_bytes("train.csv", content.as_bytes()).unwrap();
    horizon.train(&dataset, "xgb", &quick()).unwrap().model
}

fn dispatching_horizon() -> Horizon {
    let horizon = Horizon::new();
    let kepler = trained(&horizon, &kepler_export(60));
    let tess = trained(&horizon, &tess_export(60));
    let k2 = trained(&horizon, &k2_export(60));
    let store = MemoryStore::new()
        .with_model(PretrainedModel::Kepler, &kepler)
        .unwrap()
        .with_model(PretrainedModel::Tess, &tess)
        .unwrap()
        .with_model(PretrainedModel::K2, &k2)
        .unwrap();
    horizon.with_dispatcher(ModelDispatcher::new(store))
}

#[test]
fn test_tess_columns_select_tess_model() {
    let horizon = dispatching_horizon();
    let (dataset, _) = horizon.harmonize_bytes("toi.csv", tess_export(20).as_bytes()).unwrap();
    assert!(dataset.unscaled.has_column("pl_trandurh"));
    assert!(!dataset.unscaled.has_column("koi_prad"));

    let batch = horizon.predict_pretrained(&dataset).unwrap();
    assert_eq!(batch.source, PredictionSource::Pretrained { model: PretrainedModel::Tess });
    assert_eq!(batch.count, 20);
    assert_eq!(batch.display_rows.len(), 20);
}

#[test]
fn test_unmatched_columns_fall_back_to_k2() {
    let horizon = dispatching_horizon();
    let (dataset, _) = horizon.harmonize_bytes("k2.csv", k2_export(12).as_bytes()).unwrap();
    let batch = horizon.predict_pretrained(&dataset).unwrap();
    assert_eq!(batch.source, PredictionSource::Pretrained { model: PretrainedModel::K2 });
}

#[test]
fn test_kepler_model_zero_fills_missing_features() {
    let horizon = dispatching_horizon();
    // Only one Kepler feature present; the model also expects the others.
    let content = "koi_disposition,koi_prad\nCONFIRMED,1.0\nCANDIDATE,9.0\n";
    let (dataset, _) = horizon.harmonize_bytes("k.csv", content.as_bytes()).unwrap();
    let batch = horizon.predict_pretrained(&dataset).unwrap();
    assert_eq!(batch.source, PredictionSource::Pretrained { model: PretrainedModel::Kepler });
    assert_eq!(batch.predictions.len(), 2);
}

#[test]
fn test_pretrained_models_from_directory() {
    let dir = tempfile::tempdir().unwrap();
    let horizon = Horizon::new();
    let model = trained(&horizon, &k2_export(40));
    horizon::model::artifact::save(&model, &dir.path().join("xgb_k2_model.json")).unwrap();

    let config = HorizonConfig {
        model_dir: dir.path().to_path_buf(),
        ..Default::default()
    };
    let horizon = Horizon::with_config(config);
    let mut session = Session::new();
    horizon.upload(&mut session, "k2.csv", k2_export(10).as_bytes()).unwrap();
    let batch = horizon.predict_session(&mut session).unwrap();
    assert_eq!(batch.count, 10);
    assert_eq!(session.predictions().unwrap().len(), 10);

    // No Kepler artifact in the directory.
    let content = "koi_disposition,koi_prad\nCONFIRMED,1.0\n";
    horizon.upload(&mut session, "k.csv", content.as_bytes()).unwrap();
    let err = horizon.predict_session(&mut session).unwrap_err();
    assert!(matches!(err, HorizonError::Prediction(_)));
}

// =============================================================================
// Session round trips
// =============================================================================

#[test]
fn test_trained_model_predicts_same_dataset_as_supplied_model() {
    let horizon = Horizon::new();
    let mut session = Session::new();
    horizon.upload(&mut session, "k.csv", kepler_export(60).as_bytes()).unwrap();
    horizon.train_session(&mut session, "lgbm", &quick()).unwrap();

    let (name, bytes) = session.download_model().unwrap();
    assert_eq!(name, "trained_lgbm_model.json");

    let batch = horizon.predict_supplied_session(&mut session, &bytes).unwrap();
    assert_eq!(batch.source, PredictionSource::Supplied);
    assert_eq!(batch.count, 60);
}

#[test]
fn test_supplied_model_feature_mismatch() {
    let horizon = Horizon::new();
    let mut session = Session::new();
    horizon.upload(&mut session, "k2.csv", k2_export(40).as_bytes()).unwrap();
    horizon.train_session(&mut session, "xgb", &quick()).unwrap();
    let (_, bytes) = session.download_model().unwrap();

    // A TESS table carries transit duration instead of stellar temperature.
    horizon.upload(&mut session, "toi.csv", tess_export(30).as_bytes()).unwrap();
    let err = horizon.predict_supplied_session(&mut session, &bytes).unwrap_err();
    assert!(matches!(err, HorizonError::Prediction(_)));
    assert!(matches!(session.predictions(), Err(HorizonError::NoPredictions)));
}

#[test]
fn test_prediction_labels_round_trip() {
    let horizon = Horizon::new();
    let mut session = Session::new();
    horizon.upload(&mut session, "k.csv", kepler_export(45).as_bytes()).unwrap();
    horizon.train_session(&mut session, "xgb", &quick()).unwrap();
    let (_, bytes) = session.download_model().unwrap();
    horizon.predict_supplied_session(&mut session, &bytes).unwrap();

    let csv_bytes = session.download_predictions().unwrap();
    let mut reader = csv::Reader::from_reader(csv_bytes.as_slice());
    let headers = reader.headers().unwrap().clone();
    let ordinal_col = headers.iter().position(|h| h == "prediction").unwrap();
    let label_col = headers.iter().position(|h| h == "prediction_label").unwrap();

    let mut remapped = Vec::new();
    for record in reader.records() {
        let record = record.unwrap();
        let class = encode_label(&record[label_col]).unwrap();
        assert_eq!(class.ordinal().to_string(), &record[ordinal_col]);
        remapped.push(class);
    }
    assert_eq!(remapped, session.predictions().unwrap());
}

#[test]
fn test_processed_download_is_canonical_table() {
    let horizon = Horizon::new();
    let mut session = Session::new();
    horizon.upload(&mut session, "k.csv", kepler_export(6).as_bytes()).unwrap();

    let text = String::from_utf8(session.download_processed().unwrap()).unwrap();
    assert_eq!(
        text.lines().next().unwrap(),
        "pl_rade,pl_orbper,st_teff,target,kepoi_name"
    );
    assert_eq!(text.lines().count(), 7);
}

#[test]
fn test_reset_clears_everything() {
    let horizon = Horizon::new();
    let mut session = Session::new();
    horizon.upload(&mut session, "k.csv", kepler_export(30).as_bytes()).unwrap();
    horizon.train_session(&mut session, "xgb", &quick()).unwrap();

    session.reset();
    assert!(matches!(session.download_processed(), Err(HorizonError::NoDataset)));
    assert!(matches!(session.download_model(), Err(HorizonError::NoTrainedModel)));
}
