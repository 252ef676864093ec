//! Static vocabularies shared by the Kepler, K2 and TESS catalogs.
//!
//! Every table here is ordered; order decides priority (first present wins) or
//! output column order.

use indexmap::IndexMap;
use once_cell::sync::Lazy;

use super::types::TargetClass;

/// Column names that carry the disposition label, in detection priority.
pub const TARGET_ALIASES: &[&str] = &["koi_disposition", "tfopwg_disp", "disposition"];

/// Column names that identify an object, in detection priority.
pub const IDENTIFIER_ALIASES: &[&str] = &["kepoi_name", "pl_name", "kepid", "tic_id"];

/// Recognized feature columns as listed per mission (may contain repeats).
const FEATURE_KEYWORD_LIST: &[&str] = &[
    // Kepler
    "koi_prad",
    "koi_period",
    "koi_depth",
    "koi_duration",
    "koi_teq",
    "koi_insol",
    "koi_steff",
    "koi_srad",
    "ra",
    "dec",
    // K2 / TESS
    "pl_rade",
    "pl_orbper",
    "pl_trandep",
    "pl_trandur",
    "pl_trandurh",
    "pl_eqt",
    "pl_insol",
    "st_teff",
    "st_rad",
];

/// Recognized feature columns, deduplicated with the first occurrence kept.
pub static FEATURE_KEYWORDS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    let mut seen = Vec::with_capacity(FEATURE_KEYWORD_LIST.len());
    for &keyword in FEATURE_KEYWORD_LIST {
        if !seen.contains(&keyword) {
            seen.push(keyword);
        }
    }
    seen
});

/// Mission-specific column name -> canonical column name.
pub static FEATURE_ALIASES: Lazy<IndexMap<&'static str, &'static str>> = Lazy::new(|| {
    IndexMap::from([
        ("koi_prad", "pl_rade"),
        ("koi_period", "pl_orbper"),
        ("koi_depth", "pl_trandep"),
        ("koi_duration", "pl_trandur"),
        ("koi_teq", "pl_eqt"),
        ("koi_insol", "pl_insol"),
        ("koi_steff", "st_teff"),
        ("koi_srad", "st_rad"),
        ("koi_score", "score"),
        ("koi_model_snr", "snr"),
        ("pl_trandurh", "pl_trandur"),
        ("st_tmag", "st_mag"),
    ])
});

/// Raw disposition label -> ordinal class. Matching is exact and case-sensitive.
pub static LABEL_ALIASES: Lazy<IndexMap<&'static str, TargetClass>> = Lazy::new(|| {
    IndexMap::from([
        // Not a planet
        ("FALSE POSITIVE", TargetClass::FalsePositive),
        ("REFUTED", TargetClass::FalsePositive),
        ("FP", TargetClass::FalsePositive),
        ("FA", TargetClass::FalsePositive),
        // Candidate
        ("CANDIDATE", TargetClass::Candidate),
        ("PC", TargetClass::Candidate),
        ("CP", TargetClass::Candidate),
        ("APC", TargetClass::Candidate),
        // Planet
        ("CONFIRMED", TargetClass::Confirmed),
        ("KP", TargetClass::Confirmed),
    ])
});

/// Output order of canonical feature columns.
pub const CANONICAL_ORDER: &[&str] = &[
    "pl_rade",
    "pl_orbper",
    "pl_trandep",
    "pl_trandur",
    "pl_eqt",
    "pl_insol",
    "st_teff",
    "st_rad",
    "ra",
    "dec",
];

/// Name of the encoded target column in harmonized tables.
pub const TARGET_COLUMN: &str = "target";

/// Columns whose presence marks a Kepler cumulative export.
pub const KEPLER_CHARACTERISTIC: &[&str] = &["koi_prad"];

/// Columns whose presence marks a TESS objects-of-interest export.
pub const TESS_CHARACTERISTIC: &[&str] = &["pl_trandurh"];

/// Feature order expected by the single-object predictor.
pub const SINGLE_OBJECT_FEATURES: &[&str] = &[
    "pl_rade",
    "pl_orbper",
    "pl_trandep",
    "pl_trandurh",
    "pl_eqt",
    "pl_insol",
    "st_teff",
    "st_rad",
    "ra",
    "dec",
];

/// Canonical name for a source feature column (itself when no alias applies).
pub fn canonical_name(source: &str) -> &str {
    FEATURE_ALIASES.get(source).copied().unwrap_or(source)
}

/// Encode a raw disposition label; `None` for labels outside the table.
pub fn encode_label(raw: &str) -> Option<TargetClass> {
    LABEL_ALIASES.get(raw.trim()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_keywords_deduplicated() {
        assert_eq!(FEATURE_KEYWORDS.len(), FEATURE_KEYWORD_LIST.len());
        assert_eq!(FEATURE_KEYWORDS[0], "koi_prad");
        assert_eq!(FEATURE_KEYWORDS[FEATURE_KEYWORDS.len() - 1], "st_rad");
    }

    #[test]
    fn test_canonical_name() {
        assert_eq!(canonical_name("koi_prad"), "pl_rade");
        assert_eq!(canonical_name("pl_trandurh"), "pl_trandur");
        assert_eq!(canonical_name("ra"), "ra");
    }

    #[test]
    fn test_every_keyword_maps_into_canonical_order() {
        for keyword in FEATURE_KEYWORDS.iter() {
            assert!(
                CANONICAL_ORDER.contains(&canonical_name(keyword)),
                "{} has no canonical slot",
                keyword
            );
        }
    }

    #[test]
    fn test_encode_label_is_case_sensitive() {
        assert_eq!(encode_label("CONFIRMED"), Some(TargetClass::Confirmed));
        assert_eq!(encode_label(" PC "), Some(TargetClass::Candidate));
        assert_eq!(encode_label("confirmed"), None);
        assert_eq!(encode_label("UNKNOWN"), None);
    }

    #[test]
    fn test_download_labels_invert_alias_table() {
        for class in TargetClass::ALL {
            assert_eq!(encode_label(class.label()), Some(class));
        }
    }
}
