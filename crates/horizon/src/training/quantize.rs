//! Feature quantization into histogram bins.
//!
//! Each feature gets a sorted list of cut points. A value `v` falls in bin
//! `b` where `cuts[b - 1] < v <= cuts[b]`; the last bin is open above. A split
//! after bin `b` sends `v <= cuts[b]` left, which is exactly how stored trees
//! route rows at prediction time.

use super::data::FeatureMatrix;

/// Default maximum number of bins per feature.
pub const DEFAULT_MAX_BINS: usize = 256;

/// Cut points for every feature.
#[derive(Debug, Clone, PartialEq)]
pub struct BinCuts {
    cuts: Vec<Vec<f64>>,
}

impl BinCuts {
    /// Compute cuts from training data.
    ///
    /// Features with at most `max_bins` distinct values get one cut between
    /// each pair of neighbours; others get cuts at evenly spaced ranks.
    pub fn from_matrix(matrix: &FeatureMatrix, max_bins: usize) -> Self {
        let max_bins = max_bins.max(2);
        let cuts = (0..matrix.n_features())
            .map(|f| feature_cuts(matrix.column(f), max_bins))
            .collect();
        Self { cuts }
    }

    /// Cut points of one feature.
    pub fn feature(&self, feature: usize) -> &[f64] {
        &self.cuts[feature]
    }

    /// Number of bins for one feature.
    pub fn n_bins(&self, feature: usize) -> usize {
        self.cuts[feature].len() + 1
    }

    /// Bin of a value. Missing values land in bin 0.
    pub fn bin(&self, feature: usize, value: f64) -> usize {
        self.cuts[feature].partition_point(|&c| c < value)
    }

    /// Threshold that separates bins `0..=bin` from the rest.
    pub fn threshold(&self, feature: usize, bin: usize) -> f64 {
        self.cuts[feature][bin]
    }
}

fn feature_cuts(mut values: Vec<f64>, max_bins: usize) -> Vec<f64> {
    values.retain(|v| !v.is_nan());
    values.sort_by(|a, b| a.total_cmp(b));
    values.dedup();

    if values.len() <= max_bins {
        return values.windows(2).map(|w| midpoint(w[0], w[1])).collect();
    }

    let mut cuts: Vec<f64> = (1..max_bins)
        .map(|k| {
            let idx = k * values.len() / max_bins;
            midpoint(values[idx - 1], values[idx])
        })
        .collect();
    cuts.dedup();
    cuts
}

fn midpoint(a: f64, b: f64) -> f64 {
    a + (b - a) / 2.0
}

/// Column-major bin indices for a training matrix.
#[derive(Debug, Clone)]
pub struct BinnedMatrix {
    bins: Vec<Vec<u16>>,
    n_rows: usize,
}

impl BinnedMatrix {
    pub fn new(matrix: &FeatureMatrix, cuts: &BinCuts) -> Self {
        let bins = (0..matrix.n_features())
            .map(|f| {
                (0..matrix.n_rows())
                    .map(|row| cuts.bin(f, matrix.get(row, f)) as u16)
                    .collect()
            })
            .collect();
        Self {
            bins,
            n_rows: matrix.n_rows(),
        }
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_features(&self) -> usize {
        self.bins.len()
    }

    #[inline]
    pub fn bin(&self, row: usize, feature: usize) -> usize {
        self.bins[feature][row] as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(values: Vec<f64>) -> FeatureMatrix {
        FeatureMatrix::new(vec!["x".to_string()], values).unwrap()
    }

    #[test]
    fn test_cuts_between_distinct_values() {
        let cuts = BinCuts::from_matrix(&matrix(vec![3.0, 1.0, 2.0, 2.0]), 256);
        assert_eq!(cuts.feature(0), &[1.5, 2.5]);
        assert_eq!(cuts.n_bins(0), 3);
    }

    #[test]
    fn test_bin_matches_threshold_routing() {
        let cuts = BinCuts::from_matrix(&matrix(vec![1.0, 2.0, 3.0]), 256);
        assert_eq!(cuts.bin(0, 1.0), 0);
        assert_eq!(cuts.bin(0, 1.5), 0);
        assert_eq!(cuts.bin(0, 2.0), 1);
        assert_eq!(cuts.bin(0, 9.0), 2);
        assert_eq!(cuts.bin(0, f64::NAN), 0);
        // Values in bins 0..=0 satisfy v <= threshold(0).
        assert!(1.0 <= cuts.threshold(0, 0) && 2.0 > cuts.threshold(0, 0));
    }

    #[test]
    fn test_quantile_cuts_are_bounded() {
        let values: Vec<f64> = (0..1000).map(|i| i as f64).collect();
        let cuts = BinCuts::from_matrix(&matrix(values), 16);
        assert_eq!(cuts.n_bins(0), 16);
        assert!(cuts.feature(0).windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_constant_feature_has_one_bin() {
        let cuts = BinCuts::from_matrix(&matrix(vec![5.0, 5.0]), 256);
        assert_eq!(cuts.n_bins(0), 1);
        let binned = BinnedMatrix::new(&matrix(vec![5.0, 5.0]), &cuts);
        assert_eq!(binned.bin(1, 0), 0);
    }
}
