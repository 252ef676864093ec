//! Histogram-based tree growth.
//!
//! Both growth policies share split finding: per-node histograms of gradient
//! sums, hessian sums and counts per bin, scanned left to right for the best
//! gain. They differ in which node is expanded next.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::quantize::{BinCuts, BinnedMatrix};
use crate::model::{Node, Tree};

/// Order in which nodes are expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthStrategy {
    /// Expand level by level down to `max_depth`.
    DepthWise { max_depth: usize },
    /// Always expand the leaf with the highest gain until `max_leaves` exist.
    LeafWise {
        max_leaves: usize,
        max_depth: Option<usize>,
    },
}

impl Default for GrowthStrategy {
    fn default() -> Self {
        GrowthStrategy::DepthWise { max_depth: 6 }
    }
}

/// Regularization and split constraints.
#[derive(Debug, Clone, PartialEq)]
pub struct GainParams {
    /// L2 regularization on leaf weights.
    pub reg_lambda: f64,
    /// Minimum gain for a split to be kept.
    pub min_split_gain: f64,
    /// Minimum hessian sum per child.
    pub min_child_weight: f64,
    /// Minimum rows per child.
    pub min_samples_leaf: usize,
}

impl Default for GainParams {
    fn default() -> Self {
        Self {
            reg_lambda: 1.0,
            min_split_gain: 0.0,
            min_child_weight: 1.0,
            min_samples_leaf: 1,
        }
    }
}

impl GainParams {
    /// Structure score of a node: `G^2 / (H + lambda)`.
    fn score(&self, grad: f64, hess: f64) -> f64 {
        grad * grad / (hess + self.reg_lambda)
    }

    /// `0.5 * [score(L) + score(R) - score(P)] - gamma`
    fn gain(&self, left: &BinStats, right: &BinStats, parent: &BinStats) -> f64 {
        0.5 * (self.score(left.grad, left.hess) + self.score(right.grad, right.hess)
            - self.score(parent.grad, parent.hess))
            - self.min_split_gain
    }

    fn is_valid(&self, left: &BinStats, right: &BinStats) -> bool {
        left.hess >= self.min_child_weight
            && right.hess >= self.min_child_weight
            && left.count >= self.min_samples_leaf
            && right.count >= self.min_samples_leaf
    }

    /// Newton step `-G / (H + lambda)`.
    pub fn leaf_weight(&self, grad: f64, hess: f64) -> f64 {
        let denom = hess + self.reg_lambda;
        if denom <= 0.0 { 0.0 } else { -grad / denom }
    }
}

/// Parameters for growing one tree.
#[derive(Debug, Clone, PartialEq)]
pub struct GrowerParams {
    pub strategy: GrowthStrategy,
    pub gain: GainParams,
    pub learning_rate: f64,
}

#[derive(Debug, Clone, Copy, Default)]
struct BinStats {
    grad: f64,
    hess: f64,
    count: usize,
}

impl BinStats {
    fn add(&mut self, grad: f64, hess: f64) {
        self.grad += grad;
        self.hess += hess;
        self.count += 1;
    }

    fn minus(&self, other: &BinStats) -> BinStats {
        BinStats {
            grad: self.grad - other.grad,
            hess: self.hess - other.hess,
            count: self.count - other.count,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    bin: usize,
    gain: f64,
}

/// A leaf that may still be split.
struct Pending {
    node: usize,
    rows: Vec<usize>,
    depth: usize,
    split: Option<SplitCandidate>,
}

/// Heap entry ordered by gain, then by creation order (earlier first).
struct Ranked(Pending);

impl Ranked {
    fn gain(&self) -> f64 {
        self.0.split.map(|s| s.gain).unwrap_or(f64::NEG_INFINITY)
    }
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.gain()
            .total_cmp(&other.gain())
            .then_with(|| other.0.node.cmp(&self.0.node))
    }
}

/// Grows regression trees on one quantized training matrix.
pub struct TreeGrower<'a> {
    binned: &'a BinnedMatrix,
    cuts: &'a BinCuts,
    params: GrowerParams,
}

impl<'a> TreeGrower<'a> {
    pub fn new(binned: &'a BinnedMatrix, cuts: &'a BinCuts, params: GrowerParams) -> Self {
        Self {
            binned,
            cuts,
            params,
        }
    }

    /// Grow one tree from per-row gradients and hessians.
    ///
    /// Leaf values are already scaled by the learning rate.
    pub fn grow(&self, grad: &[f64], hess: &[f64]) -> Tree {
        let rows: Vec<usize> = (0..self.binned.n_rows()).collect();
        let mut nodes = vec![self.leaf(&rows, grad, hess)];
        let root = Pending {
            node: 0,
            split: self.best_split(&rows, grad, hess),
            rows,
            depth: 0,
        };

        match self.params.strategy {
            GrowthStrategy::DepthWise { max_depth } => {
                let mut frontier = vec![root];
                while !frontier.is_empty() {
                    let mut next = Vec::new();
                    for pending in frontier {
                        if pending.depth >= max_depth {
                            continue;
                        }
                        if let Some((left, right)) = self.apply(&mut nodes, pending, grad, hess) {
                            next.push(left);
                            next.push(right);
                        }
                    }
                    frontier = next;
                }
            }
            GrowthStrategy::LeafWise {
                max_leaves,
                max_depth,
            } => {
                let mut heap = BinaryHeap::new();
                heap.push(Ranked(root));
                let mut leaves = 1;
                while leaves < max_leaves {
                    let Some(Ranked(pending)) = heap.pop() else {
                        break;
                    };
                    if pending.split.is_none() {
                        break;
                    }
                    if max_depth.is_some_and(|d| pending.depth >= d) {
                        continue;
                    }
                    if let Some((left, right)) = self.apply(&mut nodes, pending, grad, hess) {
                        heap.push(Ranked(left));
                        heap.push(Ranked(right));
                        leaves += 1;
                    }
                }
            }
        }

        Tree { nodes }
    }

    /// Turn a pending leaf into a split and return its two children.
    fn apply(
        &self,
        nodes: &mut Vec<Node>,
        pending: Pending,
        grad: &[f64],
        hess: &[f64],
    ) -> Option<(Pending, Pending)> {
        let split = pending.split?;
        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = pending
            .rows
            .iter()
            .partition(|&&row| self.binned.bin(row, split.feature) <= split.bin);

        let left = nodes.len();
        let right = left + 1;
        nodes.push(self.leaf(&left_rows, grad, hess));
        nodes.push(self.leaf(&right_rows, grad, hess));
        nodes[pending.node] = Node::Split {
            feature: split.feature,
            threshold: self.cuts.threshold(split.feature, split.bin),
            left,
            right,
        };

        let depth = pending.depth + 1;
        Some((
            Pending {
                node: left,
                split: self.best_split(&left_rows, grad, hess),
                rows: left_rows,
                depth,
            },
            Pending {
                node: right,
                split: self.best_split(&right_rows, grad, hess),
                rows: right_rows,
                depth,
            },
        ))
    }

    fn leaf(&self, rows: &[usize], grad: &[f64], hess: &[f64]) -> Node {
        let (g, h) = rows
            .iter()
            .fold((0.0, 0.0), |(g, h), &row| (g + grad[row], h + hess[row]));
        Node::Leaf {
            value: self.params.gain.leaf_weight(g, h) * self.params.learning_rate,
        }
    }

    /// Best split over all features, or `None` if no split has positive gain.
    fn best_split(&self, rows: &[usize], grad: &[f64], hess: &[f64]) -> Option<SplitCandidate> {
        let gain_params = &self.params.gain;
        if rows.len() < 2 * gain_params.min_samples_leaf.max(1) {
            return None;
        }

        let mut best: Option<SplitCandidate> = None;
        for feature in 0..self.binned.n_features() {
            let n_bins = self.cuts.n_bins(feature);
            if n_bins < 2 {
                continue;
            }

            let mut histogram = vec![BinStats::default(); n_bins];
            let mut total = BinStats::default();
            for &row in rows {
                let bin = self.binned.bin(row, feature);
                histogram[bin].add(grad[row], hess[row]);
                total.add(grad[row], hess[row]);
            }

            let mut left = BinStats::default();
            for (bin, stats) in histogram.iter().enumerate().take(n_bins - 1) {
                left.grad += stats.grad;
                left.hess += stats.hess;
                left.count += stats.count;
                if left.count == 0 {
                    continue;
                }
                let right = total.minus(&left);
                if right.count == 0 {
                    break;
                }
                if !gain_params.is_valid(&left, &right) {
                    continue;
                }
                let gain = gain_params.gain(&left, &right, &total);
                if gain > 0.0 && best.is_none_or(|b| gain > b.gain) {
                    best = Some(SplitCandidate { feature, bin, gain });
                }
            }
        }
        best
    }
}
