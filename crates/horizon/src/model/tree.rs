//! Regression trees as stored in model artifacts.

use serde::{Deserialize, Serialize};

/// A tree node. Children are indices into [`Tree::nodes`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    /// Rows with `value <= threshold` (or a missing value) go left.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf { value: f64 },
}

/// A binary regression tree; node 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    /// A tree with a single leaf.
    pub fn leaf(value: f64) -> Self {
        Self {
            nodes: vec![Node::Leaf { value }],
        }
    }

    /// Output of the tree for one row.
    ///
    /// Malformed trees (dangling child or feature index) yield `None`.
    pub fn predict_row(&self, row: &[f64]) -> Option<f64> {
        let mut index = 0;
        // A well-formed tree reaches a leaf in fewer steps than it has nodes.
        for _ in 0..=self.nodes.len() {
            match self.nodes.get(index)? {
                Node::Leaf { value } => return Some(*value),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = *row.get(*feature)?;
                    index = if value > *threshold { *right } else { *left };
                }
            }
        }
        None
    }

    /// Number of leaves.
    pub fn num_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }

    /// Depth of the deepest leaf (a single leaf has depth 0).
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], index: usize, depth: usize) -> usize {
            match nodes.get(index) {
                Some(Node::Split { left, right, .. }) if depth < nodes.len() => {
                    walk(nodes, *left, depth + 1).max(walk(nodes, *right, depth + 1))
                }
                _ => depth,
            }
        }
        walk(&self.nodes, 0, 0)
    }

    /// Largest feature index referenced by a split.
    pub fn max_feature(&self) -> Option<usize> {
        self.nodes
            .iter()
            .filter_map(|n| match n {
                Node::Split { feature, .. } => Some(*feature),
                Node::Leaf { .. } => None,
            })
            .max()
    }
}
