//! Single CART classification tree.
//!
//! Trees are grown greedily on gini impurity. Nodes store absolute
//! feature-column indices, so prediction never needs to know which
//! subset of columns the tree was offered during training.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeNode {
    Leaf {
        label: i64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub root: TreeNode,
}

impl DecisionTree {
    /// Grow a tree on the given rows, splitting only on `features`.
    ///
    /// `rows` may contain duplicates (bootstrap sample). Growth stops
    /// when a node is pure or no split improves impurity.
    pub fn fit(x: &[Vec<f64>], y: &[i64], rows: &[usize], features: &[usize]) -> Self {
        Self {
            root: build_node(x, y, rows, features),
        }
    }

    pub fn predict_row(&self, row: &[f64]) -> i64 {
        let mut node = &self.root;
        loop {
            match node {
                TreeNode::Leaf { label } => return *label,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }
}

fn build_node(x: &[Vec<f64>], y: &[i64], rows: &[usize], features: &[usize]) -> TreeNode {
    let counts = label_counts(y, rows);
    if counts.len() <= 1 {
        return TreeNode::Leaf {
            label: majority_label(&counts),
        };
    }

    let Some(split) = best_split(x, y, rows, features, &counts) else {
        return TreeNode::Leaf {
            label: majority_label(&counts),
        };
    };

    let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
        .iter()
        .copied()
        .partition(|&r| x[r][split.feature] <= split.threshold);

    TreeNode::Split {
        feature: split.feature,
        threshold: split.threshold,
        left: Box::new(build_node(x, y, &left_rows, features)),
        right: Box::new(build_node(x, y, &right_rows, features)),
    }
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
}

/// Exhaustive best split over the offered features. Thresholds are
/// midpoints between adjacent distinct values, so both sides of a
/// chosen split are always non-empty.
fn best_split(
    x: &[Vec<f64>],
    y: &[i64],
    rows: &[usize],
    features: &[usize],
    counts: &BTreeMap<i64, usize>,
) -> Option<SplitCandidate> {
    let total = rows.len() as f64;
    let mut best_impurity = gini(counts, total);
    let mut best: Option<SplitCandidate> = None;

    for &feature in features {
        let mut pairs: Vec<(f64, i64)> = rows.iter().map(|&r| (x[r][feature], y[r])).collect();
        pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

        let mut left: BTreeMap<i64, usize> = BTreeMap::new();
        let mut right = counts.clone();

        for i in 0..pairs.len() - 1 {
            let (value, label) = pairs[i];
            *left.entry(label).or_insert(0) += 1;
            if let Some(c) = right.get_mut(&label) {
                *c -= 1;
                if *c == 0 {
                    right.remove(&label);
                }
            }

            // Only split between distinct values.
            if value == pairs[i + 1].0 {
                continue;
            }

            let left_n = (i + 1) as f64;
            let right_n = total - left_n;
            let weighted =
                (left_n * gini(&left, left_n) + right_n * gini(&right, right_n)) / total;
            if weighted < best_impurity - 1e-12 {
                best_impurity = weighted;
                best = Some(SplitCandidate {
                    feature,
                    threshold: (value + pairs[i + 1].0) / 2.0,
                });
            }
        }
    }

    best
}

fn label_counts(y: &[i64], rows: &[usize]) -> BTreeMap<i64, usize> {
    let mut counts = BTreeMap::new();
    for &r in rows {
        *counts.entry(y[r]).or_insert(0) += 1;
    }
    counts
}

/// Most frequent label; ties break to the smallest label so results
/// are stable across runs.
pub(crate) fn majority_label(counts: &BTreeMap<i64, usize>) -> i64 {
    let mut best_label = 0;
    let mut best_count = 0;
    for (&label, &count) in counts {
        if count > best_count {
            best_label = label;
            best_count = count;
        }
    }
    best_label
}

fn gini(counts: &BTreeMap<i64, usize>, total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    let sum_sq: f64 = counts
        .values()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum();
    1.0 - sum_sq
}
