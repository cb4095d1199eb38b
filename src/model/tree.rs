use std::collections::BTreeMap;

use serde::{
    Deserialize,
    Serialize,
};

use super::{
    Classifier,
    ModelError,
};
use crate::encoding::FeatureRow;

/// Node of a flattened tree. Children are indices into `Tree::nodes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    /// `row[feature] <= threshold` goes left.
    Split { feature: usize, threshold: f64, left: usize, right: usize },
    Leaf { class: u8 },
}

/// A decision tree classifier; the root is `nodes[0]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub n_features: usize,
    pub nodes: Vec<TreeNode>,
}

impl Tree {
    pub fn new(n_features: usize, nodes: Vec<TreeNode>) -> Self {
        Self { n_features, nodes }
    }

    fn classify(&self, row: &FeatureRow) -> Result<u8, ModelError> {
        if self.nodes.is_empty() {
            return Err(ModelError::EmptyTree);
        }

        let mut idx = 0;
        // A well-formed tree visits each node at most once.
        for _ in 0..self.nodes.len() {
            match &self.nodes[idx] {
                TreeNode::Leaf { class } => return Ok(*class),
                TreeNode::Split { feature, threshold, left, right } => {
                    let value = row.get(*feature).ok_or(ModelError::FeatureCount {
                        expected: feature + 1,
                        actual: row.len(),
                    })?;
                    let next = if *value <= *threshold { *left } else { *right };
                    if next >= self.nodes.len() {
                        return Err(ModelError::DanglingNode { node: idx, target: next });
                    }
                    idx = next;
                }
            }
        }

        Err(ModelError::CyclicTree(self.nodes.len()))
    }
}

impl Classifier for Tree {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_row(&self, row: &FeatureRow) -> Result<u8, ModelError> {
        self.classify(row)
    }
}

/// Majority vote over independently trained trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    pub n_features: usize,
    pub trees: Vec<Tree>,
}

impl RandomForest {
    pub fn new(n_features: usize, trees: Vec<Tree>) -> Self {
        Self { n_features, trees }
    }
}

impl Classifier for RandomForest {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_row(&self, row: &FeatureRow) -> Result<u8, ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::EmptyForest);
        }

        let mut votes: BTreeMap<u8, usize> = BTreeMap::new();
        for tree in &self.trees {
            *votes.entry(tree.classify(row)?).or_insert(0) += 1;
        }

        // Ties resolve to the lowest class.
        let mut winner = (0u8, 0usize);
        for (class, count) in votes {
            if count > winner.1 {
                winner = (class, count);
            }
        }
        Ok(winner.0)
    }
}
