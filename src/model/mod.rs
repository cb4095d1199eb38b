//! Trained classifiers that can be shipped as a downloadable artifact.

pub mod artifact;
pub mod linear;
pub mod tree;

use std::fmt;

use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

pub use artifact::{
    load_artifact,
    sha256_hex,
    ArtifactError,
    ArtifactFormat,
};
pub use linear::LogisticRegression;
pub use tree::{
    RandomForest,
    Tree,
    TreeNode,
};

use crate::encoding::{
    FeatureRow,
    FEATURE_COUNT,
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Model expects {expected} features but the application has {actual}")]
    FeatureCount { expected: usize, actual: usize },

    #[error("Feature {index} is not a finite number")]
    NonFiniteFeature { index: usize },

    #[error("Tree node {node} points to missing node {target}")]
    DanglingNode { node: usize, target: usize },

    #[error("Tree has no nodes")]
    EmptyTree,

    #[error("Tree walk exceeded {0} steps; the tree contains a cycle")]
    CyclicTree(usize),

    #[error("Random forest has no trees")]
    EmptyForest,

    #[error("Model returned no predictions")]
    NoPrediction,
}

/// Anything that can label rows of encoded applications as 0 or 1.
pub trait Classifier {
    fn n_features(&self) -> usize;

    fn predict_row(&self, row: &FeatureRow) -> Result<u8, ModelError>;

    /// Predicts one class per row after checking the row shape.
    fn predict(&self, rows: &[FeatureRow]) -> Result<Vec<u8>, ModelError> {
        let expected = self.n_features();
        if expected != FEATURE_COUNT {
            return Err(ModelError::FeatureCount { expected, actual: FEATURE_COUNT });
        }

        rows.iter()
            .map(|row| {
                if let Some(index) = row.iter().position(|v| !v.is_finite()) {
                    return Err(ModelError::NonFiniteFeature { index });
                }
                self.predict_row(row)
            })
            .collect()
    }
}

/// The serialized form of every classifier this app knows how to run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ModelArtifact {
    LogisticRegression(LogisticRegression),
    DecisionTree(Tree),
    RandomForest(RandomForest),
}

impl ModelArtifact {
    pub fn kind(&self) -> &'static str {
        match self {
            ModelArtifact::LogisticRegression(_) => "logistic regression",
            ModelArtifact::DecisionTree(_) => "decision tree",
            ModelArtifact::RandomForest(_) => "random forest",
        }
    }

    fn inner(&self) -> &dyn Classifier {
        match self {
            ModelArtifact::LogisticRegression(model) => model,
            ModelArtifact::DecisionTree(model) => model,
            ModelArtifact::RandomForest(model) => model,
        }
    }
}

impl Classifier for ModelArtifact {
    fn n_features(&self) -> usize {
        self.inner().n_features()
    }

    fn predict_row(&self, row: &FeatureRow) -> Result<u8, ModelError> {
        self.inner().predict_row(row)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approved,
    Denied,
}

impl Decision {
    /// Only a leading `1` approves; anything else denies.
    pub fn from_prediction(predictions: &[u8]) -> Result<Self, ModelError> {
        match predictions.first() {
            Some(1) => Ok(Decision::Approved),
            Some(_) => Ok(Decision::Denied),
            None => Err(ModelError::NoPrediction),
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Approved => f.write_str("Approved"),
            Decision::Denied => f.write_str("Denied"),
        }
    }
}
