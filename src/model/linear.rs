use serde::{
    Deserialize,
    Serialize,
};

use super::{
    Classifier,
    ModelError,
};
use crate::encoding::FeatureRow;

fn default_threshold() -> f64 {
    0.5
}

/// Binary logistic regression over the raw (unscaled) feature row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl LogisticRegression {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Self {
        Self { coefficients, intercept, threshold: default_threshold() }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    fn sigmoid(z: f64) -> f64 {
        1.0 / (1.0 + (-z).exp())
    }

    /// Probability of class 1.
    pub fn predict_proba(&self, row: &FeatureRow) -> f64 {
        let z = self.coefficients.iter().zip(row).fold(self.intercept, |acc, (w, x)| acc + w * x);
        Self::sigmoid(z)
    }
}

impl Classifier for LogisticRegression {
    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn predict_row(&self, row: &FeatureRow) -> Result<u8, ModelError> {
        Ok(u8::from(self.predict_proba(row) >= self.threshold))
    }
}
