//! Binary classifiers exported from the training notebooks.
//!
//! Each model is stored as a JSON artifact tagged with its `kind`:
//!
//! - `logistic_regression`: `sigmoid(intercept + Σ coefficients[i] · x[i])`
//! - `decision_tree`: scikit-learn's flat `tree_` arrays
//! - `random_forest`: a list of decision trees whose probabilities are averaged
//!
//! Artifacts are validated once when loaded, so inference itself never fails.

use anyhow::Context;
use serde::Deserialize;
use std::path::Path;

use crate::models::{FeatureVector, FEATURE_COUNT};

/// Marker used by scikit-learn for "no child".
const LEAF: i64 = -1;

/// A trained binary model.
pub trait Classifier: Send + Sync {
    /// Probability of the positive ("Eligible") class, in `[0, 1]`.
    fn positive_probability(&self, features: &FeatureVector) -> f64;
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    LogisticRegression(LogisticRegression),
    DecisionTree(DecisionTree),
    RandomForest(RandomForest),
}

impl ModelArtifact {
    /// Reads and validates an artifact file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read model artifact {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("invalid model artifact {}", path.display()))
    }

    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        let artifact: ModelArtifact = serde_json::from_str(raw)?;
        artifact.validate()?;
        Ok(artifact)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        match self {
            ModelArtifact::LogisticRegression(model) => model.validate(),
            ModelArtifact::DecisionTree(tree) => tree.validate(),
            ModelArtifact::RandomForest(forest) => forest.validate(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ModelArtifact::LogisticRegression(_) => "logistic_regression",
            ModelArtifact::DecisionTree(_) => "decision_tree",
            ModelArtifact::RandomForest(_) => "random_forest",
        }
    }
}

impl Classifier for ModelArtifact {
    fn positive_probability(&self, features: &FeatureVector) -> f64 {
        match self {
            ModelArtifact::LogisticRegression(model) => model.positive_probability(features),
            ModelArtifact::DecisionTree(tree) => tree.positive_probability(features),
            ModelArtifact::RandomForest(forest) => forest.positive_probability(features),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogisticRegression {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LogisticRegression {
    fn validate(&self) -> anyhow::Result<()> {
        if self.coefficients.len() != FEATURE_COUNT {
            anyhow::bail!(
                "expected {} coefficients, found {}",
                FEATURE_COUNT,
                self.coefficients.len()
            );
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            anyhow::bail!("coefficients must be finite");
        }
        Ok(())
    }
}

/// Logistic function. A NaN logit, from overflowed terms of opposite sign
/// cancelling, maps to 0.5; infinite logits saturate to 0 or 1.
fn sigmoid(z: f64) -> f64 {
    if z.is_nan() {
        return 0.5;
    }
    1.0 / (1.0 + (-z).exp())
}

impl Classifier for LogisticRegression {
    fn positive_probability(&self, features: &FeatureVector) -> f64 {
        let z = self.intercept
            + self
                .coefficients
                .iter()
                .zip(features.as_slice())
                .map(|(coef, x)| coef * x)
                .sum::<f64>();
        sigmoid(z)
    }
}

/// A fitted decision tree in scikit-learn's array layout.
///
/// Node `i` splits on `feature[i]` at `threshold[i]`; `value[i]` holds the
/// `[negative, positive]` class weights that reached it.
#[derive(Debug, Clone, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<[f64; 2]>,
}

impl DecisionTree {
    fn node_count(&self) -> usize {
        self.children_left.len()
    }

    fn validate(&self) -> anyhow::Result<()> {
        let n = self.node_count();
        if n == 0 {
            anyhow::bail!("tree has no nodes");
        }
        if self.children_right.len() != n
            || self.feature.len() != n
            || self.threshold.len() != n
            || self.value.len() != n
        {
            anyhow::bail!("tree arrays must all have {} entries", n);
        }

        for node in 0..n {
            let left = self.children_left[node];
            let right = self.children_right[node];

            if left == LEAF || right == LEAF {
                if left != right {
                    anyhow::bail!("node {} has exactly one child", node);
                }
                let [neg, pos] = self.value[node];
                if neg < 0.0 || pos < 0.0 || neg + pos <= 0.0 || !(neg + pos).is_finite() {
                    anyhow::bail!("leaf {} has invalid class weights", node);
                }
                continue;
            }

            // Children always come after their parent, which rules out cycles.
            for child in [left, right] {
                if child <= node as i64 || child >= n as i64 {
                    anyhow::bail!("node {} has out-of-range child {}", node, child);
                }
            }
            let feature = self.feature[node];
            if feature < 0 || feature >= FEATURE_COUNT as i64 {
                anyhow::bail!("node {} splits on unknown feature {}", node, feature);
            }
            if self.threshold[node].is_nan() {
                anyhow::bail!("node {} has a NaN threshold", node);
            }
        }
        Ok(())
    }
}

impl Classifier for DecisionTree {
    fn positive_probability(&self, features: &FeatureVector) -> f64 {
        let x = features.as_slice();
        let mut node = 0usize;
        while self.children_left[node] != LEAF {
            let split = self.feature[node] as usize;
            node = if x[split] <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        let [neg, pos] = self.value[node];
        pos / (neg + pos)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RandomForest {
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    fn validate(&self) -> anyhow::Result<()> {
        if self.trees.is_empty() {
            anyhow::bail!("forest has no trees");
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate().with_context(|| format!("tree {}", i))?;
        }
        Ok(())
    }
}

impl Classifier for RandomForest {
    fn positive_probability(&self, features: &FeatureVector) -> f64 {
        let total: f64 = self
            .trees
            .iter()
            .map(|tree| tree.positive_probability(features))
            .sum();
        total / self.trees.len() as f64
    }
}
