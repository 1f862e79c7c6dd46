use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use crate::classifier::{Classifier, ModelArtifact};
use crate::models::{Category, CategoryPrediction, FeatureVector, Verdict};

/// Threshold applied when no override is configured.
///
/// Lower than 0.5 on purpose: borderline applicants are reported as eligible.
pub const DEFAULT_THRESHOLD: f64 = 0.4;

/// Decision threshold on the positive-class probability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threshold(f64);

impl Threshold {
    pub fn new(value: f64) -> anyhow::Result<Self> {
        if !(0.0..=1.0).contains(&value) {
            anyhow::bail!("threshold must be within [0, 1], got {}", value);
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Probabilities at or above the threshold are eligible.
    pub fn verdict(self, probability: f64) -> Verdict {
        if probability >= self.0 {
            Verdict::Eligible
        } else {
            Verdict::NotEligible
        }
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self(DEFAULT_THRESHOLD)
    }
}

/// A classifier registered for one category.
#[derive(Clone)]
pub struct RegisteredModel {
    pub category: Category,
    pub classifier: Arc<dyn Classifier>,
    pub threshold: Threshold,
}

/// Classifiers for every category, loaded once at startup.
#[derive(Clone, Default)]
pub struct ModelRegistry {
    models: Vec<RegisteredModel>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the classifier for a category.
    pub fn register(
        &mut self,
        category: Category,
        classifier: Arc<dyn Classifier>,
        threshold: Threshold,
    ) {
        self.models.retain(|model| model.category != category);
        self.models.push(RegisteredModel {
            category,
            classifier,
            threshold,
        });
        self.models.sort_by_key(|model| model.category);
    }

    /// Loads one artifact per category from `models_dir`, asking
    /// `threshold_for` which threshold each category uses.
    pub fn load<F>(models_dir: &Path, threshold_for: F) -> anyhow::Result<Self>
    where
        F: Fn(Category) -> Threshold,
    {
        let mut registry = Self::new();
        for category in Category::ALL {
            let path = models_dir.join(category.artifact_file());
            let artifact = ModelArtifact::load(&path)?;
            let threshold = threshold_for(category);

            tracing::info!(
                "Loaded {} model ({}) from {} with threshold {}",
                category,
                artifact.kind(),
                path.display(),
                threshold.value()
            );
            registry.register(category, Arc::new(artifact), threshold);
        }
        Ok(registry)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.models.iter().map(|model| model.category)
    }

    /// Runs every classifier on the same input.
    pub fn predict_all(&self, features: &FeatureVector) -> BTreeMap<Category, CategoryPrediction> {
        self.models
            .iter()
            .map(|model| {
                let probability = model.classifier.positive_probability(features);
                let prediction = CategoryPrediction {
                    category: model.category.display_name(),
                    verdict: model.threshold.verdict(probability),
                    probability,
                    threshold: model.threshold.value(),
                };
                tracing::debug!(
                    "{}: probability {:.4} -> {}",
                    model.category,
                    probability,
                    prediction.verdict
                );
                (model.category, prediction)
            })
            .collect()
    }
}
