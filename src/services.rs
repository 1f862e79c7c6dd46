use std::collections::BTreeMap;

use crate::config::Config;
use crate::encoder::{encode, EncodedInput};
use crate::label_encoders::LabelEncoderRegistry;
use crate::models::{Category, CategoryPrediction, RawRecord};
use crate::predictor::ModelRegistry;

/// Encoded input and per-category predictions for one applicant.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub input: EncodedInput,
    pub predictions: BTreeMap<Category, CategoryPrediction>,
}

/// Encode-and-predict pipeline over the startup registries.
#[derive(Clone)]
pub struct EligibilityService {
    encoders: LabelEncoderRegistry,
    models: ModelRegistry,
}

impl EligibilityService {
    pub fn new(encoders: LabelEncoderRegistry, models: ModelRegistry) -> Self {
        Self { encoders, models }
    }

    /// Loads encoders and classifiers from `config.models_dir`.
    pub fn load(config: &Config) -> anyhow::Result<Self> {
        let encoders =
            LabelEncoderRegistry::load(&config.models_dir.join("label_encoders.json"))?;
        let models =
            ModelRegistry::load(&config.models_dir, |category| config.threshold_for(category))?;
        Ok(Self::new(encoders, models))
    }

    pub fn encoders(&self) -> &LabelEncoderRegistry {
        &self.encoders
    }

    pub fn models(&self) -> &ModelRegistry {
        &self.models
    }

    /// Encodes the record, logs any soft failures and runs every model.
    pub fn evaluate(&self, record: &RawRecord) -> Evaluation {
        let input = encode(&self.encoders, record);
        input.log_warnings();

        let predictions = self.models.predict_all(&input.features);
        Evaluation { input, predictions }
    }
}
