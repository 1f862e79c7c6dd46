//! Turns a raw request record into the numeric vector the classifiers expect.

use crate::label_encoders::{Encoded, EncodingWarning, LabelEncoderRegistry};
use crate::models::{Feature, FeatureVector, RawRecord, RawValue, FEATURE_COUNT};

/// Encoded model input together with every soft failure hit on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedInput {
    pub features: FeatureVector,
    pub warnings: Vec<EncodingWarning>,
}

impl EncodedInput {
    /// Emits one `warn` event per soft failure.
    pub fn log_warnings(&self) {
        for warning in &self.warnings {
            tracing::warn!("{}", warning);
        }
    }
}

/// Encodes every feature in training order.
///
/// Columns with a label encoder are looked up by label; all others are
/// parsed as numbers. Neither path fails: unseen labels become `-1` and
/// malformed numbers become `0.0`, each with a warning.
pub fn encode(encoders: &LabelEncoderRegistry, record: &RawRecord) -> EncodedInput {
    let mut values = [0.0; FEATURE_COUNT];
    let mut warnings = Vec::new();

    for feature in Feature::ALL {
        let raw = record.get(feature);
        let encoded = match encoders.lookup(feature, &raw.as_label()) {
            Some(encoded) => encoded,
            None => encode_numeric(feature, raw),
        };

        values[feature.index()] = encoded.value;
        if let Some(warning) = encoded.warning {
            warnings.push(warning);
        }
    }

    EncodedInput {
        features: FeatureVector::new(values),
        warnings,
    }
}

/// Converts a non-categorical value, defaulting to `0.0`.
pub fn encode_numeric(feature: Feature, raw: &RawValue) -> Encoded {
    let parsed = match raw {
        RawValue::Number(n) => Some(*n),
        RawValue::Text(text) => text.trim().parse::<f64>().ok(),
    };

    match parsed {
        Some(value) if value.is_finite() => Encoded::exact(value),
        _ => Encoded::fallback(
            0.0,
            EncodingWarning::InvalidNumber {
                feature,
                value: raw.to_string(),
            },
        ),
    }
}
