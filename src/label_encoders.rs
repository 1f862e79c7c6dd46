use anyhow::Context;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::models::Feature;

/// Code substituted for labels the encoder never saw during training.
pub const UNSEEN_LABEL_CODE: f64 = -1.0;

/// Maps the known classes of one categorical column to integer codes.
///
/// The code of a class is its position in the class list, matching the
/// `classes_` layout of a fitted scikit-learn `LabelEncoder`.
#[derive(Debug, Clone)]
pub struct LabelEncoder {
    classes: Vec<String>,
    codes: HashMap<String, u32>,
}

impl LabelEncoder {
    /// Builds an encoder, rejecting duplicate classes.
    pub fn new(classes: Vec<String>) -> anyhow::Result<Self> {
        let mut codes = HashMap::with_capacity(classes.len());
        for (code, class) in classes.iter().enumerate() {
            let code = u32::try_from(code).context("too many classes")?;
            if codes.insert(class.clone(), code).is_some() {
                anyhow::bail!("duplicate class '{}'", class);
            }
        }
        Ok(Self { classes, codes })
    }

    pub fn transform(&self, label: &str) -> Option<u32> {
        self.codes.get(label).copied()
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

/// Result of encoding one value: the number to feed the model, plus a
/// warning when a fallback had to be used.
#[derive(Debug, Clone, PartialEq)]
pub struct Encoded {
    pub value: f64,
    pub warning: Option<EncodingWarning>,
}

impl Encoded {
    pub fn exact(value: f64) -> Self {
        Self {
            value,
            warning: None,
        }
    }

    pub fn fallback(value: f64, warning: EncodingWarning) -> Self {
        Self {
            value,
            warning: Some(warning),
        }
    }
}

/// Soft failures raised while encoding a request.
#[derive(Debug, Clone, PartialEq)]
pub enum EncodingWarning {
    /// Categorical value absent from the training classes.
    UnseenLabel { feature: Feature, value: String },
    /// Numeric field that could not be parsed as a finite number.
    InvalidNumber { feature: Feature, value: String },
}

impl std::fmt::Display for EncodingWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncodingWarning::UnseenLabel { feature, value } => write!(
                f,
                "unseen value '{}' in column '{}', using code {}",
                value, feature, UNSEEN_LABEL_CODE
            ),
            EncodingWarning::InvalidNumber { feature, value } => write!(
                f,
                "invalid numeric value '{}' in column '{}', using default 0.0",
                value, feature
            ),
        }
    }
}

/// Encoders for every categorical column, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct LabelEncoderRegistry {
    encoders: BTreeMap<Feature, LabelEncoder>,
}

impl LabelEncoderRegistry {
    pub fn new(encoders: BTreeMap<Feature, LabelEncoder>) -> Self {
        Self { encoders }
    }

    /// Reads a JSON object mapping column names to class lists.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read label encoders from {}", path.display()))?;
        let registry = Self::from_json(&raw)
            .with_context(|| format!("invalid label encoders in {}", path.display()))?;

        tracing::info!(
            "Loaded label encoders for {} columns from {}",
            registry.encoders.len(),
            path.display()
        );
        Ok(registry)
    }

    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        let parsed: BTreeMap<String, Vec<String>> = serde_json::from_str(raw)?;

        let mut encoders = BTreeMap::new();
        for (column, classes) in parsed {
            let feature: Feature = column.parse().map_err(|e: String| anyhow::anyhow!(e))?;
            let encoder = LabelEncoder::new(classes)
                .with_context(|| format!("column '{}'", column))?;
            encoders.insert(feature, encoder);
        }

        Ok(Self { encoders })
    }

    pub fn is_categorical(&self, feature: Feature) -> bool {
        self.encoders.contains_key(&feature)
    }

    pub fn get(&self, feature: Feature) -> Option<&LabelEncoder> {
        self.encoders.get(&feature)
    }

    /// Encodes a categorical value, falling back to [`UNSEEN_LABEL_CODE`].
    ///
    /// Returns `None` when the column has no encoder at all.
    pub fn lookup(&self, feature: Feature, value: &str) -> Option<Encoded> {
        let encoder = self.encoders.get(&feature)?;
        let encoded = match encoder.transform(value) {
            Some(code) => Encoded::exact(f64::from(code)),
            None => Encoded::fallback(
                UNSEEN_LABEL_CODE,
                EncodingWarning::UnseenLabel {
                    feature,
                    value: value.to_string(),
                },
            ),
        };
        Some(encoded)
    }

    pub fn len(&self) -> usize {
        self.encoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encoders.is_empty()
    }
}
