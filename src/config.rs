use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::models::Category;
use crate::predictor::{Threshold, DEFAULT_THRESHOLD};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub models_dir: PathBuf,
    pub dataset_path: PathBuf,
    pub default_threshold: Threshold,
    pub category_thresholds: BTreeMap<Category, Threshold>,
    pub max_body_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            models_dir: PathBuf::from("models"),
            dataset_path: PathBuf::from("data/Updated_Farmer_Dataset.csv"),
            default_threshold: Threshold::default(),
            category_thresholds: BTreeMap::new(),
            max_body_bytes: 64 * 1024,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, so tests need not touch
    /// the process environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(port) => port
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))
                .and_then(|port: u16| {
                    if port == 0 {
                        anyhow::bail!("PORT must be a valid number between 1-65535");
                    }
                    Ok(port)
                })?,
            None => defaults.port,
        };

        let models_dir = path_var(&lookup, "MODELS_DIR")?.unwrap_or(defaults.models_dir);
        let dataset_path = path_var(&lookup, "DATASET_PATH")?.unwrap_or(defaults.dataset_path);

        let default_threshold = match lookup("ELIGIBILITY_THRESHOLD") {
            Some(raw) => parse_threshold("ELIGIBILITY_THRESHOLD", &raw)?,
            None => Threshold::new(DEFAULT_THRESHOLD)?,
        };

        let mut category_thresholds = BTreeMap::new();
        for category in Category::ALL {
            let key = category.threshold_env();
            let threshold = match lookup(key) {
                Some(raw) => parse_threshold(key, &raw)?,
                None => default_threshold,
            };
            category_thresholds.insert(category, threshold);
        }

        let max_body_bytes = match lookup("MAX_BODY_BYTES") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("MAX_BODY_BYTES must be a positive integer"))
                .and_then(|bytes: usize| {
                    if bytes == 0 {
                        anyhow::bail!("MAX_BODY_BYTES cannot be zero");
                    }
                    Ok(bytes)
                })?,
            None => defaults.max_body_bytes,
        };

        let config = Self {
            port,
            models_dir,
            dataset_path,
            default_threshold,
            category_thresholds,
            max_body_bytes,
        };

        tracing::debug!("Models directory: {}", config.models_dir.display());
        tracing::debug!("Dataset path: {}", config.dataset_path.display());
        for (category, threshold) in &config.category_thresholds {
            tracing::debug!("Threshold for {}: {}", category, threshold.value());
        }
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }

    /// Threshold in effect for a category.
    pub fn threshold_for(&self, category: Category) -> Threshold {
        self.category_thresholds
            .get(&category)
            .copied()
            .unwrap_or(self.default_threshold)
    }
}

fn path_var<F>(lookup: &F, key: &str) -> anyhow::Result<Option<PathBuf>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if value.trim().is_empty() => anyhow::bail!("{} cannot be empty", key),
        Some(value) => Ok(Some(PathBuf::from(value.trim()))),
        None => Ok(None),
    }
}

fn parse_threshold(key: &str, raw: &str) -> anyhow::Result<Threshold> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("{} must be a number, got '{}'", key, raw))?;
    Threshold::new(value).map_err(|e| anyhow::anyhow!("{}: {}", key, e))
}
