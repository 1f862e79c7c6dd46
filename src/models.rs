use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Number of features every classifier was trained on.
pub const FEATURE_COUNT: usize = 10;

/// Input features, in the column order used at training time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Feature {
    Age,
    Gender,
    Education,
    LandSizeAcres,
    AnnualIncome,
    CropType,
    State,
    District,
    Region,
    HasTakenCropInsurance,
}

impl Feature {
    /// All features in training order.
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::Age,
        Feature::Gender,
        Feature::Education,
        Feature::LandSizeAcres,
        Feature::AnnualIncome,
        Feature::CropType,
        Feature::State,
        Feature::District,
        Feature::Region,
        Feature::HasTakenCropInsurance,
    ];

    /// Column name as it appears in the dataset and the encoder file.
    pub fn name(self) -> &'static str {
        match self {
            Feature::Age => "age",
            Feature::Gender => "gender",
            Feature::Education => "education",
            Feature::LandSizeAcres => "land_size_acres",
            Feature::AnnualIncome => "annual_income",
            Feature::CropType => "crop_type",
            Feature::State => "state",
            Feature::District => "district",
            Feature::Region => "region",
            Feature::HasTakenCropInsurance => "has_taken_crop_insurance",
        }
    }

    /// Position of the feature in the vector.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Feature {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Feature::ALL
            .into_iter()
            .find(|feature| feature.name() == s)
            .ok_or_else(|| format!("unknown feature column '{}'", s))
    }
}

/// Fixed-length numeric model input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn new(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    pub fn get(&self, feature: Feature) -> f64 {
        self.0[feature.index()]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

/// A field value as submitted by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl RawValue {
    /// Text used for label lookup. Integral numbers drop the fractional part
    /// so that `1.0` matches a class stored as `"1"`.
    pub fn as_label(&self) -> String {
        match self {
            RawValue::Text(text) => text.clone(),
            RawValue::Number(n) if n.fract() == 0.0 && n.is_finite() => format!("{:.0}", n),
            RawValue::Number(n) => n.to_string(),
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Number(n) => write!(f, "{}", n),
            RawValue::Text(text) => f.write_str(text),
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

/// One raw value per feature. Also the JSON body of `POST /api/v1/predict`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub age: RawValue,
    pub gender: RawValue,
    pub education: RawValue,
    pub land_size_acres: RawValue,
    pub annual_income: RawValue,
    pub crop_type: RawValue,
    pub state: RawValue,
    pub district: RawValue,
    pub region: RawValue,
    pub has_taken_crop_insurance: RawValue,
}

impl RawRecord {
    pub fn get(&self, feature: Feature) -> &RawValue {
        match feature {
            Feature::Age => &self.age,
            Feature::Gender => &self.gender,
            Feature::Education => &self.education,
            Feature::LandSizeAcres => &self.land_size_acres,
            Feature::AnnualIncome => &self.annual_income,
            Feature::CropType => &self.crop_type,
            Feature::State => &self.state,
            Feature::District => &self.district,
            Feature::Region => &self.region,
            Feature::HasTakenCropInsurance => &self.has_taken_crop_insurance,
        }
    }
}

/// Form body of `POST /predict`. Every field is required.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictForm {
    pub age: String,
    pub gender: String,
    pub education: String,
    pub land_size_acres: String,
    pub annual_income: String,
    pub crop_type: String,
    pub state: String,
    pub district: String,
    pub region: String,
    pub has_taken_crop_insurance: String,
}

impl From<PredictForm> for RawRecord {
    fn from(form: PredictForm) -> Self {
        Self {
            age: form.age.into(),
            gender: form.gender.into(),
            education: form.education.into(),
            land_size_acres: form.land_size_acres.into(),
            annual_income: form.annual_income.into(),
            crop_type: form.crop_type.into(),
            state: form.state.into(),
            district: form.district.into(),
            region: form.region.into(),
            has_taken_crop_insurance: form.has_taken_crop_insurance.into(),
        }
    }
}

/// Government support schemes evaluated by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Pmfby,
    PmKisan,
    FpoSupport,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Pmfby, Category::PmKisan, Category::FpoSupport];

    /// Stable result key.
    pub fn key(self) -> &'static str {
        match self {
            Category::Pmfby => "eligible_pmfby",
            Category::PmKisan => "eligible_pmkisan",
            Category::FpoSupport => "eligible_fpo_support",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Category::Pmfby => "PMFBY",
            Category::PmKisan => "PM-KISAN",
            Category::FpoSupport => "FPO Support",
        }
    }

    /// Artifact file name inside the models directory.
    pub fn artifact_file(self) -> &'static str {
        match self {
            Category::Pmfby => "model_pmfby.json",
            Category::PmKisan => "model_pmkisan.json",
            Category::FpoSupport => "model_fpo_support.json",
        }
    }

    /// Environment variable holding a per-category threshold override.
    pub fn threshold_env(self) -> &'static str {
        match self {
            Category::Pmfby => "THRESHOLD_PMFBY",
            Category::PmKisan => "THRESHOLD_PMKISAN",
            Category::FpoSupport => "THRESHOLD_FPO_SUPPORT",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "Eligible")]
    Eligible,
    #[serde(rename = "Not Eligible")]
    NotEligible,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Eligible => "Eligible",
            Verdict::NotEligible => "Not Eligible",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome for one category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CategoryPrediction {
    pub category: &'static str,
    pub verdict: Verdict,
    pub probability: f64,
    pub threshold: f64,
}

/// Body of `POST /get_districts_and_regions`.
#[derive(Debug, Clone, Deserialize)]
pub struct StateQuery {
    pub state: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistrictsAndRegions {
    pub districts: Vec<String>,
    pub regions: Vec<String>,
}

/// Values offered by the form dropdowns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DropdownOptions {
    pub age_range: Vec<u32>,
    pub genders: Vec<String>,
    pub educations: Vec<String>,
    pub crop_types: Vec<String>,
    pub states: Vec<String>,
}

/// Response of `POST /api/v1/predict`.
#[derive(Debug, Clone, Serialize)]
pub struct PredictResponse {
    pub results: BTreeMap<&'static str, CategoryPrediction>,
    pub warnings: Vec<String>,
}
