use askama::Template;
use std::collections::BTreeMap;

use crate::models::{Category, CategoryPrediction, DropdownOptions, Verdict};

#[derive(Template)]
#[template(path = "form.html")]
pub struct FormTemplate {
    pub age_range: Vec<u32>,
    pub genders: Vec<String>,
    pub educations: Vec<String>,
    pub crop_types: Vec<String>,
    pub states: Vec<String>,
}

impl From<DropdownOptions> for FormTemplate {
    fn from(options: DropdownOptions) -> Self {
        Self {
            age_range: options.age_range,
            genders: options.genders,
            educations: options.educations,
            crop_types: options.crop_types,
            states: options.states,
        }
    }
}

/// One line of the result page.
pub struct ResultRow {
    pub scheme: &'static str,
    pub verdict: &'static str,
    pub eligible: bool,
}

#[derive(Template)]
#[template(path = "result.html")]
pub struct ResultTemplate {
    pub results: Vec<ResultRow>,
}

impl ResultTemplate {
    pub fn new(predictions: &BTreeMap<Category, CategoryPrediction>) -> Self {
        let results = predictions
            .iter()
            .map(|(category, prediction)| ResultRow {
                scheme: category.display_name(),
                verdict: prediction.verdict.as_str(),
                eligible: prediction.verdict == Verdict::Eligible,
            })
            .collect();
        Self { results }
    }
}
