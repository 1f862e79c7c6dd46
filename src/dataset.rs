//! Reference dataset used to populate the form dropdowns.

use anyhow::Context;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use crate::models::{DistrictsAndRegions, DropdownOptions};

/// Ages offered by the form.
pub const MIN_AGE: u32 = 18;
pub const MAX_AGE: u32 = 80;

/// Placeholder shown for rows without an education value.
pub const UNKNOWN_EDUCATION: &str = "Unknown";

/// Cell contents treated as missing, in addition to empty cells. This is the
/// default `na_values` set of `pandas.read_csv`, matched exactly.
const MISSING_MARKERS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// The columns of the farmer dataset the form cares about. Other columns in
/// the file are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReferenceRow {
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub education: Option<String>,
    #[serde(default)]
    pub crop_type: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
}

impl ReferenceRow {
    /// Replaces empty and marker cells with `None`.
    fn normalized(self) -> Self {
        Self {
            gender: present(self.gender),
            education: present(self.education),
            crop_type: present(self.crop_type),
            state: present(self.state),
            district: present(self.district),
            region: present(self.region),
        }
    }
}

fn present(cell: Option<String>) -> Option<String> {
    cell.filter(|value| !value.is_empty() && !MISSING_MARKERS.contains(&value.as_str()))
}

fn distinct<'a>(values: impl Iterator<Item = &'a String>) -> Vec<String> {
    values.cloned().collect::<BTreeSet<_>>().into_iter().collect()
}

/// Read-only table of farmer rows, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct ReferenceDataset {
    rows: Vec<ReferenceRow>,
}

impl ReferenceDataset {
    pub fn new(rows: Vec<ReferenceRow>) -> Self {
        Self {
            rows: rows.into_iter().map(ReferenceRow::normalized).collect(),
        }
    }

    /// Reads the dataset CSV. The file must have a header row.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("failed to open dataset {}", path.display()))?;
        let dataset = Self::from_reader(file)
            .with_context(|| format!("invalid dataset {}", path.display()))?;

        tracing::info!("Loaded {} dataset rows from {}", dataset.len(), path.display());
        Ok(dataset)
    }

    pub fn from_reader<R: Read>(reader: R) -> anyhow::Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let mut rows = Vec::new();
        for (line, record) in csv_reader.deserialize::<ReferenceRow>().enumerate() {
            // +2: one for the header, one for 1-based numbering
            let row = record.with_context(|| format!("malformed row {}", line + 2))?;
            rows.push(row);
        }
        Ok(Self::new(rows))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sorted, deduplicated values for every dropdown on the form.
    pub fn options(&self) -> DropdownOptions {
        DropdownOptions {
            age_range: (MIN_AGE..=MAX_AGE).collect(),
            genders: distinct(self.rows.iter().filter_map(|r| r.gender.as_ref())),
            educations: self
                .rows
                .iter()
                .map(|r| {
                    r.education
                        .clone()
                        .unwrap_or_else(|| UNKNOWN_EDUCATION.to_string())
                })
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
            crop_types: distinct(self.rows.iter().filter_map(|r| r.crop_type.as_ref())),
            states: distinct(self.rows.iter().filter_map(|r| r.state.as_ref())),
        }
    }

    /// Districts and regions of rows whose state matches exactly.
    pub fn districts_and_regions(&self, state: &str) -> DistrictsAndRegions {
        let matching: Vec<&ReferenceRow> = self
            .rows
            .iter()
            .filter(|r| r.state.as_deref() == Some(state))
            .collect();

        DistrictsAndRegions {
            districts: distinct(matching.iter().filter_map(|r| r.district.as_ref())),
            regions: distinct(matching.iter().filter_map(|r| r.region.as_ref())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
farmer_id,age,gender,education,crop_type,state,district,region
1,30,Male,Graduate,Rice,Kerala,Ernakulam,South
2,45,Female,,Wheat,Punjab,Ludhiana,North
3,52,Male,Primary,Rice,Kerala,Thrissur,South
4,38,,NA,Cotton,kerala,Kochi,Coast
5,61,Female,Graduate,,Punjab,,North
";

    fn dataset() -> ReferenceDataset {
        ReferenceDataset::from_reader(SAMPLE.as_bytes()).unwrap()
    }

    #[test]
    fn options_are_sorted_and_deduplicated() {
        let options = dataset().options();
        assert_eq!(options.genders, vec!["Female", "Male"]);
        assert_eq!(options.crop_types, vec!["Cotton", "Rice", "Wheat"]);
        assert_eq!(options.states, vec!["Kerala", "Punjab", "kerala"]);
    }

    #[test]
    fn missing_education_becomes_unknown() {
        let options = dataset().options();
        assert_eq!(options.educations, vec!["Graduate", "Primary", "Unknown"]);
    }

    #[test]
    fn age_range_covers_adults() {
        let options = dataset().options();
        assert_eq!(options.age_range.first(), Some(&18));
        assert_eq!(options.age_range.last(), Some(&80));
        assert_eq!(options.age_range.len(), 63);
    }

    #[test]
    fn state_filter_is_exact_and_case_sensitive() {
        let result = dataset().districts_and_regions("Kerala");
        assert_eq!(result.districts, vec!["Ernakulam", "Thrissur"]);
        assert_eq!(result.regions, vec!["South"]);

        let partial = dataset().districts_and_regions("Ker");
        assert!(partial.districts.is_empty());
        assert!(partial.regions.is_empty());
    }

    #[test]
    fn state_filter_drops_missing_districts() {
        let result = dataset().districts_and_regions("Punjab");
        assert_eq!(result.districts, vec!["Ludhiana"]);
        assert_eq!(result.regions, vec!["North"]);
    }

    #[test]
    fn missing_markers_match_pandas_defaults() {
        let csv = "\
gender,education,crop_type,state,district,region
Male,NULL,Rice,Kerala,#N/A,<NA>
Female,None,Rice,Kerala,n/a,South
-nan,#N/A N/A,1.#QNAN,Kerala,Thrissur,-1.#IND
Male, ,Rice,Kerala,Kochi,South
";
        let dataset = ReferenceDataset::from_reader(csv.as_bytes()).unwrap();
        let options = dataset.options();

        assert_eq!(options.genders, vec!["Female", "Male"]);
        assert_eq!(options.crop_types, vec!["Rice"]);
        // whitespace is a value, not a missing cell
        assert_eq!(options.educations, vec![" ", "Unknown"]);

        let result = dataset.districts_and_regions("Kerala");
        assert_eq!(result.districts, vec!["Kochi", "Thrissur"]);
        assert_eq!(result.regions, vec!["South"]);
    }
}
