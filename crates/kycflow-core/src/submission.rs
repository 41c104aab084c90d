//! Submission payload

use crate::schema::{FormConfiguration, Scalar};
use crate::state::FormState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field values produced by a successful submit, ordered by field id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionPayload {
    values: BTreeMap<String, Scalar>,
}

impl SubmissionPayload {
    /// Collect every schema field holding a non-empty value
    pub fn collect(configuration: &FormConfiguration, state: &FormState) -> Self {
        let values = configuration
            .fields
            .iter()
            .filter_map(|field| {
                state
                    .value(&field.id)
                    .filter(|value| !value.is_blank())
                    .map(|value| (field.id.clone(), value.clone()))
            })
            .collect();
        Self { values }
    }

    pub fn get(&self, id: &str) -> Option<&Scalar> {
        self.values.get(id)
    }

    /// Value rendered for presentation
    pub fn display_value(&self, id: &str) -> Option<String> {
        self.values.get(id).map(Scalar::to_string)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.values.iter().map(|(id, value)| (id.as_str(), value))
    }

    /// Indented JSON object with sorted keys
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.values)
    }
}

impl FromIterator<(String, Scalar)> for SubmissionPayload {
    fn from_iter<I: IntoIterator<Item = (String, Scalar)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
