//! CLI Commands

pub mod countries;
pub mod form;
pub mod schema;

use kycflow_core::{FormConfiguration, FormState};
use serde::Serialize;
use tabled::Tabled;

/// One schema field with its current state
#[derive(Debug, Serialize, Tabled)]
pub struct FieldRow {
    pub id: String,
    pub label: String,
    #[tabled(rename = "type")]
    #[serde(rename = "type")]
    pub field_type: String,
    pub required: bool,
    #[tabled(rename = "read-only")]
    pub read_only: bool,
    #[tabled(display_with = "display_option")]
    pub source: Option<String>,
    #[tabled(display_with = "display_option")]
    pub value: Option<String>,
    #[tabled(display_with = "display_errors")]
    pub errors: Vec<String>,
}

impl FieldRow {
    pub fn collect(configuration: &FormConfiguration, state: &FormState) -> Vec<Self> {
        configuration
            .fields
            .iter()
            .map(|field| {
                let field_state = state.get(&field.id);
                FieldRow {
                    id: field.id.clone(),
                    label: field.label.clone(),
                    field_type: field.field_type.as_str().to_string(),
                    required: field.required,
                    read_only: field.read_only,
                    source: field.data_source_id.clone(),
                    value: field_state.and_then(|s| s.value.as_ref()).map(ToString::to_string),
                    errors: field_state.map(|s| s.errors.clone()).unwrap_or_default(),
                }
            })
            .collect()
    }
}

fn display_option(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn display_errors(errors: &[String]) -> String {
    errors.join("\n")
}
