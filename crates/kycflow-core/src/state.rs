//! Per-field form state

use crate::schema::{FormConfiguration, Scalar};
use serde::Serialize;
use std::collections::HashMap;

/// Mutable state of one field
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormFieldState {
    pub value: Option<Scalar>,
    /// Error messages; empty means valid
    pub errors: Vec<String>,
    pub is_loading: bool,
    pub is_read_only: bool,
}

impl FormFieldState {
    pub fn has_error(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Messages joined one per line, for display
    pub fn error_text(&self) -> Option<String> {
        if self.errors.is_empty() {
            None
        } else {
            Some(self.errors.join("\n"))
        }
    }
}

/// Field states keyed by field id
///
/// Mutators on an unknown id create a default state instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FormState {
    fields: HashMap<String, FormFieldState>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// One empty state per schema field
    pub fn initialize(configuration: &FormConfiguration) -> Self {
        let fields = configuration
            .fields
            .iter()
            .map(|field| {
                let state = FormFieldState {
                    is_read_only: field.read_only,
                    ..FormFieldState::default()
                };
                (field.id.clone(), state)
            })
            .collect();
        Self { fields }
    }

    /// Set a value and clear the field's errors
    pub fn set_value(&mut self, id: &str, value: Option<Scalar>) {
        let state = self.entry(id);
        state.value = value;
        state.errors.clear();
    }

    pub fn set_error(&mut self, id: &str, messages: Vec<String>) {
        self.entry(id).errors = messages;
    }

    pub fn clear_error(&mut self, id: &str) {
        self.entry(id).errors.clear();
    }

    pub fn set_loading(&mut self, id: &str, loading: bool) {
        self.entry(id).is_loading = loading;
    }

    pub fn get(&self, id: &str) -> Option<&FormFieldState> {
        self.fields.get(id)
    }

    pub fn value(&self, id: &str) -> Option<&Scalar> {
        self.fields.get(id).and_then(|s| s.value.as_ref())
    }

    pub fn has_errors(&self) -> bool {
        self.fields.values().any(FormFieldState::has_error)
    }

    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    pub fn any_loading(&self) -> bool {
        self.fields.values().any(|s| s.is_loading)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FormFieldState)> {
        self.fields.iter().map(|(id, state)| (id.as_str(), state))
    }

    fn entry(&mut self, id: &str) -> &mut FormFieldState {
        self.fields.entry(id.to_string()).or_default()
    }
}
