//! Form schema model
//!
//! A [`FormConfiguration`] is loaded once per country and is immutable
//! afterwards. Decoding lives in [`decoder`]; field values in [`value`].

pub mod decoder;
pub mod value;

pub use decoder::{decode, decode_value};
pub use value::Scalar;

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Validation rules
// =============================================================================

/// Kind of a validation rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleKind {
    Required,
    Regex,
    MinLength,
    MaxLength,
    MinValue,
    MaxValue,
}

impl RuleKind {
    /// Kinds accepted as keys of the shorthand `validation` map, in the
    /// order the decoder emits them.
    pub const SHORTHAND_ORDER: [RuleKind; 5] = [
        RuleKind::Regex,
        RuleKind::MinLength,
        RuleKind::MaxLength,
        RuleKind::MinValue,
        RuleKind::MaxValue,
    ];

    /// Schema name of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::Required => "required",
            RuleKind::Regex => "regex",
            RuleKind::MinLength => "minLength",
            RuleKind::MaxLength => "maxLength",
            RuleKind::MinValue => "minValue",
            RuleKind::MaxValue => "maxValue",
        }
    }

    /// Parse a schema name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "required" => Some(RuleKind::Required),
            "regex" => Some(RuleKind::Regex),
            "minLength" => Some(RuleKind::MinLength),
            "maxLength" => Some(RuleKind::MaxLength),
            "minValue" => Some(RuleKind::MinValue),
            "maxValue" => Some(RuleKind::MaxValue),
            _ => None,
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rule of a field's rule chain
///
/// `parameter` is always text (pattern, length or numeric bound) and is
/// parsed by the validation engine at evaluation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRule {
    #[serde(rename = "type")]
    pub kind: RuleKind,
    #[serde(rename = "value", default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ValidationRule {
    pub fn new(kind: RuleKind) -> Self {
        Self {
            kind,
            parameter: None,
            message: None,
        }
    }

    pub fn with_parameter(mut self, parameter: impl Into<String>) -> Self {
        self.parameter = Some(parameter.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn required() -> Self {
        Self::new(RuleKind::Required)
    }

    pub fn regex(pattern: impl Into<String>) -> Self {
        Self::new(RuleKind::Regex).with_parameter(pattern)
    }

    pub fn min_length(min: usize) -> Self {
        Self::new(RuleKind::MinLength).with_parameter(min.to_string())
    }

    pub fn max_length(max: usize) -> Self {
        Self::new(RuleKind::MaxLength).with_parameter(max.to_string())
    }

    pub fn min_value(min: f64) -> Self {
        Self::new(RuleKind::MinValue).with_parameter(value::format_number(min))
    }

    pub fn max_value(max: f64) -> Self {
        Self::new(RuleKind::MaxValue).with_parameter(value::format_number(max))
    }
}

// =============================================================================
// Fields
// =============================================================================

/// Input type of a field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    Text,
    Number,
    Date,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Date => "date",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "text" => Some(FieldType::Text),
            "number" => Some(FieldType::Number),
            "date" => Some(FieldType::Date),
            _ => None,
        }
    }
}

/// A schema-declared input
///
/// Serializes to the explicit rule-array form; deserialization goes through
/// [`decoder`] so both rule encodings are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub required: bool,
    #[serde(rename = "validation")]
    pub rules: Vec<ValidationRule>,
    #[serde(rename = "dataSource", skip_serializing_if = "Option::is_none")]
    pub data_source_id: Option<String>,
    pub read_only: bool,
}

impl FormField {
    pub fn new(id: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            field_type,
            required: false,
            rules: Vec::new(),
            data_source_id: None,
            read_only: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_rule(mut self, rule: ValidationRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn bound_to(mut self, data_source_id: impl Into<String>) -> Self {
        self.data_source_id = Some(data_source_id.into());
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }
}

// =============================================================================
// Data sources
// =============================================================================

/// Where a data source's values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceType {
    /// Fetched from a profile source during hydration
    Api,
    /// Entered by the user
    Manual,
}

impl DataSourceType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "api" => Some(DataSourceType::Api),
            "manual" => Some(DataSourceType::Manual),
            _ => None,
        }
    }
}

/// Named binding for a group of fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSource {
    pub id: String,
    #[serde(rename = "type")]
    pub source_type: DataSourceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub fields: Vec<String>,
}

impl DataSource {
    pub fn api(id: impl Into<String>, endpoint: Option<&str>) -> Self {
        Self {
            id: id.into(),
            source_type: DataSourceType::Api,
            endpoint: endpoint.map(String::from),
            fields: Vec::new(),
        }
    }

    pub fn manual(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source_type: DataSourceType::Manual,
            endpoint: None,
            fields: Vec::new(),
        }
    }

    pub fn supplying<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_api(&self) -> bool {
        self.source_type == DataSourceType::Api
    }
}

// =============================================================================
// Configuration
// =============================================================================

/// Complete form schema for one country
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "serde_yaml::Value")]
pub struct FormConfiguration {
    pub country: String,
    pub data_sources: Vec<DataSource>,
    pub fields: Vec<FormField>,
}

impl TryFrom<serde_yaml::Value> for FormConfiguration {
    type Error = crate::SchemaError;

    fn try_from(value: serde_yaml::Value) -> Result<Self, Self::Error> {
        decode_value(&value)
    }
}

impl FormConfiguration {
    pub fn new(country: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            data_sources: Vec::new(),
            fields: Vec::new(),
        }
    }

    pub fn with_data_source(mut self, source: DataSource) -> Self {
        self.data_sources.push(source);
        self
    }

    pub fn with_field(mut self, field: FormField) -> Self {
        self.fields.push(field);
        self
    }

    /// Field by id
    pub fn field(&self, id: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Data source by id
    pub fn data_source(&self, id: &str) -> Option<&DataSource> {
        self.data_sources.iter().find(|s| s.id == id)
    }

    /// Fields bound to a data source, in schema order
    pub fn fields_for_source<'a>(&'a self, source_id: &'a str) -> impl Iterator<Item = &'a FormField> + 'a {
        self.fields
            .iter()
            .filter(move |f| f.data_source_id.as_deref() == Some(source_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FormConfiguration {
        FormConfiguration::new("NL")
            .with_data_source(DataSource::api("user_profile", Some("/api/nl-user-profile")))
            .with_field(
                FormField::new("first_name", "First Name", FieldType::Text)
                    .required()
                    .bound_to("user_profile")
                    .read_only(),
            )
            .with_field(FormField::new("bsn", "BSN", FieldType::Text).with_rule(ValidationRule::regex(r"^\d{9}$")))
    }

    #[test]
    fn test_field_defaults() {
        let field = FormField::new("first_name", "First Name", FieldType::Text);
        assert!(!field.required);
        assert!(field.rules.is_empty());
        assert!(field.data_source_id.is_none());
        assert!(!field.read_only);
    }

    #[test]
    fn test_lookups() {
        let config = sample();
        assert_eq!(config.field("bsn").map(|f| f.label.as_str()), Some("BSN"));
        assert!(config.field("missing").is_none());
        assert!(config.data_source("user_profile").is_some_and(DataSource::is_api));

        let bound: Vec<_> = config.fields_for_source("user_profile").map(|f| f.id.as_str()).collect();
        assert_eq!(bound, vec!["first_name"]);
    }

    #[test]
    fn test_rule_kind_names() {
        for kind in RuleKind::SHORTHAND_ORDER {
            assert_eq!(RuleKind::from_name(kind.as_str()), Some(kind));
        }
        assert_eq!(RuleKind::from_name("email"), None);
    }

    #[test]
    fn test_numeric_rule_parameters_are_text() {
        assert_eq!(ValidationRule::min_value(18.0).parameter.as_deref(), Some("18"));
        assert_eq!(ValidationRule::max_value(2.5).parameter.as_deref(), Some("2.5"));
        assert_eq!(ValidationRule::min_length(3).parameter.as_deref(), Some("3"));
    }

    #[test]
    fn test_serializes_explicit_rule_form() {
        let json = serde_json::to_value(sample()).unwrap();
        let rule = &json["fields"][1]["validation"][0];
        assert_eq!(rule["type"], "regex");
        assert_eq!(rule["value"], r"^\d{9}$");
        assert!(rule.get("message").is_none());
        assert_eq!(json["fields"][0]["dataSource"], "user_profile");
        assert_eq!(json["fields"][0]["readOnly"], true);
    }

    #[test]
    fn test_serde_round_trip_through_decoder() {
        let config = sample();
        let json = serde_json::to_string(&config).unwrap();
        let back: FormConfiguration = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
