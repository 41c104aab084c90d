//! Schema document decoder
//!
//! Accepts YAML or JSON. A field's `validation` key may hold either an
//! explicit array of `{type, value, message}` rules or a shorthand map
//! keyed by rule kind:
//!
//! ```yaml
//! validation:
//!   regex: '^\d{9}$'
//!   maxLength: { value: 9, message: Too long }
//!   message: BSN must be 9 digits   # fallback for sub-rules without one
//! ```

use super::{DataSource, DataSourceType, FieldType, FormConfiguration, FormField, RuleKind, ValidationRule};
use crate::error::{Result, SchemaError};
use regex::Regex;
use serde_yaml::{Mapping, Value};
use std::collections::HashSet;

/// Decode a schema document
pub fn decode(document: &str) -> Result<FormConfiguration> {
    let value: Value = serde_yaml::from_str(document)?;
    decode_value(&value)
}

/// Decode an already-parsed schema document
pub fn decode_value(value: &Value) -> Result<FormConfiguration> {
    let root = mapping(value, "$")?;
    let country = required_str(root, "$", "country")?;

    let data_sources = match root.get("dataSources") {
        None | Some(Value::Null) => Vec::new(),
        Some(v) => sequence(v, "dataSources")?
            .iter()
            .enumerate()
            .map(|(i, item)| decode_data_source(item, &format!("dataSources[{}]", i)))
            .collect::<Result<Vec<_>>>()?,
    };

    let fields = match root.get("fields") {
        None => {
            return Err(SchemaError::MissingKey {
                path: "$".into(),
                key: "fields",
            })
        }
        Some(Value::Null) => Vec::new(),
        Some(v) => sequence(v, "fields")?
            .iter()
            .enumerate()
            .map(|(i, item)| decode_field(item, &format!("fields[{}]", i)))
            .collect::<Result<Vec<_>>>()?,
    };

    ensure_unique("data source", data_sources.iter().map(|s| s.id.as_str()))?;
    ensure_unique("field", fields.iter().map(|f| f.id.as_str()))?;

    Ok(FormConfiguration {
        country,
        data_sources,
        fields,
    })
}

fn decode_data_source(value: &Value, path: &str) -> Result<DataSource> {
    let map = mapping(value, path)?;
    let id = required_str(map, path, "id")?;
    let type_name = required_str(map, path, "type")?;
    let source_type = DataSourceType::from_name(&type_name).ok_or_else(|| SchemaError::UnknownVariant {
        path: format!("{}.type", path),
        kind: "data source type",
        value: type_name,
    })?;
    let endpoint = optional_str(map, path, "endpoint")?;
    let fields = match map.get("fields") {
        None | Some(Value::Null) => Vec::new(),
        Some(v) => sequence(v, &format!("{}.fields", path))?
            .iter()
            .map(|item| {
                item.as_str().map(String::from).ok_or_else(|| SchemaError::InvalidType {
                    path: format!("{}.fields", path),
                    expected: "sequence of field ids",
                })
            })
            .collect::<Result<Vec<_>>>()?,
    };

    Ok(DataSource {
        id,
        source_type,
        endpoint,
        fields,
    })
}

fn decode_field(value: &Value, path: &str) -> Result<FormField> {
    let map = mapping(value, path)?;
    let id = required_str(map, path, "id")?;
    let label = required_str(map, path, "label")?;
    let type_name = required_str(map, path, "type")?;
    let field_type = FieldType::from_name(&type_name).ok_or_else(|| SchemaError::UnknownVariant {
        path: format!("{}.type", path),
        kind: "field type",
        value: type_name,
    })?;
    let required = match map.get("required") {
        Some(v) => v.as_bool().ok_or_else(|| SchemaError::InvalidType {
            path: format!("{}.required", path),
            expected: "boolean",
        })?,
        None => {
            return Err(SchemaError::MissingKey {
                path: path.to_string(),
                key: "required",
            })
        }
    };
    let read_only = match map.get("readOnly") {
        None | Some(Value::Null) => false,
        Some(v) => v.as_bool().ok_or_else(|| SchemaError::InvalidType {
            path: format!("{}.readOnly", path),
            expected: "boolean",
        })?,
    };
    let data_source_id = match optional_str(map, path, "dataSource")? {
        Some(id) => Some(id),
        None => optional_str(map, path, "dataSourceId")?,
    };
    let rules = decode_rules(map.get("validation"), &format!("{}.validation", path))?;

    Ok(FormField {
        id,
        label,
        field_type,
        required,
        rules,
        data_source_id,
        read_only,
    })
}

// =============================================================================
// Rule decoding
// =============================================================================

/// Decode a `validation` value in either encoding.
///
/// The explicit array form is tried first; anything that is not a sequence
/// falls through to the shorthand map form. Absent or null yields no rules.
pub fn decode_rules(value: Option<&Value>, path: &str) -> Result<Vec<ValidationRule>> {
    let value = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(v) => v,
    };

    explicit_rules(value, path)
        .or_else(|| shorthand_rules(value, path))
        .unwrap_or_else(|| {
            Err(SchemaError::InvalidType {
                path: path.to_string(),
                expected: "sequence of rules or map of rule kinds",
            })
        })
}

/// `[{type, value, message}, ...]`; `None` when the value is not a sequence
fn explicit_rules(value: &Value, path: &str) -> Option<Result<Vec<ValidationRule>>> {
    let items = value.as_sequence()?;
    Some(
        items
            .iter()
            .enumerate()
            .map(|(i, item)| explicit_rule(item, &format!("{}[{}]", path, i)))
            .collect(),
    )
}

fn explicit_rule(value: &Value, path: &str) -> Result<ValidationRule> {
    let map = mapping(value, path)?;
    let type_name = required_str(map, path, "type")?;
    let kind = RuleKind::from_name(&type_name).ok_or_else(|| SchemaError::UnknownVariant {
        path: format!("{}.type", path),
        kind: "rule kind",
        value: type_name,
    })?;
    let parameter = match map.get("value") {
        None | Some(Value::Null) => None,
        Some(v) => Some(parameter_text(v, &format!("{}.value", path))?),
    };
    let message = optional_str(map, path, "message")?;

    build_rule(kind, parameter, message, path)
}

/// `{regex: .., minLength: .., message: ..}`; `None` when not a mapping
fn shorthand_rules(value: &Value, path: &str) -> Option<Result<Vec<ValidationRule>>> {
    let map = value.as_mapping()?;
    Some(shorthand_from_map(map, path))
}

fn shorthand_from_map(map: &Mapping, path: &str) -> Result<Vec<ValidationRule>> {
    let fallback = optional_str(map, path, "message")?;

    for key in map.keys() {
        let name = key.as_str().ok_or_else(|| SchemaError::InvalidType {
            path: path.to_string(),
            expected: "string keys",
        })?;
        let known = name == "message"
            || RuleKind::SHORTHAND_ORDER.iter().any(|kind| kind.as_str() == name);
        if !known {
            return Err(SchemaError::UnknownVariant {
                path: path.to_string(),
                kind: "rule kind",
                value: name.to_string(),
            });
        }
    }

    let mut rules = Vec::new();
    for kind in RuleKind::SHORTHAND_ORDER {
        let entry = match map.get(kind.as_str()) {
            Some(v) => v,
            None => continue,
        };
        let rule_path = format!("{}.{}", path, kind);

        let (parameter, message) = match entry {
            Value::Mapping(inner) => {
                let parameter = match inner.get("value") {
                    None | Some(Value::Null) => None,
                    Some(v) => Some(parameter_text(v, &format!("{}.value", rule_path))?),
                };
                (parameter, optional_str(inner, &rule_path, "message")?)
            }
            Value::Null => (None, None),
            scalar => (Some(parameter_text(scalar, &rule_path)?), None),
        };

        rules.push(build_rule(kind, parameter, message.or_else(|| fallback.clone()), &rule_path)?);
    }

    Ok(rules)
}

fn build_rule(
    kind: RuleKind,
    parameter: Option<String>,
    message: Option<String>,
    path: &str,
) -> Result<ValidationRule> {
    check_parameter(kind, parameter.as_deref(), path)?;
    Ok(ValidationRule {
        kind,
        parameter,
        message,
    })
}

/// Reject parameters the validation engine could never use
fn check_parameter(kind: RuleKind, parameter: Option<&str>, path: &str) -> Result<()> {
    let malformed = |reason: String| SchemaError::MalformedParameter {
        path: path.to_string(),
        kind,
        reason,
    };

    match kind {
        RuleKind::Required => Ok(()),
        _ => {
            let parameter = parameter.ok_or_else(|| malformed("missing value".into()))?;
            match kind {
                RuleKind::Regex => Regex::new(parameter)
                    .map(|_| ())
                    .map_err(|e| malformed(e.to_string())),
                RuleKind::MinLength | RuleKind::MaxLength => parameter
                    .trim()
                    .parse::<usize>()
                    .map(|_| ())
                    .map_err(|_| malformed(format!("`{}` is not a length", parameter))),
                _ => match parameter.trim().parse::<f64>() {
                    Ok(n) if n.is_finite() => Ok(()),
                    _ => Err(malformed(format!("`{}` is not a number", parameter))),
                },
            }
        }
    }
}

/// Rule operands are carried as text whatever their YAML type
fn parameter_text(value: &Value, path: &str) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(SchemaError::InvalidType {
            path: path.to_string(),
            expected: "scalar rule value",
        }),
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn mapping<'a>(value: &'a Value, path: &str) -> Result<&'a Mapping> {
    value.as_mapping().ok_or_else(|| SchemaError::InvalidType {
        path: path.to_string(),
        expected: "mapping",
    })
}

fn sequence<'a>(value: &'a Value, path: &str) -> Result<&'a Vec<Value>> {
    value.as_sequence().ok_or_else(|| SchemaError::InvalidType {
        path: path.to_string(),
        expected: "sequence",
    })
}

fn required_str(map: &Mapping, path: &str, key: &'static str) -> Result<String> {
    match map.get(key) {
        None | Some(Value::Null) => Err(SchemaError::MissingKey {
            path: path.to_string(),
            key,
        }),
        Some(v) => scalar_string(v).ok_or_else(|| SchemaError::InvalidType {
            path: format!("{}.{}", path, key),
            expected: "string",
        }),
    }
}

fn optional_str(map: &Mapping, path: &str, key: &'static str) -> Result<Option<String>> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => scalar_string(v).map(Some).ok_or_else(|| SchemaError::InvalidType {
            path: format!("{}.{}", path, key),
            expected: "string",
        }),
    }
}

/// Strings, plus numbers written unquoted (e.g. a label `2024`)
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn ensure_unique<'a>(kind: &'static str, ids: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(SchemaError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}
