//! Field values

use super::FieldType;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// A single form value
///
/// Serialized untagged: text and dates as JSON strings, numbers as JSON
/// numbers (integral ones without a fraction), flags as booleans. Deserializing a string always yields
/// [`Scalar::Text`]; use [`Scalar::conform`] to retype it for a field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Number(f64),
    Flag(bool),
    /// ISO-8601 calendar date (`YYYY-MM-DD`)
    Date(String),
}

impl Scalar {
    /// Textual content, for text and date values
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) | Scalar::Date(s) => Some(s),
            Scalar::Number(_) | Scalar::Flag(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Scalar::Flag(b) => Some(*b),
            _ => None,
        }
    }

    /// True for an empty text or date value
    pub fn is_blank(&self) -> bool {
        self.as_str().is_some_and(str::is_empty)
    }

    /// Turn raw user input into a value typed for the field.
    ///
    /// Number fields keep non-numeric input as text so validation can
    /// report the mismatch.
    pub fn parse_for(field_type: FieldType, raw: &str) -> Scalar {
        match field_type {
            FieldType::Text => Scalar::Text(raw.to_string()),
            FieldType::Date => Scalar::Date(raw.to_string()),
            FieldType::Number => match raw.trim().parse::<f64>() {
                Ok(n) if n.is_finite() => Scalar::Number(n),
                _ => Scalar::Text(raw.to_string()),
            },
        }
    }

    /// Retype a fetched value for the field it is merged into
    pub fn conform(self, field_type: FieldType) -> Scalar {
        match (field_type, self) {
            (FieldType::Date, Scalar::Text(s)) => Scalar::Date(s),
            (FieldType::Number, Scalar::Text(s)) => Scalar::parse_for(FieldType::Number, &s),
            (_, other) => other,
        }
    }

    /// Convert a JSON value. Null, arrays and objects have no scalar form.
    pub fn from_json(value: &serde_json::Value) -> Option<Scalar> {
        match value {
            serde_json::Value::String(s) => Some(Scalar::Text(s.clone())),
            serde_json::Value::Number(n) => n.as_f64().map(Scalar::Number),
            serde_json::Value::Bool(b) => Some(Scalar::Flag(*b)),
            serde_json::Value::Null
            | serde_json::Value::Array(_)
            | serde_json::Value::Object(_) => None,
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::Text(s) | Scalar::Date(s) => serializer.serialize_str(s),
            Scalar::Number(n) => match as_integral(*n) {
                Some(i) => serializer.serialize_i64(i),
                None => serializer.serialize_f64(*n),
            },
            Scalar::Flag(b) => serializer.serialize_bool(*b),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(s) | Scalar::Date(s) => f.write_str(s),
            Scalar::Number(n) => f.write_str(&format_number(*n)),
            Scalar::Flag(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Text(s)
    }
}

impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        Scalar::Number(n)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Number(n as f64)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Flag(b)
    }
}

/// Integer value of `n` when it has no fraction and fits exactly
fn as_integral(n: f64) -> Option<i64> {
    (n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15).then(|| n as i64)
}

/// Render a number without a trailing `.0` when it is integral
pub fn format_number(n: f64) -> String {
    match as_integral(n) {
        Some(i) => i.to_string(),
        None => n.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_for_field_type() {
        assert_eq!(Scalar::parse_for(FieldType::Number, " 42 "), Scalar::Number(42.0));
        assert_eq!(Scalar::parse_for(FieldType::Number, "abc"), Scalar::Text("abc".into()));
        assert_eq!(Scalar::parse_for(FieldType::Number, "NaN"), Scalar::Text("NaN".into()));
        assert_eq!(Scalar::parse_for(FieldType::Date, "1985-03-15"), Scalar::Date("1985-03-15".into()));
        assert_eq!(Scalar::parse_for(FieldType::Text, "Jan"), Scalar::Text("Jan".into()));
    }

    #[test]
    fn test_from_json_drops_untyped_kinds() {
        assert_eq!(Scalar::from_json(&json!("Jan")), Some(Scalar::Text("Jan".into())));
        assert_eq!(Scalar::from_json(&json!(7)), Some(Scalar::Number(7.0)));
        assert_eq!(Scalar::from_json(&json!(true)), Some(Scalar::Flag(true)));
        assert_eq!(Scalar::from_json(&json!(null)), None);
        assert_eq!(Scalar::from_json(&json!([1, 2])), None);
        assert_eq!(Scalar::from_json(&json!({"a": 1})), None);
    }

    #[test]
    fn test_conform() {
        let date = Scalar::Text("1985-03-15".into()).conform(FieldType::Date);
        assert_eq!(date, Scalar::Date("1985-03-15".into()));
        assert_eq!(Scalar::Text("30".into()).conform(FieldType::Number), Scalar::Number(30.0));
        assert_eq!(Scalar::Flag(true).conform(FieldType::Text), Scalar::Flag(true));
    }

    #[test]
    fn test_equality_is_per_variant() {
        assert_ne!(Scalar::Text("1".into()), Scalar::Number(1.0));
        assert_ne!(Scalar::Text("2024-01-01".into()), Scalar::Date("2024-01-01".into()));
        assert_eq!(Scalar::from(18_i64), Scalar::Number(18.0));
    }

    #[test]
    fn test_display_and_json() {
        assert_eq!(Scalar::Number(18.0).to_string(), "18");
        assert_eq!(Scalar::Number(2.5).to_string(), "2.5");
        assert_eq!(Scalar::Flag(false).to_string(), "false");
        assert_eq!(serde_json::to_value(Scalar::Date("2024-01-01".into())).unwrap(), json!("2024-01-01"));
        assert_eq!(serde_json::to_value(Scalar::Number(3.0)).unwrap(), json!(3));
        assert_eq!(serde_json::to_value(Scalar::Number(-3.0)).unwrap(), json!(-3));
        assert_eq!(serde_json::to_value(Scalar::Number(2.5)).unwrap(), json!(2.5));
        assert_eq!(serde_json::to_string(&Scalar::Number(30.0)).unwrap(), "30");
        assert_eq!(serde_json::from_value::<Scalar>(json!(30)).unwrap(), Scalar::Number(30.0));
    }

    #[test]
    fn test_blank() {
        assert!(Scalar::Text(String::new()).is_blank());
        assert!(!Scalar::Text(" ".into()).is_blank());
        assert!(!Scalar::Number(0.0).is_blank());
    }
}
