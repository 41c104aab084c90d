//! Error types for the form engine

use crate::schema::RuleKind;
use thiserror::Error;

/// Schema loading and decoding errors
///
/// Fatal to a form load: the session surfaces the message and keeps no
/// configuration.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// No schema document exists for the country
    #[error("configuration not found for country: {0}")]
    NotFound(String),

    /// A schema document exists but could not be decoded
    #[error("invalid configuration for country {country}: {source}")]
    Invalid {
        country: String,
        #[source]
        source: Box<SchemaError>,
    },

    /// The document is not well-formed YAML/JSON
    #[error("parse error: {0}")]
    Parse(String),

    /// A mandatory key is absent
    #[error("{path}: missing required key `{key}`")]
    MissingKey { path: String, key: &'static str },

    /// A key holds a value of the wrong shape
    #[error("{path}: expected {expected}")]
    InvalidType { path: String, expected: &'static str },

    /// An enum value outside the known set
    #[error("{path}: unknown {kind} `{value}`")]
    UnknownVariant {
        path: String,
        kind: &'static str,
        value: String,
    },

    /// A rule parameter that cannot be used by its rule kind
    #[error("{path}: malformed {kind} parameter: {reason}")]
    MalformedParameter {
        path: String,
        kind: RuleKind,
        reason: String,
    },

    /// Two fields or two data sources share an id
    #[error("duplicate {kind} id `{id}`")]
    DuplicateId { kind: &'static str, id: String },

    /// Schema storage could not be read
    #[error("IO error: {0}")]
    Io(String),
}

impl SchemaError {
    /// Wrap a decode failure with the country it was loaded for
    pub fn invalid(country: impl Into<String>, source: SchemaError) -> Self {
        Self::Invalid {
            country: country.into(),
            source: Box::new(source),
        }
    }

    /// True for the not-found case
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<serde_yaml::Error> for SchemaError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Errors raised by a [`ProfileSource`](crate::profile::ProfileSource)
///
/// Never fatal to a form: hydration records them as per-field error state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    /// Endpoint or country the source does not serve
    #[error("unsupported profile key: {0}")]
    UnsupportedKey(String),

    /// Request could not be completed
    #[error("profile request failed: {0}")]
    Transport(String),

    /// Non-success response
    #[error("profile endpoint returned status {0}")]
    Status(u16),

    /// Response body is not a profile object
    #[error("profile decode error: {0}")]
    Decode(String),
}

/// Engine configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Result type for schema operations
pub type Result<T> = std::result::Result<T, SchemaError>;
