//! Validation engine
//!
//! Evaluates rule chains against field values. Failures are ordinary
//! return values, never errors: a rule whose parameter cannot be used
//! fails closed with [`INVALID_CONFIGURATION_MESSAGE`].

use crate::schema::value::format_number;
use crate::schema::{FormField, RuleKind, Scalar, ValidationRule};
use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

pub const REQUIRED_MESSAGE: &str = "This field is required";
pub const INVALID_CONFIGURATION_MESSAGE: &str = "Invalid validation configuration";
pub const EXPECTED_TEXT_FORMAT_MESSAGE: &str = "Invalid format - expected text value";
pub const INVALID_FORMAT_MESSAGE: &str = "Invalid format";
pub const EXPECTED_TEXT_MESSAGE: &str = "Invalid value - expected text";
pub const EXPECTED_NUMBER_MESSAGE: &str = "Invalid value - expected number";

/// How a rule chain reports failures
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RulePolicy {
    /// Stop at the first failing rule and report only its message
    #[default]
    FirstFailure,
    /// Evaluate every rule and report every failure in declaration order
    AccumulateAll,
}

/// Result of a single rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutcome {
    pub valid: bool,
    pub message: Option<String>,
}

impl RuleOutcome {
    pub fn valid() -> Self {
        Self {
            valid: true,
            message: None,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: Some(message.into()),
        }
    }
}

/// Result of a rule chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldOutcome {
    pub valid: bool,
    pub messages: Vec<String>,
}

impl FieldOutcome {
    pub fn valid() -> Self {
        Self {
            valid: true,
            messages: Vec::new(),
        }
    }

    fn from_messages(messages: Vec<String>) -> Self {
        Self {
            valid: messages.is_empty(),
            messages,
        }
    }

    pub fn first_message(&self) -> Option<&str> {
        self.messages.first().map(String::as_str)
    }

    /// All messages, one per line
    pub fn joined(&self) -> String {
        self.messages.join("\n")
    }
}

impl Default for FieldOutcome {
    fn default() -> Self {
        Self::valid()
    }
}

/// Stateless rule evaluator
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationEngine {
    policy: RulePolicy,
}

impl ValidationEngine {
    pub fn new(policy: RulePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> RulePolicy {
        self.policy
    }

    /// Evaluate one rule
    pub fn evaluate(&self, value: Option<&Scalar>, rule: &ValidationRule) -> RuleOutcome {
        let message = rule.message.as_deref();
        match rule.kind {
            RuleKind::Required => check_required(value, message),
            RuleKind::Regex => check_regex(value, rule.parameter.as_deref(), message),
            RuleKind::MinLength => check_length(value, rule.parameter.as_deref(), message, Bound::Min),
            RuleKind::MaxLength => check_length(value, rule.parameter.as_deref(), message, Bound::Max),
            RuleKind::MinValue => check_number(value, rule.parameter.as_deref(), message, Bound::Min),
            RuleKind::MaxValue => check_number(value, rule.parameter.as_deref(), message, Bound::Max),
        }
    }

    /// Evaluate a field: the implicit required check, then its rule chain.
    ///
    /// Optional fields run their rules whatever the value, so a rule on an
    /// empty optional field reports its type mismatch.
    pub fn evaluate_field(&self, field: &FormField, value: Option<&Scalar>) -> FieldOutcome {
        if !field.required {
            return self.evaluate_all(value, &field.rules);
        }

        let required = check_required(value, None);
        match (self.policy, required.message) {
            (_, None) => self.evaluate_all(value, &field.rules),
            (RulePolicy::FirstFailure, Some(message)) => FieldOutcome::from_messages(vec![message]),
            (RulePolicy::AccumulateAll, Some(message)) => {
                let mut messages = vec![message];
                messages.extend(self.evaluate_all(value, &field.rules).messages);
                FieldOutcome::from_messages(messages)
            }
        }
    }

    /// Evaluate an arbitrary rule list in declaration order
    pub fn evaluate_all(&self, value: Option<&Scalar>, rules: &[ValidationRule]) -> FieldOutcome {
        let failures = rules
            .iter()
            .map(|rule| self.evaluate(value, rule))
            .filter_map(|outcome| outcome.message);

        match self.policy {
            RulePolicy::FirstFailure => FieldOutcome::from_messages(failures.take(1).collect()),
            RulePolicy::AccumulateAll => FieldOutcome::from_messages(failures.collect()),
        }
    }
}

#[derive(Clone, Copy)]
enum Bound {
    Min,
    Max,
}

fn check_required(value: Option<&Scalar>, message: Option<&str>) -> RuleOutcome {
    match value {
        Some(v) if !v.is_blank() => RuleOutcome::valid(),
        _ => RuleOutcome::invalid(message.unwrap_or(REQUIRED_MESSAGE)),
    }
}

fn check_regex(value: Option<&Scalar>, pattern: Option<&str>, message: Option<&str>) -> RuleOutcome {
    let regex = match pattern.map(Regex::new) {
        Some(Ok(regex)) => regex,
        _ => return RuleOutcome::invalid(INVALID_CONFIGURATION_MESSAGE),
    };
    let text = match value.and_then(Scalar::as_str) {
        Some(text) => text,
        None => return RuleOutcome::invalid(message.unwrap_or(EXPECTED_TEXT_FORMAT_MESSAGE)),
    };

    if regex.is_match(text) {
        RuleOutcome::valid()
    } else {
        RuleOutcome::invalid(message.unwrap_or(INVALID_FORMAT_MESSAGE))
    }
}

fn check_length(value: Option<&Scalar>, parameter: Option<&str>, message: Option<&str>, bound: Bound) -> RuleOutcome {
    let limit = match parameter.and_then(|p| p.trim().parse::<usize>().ok()) {
        Some(limit) => limit,
        None => return RuleOutcome::invalid(INVALID_CONFIGURATION_MESSAGE),
    };
    let text = match value.and_then(Scalar::as_str) {
        Some(text) => text,
        None => return RuleOutcome::invalid(message.unwrap_or(EXPECTED_TEXT_MESSAGE)),
    };

    let length = text.graphemes(true).count();
    let (ok, default) = match bound {
        Bound::Min => (length >= limit, format!("Must be at least {} characters", limit)),
        Bound::Max => (length <= limit, format!("Must be at most {} characters", limit)),
    };
    if ok {
        RuleOutcome::valid()
    } else {
        RuleOutcome::invalid(message.map(String::from).unwrap_or(default))
    }
}

fn check_number(value: Option<&Scalar>, parameter: Option<&str>, message: Option<&str>, bound: Bound) -> RuleOutcome {
    let limit = match parameter.and_then(|p| p.trim().parse::<f64>().ok()) {
        Some(limit) if limit.is_finite() => limit,
        _ => return RuleOutcome::invalid(INVALID_CONFIGURATION_MESSAGE),
    };
    let number = match value.and_then(Scalar::as_number) {
        Some(number) => number,
        None => return RuleOutcome::invalid(message.unwrap_or(EXPECTED_NUMBER_MESSAGE)),
    };

    let (ok, default) = match bound {
        Bound::Min => (number >= limit, format!("Must be at least {}", format_number(limit))),
        Bound::Max => (number <= limit, format!("Must be at most {}", format_number(limit))),
    };
    if ok {
        RuleOutcome::valid()
    } else {
        RuleOutcome::invalid(message.map(String::from).unwrap_or(default))
    }
}
