//! Parameter validation against an [`EndpointSpec`].
//!
//! Runs before any URL is built or request is sent. Checks are applied in a
//! fixed order (missing required, unknown names, then value types) and the
//! first failing check decides the error.

use std::sync::OnceLock;

use bcra_api::{EndpointSpec, Params};
use chrono::NaiveDate;
use regex::Regex;
use serde_json::Value;

use crate::error::BcraError;

/// Parameters that steer the library and never reach the remote service.
pub const BEHAVIOR_PARAMS: &[&str] = &["debug", "json"];

/// Parameters that must be `YYYY-MM-DD` calendar dates.
pub const DATE_PARAMS: &[&str] = &["desde", "fecha", "fechadesde", "fechahasta", "hasta"];

/// Parameters that must be non-negative integers.
pub const INTEGER_PARAMS: &[&str] = &[
    "codigo_entidad",
    "id_variable",
    "limit",
    "numero_cheque",
    "offset",
];

/// How much checking [`validate`] does beyond parameter names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Strictness {
    /// Names plus date and integer formats.
    #[default]
    Strict,
    /// Names only; values are passed through unchecked.
    Lenient,
}

/// Call parameters split into what goes on the wire and what steers the library.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedParameters {
    pub transport_params: Params,
    pub behavior_params: Params,
}

impl ValidatedParameters {
    /// True when the `debug` flag is exactly JSON `true`.
    pub fn debug(&self) -> bool {
        self.behavior_params.flag("debug")
    }

    /// True when the `json` flag is exactly JSON `true`.
    pub fn json(&self) -> bool {
        self.behavior_params.flag("json")
    }
}

pub fn is_behavior_param(name: &str) -> bool {
    BEHAVIOR_PARAMS.contains(&name)
}

/// Validates `params` for `spec` and partitions them.
///
/// Null values count as not supplied: they satisfy no requirement, are
/// never type-checked and are left out of both output maps. A required
/// parameter holding a blank string is reported as missing. Type errors
/// report every offending field of the first failing class, dates before
/// integers.
pub fn validate(
    params: &Params,
    spec: &EndpointSpec,
    strictness: Strictness,
) -> Result<ValidatedParameters, BcraError> {
    let missing: Vec<String> = spec
        .required_params
        .iter()
        .filter(|name| !params.is_supplied(name) || is_blank(params.get(name)))
        .map(|name| name.to_string())
        .collect::<std::collections::BTreeSet<_>>()
        .into_iter()
        .collect();
    if !missing.is_empty() {
        return Err(BcraError::MissingRequiredParameters {
            endpoint: spec.name.to_string(),
            missing,
        });
    }

    let unknown: Vec<String> = params
        .names()
        .filter(|name| !spec.is_api_param(name) && !is_behavior_param(name))
        .map(str::to_string)
        .collect();
    if !unknown.is_empty() {
        return Err(BcraError::UnknownParameters {
            endpoint: spec.name.to_string(),
            unknown,
            allowed_api: spec.api_params().into_iter().map(str::to_string).collect(),
            allowed_behavior: BEHAVIOR_PARAMS.iter().map(|s| s.to_string()).collect(),
        });
    }

    if strictness == Strictness::Strict {
        check_types(params, spec)?;
    }

    let mut validated = ValidatedParameters::default();
    for (name, value) in params.iter().filter(|(_, value)| !value.is_null()) {
        if is_behavior_param(name) {
            validated.behavior_params.insert(name, value.clone());
        } else {
            validated.transport_params.insert(name, value.clone());
        }
    }
    Ok(validated)
}

fn check_types(params: &Params, spec: &EndpointSpec) -> Result<(), BcraError> {
    let supplied = || params.iter().filter(|(_, value)| !value.is_null());

    let mut bad_dates = supplied()
        .filter(|(name, value)| DATE_PARAMS.contains(name) && !is_valid_date(value))
        .map(|(name, value)| (name.to_string(), display_value(value)));
    if let Some((field, value)) = bad_dates.next() {
        return Err(BcraError::InvalidDateFormat {
            endpoint: spec.name.to_string(),
            field,
            value,
            others: bad_dates.collect(),
        });
    }

    let mut bad_integers = supplied()
        .filter(|(name, value)| INTEGER_PARAMS.contains(name) && !is_non_negative_integer(value))
        .map(|(name, value)| (name.to_string(), value.to_string()));
    if let Some((field, value)) = bad_integers.next() {
        return Err(BcraError::InvalidIntegerValue {
            endpoint: spec.name.to_string(),
            field,
            value,
            others: bad_integers.collect(),
        });
    }
    Ok(())
}

/// A string that is empty once trimmed. Such a value cannot fill a path
/// segment, so a required parameter holding one counts as missing.
fn is_blank(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::String(s)) if s.trim().is_empty())
}

fn date_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").ok())
        .as_ref()
}

/// A string shaped `YYYY-MM-DD` that names a real calendar date.
pub fn is_valid_date(value: &Value) -> bool {
    match value {
        Value::String(s) => {
            date_pattern().is_some_and(|re| re.is_match(s))
                && NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
        }
        _ => false,
    }
}

/// A non-negative JSON integer, or a non-empty string of ASCII digits.
pub fn is_non_negative_integer(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.is_u64(),
        Value::String(s) => !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()),
        _ => false,
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[path = "validation_tests.rs"]
mod tests;
