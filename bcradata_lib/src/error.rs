//! Error types for the library layer.

use std::fmt;

use bcra_api::{BuildError, ErrorCategory, UnknownEndpoint};

/// Errors produced by the library layer, wrapping upstream API errors and
/// adding parameter validation and configuration failures.
#[derive(Debug)]
pub enum BcraError {
    /// The requested operation is not in the registry.
    UnknownEndpoint(UnknownEndpoint),
    /// One or more required parameters were absent or null.
    MissingRequiredParameters {
        endpoint: String,
        missing: Vec<String>,
    },
    /// Parameters outside the endpoint's declared set.
    UnknownParameters {
        endpoint: String,
        unknown: Vec<String>,
        allowed_api: Vec<String>,
        allowed_behavior: Vec<String>,
    },
    /// A date parameter that is not a real `YYYY-MM-DD` date. `others`
    /// holds any further bad date fields as `(field, value)`, in name order.
    InvalidDateFormat {
        endpoint: String,
        field: String,
        value: String,
        others: Vec<(String, String)>,
    },
    /// An integer parameter that is negative or not numeric.
    InvalidIntegerValue {
        endpoint: String,
        field: String,
        value: String,
        others: Vec<(String, String)>,
    },
    /// URL construction failed.
    Url(BuildError),
    /// The transport could not deliver a JSON payload.
    Transport {
        endpoint: String,
        url: String,
        source: bcra_api::Error,
    },
    /// Invalid client configuration.
    Config(String),
}

impl BcraError {
    /// Category of the underlying transport failure, if this is one.
    pub fn transport_category(&self) -> Option<ErrorCategory> {
        match self {
            Self::Transport { source, .. } => Some(source.category()),
            _ => None,
        }
    }
}

impl fmt::Display for BcraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownEndpoint(e) => write!(f, "{}", e),
            Self::MissingRequiredParameters { endpoint, missing } => write!(
                f,
                "endpoint '{}' is missing required parameters: {}",
                endpoint,
                missing.join(", ")
            ),
            Self::UnknownParameters {
                endpoint,
                unknown,
                allowed_api,
                allowed_behavior,
            } => write!(
                f,
                "endpoint '{}' does not accept parameters: {}. API parameters: {}. Behavior parameters: {}",
                endpoint,
                unknown.join(", "),
                list_or_none(allowed_api),
                list_or_none(allowed_behavior)
            ),
            Self::InvalidDateFormat {
                endpoint,
                field,
                value,
                others,
            } => write!(
                f,
                "endpoint '{}': invalid date '{}' for '{}'{}. Expected format: YYYY-MM-DD (e.g., 2024-01-31)",
                endpoint,
                value,
                field,
                also_invalid(others)
            ),
            Self::InvalidIntegerValue {
                endpoint,
                field,
                value,
                others,
            } => write!(
                f,
                "endpoint '{}': '{}' must be a non-negative integer, got {}{}",
                endpoint,
                field,
                value,
                also_invalid(others)
            ),
            Self::Url(e) => write!(f, "URL error: {}", e),
            Self::Transport {
                endpoint,
                url,
                source,
            } => write!(f, "request for '{}' to {} failed: {}", endpoint, url, source),
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

fn also_invalid(others: &[(String, String)]) -> String {
    if others.is_empty() {
        return String::new();
    }
    let listed: Vec<String> = others
        .iter()
        .map(|(field, value)| format!("'{}' = {}", field, value))
        .collect();
    format!(" (also invalid: {})", listed.join(", "))
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}

impl std::error::Error for BcraError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::UnknownEndpoint(e) => Some(e),
            Self::Url(e) => Some(e),
            Self::Transport { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<UnknownEndpoint> for BcraError {
    fn from(e: UnknownEndpoint) -> Self {
        Self::UnknownEndpoint(e)
    }
}

impl From<BuildError> for BcraError {
    fn from(e: BuildError) -> Self {
        Self::Url(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_parameters_lists_allowed_sets() {
        let err = BcraError::UnknownParameters {
            endpoint: "banks".to_string(),
            unknown: vec!["foo".to_string()],
            allowed_api: vec![],
            allowed_behavior: vec!["debug".to_string(), "json".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "endpoint 'banks' does not accept parameters: foo. API parameters: (none). Behavior parameters: debug, json"
        );
    }

    #[test]
    fn invalid_date_lists_further_offenders() {
        let err = BcraError::InvalidDateFormat {
            endpoint: "exchange_rates".to_string(),
            field: "fecha".to_string(),
            value: "2024-13-01".to_string(),
            others: vec![],
        };
        assert_eq!(
            err.to_string(),
            "endpoint 'exchange_rates': invalid date '2024-13-01' for 'fecha'. Expected format: YYYY-MM-DD (e.g., 2024-01-31)"
        );

        let err = BcraError::InvalidIntegerValue {
            endpoint: "monetary_series".to_string(),
            field: "limit".to_string(),
            value: "-1".to_string(),
            others: vec![("offset".to_string(), "\"x\"".to_string())],
        };
        assert_eq!(
            err.to_string(),
            "endpoint 'monetary_series': 'limit' must be a non-negative integer, got -1 (also invalid: 'offset' = \"x\")"
        );
    }

    #[test]
    fn transport_category_only_for_transport_errors() {
        let err = BcraError::Transport {
            endpoint: "banks".to_string(),
            url: "https://api.bcra.gob.ar/cheques/v1.0/entidades".to_string(),
            source: bcra_api::Error::HttpStatus {
                status: 503,
                body: String::new(),
            },
        };
        assert_eq!(err.transport_category(), Some(ErrorCategory::HttpStatus));
        assert!(std::error::Error::source(&err).is_some());
        assert_eq!(BcraError::Config("x".into()).transport_category(), None);
    }
}
