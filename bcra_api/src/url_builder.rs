//! URL construction from an [`EndpointSpec`] template and validated parameters.

use serde_json::Value;
use url::Url;

use crate::endpoint::EndpointSpec;
use crate::query::Params;

/// Errors raised while building a request URL.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("invalid base URL '{base}': {reason}")]
    InvalidBaseUrl { base: String, reason: String },
    /// A `{name}` placeholder had no value, or only a blank one.
    /// Required-parameter validation should make this unreachable.
    #[error("endpoint '{endpoint}' left placeholder '{{{placeholder}}}' unsubstituted")]
    UnresolvedPlaceholder { endpoint: String, placeholder: String },
}

/// Builds the full request URL for `spec`.
///
/// Path parameters replace their placeholders (percent-encoded as path
/// segments). Query parameters are appended form-encoded in ascending name
/// order, and only when at least one is supplied. When the endpoint's only
/// path parameter is optional and missing, its segment is dropped so the URL
/// points at the family's catalog.
pub fn build_url(base_url: &str, spec: &EndpointSpec, params: &Params) -> Result<String, BuildError> {
    let base = base_url.trim_end_matches('/');
    let mut url = Url::parse(base).map_err(|e| BuildError::InvalidBaseUrl {
        base: base_url.to_string(),
        reason: e.to_string(),
    })?;

    let fallback = catalog_fallback(spec, params);
    let mut segments = Vec::new();
    for segment in spec.url_template.split('/').filter(|s| !s.is_empty()) {
        if let Some(dropped) = fallback {
            if segment == EndpointSpec::placeholder(dropped) {
                continue;
            }
        }
        segments.push(substitute(segment, spec, params)?);
    }

    url.path_segments_mut()
        .map_err(|_| BuildError::InvalidBaseUrl {
            base: base_url.to_string(),
            reason: "URL cannot be a base".to_string(),
        })?
        .pop_if_empty()
        .extend(&segments);

    let query: Vec<(&str, String)> = params
        .iter()
        .filter(|(name, value)| {
            spec.is_query_param(name) && !spec.is_path_param(name) && !value.is_null()
        })
        .map(|(name, value)| (name, value_to_string(value)))
        .collect();
    if !query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (name, value) in &query {
            pairs.append_pair(name, value);
        }
    }

    Ok(url.into())
}

/// String form of a parameter value as it appears in a URL.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn catalog_fallback(spec: &EndpointSpec, params: &Params) -> Option<&'static str> {
    match spec.path_params {
        [only] if !spec.is_required(only) && !params.is_supplied(only) => Some(*only),
        _ => None,
    }
}

fn substitute(segment: &str, spec: &EndpointSpec, params: &Params) -> Result<String, BuildError> {
    let mut out = String::with_capacity(segment.len());
    let mut rest = segment;
    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}').map(|i| open + i) else {
            break;
        };
        out.push_str(&rest[..open]);
        let name = &rest[open + 1..close];
        match params.get(name) {
            Some(value) if spec.is_path_param(name) && !value.is_null() => {
                let text = value_to_string(value);
                if text.trim().is_empty() {
                    return Err(unresolved(spec, name));
                }
                out.push_str(&text);
            }
            _ => return Err(unresolved(spec, name)),
        }
        rest = &rest[close + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

fn unresolved(spec: &EndpointSpec, placeholder: &str) -> BuildError {
    BuildError::UnresolvedPlaceholder {
        endpoint: spec.name.to_string(),
        placeholder: placeholder.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::{Operation, Registry, ShapeKind};

    const BASE: &str = "https://api.bcra.gob.ar";

    fn spec(op: Operation) -> EndpointSpec {
        Registry::bcra().get(op).unwrap().clone()
    }

    #[test]
    fn monetary_series_with_variable_and_range() {
        let params = Params::new()
            .with("id_variable", 6)
            .with("desde", "2023-01-01")
            .with("hasta", "2023-01-31")
            .with("limit", 12)
            .with("offset", 2);
        let url = build_url(BASE, &spec(Operation::MonetarySeries), &params).unwrap();
        insta::assert_snapshot!(url, @"https://api.bcra.gob.ar/estadisticas/v3.0/monetarias/6?desde=2023-01-01&hasta=2023-01-31&limit=12&offset=2");
    }

    #[test]
    fn monetary_series_without_variable_falls_back_to_catalog() {
        let url = build_url(BASE, &spec(Operation::MonetarySeries), &Params::new()).unwrap();
        insta::assert_snapshot!(url, @"https://api.bcra.gob.ar/estadisticas/v3.0/monetarias");
    }

    #[test]
    fn catalog_fallback_keeps_query_params() {
        let params = Params::new().with("limit", 5);
        let url = build_url(BASE, &spec(Operation::MonetarySeries), &params).unwrap();
        assert_eq!(url, format!("{}/estadisticas/v3.0/monetarias?limit=5", BASE));
    }

    #[test]
    fn explicit_null_counts_as_missing() {
        let params = Params::new().with("id_variable", Value::Null);
        let url = build_url(BASE, &spec(Operation::MonetarySeries), &params).unwrap();
        assert!(url.ends_with("/monetarias"));
    }

    #[test]
    fn base_and_template_slashes_are_normalized() {
        let url = build_url(
            "https://api.bcra.gob.ar///",
            &spec(Operation::Banks),
            &Params::new(),
        )
        .unwrap();
        assert_eq!(url, "https://api.bcra.gob.ar/cheques/v1.0/entidades");
    }

    #[test]
    fn base_with_path_prefix() {
        let url = build_url(
            "http://localhost:8080/proxy/",
            &spec(Operation::Currencies),
            &Params::new(),
        )
        .unwrap();
        assert_eq!(
            url,
            "http://localhost:8080/proxy/estadisticascambiarias/v1.0/Maestros/Divisas"
        );
    }

    #[test]
    fn two_path_params_are_substituted() {
        let params = Params::new()
            .with("codigo_entidad", 11)
            .with("numero_cheque", 20377516);
        let url = build_url(BASE, &spec(Operation::ReportedChecks), &params).unwrap();
        insta::assert_snapshot!(url, @"https://api.bcra.gob.ar/cheques/v1.0/denunciados/11/20377516");
    }

    #[test]
    fn path_values_are_percent_encoded() {
        let params = Params::new().with("identificacion", "20 1/2");
        let url = build_url(BASE, &spec(Operation::Debtors), &params).unwrap();
        assert_eq!(
            url,
            "https://api.bcra.gob.ar/CentralDeDeudores/v1.0/Deudas/20%201%2F2"
        );
    }

    #[test]
    fn query_values_are_form_encoded() {
        let params = Params::new().with("fecha", "2023 01&15");
        let url = build_url(BASE, &spec(Operation::ExchangeRates), &params).unwrap();
        assert!(url.ends_with("/Cotizaciones?fecha=2023+01%2615"));
    }

    #[test]
    fn no_query_string_without_query_params() {
        let params = Params::new().with("moneda", "USD");
        let url = build_url(BASE, &spec(Operation::CurrencySeries), &params).unwrap();
        assert_eq!(
            url,
            "https://api.bcra.gob.ar/estadisticascambiarias/v1.0/Cotizaciones/USD"
        );
    }

    #[test]
    fn missing_required_path_param_is_an_invariant_violation() {
        let err = build_url(BASE, &spec(Operation::CurrencySeries), &Params::new()).unwrap_err();
        assert_eq!(
            err,
            BuildError::UnresolvedPlaceholder {
                endpoint: "currency_series".to_string(),
                placeholder: "moneda".to_string(),
            }
        );
    }

    #[test]
    fn partially_supplied_multi_param_path_fails() {
        let params = Params::new().with("codigo_entidad", 11);
        let err = build_url(BASE, &spec(Operation::ReportedChecks), &params).unwrap_err();
        assert!(matches!(err, BuildError::UnresolvedPlaceholder { placeholder, .. } if placeholder == "numero_cheque"));
    }

    #[test]
    fn blank_path_value_is_unresolved() {
        let params = Params::new().with("moneda", "");
        let err = build_url(BASE, &spec(Operation::CurrencySeries), &params).unwrap_err();
        assert_eq!(
            err,
            BuildError::UnresolvedPlaceholder {
                endpoint: "currency_series".to_string(),
                placeholder: "moneda".to_string(),
            }
        );

        let params = Params::new().with("identificacion", "  ");
        let err = build_url(BASE, &spec(Operation::Debtors), &params).unwrap_err();
        assert!(matches!(err, BuildError::UnresolvedPlaceholder { placeholder, .. } if placeholder == "identificacion"));
    }

    #[test]
    fn blank_optional_path_value_does_not_fall_back() {
        let params = Params::new().with("id_variable", "");
        let err = build_url(BASE, &spec(Operation::MonetarySeries), &params).unwrap_err();
        assert!(matches!(err, BuildError::UnresolvedPlaceholder { .. }));
    }

    #[test]
    fn undeclared_params_never_reach_the_url() {
        let params = Params::new().with("moneda", "EUR").with("json", true);
        let url = build_url(BASE, &spec(Operation::CurrencySeries), &params).unwrap();
        assert!(!url.contains("json"));
    }

    #[test]
    fn complete_params_never_leave_placeholders() {
        let registry = Registry::bcra();
        for spec in registry.iter() {
            let params: Params = spec.api_params().into_iter().map(|name| (name, "1")).collect();
            let url = build_url(BASE, spec, &params).unwrap();
            assert!(!url.contains('{') && !url.contains("%7B"), "{}", url);
        }
    }

    #[test]
    fn build_is_deterministic() {
        let params = Params::new()
            .with("moneda", "USD")
            .with("fechahasta", "2023-02-01")
            .with("fechadesde", "2023-01-01");
        let spec = spec(Operation::CurrencySeries);
        let first = build_url(BASE, &spec, &params).unwrap();
        assert_eq!(first, build_url(BASE, &spec, &params).unwrap());
        assert!(first.ends_with("?fechadesde=2023-01-01&fechahasta=2023-02-01"));
    }

    #[test]
    fn invalid_base_url() {
        let err = build_url("not a url", &spec(Operation::Banks), &Params::new()).unwrap_err();
        assert!(matches!(err, BuildError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn embedded_placeholder_in_custom_template() {
        let custom = EndpointSpec {
            name: "versioned",
            url_template: "/api/v{version}/items",
            path_params: &["version"],
            query_params: &[],
            required_params: &["version"],
            shape: ShapeKind::Default,
        };
        let url = build_url(BASE, &custom, &Params::new().with("version", 2)).unwrap();
        assert_eq!(url, "https://api.bcra.gob.ar/api/v2/items");
    }
}
