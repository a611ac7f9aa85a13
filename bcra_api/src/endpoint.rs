//! Endpoint registry: one [`EndpointSpec`] per logical operation of the BCRA API.
//!
//! Templates are relative to the client's base URL and mark path parameters
//! with `{name}` placeholders.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Response layout of an endpoint family, selecting how its payload is flattened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    /// Flat records or a single object; generic flattening only.
    Default,
    /// One object with a `fecha` and a `detalle` array of per-currency quotes.
    CurrencyQuote,
    /// An array of per-date objects, each with a `detalle` array.
    CurrencyTimeseries,
    /// A reported check with a `detalles` array of account matches.
    CheckReport,
    /// A debtor with `periodos`, each holding `entidades`.
    DebtRecord,
    /// Same layout as [`ShapeKind::DebtRecord`], spanning several periods.
    HistoricalDebt,
    /// A debtor with `causales` → `entidades` → `detalle` rejected checks.
    RejectedChecks,
}

/// Static description of one endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointSpec {
    /// Registry key, e.g. `currency_series`.
    pub name: &'static str,
    /// URL path relative to the base URL, with `{name}` placeholders.
    pub url_template: &'static str,
    /// Parameters substituted into the path.
    pub path_params: &'static [&'static str],
    /// Parameters appended to the query string.
    pub query_params: &'static [&'static str],
    /// Parameters the caller must supply. Always a subset of path and query params.
    pub required_params: &'static [&'static str],
    /// How the payload of this endpoint is flattened.
    pub shape: ShapeKind,
}

impl EndpointSpec {
    pub fn is_path_param(&self, name: &str) -> bool {
        self.path_params.contains(&name)
    }

    pub fn is_query_param(&self, name: &str) -> bool {
        self.query_params.contains(&name)
    }

    /// True for any name that reaches the URL, path or query.
    pub fn is_api_param(&self, name: &str) -> bool {
        self.is_path_param(name) || self.is_query_param(name)
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required_params.contains(&name)
    }

    /// Path and query parameter names, sorted and deduplicated.
    pub fn api_params(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self
            .path_params
            .iter()
            .chain(self.query_params.iter())
            .copied()
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// The placeholder text for a path parameter, e.g. `{moneda}`.
    pub fn placeholder(name: &str) -> String {
        format!("{{{}}}", name)
    }

    fn check(&self) -> Result<(), InvalidSpec> {
        for required in self.required_params {
            if !self.is_api_param(required) {
                return Err(InvalidSpec::UndeclaredRequired {
                    endpoint: self.name.to_string(),
                    param: required.to_string(),
                });
            }
        }
        for path_param in self.path_params {
            if !self.url_template.contains(&Self::placeholder(path_param)) {
                return Err(InvalidSpec::MissingPlaceholder {
                    endpoint: self.name.to_string(),
                    param: path_param.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Requested operation name is not registered.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown endpoint '{name}'. Known endpoints: {}", known.join(", "))]
pub struct UnknownEndpoint {
    pub name: String,
    pub known: Vec<String>,
}

/// An endpoint declaration that can never be satisfied.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidSpec {
    #[error("endpoint '{endpoint}' requires '{param}' but declares it neither as path nor query parameter")]
    UndeclaredRequired { endpoint: String, param: String },
    #[error("endpoint '{endpoint}' declares path parameter '{param}' missing from its template")]
    MissingPlaceholder { endpoint: String, param: String },
    #[error("endpoint '{0}' is declared twice")]
    Duplicate(String),
}

/// The ten operations exposed by the BCRA API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    MonetarySeries,
    MonetaryVariables,
    Currencies,
    ExchangeRates,
    CurrencySeries,
    Banks,
    ReportedChecks,
    Debtors,
    DebtorsHistory,
    RejectedChecks,
}

impl Operation {
    pub const ALL: [Operation; 10] = [
        Operation::MonetarySeries,
        Operation::MonetaryVariables,
        Operation::Currencies,
        Operation::ExchangeRates,
        Operation::CurrencySeries,
        Operation::Banks,
        Operation::ReportedChecks,
        Operation::Debtors,
        Operation::DebtorsHistory,
        Operation::RejectedChecks,
    ];

    /// Registry key for this operation.
    pub fn name(self) -> &'static str {
        match self {
            Operation::MonetarySeries => "monetary_series",
            Operation::MonetaryVariables => "monetary_variables",
            Operation::Currencies => "currencies",
            Operation::ExchangeRates => "exchange_rates",
            Operation::CurrencySeries => "currency_series",
            Operation::Banks => "banks",
            Operation::ReportedChecks => "reported_checks",
            Operation::Debtors => "debtors",
            Operation::DebtorsHistory => "debtors_history",
            Operation::RejectedChecks => "rejected_checks",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Operation {
    type Err = UnknownEndpoint;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .iter()
            .copied()
            .find(|op| op.name() == s)
            .ok_or_else(|| UnknownEndpoint {
                name: s.to_string(),
                known: Operation::ALL.iter().map(|op| op.name().to_string()).collect(),
            })
    }
}

/// Endpoint declarations for every [`Operation`].
pub static BCRA_ENDPOINTS: &[EndpointSpec] = &[
    EndpointSpec {
        name: "monetary_series",
        url_template: "estadisticas/v3.0/monetarias/{id_variable}",
        path_params: &["id_variable"],
        query_params: &["desde", "hasta", "limit", "offset"],
        required_params: &[],
        shape: ShapeKind::Default,
    },
    EndpointSpec {
        name: "monetary_variables",
        url_template: "estadisticas/v3.0/monetarias",
        path_params: &[],
        query_params: &[],
        required_params: &[],
        shape: ShapeKind::Default,
    },
    EndpointSpec {
        name: "currencies",
        url_template: "estadisticascambiarias/v1.0/Maestros/Divisas",
        path_params: &[],
        query_params: &[],
        required_params: &[],
        shape: ShapeKind::Default,
    },
    EndpointSpec {
        name: "exchange_rates",
        url_template: "estadisticascambiarias/v1.0/Cotizaciones",
        path_params: &[],
        query_params: &["fecha"],
        required_params: &[],
        shape: ShapeKind::CurrencyQuote,
    },
    EndpointSpec {
        name: "currency_series",
        url_template: "estadisticascambiarias/v1.0/Cotizaciones/{moneda}",
        path_params: &["moneda"],
        query_params: &["fechadesde", "fechahasta", "limit", "offset"],
        required_params: &["moneda"],
        shape: ShapeKind::CurrencyTimeseries,
    },
    EndpointSpec {
        name: "banks",
        url_template: "cheques/v1.0/entidades",
        path_params: &[],
        query_params: &[],
        required_params: &[],
        shape: ShapeKind::Default,
    },
    EndpointSpec {
        name: "reported_checks",
        url_template: "cheques/v1.0/denunciados/{codigo_entidad}/{numero_cheque}",
        path_params: &["codigo_entidad", "numero_cheque"],
        query_params: &[],
        required_params: &["codigo_entidad", "numero_cheque"],
        shape: ShapeKind::CheckReport,
    },
    EndpointSpec {
        name: "debtors",
        url_template: "CentralDeDeudores/v1.0/Deudas/{identificacion}",
        path_params: &["identificacion"],
        query_params: &[],
        required_params: &["identificacion"],
        shape: ShapeKind::DebtRecord,
    },
    EndpointSpec {
        name: "debtors_history",
        url_template: "CentralDeDeudores/v1.0/Deudas/Historicas/{identificacion}",
        path_params: &["identificacion"],
        query_params: &[],
        required_params: &["identificacion"],
        shape: ShapeKind::HistoricalDebt,
    },
    EndpointSpec {
        name: "rejected_checks",
        url_template: "CentralDeDeudores/v1.0/Deudas/ChequesRechazados/{identificacion}",
        path_params: &["identificacion"],
        query_params: &[],
        required_params: &["identificacion"],
        shape: ShapeKind::RejectedChecks,
    },
];

/// Read-only lookup table from operation name to [`EndpointSpec`].
///
/// Built once and handed to the client; never mutated afterwards, so it can
/// be shared freely between threads.
#[derive(Debug, Clone)]
pub struct Registry {
    specs: HashMap<&'static str, EndpointSpec>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::bcra()
    }
}

impl Registry {
    /// The registry for the public BCRA API.
    pub fn bcra() -> Self {
        Self {
            specs: BCRA_ENDPOINTS
                .iter()
                .map(|spec| (spec.name, spec.clone()))
                .collect(),
        }
    }

    /// Builds a registry from custom declarations, rejecting any that violate
    /// the endpoint invariants.
    pub fn from_specs(specs: impl IntoIterator<Item = EndpointSpec>) -> Result<Self, InvalidSpec> {
        let mut map = HashMap::new();
        for spec in specs {
            spec.check()?;
            if map.contains_key(spec.name) {
                return Err(InvalidSpec::Duplicate(spec.name.to_string()));
            }
            map.insert(spec.name, spec);
        }
        Ok(Self { specs: map })
    }

    pub fn lookup(&self, name: &str) -> Result<&EndpointSpec, UnknownEndpoint> {
        self.specs.get(name).ok_or_else(|| UnknownEndpoint {
            name: name.to_string(),
            known: self.names().into_iter().map(str::to_string).collect(),
        })
    }

    pub fn get(&self, operation: Operation) -> Result<&EndpointSpec, UnknownEndpoint> {
        self.lookup(operation.name())
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.specs.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn iter(&self) -> impl Iterator<Item = &EndpointSpec> {
        self.specs.values()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MONETARY_BASE: &str = "estadisticas/v3.0";
    const CURRENCY_BASE: &str = "estadisticascambiarias/v1.0";
    const CHECKS_BASE: &str = "cheques/v1.0";
    const DEBTS_BASE: &str = "CentralDeDeudores/v1.0/Deudas";

    #[test]
    fn bcra_registry_declares_every_operation() {
        let registry = Registry::bcra();
        assert_eq!(registry.len(), Operation::ALL.len());
        for op in Operation::ALL {
            assert_eq!(registry.get(op).unwrap().name, op.name());
        }
    }

    #[test]
    fn required_params_are_declared() {
        for spec in Registry::bcra().iter() {
            for required in spec.required_params {
                assert!(
                    spec.is_api_param(required),
                    "{} requires undeclared {}",
                    spec.name,
                    required
                );
            }
        }
    }

    #[test]
    fn every_path_param_has_a_placeholder() {
        for spec in BCRA_ENDPOINTS {
            assert!(spec.check().is_ok(), "{} is inconsistent", spec.name);
        }
    }

    #[test]
    fn templates_use_family_bases() {
        let registry = Registry::bcra();
        let base_of = |op: Operation| registry.get(op).unwrap().url_template;
        assert!(base_of(Operation::MonetarySeries).starts_with(MONETARY_BASE));
        assert!(base_of(Operation::CurrencySeries).starts_with(CURRENCY_BASE));
        assert!(base_of(Operation::Banks).starts_with(CHECKS_BASE));
        assert!(base_of(Operation::RejectedChecks).starts_with(DEBTS_BASE));
    }

    #[test]
    fn lookup_unknown_lists_known_names() {
        let err = Registry::bcra().lookup("get_everything").unwrap_err();
        assert_eq!(err.name, "get_everything");
        assert!(err.known.contains(&"debtors".to_string()));
        assert!(err.to_string().contains("currency_series"));
    }

    #[test]
    fn operation_round_trips_through_name() {
        for op in Operation::ALL {
            assert_eq!(op.name().parse::<Operation>().unwrap(), op);
        }
        assert!("monetary".parse::<Operation>().is_err());
    }

    #[test]
    fn operation_serializes_as_registry_key() {
        for op in Operation::ALL {
            let encoded = serde_json::to_string(&op).unwrap();
            assert_eq!(encoded, format!("\"{}\"", op.name()));
            assert_eq!(serde_json::from_str::<Operation>(&encoded).unwrap(), op);
        }
    }

    #[test]
    fn from_specs_rejects_undeclared_required() {
        let broken = EndpointSpec {
            name: "broken",
            url_template: "x/{a}",
            path_params: &["a"],
            query_params: &[],
            required_params: &["a", "b"],
            shape: ShapeKind::Default,
        };
        let err = Registry::from_specs([broken]).unwrap_err();
        assert_eq!(
            err,
            InvalidSpec::UndeclaredRequired {
                endpoint: "broken".to_string(),
                param: "b".to_string()
            }
        );
    }

    #[test]
    fn from_specs_rejects_duplicates() {
        let spec = BCRA_ENDPOINTS[0].clone();
        let err = Registry::from_specs([spec.clone(), spec]).unwrap_err();
        assert!(matches!(err, InvalidSpec::Duplicate(_)));
    }

    #[test]
    fn api_params_are_sorted() {
        let spec = Registry::bcra().get(Operation::CurrencySeries).unwrap().clone();
        assert_eq!(
            spec.api_params(),
            vec!["fechadesde", "fechahasta", "limit", "moneda", "offset"]
        );
    }
}
