//! Dispatcher: lookup, validation, URL construction, transport and
//! normalization for every BCRA operation.

use bcra_api::{
    build_url, CatalogQuery, Client, CurrencySeriesQuery, DebtorQuery, EndpointSpec,
    ExchangeRatesQuery, MonetarySeriesQuery, Operation, Params, Query, Registry,
    ReportedCheckQuery, Transport,
};
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::BcraError;
use crate::normalize::normalize;
use crate::table::Table;
use crate::validation::{validate, Strictness};

/// What a call produced, selected by its behavior flags.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// `debug` was set: the URL that would have been requested.
    Url(String),
    /// `json` was set: the payload exactly as received.
    Json(Value),
    /// The normalized payload.
    Table(Table),
}

impl Output {
    pub fn as_url(&self) -> Option<&str> {
        match self {
            Output::Url(url) => Some(url),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Output::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Output::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn into_table(self) -> Option<Table> {
        match self {
            Output::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn into_json(self) -> Option<Value> {
        match self {
            Output::Json(value) => Some(value),
            _ => None,
        }
    }
}

/// A validated call with its URL, ready to send.
#[derive(Debug, Clone)]
pub struct PreparedCall<'a> {
    pub spec: &'a EndpointSpec,
    pub url: String,
    pub behavior: Params,
}

impl PreparedCall<'_> {
    pub fn is_debug(&self) -> bool {
        self.behavior.flag("debug")
    }

    pub fn is_json(&self) -> bool {
        self.behavior.flag("json")
    }
}

/// BCRA API client.
///
/// Every call runs lookup, validation and URL construction synchronously,
/// then performs at most one transport request. Invalid calls and `debug`
/// calls never touch the network.
#[derive(Debug, Clone)]
pub struct BcraClient<T = Client> {
    transport: T,
    registry: Registry,
    base_url: String,
    strictness: Strictness,
}

impl BcraClient<Client> {
    /// Creates a client for the production API with default settings.
    pub fn new() -> Result<Self, BcraError> {
        Self::from_config(ClientConfig::default())
    }

    /// Creates a client configured from `BCRA_*` environment variables.
    pub fn from_env() -> Result<Self, BcraError> {
        Self::from_config(ClientConfig::from_env()?)
    }

    /// Creates a client with a custom base URL. Used for testing.
    pub fn with_base_url(base_url: &str) -> Result<Self, BcraError> {
        Self::from_config(ClientConfig::default().with_base_url(base_url))
    }

    pub fn from_config(config: ClientConfig) -> Result<Self, BcraError> {
        config.validate()?;
        let transport = Client::with_tls(&config.tls).map_err(|e| {
            tracing::error!("Failed to create HTTP client: {}", e);
            BcraError::Config(e.to_string())
        })?;
        Self::with_transport(transport, config)
    }
}

impl<T: Transport> BcraClient<T> {
    /// Creates a client around any transport, e.g. a test double.
    pub fn with_transport(transport: T, config: ClientConfig) -> Result<Self, BcraError> {
        config.validate()?;
        Ok(Self {
            transport,
            registry: Registry::bcra(),
            base_url: config.base_url,
            strictness: config.strictness,
        })
    }

    /// Replaces the endpoint registry.
    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn strictness(&self) -> Strictness {
        self.strictness
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Looks up `operation`, validates `params` and builds the URL.
    pub fn prepare(&self, operation: &str, params: &Params) -> Result<PreparedCall<'_>, BcraError> {
        let spec = self.registry.lookup(operation)?;
        let validated = validate(params, spec, self.strictness)?;
        let url = build_url(&self.base_url, spec, &validated.transport_params)?;
        tracing::debug!("Prepared {} -> {}", spec.name, url);
        Ok(PreparedCall {
            spec,
            url,
            behavior: validated.behavior_params,
        })
    }

    /// Runs `operation` with raw parameters.
    ///
    /// `debug` wins over `json`. Transport failures are logged and returned
    /// as [`BcraError::Transport`]; an empty payload is an empty table.
    pub async fn dispatch(&self, operation: &str, params: &Params) -> Result<Output, BcraError> {
        let call = self.prepare(operation, params)?;
        if call.is_debug() {
            return Ok(Output::Url(call.url));
        }

        let payload = self.transport.get_json(&call.url).await.map_err(|source| {
            tracing::error!("Request for {} failed: {}", call.spec.name, source);
            BcraError::Transport {
                endpoint: call.spec.name.to_string(),
                url: call.url.clone(),
                source,
            }
        })?;

        if call.is_json() {
            return Ok(Output::Json(payload));
        }
        Ok(Output::Table(normalize(&payload, call.spec.shape)))
    }

    async fn run(&self, operation: Operation, query: &impl Query) -> Result<Output, BcraError> {
        self.dispatch(operation.name(), &query.to_params()).await
    }

    /// Catalog of monetary variables, or one variable's series when
    /// `query` names a variable.
    pub async fn monetary_series(&self, query: &MonetarySeriesQuery) -> Result<Output, BcraError> {
        self.run(Operation::MonetarySeries, query).await
    }

    /// Catalog of monetary variables with their latest value.
    pub async fn monetary_variables(&self, query: &CatalogQuery) -> Result<Output, BcraError> {
        self.run(Operation::MonetaryVariables, query).await
    }

    /// Currencies quoted by the BCRA.
    pub async fn currencies(&self, query: &CatalogQuery) -> Result<Output, BcraError> {
        self.run(Operation::Currencies, query).await
    }

    /// Quotes for every currency on one date (latest when no date is set).
    pub async fn exchange_rates(&self, query: &ExchangeRatesQuery) -> Result<Output, BcraError> {
        self.run(Operation::ExchangeRates, query).await
    }

    /// Quote history of one currency.
    pub async fn currency_series(&self, query: &CurrencySeriesQuery) -> Result<Output, BcraError> {
        self.run(Operation::CurrencySeries, query).await
    }

    /// Financial entities taking part in the check registry.
    pub async fn banks(&self, query: &CatalogQuery) -> Result<Output, BcraError> {
        self.run(Operation::Banks, query).await
    }

    /// Whether a check has been reported lost or stolen.
    pub async fn reported_checks(&self, query: &ReportedCheckQuery) -> Result<Output, BcraError> {
        self.run(Operation::ReportedChecks, query).await
    }

    /// Current debt situation of a CUIT/CUIL/CDI.
    pub async fn debtors(&self, query: &DebtorQuery) -> Result<Output, BcraError> {
        self.run(Operation::Debtors, query).await
    }

    /// Debt situation over the last 24 periods.
    pub async fn debtors_history(&self, query: &DebtorQuery) -> Result<Output, BcraError> {
        self.run(Operation::DebtorsHistory, query).await
    }

    /// Rejected checks drawn by a CUIT/CUIL/CDI.
    pub async fn rejected_checks(&self, query: &DebtorQuery) -> Result<Output, BcraError> {
        self.run(Operation::RejectedChecks, query).await
    }
}
