//! Low-level building blocks for the BCRA public API: the endpoint registry,
//! typed query builders, URL construction and the HTTP transport.

mod client;
pub mod endpoint;
mod errors;
pub mod query;
pub mod url_builder;
pub use self::client::{Client, TlsVerification, Transport};
pub use self::endpoint::{EndpointSpec, InvalidSpec, Operation, Registry, ShapeKind, UnknownEndpoint};
pub use self::errors::{Error, ErrorCategory};
pub use self::query::{
    CatalogQuery, CurrencySeriesQuery, DebtorQuery, ExchangeRatesQuery, MonetarySeriesQuery,
    Params, Query, QueryCommon, ReportedCheckQuery,
};
pub use self::url_builder::{build_url, BuildError};
