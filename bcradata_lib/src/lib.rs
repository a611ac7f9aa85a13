//! Library layer for the BCRA API: configuration, parameter validation,
//! response normalization and the [`BcraClient`] dispatcher.
//!
//! Builds on the `bcra_api` crate, which owns the endpoint registry, query
//! builders, URL construction and HTTP transport.

pub mod client;
pub mod config;
pub mod error;
pub mod normalize;
pub mod table;
pub mod validation;

pub use bcra_api;
pub use bcra_api::{
    CatalogQuery, CurrencySeriesQuery, DebtorQuery, ExchangeRatesQuery, MonetarySeriesQuery,
    Operation, Params, Query, Registry, ReportedCheckQuery, ShapeKind, TlsVerification,
};

pub use client::{BcraClient, Output, PreparedCall};
pub use config::ClientConfig;
pub use error::BcraError;
pub use normalize::normalize;
pub use table::{Cell, Row, Table};
pub use validation::{validate, Strictness, ValidatedParameters};
