//! Shared query infrastructure: the [`Params`] map, the [`Query`] trait and [`QueryCommon`] flags.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde_json::Value;

/// Raw call parameters: argument name to JSON value.
///
/// Ordered by name so every consumer sees the same iteration order. An
/// explicit `null` value is treated as "not supplied".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(BTreeMap<String, Value>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a parameter, builder style.
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// True when `name` is present with a non-null value.
    pub fn is_supplied(&self, name: &str) -> bool {
        matches!(self.0.get(name), Some(value) if !value.is_null())
    }

    /// True only when `name` is present and exactly JSON `true`.
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.0.get(name), Some(Value::Bool(true)))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<BTreeMap<String, Value>> for Params {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self(map)
    }
}

/// Trait implemented by all query builders. Converts the typed builder into
/// raw [`Params`] and provides the shared behavior-flag setters.
pub trait Query {
    /// Writes this query's endpoint-specific parameters.
    fn add_to_params(&self, params: &mut Params);

    /// Returns a mutable reference to the common query fields.
    fn get_common(&mut self) -> &mut QueryCommon;

    /// Returns the common query fields.
    fn common(&self) -> &QueryCommon;

    /// Endpoint parameters plus any behavior flags that are set.
    fn to_params(&self) -> Params {
        let mut params = Params::new();
        self.add_to_params(&mut params);
        self.common().add_to_params(&mut params);
        params
    }

    /// Return the raw JSON payload instead of a table.
    fn with_json(mut self) -> Self
    where
        Self: Sized,
    {
        self.get_common().json = true;
        self
    }

    /// Return the constructed URL without calling the API.
    fn with_debug(mut self) -> Self
    where
        Self: Sized,
    {
        self.get_common().debug = true;
        self
    }
}

/// Behavior flags shared by every query. Neither reaches the remote service.
#[derive(Clone, Copy, Debug, Default)]
pub struct QueryCommon {
    /// Return the unprocessed payload.
    pub json: bool,
    /// Return the URL and skip the request.
    pub debug: bool,
}

impl QueryCommon {
    /// Writes the flags that are set; unset flags are left out entirely.
    pub fn add_to_params(&self, params: &mut Params) {
        if self.json {
            params.insert("json", true);
        }
        if self.debug {
            params.insert("debug", true);
        }
    }
}

/// Query for endpoints that take no arguments: the monetary variable list,
/// the currency catalog and the bank catalog.
#[derive(Clone, Copy, Debug, Default)]
pub struct CatalogQuery {
    pub common: QueryCommon,
}

impl Query for CatalogQuery {
    fn add_to_params(&self, _params: &mut Params) {}

    fn get_common(&mut self) -> &mut QueryCommon {
        &mut self.common
    }

    fn common(&self) -> &QueryCommon {
        &self.common
    }
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub(crate) fn add_pagination(params: &mut Params, limit: Option<u32>, offset: Option<u32>) {
    if let Some(limit) = limit {
        params.insert("limit", limit);
    }
    if let Some(offset) = offset {
        params.insert("offset", offset);
    }
}
