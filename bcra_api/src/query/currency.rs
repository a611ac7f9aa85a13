use chrono::NaiveDate;

use super::common::{add_pagination, format_date, Params, Query, QueryCommon};

/// Query for the daily quotes of every currency.
#[derive(Clone, Debug, Default)]
pub struct ExchangeRatesQuery {
    pub common: QueryCommon,
    /// Quote date. The API answers with the latest quotes when omitted.
    pub date: Option<NaiveDate>,
}

impl Query for ExchangeRatesQuery {
    fn get_common(&mut self) -> &mut QueryCommon {
        &mut self.common
    }
    fn common(&self) -> &QueryCommon {
        &self.common
    }
    fn add_to_params(&self, params: &mut Params) {
        if let Some(date) = self.date {
            params.insert("fecha", format_date(date));
        }
    }
}

impl ExchangeRatesQuery {
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }
}

/// Query for the historical quotes of one currency.
#[derive(Clone, Debug)]
pub struct CurrencySeriesQuery {
    pub common: QueryCommon,
    /// ISO currency code, e.g. `USD`.
    pub currency: String,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl Query for CurrencySeriesQuery {
    fn get_common(&mut self) -> &mut QueryCommon {
        &mut self.common
    }
    fn common(&self) -> &QueryCommon {
        &self.common
    }
    fn add_to_params(&self, params: &mut Params) {
        params.insert("moneda", self.currency.as_str());
        if let Some(from) = self.from {
            params.insert("fechadesde", format_date(from));
        }
        if let Some(to) = self.to {
            params.insert("fechahasta", format_date(to));
        }
        add_pagination(params, self.limit, self.offset);
    }
}

impl CurrencySeriesQuery {
    pub fn new(currency: &str) -> Self {
        Self {
            common: QueryCommon::default(),
            currency: currency.to_string(),
            from: None,
            to: None,
            limit: None,
            offset: None,
        }
    }

    pub fn with_from(mut self, from: NaiveDate) -> Self {
        self.from = Some(from);
        self
    }

    pub fn with_to(mut self, to: NaiveDate) -> Self {
        self.to = Some(to);
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }
}
