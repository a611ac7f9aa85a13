use chrono::NaiveDate;

use super::common::{add_pagination, format_date, Params, Query, QueryCommon};

/// Query for the money-supply series endpoint.
///
/// Without a variable id the request falls back to the variable catalog.
#[derive(Clone, Debug, Default)]
pub struct MonetarySeriesQuery {
    pub common: QueryCommon,
    pub variable_id: Option<i64>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl Query for MonetarySeriesQuery {
    fn get_common(&mut self) -> &mut QueryCommon {
        &mut self.common
    }
    fn common(&self) -> &QueryCommon {
        &self.common
    }
    fn add_to_params(&self, params: &mut Params) {
        if let Some(variable_id) = self.variable_id {
            params.insert("id_variable", variable_id);
        }
        if let Some(from) = self.from {
            params.insert("desde", format_date(from));
        }
        if let Some(to) = self.to {
            params.insert("hasta", format_date(to));
        }
        add_pagination(params, self.limit, self.offset);
    }
}

impl MonetarySeriesQuery {
    pub fn with_variable(mut self, variable_id: i64) -> Self {
        self.variable_id = Some(variable_id);
        self
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
