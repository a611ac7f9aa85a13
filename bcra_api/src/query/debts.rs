use super::common::{Params, Query, QueryCommon};

/// Query for the debtor registry: current debts, debt history and rejected
/// checks all take the same CUIT/CUIL/CDI identification.
#[derive(Clone, Debug)]
pub struct DebtorQuery {
    pub common: QueryCommon,
    pub identification: String,
}

impl Query for DebtorQuery {
    fn get_common(&mut self) -> &mut QueryCommon {
        &mut self.common
    }
    fn common(&self) -> &QueryCommon {
        &self.common
    }
    fn add_to_params(&self, params: &mut Params) {
        params.insert("identificacion", self.identification.as_str());
    }
}

impl DebtorQuery {
    pub fn new(identification: &str) -> Self {
        Self {
            common: QueryCommon::default(),
            identification: identification.to_string(),
        }
    }
}
