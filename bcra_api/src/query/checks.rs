use super::common::{Params, Query, QueryCommon};

/// Query for a check reported as lost or stolen.
#[derive(Clone, Copy, Debug)]
pub struct ReportedCheckQuery {
    pub common: QueryCommon,
    /// Code of the bank that issued the check (see the bank catalog).
    pub bank_code: i64,
    pub check_number: i64,
}

impl Query for ReportedCheckQuery {
    fn get_common(&mut self) -> &mut QueryCommon {
        &mut self.common
    }
    fn common(&self) -> &QueryCommon {
        &self.common
    }
    fn add_to_params(&self, params: &mut Params) {
        params.insert("codigo_entidad", self.bank_code);
        params.insert("numero_cheque", self.check_number);
    }
}

impl ReportedCheckQuery {
    pub fn new(bank_code: i64, check_number: i64) -> Self {
        Self {
            common: QueryCommon::default(),
            bank_code,
            check_number,
        }
    }
}
