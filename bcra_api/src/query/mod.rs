mod common;
pub use self::common::{CatalogQuery, Params, Query, QueryCommon};

mod monetary;
pub use self::monetary::MonetarySeriesQuery;

mod currency;
pub use self::currency::{CurrencySeriesQuery, ExchangeRatesQuery};

mod checks;
pub use self::checks::ReportedCheckQuery;

mod debts;
pub use self::debts::DebtorQuery;
