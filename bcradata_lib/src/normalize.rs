//! Response normalization: raw JSON payloads into [`Table`]s.
//!
//! Each [`ShapeKind`] has its own unnesting rule. When a payload does not
//! look like its family's shape, normalization falls back to generic
//! flattening instead of failing. Column typing runs last and is best-effort.

use bcra_api::ShapeKind;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};

use crate::table::{Cell, Table};

/// Columns parsed as calendar dates.
pub const DATE_COLUMNS: &[&str] = &["fecha", "fechaProcesamiento", "fechaSit1"];

/// Columns parsed as floating-point numbers.
pub const FLOAT_COLUMNS: &[&str] = &["valor", "tipoCotizacion", "tipoPase"];

/// Columns parsed as integers.
pub const INT_COLUMNS: &[&str] = &["codigoEntidad", "idVariable", "numeroCheque"];

/// Placeholder columns for a check report without detail records.
const CHECK_DETAIL_COLUMNS: &[&str] = &["sucursal", "numeroCuenta", "causal"];

type Record = Vec<(String, Cell)>;

/// Converts `payload` into a table according to `shape`.
///
/// An envelope object with a `results` key is unwrapped first. Empty
/// payloads (`null`, `{}`, `[]`) yield an empty table with no columns.
pub fn normalize(payload: &Value, shape: ShapeKind) -> Table {
    let data = unwrap_envelope(payload);
    if is_empty_payload(data) {
        return Table::new();
    }

    let shaped = match shape {
        ShapeKind::Default => None,
        ShapeKind::CurrencyQuote => currency_quote(data),
        ShapeKind::CurrencyTimeseries => currency_timeseries(data),
        ShapeKind::CheckReport => check_report(data),
        ShapeKind::DebtRecord | ShapeKind::HistoricalDebt => debt_periods(data),
        ShapeKind::RejectedChecks => rejected_checks(data),
    };
    let records = match shaped {
        Some(records) => records,
        None => {
            if shape != ShapeKind::Default {
                tracing::warn!(
                    "Payload does not match the {:?} shape, falling back to generic flattening",
                    shape
                );
            }
            generic_records(data)
        }
    };

    let mut table = Table::from_records(records);
    assign_column_types(&mut table);
    tracing::debug!(
        "Normalized {} rows x {} columns",
        table.len(),
        table.columns().len()
    );
    table
}

/// Returns the `results` member of an envelope object, or the payload itself.
pub fn unwrap_envelope(payload: &Value) -> &Value {
    match payload {
        Value::Object(obj) => obj.get("results").unwrap_or(payload),
        _ => payload,
    }
}

fn is_empty_payload(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(obj) => obj.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

// -- Generic flattening --

/// One record per element for arrays, one record for anything else.
pub fn generic_records(data: &Value) -> Vec<Record> {
    match data {
        Value::Array(items) => items.iter().map(element_record).collect(),
        other => vec![element_record(other)],
    }
}

/// Flattens an object into a record; a non-object becomes a `value` column.
fn element_record(value: &Value) -> Record {
    match value {
        Value::Object(obj) => flatten_object(obj, &[]),
        other => vec![("value".to_string(), Cell::from_json(other))],
    }
}

/// Flattens `obj`, skipping the top-level keys in `skip`.
fn flatten_object(obj: &Map<String, Value>, skip: &[&str]) -> Record {
    let mut record = Vec::new();
    for (key, value) in obj {
        if skip.contains(&key.as_str()) {
            continue;
        }
        flatten_into(key.clone(), value, &mut record);
    }
    record
}

fn flatten_into(key: String, value: &Value, record: &mut Record) {
    match value {
        Value::Object(obj) => {
            for (sub, inner) in obj {
                flatten_into(format!("{}_{}", key, sub), inner, record);
            }
        }
        Value::Array(items) if !items.is_empty() && items.iter().all(Value::is_object) => {
            for (i, item) in items.iter().enumerate() {
                flatten_into(format!("{}_{}", key, i), item, record);
            }
        }
        other => record.push((key, Cell::from_json(other))),
    }
}

/// An array's elements, or a lone object as a one-element list.
fn as_list(value: &Value) -> Option<Vec<&Value>> {
    match value {
        Value::Array(items) => Some(items.iter().collect()),
        Value::Object(_) => Some(vec![value]),
        _ => None,
    }
}

/// A nested list member. Absent and `null` count as empty.
fn nested_list<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<Vec<&'a Value>> {
    match obj.get(key) {
        None | Some(Value::Null) => Some(Vec::new()),
        Some(value) => as_list(value),
    }
}

fn with_fields(base: &Record, extra: Record) -> Record {
    let mut record = base.clone();
    record.extend(extra);
    record
}

fn null_column(name: &str) -> (String, Cell) {
    (name.to_string(), Cell::Null)
}

// -- Shape families --

/// `{fecha, detalle: [...]}`: one row per detail, date copied on. A `null`
/// `detalle` yields no rows.
fn currency_quote(data: &Value) -> Option<Vec<Record>> {
    let obj = data.as_object()?;
    if !obj.contains_key("detalle") {
        return None;
    }
    let details = nested_list(obj, "detalle")?;
    let base = flatten_object(obj, &["detalle"]);
    Some(
        details
            .into_iter()
            .map(|detail| with_fields(&base, element_record(detail)))
            .collect(),
    )
}

/// `[{fecha, detalle: [...]}, ...]`: one row per (date, detail) pair. A date
/// without details contributes no rows; at least one entry must carry
/// `detalle` for the payload to match.
fn currency_timeseries(data: &Value) -> Option<Vec<Record>> {
    let entries = as_list(data)?;
    let mut matched = false;
    let mut records = Vec::new();
    for entry in entries {
        let obj = entry.as_object()?;
        matched |= obj.contains_key("detalle");
        let details = nested_list(obj, "detalle")?;
        let base = flatten_object(obj, &["detalle"]);
        records.extend(
            details
                .into_iter()
                .map(|detail| with_fields(&base, element_record(detail))),
        );
    }
    matched.then_some(records)
}

/// Check-level fields merged onto each record of `detalles`.
fn check_report(data: &Value) -> Option<Vec<Record>> {
    let mut records = Vec::new();
    for report in as_list(data)? {
        let obj = report.as_object()?;
        if !obj.contains_key("detalles") && !obj.contains_key("numeroCheque") {
            return None;
        }
        let base = flatten_object(obj, &["detalles"]);
        let details = nested_list(obj, "detalles")?;
        if details.is_empty() {
            let placeholders = CHECK_DETAIL_COLUMNS.iter().map(|c| null_column(c)).collect();
            records.push(with_fields(&base, placeholders));
        } else {
            records.extend(
                details
                    .into_iter()
                    .map(|detail| with_fields(&base, element_record(detail))),
            );
        }
    }
    Some(records)
}

/// `{identificacion, denominacion, periodos: [{periodo, entidades: [...]}]}`:
/// one row per (period, entity).
fn debt_periods(data: &Value) -> Option<Vec<Record>> {
    let obj = data.as_object()?;
    if !obj.contains_key("periodos") && !obj.contains_key("identificacion") {
        return None;
    }
    let base = flatten_object(obj, &["periodos"]);
    let periods = nested_list(obj, "periodos")?;
    if periods.is_empty() {
        return Some(vec![base]);
    }

    let mut records = Vec::new();
    for period in periods {
        let period_obj = period.as_object()?;
        let with_period = with_fields(&base, flatten_object(period_obj, &["entidades"]));
        let entities = nested_list(period_obj, "entidades")?;
        if entities.is_empty() {
            records.push(with_fields(&with_period, vec![null_column("entidad")]));
        } else {
            records.extend(
                entities
                    .into_iter()
                    .map(|entity| with_fields(&with_period, element_record(entity))),
            );
        }
    }
    Some(records)
}

/// `{identificacion, denominacion, causales: [{causal, entidades: [{entidad,
/// detalle: [...]}]}]}`: one row per (cause, entity, detail).
fn rejected_checks(data: &Value) -> Option<Vec<Record>> {
    let obj = data.as_object()?;
    if !obj.contains_key("causales") && !obj.contains_key("identificacion") {
        return None;
    }
    let base = flatten_object(obj, &["causales"]);
    let causes = nested_list(obj, "causales")?;
    if causes.is_empty() {
        return Some(vec![with_fields(&base, vec![null_column("causal")])]);
    }

    let mut records = Vec::new();
    for cause in causes {
        let cause_obj = cause.as_object()?;
        let with_cause = with_fields(&base, flatten_object(cause_obj, &["entidades"]));
        let entities = nested_list(cause_obj, "entidades")?;
        if entities.is_empty() {
            records.push(with_fields(&with_cause, vec![null_column("entidad")]));
            continue;
        }
        for entity in entities {
            let entity_obj = entity.as_object()?;
            let with_entity = with_fields(&with_cause, flatten_object(entity_obj, &["detalle"]));
            let details = nested_list(entity_obj, "detalle")?;
            if details.is_empty() {
                records.push(with_entity);
            } else {
                records.extend(
                    details
                        .into_iter()
                        .map(|detail| with_fields(&with_entity, element_record(detail))),
                );
            }
        }
    }
    Some(records)
}

// -- Column typing --

/// Converts known columns to their kinds. Cells that cannot be converted
/// become [`Cell::Null`].
pub fn assign_column_types(table: &mut Table) {
    for name in DATE_COLUMNS {
        convert_column(table, name, to_date);
    }
    for name in FLOAT_COLUMNS {
        convert_column(table, name, to_float);
    }
    for name in INT_COLUMNS {
        convert_column(table, name, to_int);
    }
}

fn convert_column(table: &mut Table, name: &str, convert: fn(&Cell) -> Option<Cell>) {
    let mut failed = 0usize;
    table.map_column(name, |cell| {
        if cell.is_null() {
            return cell;
        }
        convert(&cell).unwrap_or_else(|| {
            failed += 1;
            Cell::Null
        })
    });
    if failed > 0 {
        tracing::warn!("Error converting column {}: {} cells set to null", name, failed);
    }
}

fn to_date(cell: &Cell) -> Option<Cell> {
    match cell {
        Cell::Date(d) => Some(Cell::Date(*d)),
        Cell::Text(s) => parse_date(s.trim()).map(Cell::Date),
        _ => None,
    }
}

/// Accepts `YYYY-MM-DD` and ISO date-times with or without an offset.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

fn to_float(cell: &Cell) -> Option<Cell> {
    match cell {
        Cell::Float(x) => Some(Cell::Float(*x)),
        Cell::Int(i) => Some(Cell::Float(*i as f64)),
        Cell::Text(s) => s.trim().parse::<f64>().ok().map(Cell::Float),
        _ => None,
    }
}

fn to_int(cell: &Cell) -> Option<Cell> {
    match cell {
        Cell::Int(i) => Some(Cell::Int(*i)),
        Cell::Float(x) if x.fract() == 0.0 && x.abs() < i64::MAX as f64 => {
            Some(Cell::Int(*x as i64))
        }
        Cell::Text(s) => s.trim().parse::<i64>().ok().map(Cell::Int),
        _ => None,
    }
}

#[cfg(test)]
#[path = "normalize_tests.rs"]
mod tests;
