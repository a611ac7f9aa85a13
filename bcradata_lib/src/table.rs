//! Tabular result model: named columns, dense rows of typed cells.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::Value;

/// A single table value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
}

impl Cell {
    /// Converts a JSON scalar to its natural cell kind. Arrays and objects
    /// become their JSON text.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Cell::Null,
            Value::Bool(b) => Cell::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Cell::Int(i),
                None => n.as_f64().map(Cell::Float).unwrap_or(Cell::Null),
            },
            Value::String(s) => Cell::Text(s.clone()),
            other => Cell::Text(other.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Cell::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Float(f) => Some(*f),
            Cell::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Cell::Date(d) => Some(*d),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Bool(b) => write!(f, "{}", b),
            Cell::Int(i) => write!(f, "{}", i),
            Cell::Float(x) => write!(f, "{}", x),
            Cell::Text(s) => f.write_str(s),
            Cell::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Null => serializer.serialize_none(),
            Cell::Bool(b) => serializer.serialize_bool(*b),
            Cell::Int(i) => serializer.serialize_i64(*i),
            Cell::Float(x) => serializer.serialize_f64(*x),
            Cell::Text(s) => serializer.serialize_str(s),
            Cell::Date(d) => serializer.collect_str(&d.format("%Y-%m-%d")),
        }
    }
}

/// Ordered columns plus rows. Every row has a cell for every column;
/// absent values are [`Cell::Null`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// An empty table: no rows, no columns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a dense table from sparse records. Columns appear in the order
    /// they are first seen; a later duplicate key in one record overwrites
    /// the earlier value.
    pub fn from_records(records: Vec<Vec<(String, Cell)>>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for record in &records {
            for (name, _) in record {
                if !index.contains_key(name) {
                    index.insert(name.clone(), columns.len());
                    columns.push(name.clone());
                }
            }
        }

        let rows = records
            .into_iter()
            .map(|record| {
                let mut row = vec![Cell::Null; columns.len()];
                for (name, cell) in record {
                    if let Some(&i) = index.get(&name) {
                        row[i] = cell;
                    }
                }
                row
            })
            .collect();

        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, i: usize) -> Option<Row<'_>> {
        self.rows.get(i).map(|cells| Row {
            columns: &self.columns,
            cells,
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(move |cells| Row {
            columns: &self.columns,
            cells,
        })
    }

    /// All cells of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&Cell>> {
        let i = self.column_index(name)?;
        Some(self.rows.iter().map(|row| &row[i]).collect())
    }

    /// Rewrites every cell of `name` in place. No-op if the column is absent.
    pub fn map_column(&mut self, name: &str, mut f: impl FnMut(Cell) -> Cell) {
        let Some(i) = self.column_index(name) else {
            return;
        };
        for row in &mut self.rows {
            let cell = std::mem::replace(&mut row[i], Cell::Null);
            row[i] = f(cell);
        }
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// Borrowed view of one table row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    columns: &'a [String],
    cells: &'a [Cell],
}

impl<'a> Row<'a> {
    pub fn get(&self, name: &str) -> Option<&'a Cell> {
        let i = self.columns.iter().position(|c| c == name)?;
        self.cells.get(i)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a Cell)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.cells.iter())
    }
}

impl Serialize for Row<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (name, cell) in self.iter() {
            map.serialize_entry(name, cell)?;
        }
        map.end()
    }
}

/// Serializes as an array of objects, one per row, keys in column order.
impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in self.rows() {
            seq.serialize_element(&row)?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(pairs: &[(&str, Cell)]) -> Vec<(String, Cell)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn from_records_pads_missing_cells() {
        let table = Table::from_records(vec![
            record(&[("a", Cell::Int(1))]),
            record(&[("b", Cell::Text("x".into())), ("a", Cell::Int(2))]),
        ]);
        assert_eq!(table.columns(), &["a".to_string(), "b".to_string()]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.row(0).unwrap().get("b"), Some(&Cell::Null));
        assert_eq!(table.row(1).unwrap().get("a"), Some(&Cell::Int(2)));
    }

    #[test]
    fn empty_table_has_no_columns() {
        let table = Table::from_records(Vec::new());
        assert!(table.is_empty());
        assert!(table.columns().is_empty());
        assert_eq!(serde_json::to_value(&table).unwrap(), json!([]));
    }

    #[test]
    fn serializes_as_array_of_objects() {
        let table = Table::from_records(vec![record(&[
            ("fecha", Cell::Date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap())),
            ("valor", Cell::Float(1.5)),
            ("nota", Cell::Null),
        ])]);
        assert_eq!(
            serde_json::to_value(&table).unwrap(),
            json!([{ "fecha": "2024-01-02", "valor": 1.5, "nota": null }])
        );
    }

    #[test]
    fn map_column_rewrites_cells() {
        let mut table = Table::from_records(vec![
            record(&[("n", Cell::Text("1".into()))]),
            record(&[("n", Cell::Text("x".into()))]),
        ]);
        table.map_column("n", |cell| match cell.as_str().and_then(|s| s.parse().ok()) {
            Some(i) => Cell::Int(i),
            None => Cell::Null,
        });
        let column = table.column("n").unwrap();
        assert_eq!(column, vec![&Cell::Int(1), &Cell::Null]);
        table.map_column("missing", |_| Cell::Bool(true));
        assert!(!table.has_column("missing"));
    }

    #[test]
    fn cell_from_json_kinds() {
        assert_eq!(Cell::from_json(&json!(null)), Cell::Null);
        assert_eq!(Cell::from_json(&json!(3)), Cell::Int(3));
        assert_eq!(Cell::from_json(&json!(2.25)), Cell::Float(2.25));
        assert_eq!(Cell::from_json(&json!("USD")), Cell::Text("USD".into()));
        assert_eq!(Cell::from_json(&json!([1, 2])), Cell::Text("[1,2]".into()));
    }
}
