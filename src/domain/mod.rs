//! Tabular data shapes shared by the cleaning pipeline and the analytics view.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::constants::NULL_TOKENS;

/// A single cell. `Missing` is the marker for "no valid data" and is distinct from zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Missing,
    Number(f64),
    Text(String),
}

impl Value {
    /// Interpret a raw field read from a delimited file
    pub fn from_field(raw: &str) -> Self {
        if NULL_TOKENS.contains(&raw.trim()) {
            Value::Missing
        } else {
            Value::Text(raw.to_string())
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Field representation used when persisting. Whole numbers are written without a
    /// fractional part so a re-read parses back to the same value.
    pub fn to_field(&self) -> String {
        match self {
            Value::Missing => String::new(),
            Value::Text(s) => s.clone(),
            Value::Number(n) => format_number(*n),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{:.0}", n)
    } else {
        n.to_string()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Missing, Value::Missing) => true,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            _ => false,
        }
    }
}

// Non-finite numbers are never stored, so equality on numbers is total.
impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Missing => {}
            // +0.0 and -0.0 compare equal and must hash equal
            Value::Number(n) => (if *n == 0.0 { 0.0f64 } else { *n }).to_bits().hash(state),
            Value::Text(s) => s.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Missing => write!(f, "NaN"),
            other => write!(f, "{}", other.to_field()),
        }
    }
}

pub type Row = Vec<Value>;

/// An ordered set of named columns with rows of cells. Every row has exactly one cell
/// per column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table from string literals; handy for fixtures.
    pub fn from_fields(columns: &[&str], rows: &[&[&str]]) -> Self {
        let mut table = Table::new(columns.iter().map(|c| c.to_string()).collect());
        for row in rows {
            table.push_row(row.iter().map(|f| Value::from_field(f)).collect());
        }
        table
    }

    /// Append a row, padding or truncating to the column count
    pub fn push_row(&mut self, mut row: Row) {
        row.resize(self.columns.len(), Value::Missing);
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.row_count(), self.column_count())
    }

    /// Approximate heap footprint: every cell slot, text payloads and column names
    pub fn memory_bytes(&self) -> usize {
        let text = |v: &Value| match v {
            Value::Text(s) => s.capacity(),
            _ => 0,
        };
        let cells: usize = self
            .rows
            .iter()
            .map(|row| row.capacity() * std::mem::size_of::<Value>() + row.iter().map(text).sum::<usize>())
            .sum();
        let names: usize = self.columns.iter().map(|c| c.capacity()).sum();
        cells + names + self.rows.capacity() * std::mem::size_of::<Row>()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// Iterate one column's cells in row order
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Value> + '_> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |r| &r[idx]))
    }

    /// Non-missing numeric values of a column, in row order
    pub fn numbers(&self, name: &str) -> Option<Vec<f64>> {
        self.column(name)
            .map(|cells| cells.filter_map(Value::as_number).collect())
    }

    /// Apply `f` to every cell of a column. Returns false if the column is absent.
    pub fn map_column<F>(&mut self, name: &str, mut f: F) -> bool
    where
        F: FnMut(&Value) -> Value,
    {
        let Some(idx) = self.column_index(name) else {
            return false;
        };
        for row in &mut self.rows {
            row[idx] = f(&row[idx]);
        }
        true
    }

    /// Replace an existing column's values or append a new column
    pub fn set_column(&mut self, name: &str, values: Vec<Value>) {
        debug_assert_eq!(values.len(), self.rows.len());
        match self.column_index(name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
    }

    /// Remove a column. Returns false if it was not present.
    pub fn drop_column(&mut self, name: &str) -> bool {
        let Some(idx) = self.column_index(name) else {
            return false;
        };
        self.columns.remove(idx);
        for row in &mut self.rows {
            row.remove(idx);
        }
        true
    }

    /// Keep only rows whose index satisfies `keep`
    pub fn retain_rows<F>(&mut self, mut keep: F)
    where
        F: FnMut(usize, &Row) -> bool,
    {
        let mut idx = 0;
        self.rows.retain(|row| {
            let k = keep(idx, row);
            idx += 1;
            k
        });
    }
}

/// Explicit-content classification derived from the `Explicit Track` flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TrackType {
    Clean,
    Explicit,
}

impl TrackType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackType::Clean => "Clean",
            TrackType::Explicit => "Explicit",
        }
    }

    /// A flag of boolean-true (the text "true" in any case, or the number 1) is explicit.
    /// Everything else, missing included, is clean.
    pub fn from_flag(flag: &Value) -> Self {
        let explicit = match flag {
            Value::Text(s) => {
                let s = s.trim();
                s.eq_ignore_ascii_case("true") || s.parse::<f64>().map(|n| n == 1.0).unwrap_or(false)
            }
            Value::Number(n) => *n == 1.0,
            Value::Missing => false,
        };
        if explicit {
            TrackType::Explicit
        } else {
            TrackType::Clean
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "explicit" => Some(TrackType::Explicit),
            "clean" => Some(TrackType::Clean),
            _ => None,
        }
    }
}

impl fmt::Display for TrackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_tokens_become_missing() {
        assert!(Value::from_field("").is_missing());
        assert!(Value::from_field("N/A").is_missing());
        assert!(Value::from_field(" NaN ").is_missing());
        assert_eq!(Value::from_field("0"), Value::Text("0".to_string()));
    }

    #[test]
    fn test_number_field_formatting() {
        assert_eq!(Value::Number(1234567.0).to_field(), "1234567");
        assert_eq!(Value::Number(725.4).to_field(), "725.4");
        assert_eq!(Value::Missing.to_field(), "");
    }

    #[test]
    fn test_track_type_from_flag() {
        assert_eq!(TrackType::from_flag(&Value::Text("TRUE".into())), TrackType::Explicit);
        assert_eq!(TrackType::from_flag(&Value::Text("true".into())), TrackType::Explicit);
        assert_eq!(TrackType::from_flag(&Value::Text("1".into())), TrackType::Explicit);
        assert_eq!(TrackType::from_flag(&Value::Text("False".into())), TrackType::Clean);
        assert_eq!(TrackType::from_flag(&Value::Text("yes".into())), TrackType::Clean);
        assert_eq!(TrackType::from_flag(&Value::Missing), TrackType::Clean);
    }

    #[test]
    fn test_memory_bytes_grows_with_text() {
        let short = Table::from_fields(&["A"], &[&["x"]]);
        let long = Table::from_fields(&["A"], &[&["a much longer cell value"]]);
        assert!(short.memory_bytes() >= std::mem::size_of::<Value>());
        assert!(long.memory_bytes() > short.memory_bytes());
        assert_eq!(Table::new(Vec::new()).memory_bytes(), 0);
    }

    #[test]
    fn test_drop_and_set_column() {
        let mut table = Table::from_fields(&["A", "B"], &[&["1", "2"], &["3", "4"]]);
        assert!(table.drop_column("A"));
        assert!(!table.drop_column("A"));
        assert_eq!(table.columns(), &["B".to_string()]);

        table.set_column("C", vec![Value::Number(1.0), Value::Missing]);
        assert_eq!(table.shape(), (2, 2));
        assert_eq!(table.cell(1, "C"), Some(&Value::Missing));
    }
}
