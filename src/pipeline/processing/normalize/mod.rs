//! Repairs applied to a loaded table: numeric coercion, duplicate removal and
//! column pruning.

pub mod derive;

use serde::Serialize;
use std::collections::HashSet;

use crate::domain::{Table, Value};

pub use derive::{derive_release_year, derive_track_type, parse_release_year};

/// Outcome of coercing one counter column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericConversion {
    pub column: String,
    /// Cells holding a number after coercion
    pub converted: usize,
    /// Non-missing cells that could not be read as a non-negative number
    pub coerced_to_missing: usize,
}

/// Columns removed by pruning, and requested columns that were never there
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ColumnPruning {
    pub dropped: Vec<String>,
    pub not_found: Vec<String>,
}

/// Parse a counter that may carry thousands separators.
///
/// Returns `None` for anything that is not a finite number; callers store that as the
/// missing marker.
pub fn parse_numeric(raw: &str) -> Option<f64> {
    let stripped: String = raw.chars().filter(|c| *c != ',').collect();
    let n = stripped.trim().parse::<f64>().ok()?;
    n.is_finite().then_some(n)
}

/// Coerce a single cell to a non-negative number or the missing marker
pub fn coerce_counter(value: &Value) -> Value {
    let number = match value {
        Value::Missing => None,
        Value::Number(n) => Some(*n),
        Value::Text(s) => parse_numeric(s),
    };
    match number {
        Some(n) if n >= 0.0 => Value::Number(n),
        _ => Value::Missing,
    }
}

/// Coerce a cell to any finite number, keeping negatives
pub fn coerce_number(value: &Value) -> Value {
    match value {
        Value::Number(n) => Value::Number(*n),
        Value::Text(s) => parse_numeric(s).map(Value::Number).unwrap_or(Value::Missing),
        Value::Missing => Value::Missing,
    }
}

/// Coerce every listed counter column that exists in the table
pub fn normalize_numeric_columns(table: &mut Table, columns: &[&str]) -> Vec<NumericConversion> {
    let mut conversions = Vec::new();
    for column in columns {
        let mut converted = 0;
        let mut coerced_to_missing = 0;
        let present = table.map_column(column, |value| {
            let coerced = coerce_counter(value);
            match (&coerced, value.is_missing()) {
                (Value::Number(_), _) => converted += 1,
                (_, false) => coerced_to_missing += 1,
                _ => {}
            }
            coerced
        });
        if present {
            conversions.push(NumericConversion {
                column: column.to_string(),
                converted,
                coerced_to_missing,
            });
        }
    }
    conversions
}

/// Remove the rows at the given indices, keeping everything else in order
pub fn drop_rows(table: &mut Table, rows: &[usize]) -> usize {
    let doomed: HashSet<usize> = rows.iter().copied().collect();
    let before = table.row_count();
    table.retain_rows(|idx, _| !doomed.contains(&idx));
    before - table.row_count()
}

/// Drop the listed columns if present
pub fn prune_columns(table: &mut Table, columns: &[&str]) -> ColumnPruning {
    let mut pruning = ColumnPruning::default();
    for column in columns {
        if table.drop_column(column) {
            pruning.dropped.push(column.to_string());
        } else {
            pruning.not_found.push(column.to_string());
        }
    }
    pruning
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numeric_strips_separators() {
        assert_eq!(parse_numeric("1,234,567"), Some(1234567.0));
        assert_eq!(parse_numeric(" 42 "), Some(42.0));
        assert_eq!(parse_numeric("725.4"), Some(725.4));
        assert_eq!(parse_numeric("N/A"), None);
        assert_eq!(parse_numeric("inf"), None);
        assert_eq!(parse_numeric(""), None);
    }

    #[test]
    fn test_coerce_counter_rejects_negatives_and_text() {
        assert_eq!(coerce_counter(&Value::Text("1,000".into())), Value::Number(1000.0));
        assert_eq!(coerce_counter(&Value::Text("-5".into())), Value::Missing);
        assert_eq!(coerce_counter(&Value::Text("lots".into())), Value::Missing);
        assert_eq!(coerce_counter(&Value::Number(3.0)), Value::Number(3.0));
        assert_eq!(coerce_counter(&Value::Missing), Value::Missing);
    }

    #[test]
    fn test_normalize_numeric_columns_reports_per_column() {
        let mut table = Table::from_fields(
            &["Spotify Streams", "Track"],
            &[&["1,234,567", "a"], &["N/A", "b"], &["oops", "c"], &["", "d"]],
        );
        let conversions =
            normalize_numeric_columns(&mut table, &["Spotify Streams", "YouTube Views"]);

        assert_eq!(
            conversions,
            vec![NumericConversion {
                column: "Spotify Streams".into(),
                converted: 1,
                coerced_to_missing: 1,
            }]
        );
        assert_eq!(table.cell(0, "Spotify Streams"), Some(&Value::Number(1234567.0)));
        assert_eq!(table.cell(2, "Spotify Streams"), Some(&Value::Missing));
        assert_eq!(table.cell(0, "Track"), Some(&Value::Text("a".into())));
    }

    #[test]
    fn test_drop_rows_keeps_order() {
        let mut table = Table::from_fields(&["A"], &[&["0"], &["1"], &["2"], &["3"]]);
        assert_eq!(drop_rows(&mut table, &[1, 3]), 2);
        let left: Vec<String> = table.column("A").unwrap().map(|v| v.to_field()).collect();
        assert_eq!(left, vec!["0", "2"]);
    }

    #[test]
    fn test_prune_columns_reports_missing_names() {
        let mut table = Table::from_fields(&["ISRC", "Track"], &[&["X", "Y"]]);
        let pruning = prune_columns(&mut table, &["ISRC", "TIDAL Popularity"]);
        assert_eq!(pruning.dropped, vec!["ISRC"]);
        assert_eq!(pruning.not_found, vec!["TIDAL Popularity"]);
        assert_eq!(table.columns(), &["Track".to_string()]);
    }
}
