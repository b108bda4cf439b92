use serde::Serialize;

use crate::analytics::table::AnalyticsTable;
use crate::constants::{RELEASE_YEAR, TRACK_SCORE, TRACK_TYPE};
use crate::domain::{Table, TrackType, Value};

pub const DEFAULT_YEAR_RANGE: (i32, i32) = (2000, 2024);
pub const DEFAULT_SCORE_RANGE: (f64, f64) = (0.0, 100.0);

/// Limits offered to the user, derived from the data at load time.
/// A `None` range means the backing column is absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterBounds {
    pub track_types: Vec<TrackType>,
    pub year_range: Option<(i32, i32)>,
    pub score_range: Option<(f64, f64)>,
}

fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let min = values.iter().copied().reduce(f64::min)?;
    let max = values.iter().copied().reduce(f64::max)?;
    Some((min, max))
}

impl FilterBounds {
    pub fn from_table(analytics: &AnalyticsTable) -> Self {
        let table = analytics.table();
        let year_range = table.numbers(RELEASE_YEAR).map(|years| {
            min_max(&years)
                .map(|(lo, hi)| (lo as i32, hi as i32))
                .unwrap_or(DEFAULT_YEAR_RANGE)
        });
        let score_range = table
            .numbers(TRACK_SCORE)
            .map(|scores| min_max(&scores).unwrap_or(DEFAULT_SCORE_RANGE));

        Self {
            track_types: analytics.track_types(),
            year_range,
            score_range,
        }
    }
}

/// The user's current selection. Every field narrows the view independently; an empty
/// track-type list and a `None` range select everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterState {
    pub track_types: Vec<TrackType>,
    pub year_range: Option<(i32, i32)>,
    pub score_range: Option<(f64, f64)>,
}

impl FilterState {
    /// Full-range selection, the initial state of the dashboard
    pub fn from_bounds(bounds: &FilterBounds) -> Self {
        Self {
            track_types: bounds.track_types.clone(),
            year_range: bounds.year_range,
            score_range: bounds.score_range,
        }
    }

    pub fn with_track_types(mut self, track_types: Vec<TrackType>) -> Self {
        self.track_types = track_types;
        self
    }

    pub fn with_year_range(mut self, lo: i32, hi: i32) -> Self {
        self.year_range = Some((lo, hi));
        self
    }

    pub fn with_score_range(mut self, lo: f64, hi: f64) -> Self {
        self.score_range = Some((lo, hi));
        self
    }

    /// Select the rows satisfying every active predicate. Predicates over absent columns
    /// are skipped.
    pub fn apply<'a>(&self, analytics: &'a AnalyticsTable) -> FilteredView<'a> {
        let table = analytics.table();
        let type_idx = table.column_index(TRACK_TYPE);
        let year_idx = table.column_index(RELEASE_YEAR);
        let score_idx = table.column_index(TRACK_SCORE);

        let in_range = |value: &Value, lo: f64, hi: f64| {
            value.as_number().map(|n| n >= lo && n <= hi).unwrap_or(false)
        };

        let rows = table
            .rows()
            .iter()
            .enumerate()
            .filter(|(_, row)| match (type_idx, self.track_types.is_empty()) {
                (Some(idx), false) => row[idx]
                    .as_text()
                    .map(|t| self.track_types.iter().any(|s| s.as_str() == t))
                    .unwrap_or(false),
                _ => true,
            })
            .filter(|(_, row)| match (year_idx, self.year_range) {
                (Some(idx), Some((lo, hi))) => in_range(&row[idx], lo as f64, hi as f64),
                _ => true,
            })
            .filter(|(_, row)| match (score_idx, self.score_range) {
                (Some(idx), Some((lo, hi))) => in_range(&row[idx], lo, hi),
                _ => true,
            })
            .map(|(idx, _)| idx)
            .collect();

        FilteredView { table, rows }
    }
}

/// Rows of a table selected by a filter, in table order. Values are borrowed, never copied
/// or modified.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    table: &'a Table,
    rows: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    pub fn table(&self) -> &'a Table {
        self.table
    }

    pub fn row_indices(&self) -> &[usize] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn total_rows(&self) -> usize {
        self.table.row_count()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.table.has_column(name)
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&'a Value> {
        self.table.cell(row, column)
    }

    /// Cells of one column for the selected rows
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &'a Value> + '_> {
        let idx = self.table.column_index(name)?;
        let rows = self.table.rows();
        Some(self.rows.iter().map(move |r| &rows[*r][idx]))
    }

    /// Non-missing numbers of one column for the selected rows
    pub fn numbers(&self, name: &str) -> Option<Vec<f64>> {
        self.column(name)
            .map(|cells| cells.filter_map(Value::as_number).collect())
    }
}
