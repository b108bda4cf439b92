//! Cleaning pipeline orchestration.
//!
//! [`CleaningPipeline::clean`] runs the in-memory steps (audits, deduplication, numeric
//! coercion, pruning) over an already loaded table. Loading and persisting are done by
//! the caller, see `app::clean_use_case`.

use tracing::{info, info_span, warn};

use crate::constants::{
    ARTIST, COUNTER_COLUMNS, DROPPED_COLUMNS, OUTLIER_COLUMNS, SPOTIFY_STREAMS, TIKTOK_VIEWS,
    TRACK, YOUTUBE_VIEWS,
};
use crate::domain::Table;
use crate::observability::metrics::{increment, MetricName};
use crate::pipeline::processing::normalize::{drop_rows, normalize_numeric_columns, prune_columns};
use crate::pipeline::processing::quality_gate::{
    audit_duplicates, audit_encoding, audit_missing, audit_negative_values, audit_outliers,
    describe_numeric,
};
use crate::pipeline::report::{CleaningReport, FinalSummary, LoadSummary, SampleRow};

/// Rows included in the final summary sample
pub const SAMPLE_ROWS: usize = 10;
/// Rows shown when inspecting the loaded table
pub const PREVIEW_ROWS: usize = 5;

/// Column lists driving the cleaning steps
#[derive(Debug, Clone)]
pub struct CleaningOptions {
    pub counter_columns: Vec<String>,
    pub outlier_columns: Vec<String>,
    pub dropped_columns: Vec<String>,
}

impl Default for CleaningOptions {
    fn default() -> Self {
        Self {
            counter_columns: COUNTER_COLUMNS.iter().map(|c| c.to_string()).collect(),
            outlier_columns: OUTLIER_COLUMNS.iter().map(|c| c.to_string()).collect(),
            dropped_columns: DROPPED_COLUMNS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// A cleaned table together with everything learned while cleaning it
#[derive(Debug, Clone)]
pub struct CleanedTable {
    pub table: Table,
    pub report: CleaningReport,
}

#[derive(Debug, Clone, Default)]
pub struct CleaningPipeline {
    options: CleaningOptions,
}

fn as_strs(columns: &[String]) -> Vec<&str> {
    columns.iter().map(String::as_str).collect()
}

impl CleaningPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: CleaningOptions) -> Self {
        Self { options }
    }

    /// Inspect the loaded table, then run steps 2 through 7 and the final deduplication.
    /// Absent columns are skipped, never fatal.
    pub fn clean(&self, raw: Table) -> CleanedTable {
        let original_shape = raw.shape();
        let load = LoadSummary {
            rows: original_shape.0,
            columns: original_shape.1,
            headers: raw.columns().to_vec(),
            preview: raw.rows().iter().take(PREVIEW_ROWS).cloned().collect(),
            numeric_summary: describe_numeric(&raw),
            memory_bytes: raw.memory_bytes(),
        };
        increment(MetricName::RowsLoaded, load.rows as u64);
        let mut table = raw;

        let missing = {
            let _span = info_span!("missing_values").entered();
            let missing = audit_missing(&table);
            info!(columns_with_missing = missing.len(), "Missing-value audit complete");
            missing
        };

        let (duplicates, rows_after_dedup) = {
            let _span = info_span!("duplicates").entered();
            let audit = audit_duplicates(&table);
            if audit.count > 0 {
                let removed = drop_rows(&mut table, &audit.repeated_rows);
                increment(MetricName::DuplicatesRemoved, removed as u64);
                warn!(removed, "Removed duplicate rows");
            } else {
                info!("No duplicate rows found");
            }
            (audit, table.row_count())
        };

        let encoding_issues = {
            let _span = info_span!("encoding").entered();
            let issues = audit_encoding(&table);
            for issue in &issues {
                warn!(column = %issue.column, count = issue.count, "Replacement characters found");
            }
            issues
        };

        let conversions = {
            let _span = info_span!("numeric").entered();
            let conversions =
                normalize_numeric_columns(&mut table, &as_strs(&self.options.counter_columns));
            let coerced: usize = conversions.iter().map(|c| c.coerced_to_missing).sum();
            increment(MetricName::ValuesCoerced, coerced as u64);
            info!(columns = conversions.len(), coerced, "Numeric normalization complete");
            conversions
        };

        let (negative_values, outliers) = {
            let _span = info_span!("outliers").entered();
            let negative = audit_negative_values(&table);
            let outliers = audit_outliers(&table, &as_strs(&self.options.outlier_columns));
            for audit in &outliers {
                info!(column = %audit.column, count = audit.count, "Outliers outside IQR fences");
            }
            (negative, outliers)
        };

        let pruning = {
            let _span = info_span!("prune").entered();
            let pruning = prune_columns(&mut table, &as_strs(&self.options.dropped_columns));
            increment(MetricName::ColumnsDropped, pruning.dropped.len() as u64);
            if !pruning.not_found.is_empty() {
                info!(not_found = ?pruning.not_found, "Some columns to drop were not present");
            }
            pruning
        };

        let late_duplicates_removed = {
            let _span = info_span!("final_dedup").entered();
            let audit = audit_duplicates(&table);
            let removed = drop_rows(&mut table, &audit.repeated_rows);
            if removed > 0 {
                increment(MetricName::DuplicatesRemoved, removed as u64);
                warn!(removed, "Removed rows made identical by normalization");
            }
            removed
        };

        let summary = FinalSummary {
            original_shape,
            cleaned_shape: table.shape(),
            rows_removed: original_shape.0 - table.row_count(),
            late_duplicates_removed,
            remaining_missing: audit_missing(&table),
            sample: sample_rows(&table, SAMPLE_ROWS),
        };

        let report = CleaningReport {
            load,
            missing,
            duplicates,
            rows_after_dedup,
            encoding_issues,
            conversions,
            negative_values,
            outliers,
            pruning,
            summary,
            output: None,
        };

        CleanedTable { table, report }
    }
}

fn sample_rows(table: &Table, limit: usize) -> Vec<SampleRow> {
    let field = |row: usize, column: &str| table.cell(row, column).cloned().unwrap_or_default();
    (0..table.row_count().min(limit))
        .map(|row| SampleRow {
            track: field(row, TRACK),
            artist: field(row, ARTIST),
            spotify_streams: field(row, SPOTIFY_STREAMS),
            youtube_views: field(row, YOUTUBE_VIEWS),
            tiktok_views: field(row, TIKTOK_VIEWS),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Value;

    fn raw() -> Table {
        Table::from_fields(
            &["Track", "Artist", "ISRC", "Spotify Streams", "YouTube Views", "TIDAL Popularity"],
            &[
                &["B Song", "Ann", "US1", "1,234,567", "10", ""],
                &["A Song", "Bob", "US2", "N/A", "20", ""],
                &["B Song", "Ann", "US1", "1,234,567", "10", ""],
                &["C Song", "Cat", "US3", "-4", "not a number", ""],
            ],
        )
    }

    #[test]
    fn test_clean_runs_every_step() {
        let cleaned = CleaningPipeline::new().clean(raw());
        let table = &cleaned.table;
        let report = &cleaned.report;

        assert_eq!(report.load.rows, 4);
        assert_eq!(report.duplicates.count, 1);
        assert_eq!(report.rows_after_dedup, 3);
        assert_eq!(table.row_count(), 3);
        assert_eq!(report.pruning.dropped, vec!["ISRC", "TIDAL Popularity"]);
        assert!(!table.has_column("ISRC"));
        assert!(!table.has_column("TIDAL Popularity"));

        assert_eq!(table.cell(0, "Spotify Streams"), Some(&Value::Number(1234567.0)));
        assert_eq!(table.cell(1, "Spotify Streams"), Some(&Value::Missing));
        assert_eq!(table.cell(2, "Spotify Streams"), Some(&Value::Missing));
        assert_eq!(table.cell(2, "YouTube Views"), Some(&Value::Missing));

        assert_eq!(report.summary.original_shape, (4, 6));
        assert_eq!(report.summary.cleaned_shape, (3, 4));
        assert_eq!(report.summary.rows_removed, 1);
        assert_eq!(report.summary.sample.len(), 3);
        assert!(report.negative_values.is_empty());
    }

    #[test]
    fn test_inspection_summary_of_loaded_table() {
        let cleaned = CleaningPipeline::new().clean(raw());
        let load = &cleaned.report.load;

        assert_eq!(load.preview.len(), 4);
        assert_eq!(load.preview[0][0], Value::Text("B Song".to_string()));
        assert!(load.memory_bytes > 0);

        // Raw counters with separators or junk are not numeric yet
        assert!(load.numeric_summary.is_empty());

        let scored = Table::from_fields(
            &["Track", "Track Score"],
            &[
                &["a", "0"],
                &["b", "10"],
                &["c", "20"],
                &["d", "30"],
                &["e", "40"],
                &["f", "50"],
                &["g", "60"],
                &["h", "70"],
            ],
        );
        let cleaned = CleaningPipeline::new().clean(scored);
        let load = &cleaned.report.load;
        assert_eq!(load.preview.len(), PREVIEW_ROWS);
        assert_eq!(load.numeric_summary.len(), 1);
        let score = &load.numeric_summary[0];
        assert_eq!(score.column, "Track Score");
        assert_eq!((score.count, score.mean, score.p50, score.max), (8, 35.0, 35.0, 70.0));
    }

    #[test]
    fn test_rows_identical_after_normalization_are_removed() {
        let table = Table::from_fields(
            &["Track", "Artist", "ISRC", "Spotify Streams"],
            &[
                &["A", "X", "US1", "1,000"],
                &["A", "X", "US1", "1000"],
                &["B", "Y", "US2", "5"],
                &["B", "Y", "US3", "5"],
            ],
        );
        let cleaned = CleaningPipeline::new().clean(table);

        assert_eq!(cleaned.report.duplicates.count, 0);
        assert_eq!(cleaned.report.summary.late_duplicates_removed, 2);
        assert_eq!(cleaned.report.summary.rows_removed, 2);
        assert_eq!(cleaned.table.row_count(), 2);
        assert_eq!(cleaned.table.cell(0, "Spotify Streams"), Some(&Value::Number(1000.0)));
        assert_eq!(cleaned.table.cell(1, "Track"), Some(&Value::Text("B".to_string())));

        let again = CleaningPipeline::new().clean(cleaned.table.clone());
        assert_eq!(again.report.duplicates.count, 0);
        assert_eq!(again.report.summary.late_duplicates_removed, 0);
        assert_eq!(again.table, cleaned.table);
    }

    #[test]
    fn test_clean_without_expected_columns_degrades() {
        let table = Table::from_fields(&["Name"], &[&["x"], &["y"]]);
        let cleaned = CleaningPipeline::new().clean(table);
        assert!(cleaned.report.conversions.is_empty());
        assert!(cleaned.report.outliers.is_empty());
        assert!(cleaned.report.pruning.dropped.is_empty());
        assert_eq!(cleaned.report.pruning.not_found.len(), DROPPED_COLUMNS.len());
        assert_eq!(cleaned.table.row_count(), 2);
    }

    #[test]
    fn test_empty_table_cleans_without_division_errors() {
        let table = Table::from_fields(&["Track", "Spotify Streams"], &[]);
        let cleaned = CleaningPipeline::new().clean(table);
        assert_eq!(cleaned.report.duplicates.percentage, 0.0);
        assert!(cleaned.report.outliers.is_empty());
    }
}
