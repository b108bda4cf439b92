use serde::Serialize;
use std::fmt;

use crate::domain::Value;
use crate::pipeline::processing::normalize::{ColumnPruning, NumericConversion};
use crate::pipeline::processing::quality_gate::{
    ColumnStats, DuplicateAudit, EncodingIssue, MissingValues, NegativeValues, OutlierAudit,
};

#[derive(Debug, Clone, Serialize)]
pub struct LoadSummary {
    pub rows: usize,
    pub columns: usize,
    pub headers: Vec<String>,
    /// Leading rows as loaded
    pub preview: Vec<Vec<Value>>,
    pub numeric_summary: Vec<ColumnStats>,
    pub memory_bytes: usize,
}

/// One line of the cleaned-data sample
#[derive(Debug, Clone, Serialize)]
pub struct SampleRow {
    pub track: Value,
    pub artist: Value,
    pub spotify_streams: Value,
    pub youtube_views: Value,
    pub tiktok_views: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct FinalSummary {
    pub original_shape: (usize, usize),
    pub cleaned_shape: (usize, usize),
    pub rows_removed: usize,
    /// Rows that only became identical after numeric normalization and column pruning
    pub late_duplicates_removed: usize,
    pub remaining_missing: Vec<MissingValues>,
    pub sample: Vec<SampleRow>,
}

/// Findings of one cleaning run, in step order
#[derive(Debug, Clone, Serialize)]
pub struct CleaningReport {
    pub load: LoadSummary,
    pub missing: Vec<MissingValues>,
    pub duplicates: DuplicateAudit,
    pub rows_after_dedup: usize,
    pub encoding_issues: Vec<EncodingIssue>,
    pub conversions: Vec<NumericConversion>,
    pub negative_values: Vec<NegativeValues>,
    pub outliers: Vec<OutlierAudit>,
    pub pruning: ColumnPruning,
    pub summary: FinalSummary,
    /// Where the cleaned table was persisted, once it has been
    pub output: Option<String>,
}

impl CleaningReport {
    pub fn total_encoding_issues(&self) -> usize {
        self.encoding_issues.iter().map(|i| i.count).sum()
    }
}

/// Format with thousands separators and no decimals
fn thousands(n: f64) -> String {
    let rounded = format!("{:.0}", n.abs());
    let mut out = String::with_capacity(rounded.len() + rounded.len() / 3);
    for (i, ch) in rounded.chars().enumerate() {
        if i > 0 && (rounded.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if n < 0.0 && rounded != "0" {
        out.insert(0, '-');
    }
    out
}

fn banner(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "{}", "=".repeat(70))?;
    writeln!(f, "{}", title)?;
    writeln!(f, "{}", "=".repeat(70))
}

impl fmt::Display for CleaningReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        banner(f, "STEP 1: LOAD AND INSPECT DATA")?;
        writeln!(f, "Total Rows: {}", self.load.rows)?;
        writeln!(f, "Total Columns: {}", self.load.columns)?;
        writeln!(f, "Columns: {}", self.load.headers.join(", "))?;
        writeln!(f, "Memory usage: {:.2} MB", self.load.memory_bytes as f64 / 1_048_576.0)?;
        writeln!(f, "First {} rows:", self.load.preview.len())?;
        for row in &self.load.preview {
            let cells: Vec<String> = row.iter().map(Value::to_string).collect();
            writeln!(f, "  {}", cells.join(" | "))?;
        }
        if !self.load.numeric_summary.is_empty() {
            writeln!(f, "Numeric columns:")?;
            writeln!(
                f,
                "  {:<28} {:>6} {:>14} {:>14} {:>14} {:>14} {:>14} {:>14} {:>14}",
                "column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
            )?;
            for c in &self.load.numeric_summary {
                let std = c.std.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "NaN".to_string());
                writeln!(
                    f,
                    "  {:<28} {:>6} {:>14.2} {:>14} {:>14.2} {:>14.2} {:>14.2} {:>14.2} {:>14.2}",
                    c.column, c.count, c.mean, std, c.min, c.p25, c.p50, c.p75, c.max
                )?;
            }
        }

        banner(f, "STEP 2: CHECK FOR NULL/MISSING VALUES")?;
        if self.missing.is_empty() {
            writeln!(f, "No missing values found!")?;
        } else {
            writeln!(f, "Found {} columns with missing values:", self.missing.len())?;
            for m in &self.missing {
                writeln!(f, "  {:<32} {:>8} {:>7.2}%", m.column, m.count, m.percentage)?;
            }
        }

        banner(f, "STEP 3: CHECK FOR DUPLICATE ROWS")?;
        writeln!(f, "Number of duplicate rows: {}", self.duplicates.count)?;
        writeln!(f, "Percentage of duplicates: {:.2}%", self.duplicates.percentage)?;
        if self.duplicates.count > 0 {
            writeln!(f, "Duplicate rows found:")?;
            for e in &self.duplicates.examples {
                writeln!(f, "  {} | {} | {}", e.track, e.artist, e.album)?;
            }
            writeln!(f, "Rows after removing duplicates: {}", self.rows_after_dedup)?;
        } else {
            writeln!(f, "No duplicate rows found!")?;
        }

        banner(f, "STEP 4: CHECK FOR ENCODING ISSUES")?;
        if self.encoding_issues.is_empty() {
            writeln!(f, "No encoding issues detected!")?;
        } else {
            for issue in &self.encoding_issues {
                writeln!(f, "{}: {} rows affected", issue.column, issue.count)?;
                for example in &issue.examples {
                    writeln!(f, "  - {}", example)?;
                }
            }
        }
        writeln!(f, "Total rows with encoding issues: {}", self.total_encoding_issues())?;

        banner(f, "STEP 5: CHECK AND CONVERT DATA TYPES")?;
        for c in &self.conversions {
            writeln!(
                f,
                "  {}: {} numeric, {} coerced to missing",
                c.column, c.converted, c.coerced_to_missing
            )?;
        }

        banner(f, "STEP 6: CHECK FOR INVALID VALUES AND OUTLIERS")?;
        if self.negative_values.is_empty() {
            writeln!(f, "No negative values found!")?;
        } else {
            for n in &self.negative_values {
                writeln!(f, "  {}: {} negative values", n.column, n.count)?;
            }
        }
        writeln!(f, "Outlier Detection (using IQR method):")?;
        for o in &self.outliers {
            writeln!(f, "{}:", o.column)?;
            writeln!(f, "  Q1: {}", thousands(o.q1))?;
            writeln!(f, "  Q3: {}", thousands(o.q3))?;
            writeln!(f, "  IQR: {}", thousands(o.iqr))?;
            writeln!(f, "  Lower bound: {}", thousands(o.lower_bound))?;
            writeln!(f, "  Upper bound: {}", thousands(o.upper_bound))?;
            writeln!(f, "  Number of outliers: {} ({:.1}%)", o.count, o.percentage)?;
        }

        banner(f, "STEP 7: DROP UNNECESSARY COLUMNS")?;
        if self.pruning.dropped.is_empty() {
            writeln!(f, "No columns to drop (none found in dataset)")?;
        } else {
            writeln!(f, "Dropped columns: {}", self.pruning.dropped.join(", "))?;
        }
        if !self.pruning.not_found.is_empty() {
            writeln!(f, "Columns not found in dataset: {}", self.pruning.not_found.join(", "))?;
        }

        banner(f, "STEP 8: FINAL CLEANED DATA SUMMARY")?;
        let s = &self.summary;
        writeln!(f, "Original dataset shape: {:?}", s.original_shape)?;
        writeln!(f, "Cleaned dataset shape: {:?}", s.cleaned_shape)?;
        writeln!(f, "Rows removed: {}", s.rows_removed)?;
        if s.late_duplicates_removed > 0 {
            writeln!(
                f,
                "Duplicates removed after normalization: {}",
                s.late_duplicates_removed
            )?;
        }
        writeln!(f, "Remaining Missing Values:")?;
        if s.remaining_missing.is_empty() {
            writeln!(f, "  No missing values!")?;
        }
        for m in &s.remaining_missing {
            writeln!(f, "  {}: {} ({:.2}%)", m.column, m.count, m.percentage)?;
        }
        writeln!(f, "Cleaned Data Sample:")?;
        for row in &s.sample {
            writeln!(
                f,
                "  {} | {} | {} | {} | {}",
                row.track, row.artist, row.spotify_streams, row.youtube_views, row.tiktok_views
            )?;
        }
        if let Some(output) = &self.output {
            writeln!(f)?;
            writeln!(f, "Cleaned data saved to '{}'", output)?;
        }
        Ok(())
    }
}
