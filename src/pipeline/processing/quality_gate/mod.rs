//! Data-quality audits run by the cleaning pipeline.
//!
//! Every audit here is read-only: it inspects a [`Table`] and returns findings for the
//! cleaning report. Repairs live in the `normalize` module.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::constants::{ALBUM_NAME, ARTIST, TRACK};
use crate::domain::{Row, Table, Value};

/// Maximum duplicate rows listed in a report
pub const MAX_DUPLICATE_EXAMPLES: usize = 20;
/// Maximum distinct example values listed per column with encoding issues
pub const MAX_ENCODING_EXAMPLES: usize = 5;
/// Multiplier applied to the IQR for the boxplot fences
pub const IQR_FENCE_FACTOR: f64 = 1.5;

const REPLACEMENT_CHAR: char = '\u{fffd}';

/// Missing-value count for one column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingValues {
    pub column: String,
    pub count: usize,
    pub percentage: f64,
}

/// Identifying fields of a row shown as a duplicate example
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateExample {
    pub track: String,
    pub artist: String,
    pub album: String,
}

/// Result of scanning for rows identical across every column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateAudit {
    /// Rows that repeat an earlier row; dropping these leaves one copy per group
    pub count: usize,
    pub percentage: f64,
    /// Members of duplicate groups (first occurrences included), sorted by track name
    pub examples: Vec<DuplicateExample>,
    #[serde(skip)]
    pub repeated_rows: Vec<usize>,
}

/// Replacement characters found in a text column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncodingIssue {
    pub column: String,
    pub count: usize,
    pub examples: Vec<String>,
}

/// Negative numbers found in a numeric column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NegativeValues {
    pub column: String,
    pub count: usize,
}

/// Interquartile-range fences and the values falling outside them
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierAudit {
    pub column: String,
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub count: usize,
    pub percentage: f64,
}

/// Summary statistics of one numeric column, quartiles by linear interpolation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStats {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; `None` below two values
    pub std: Option<f64>,
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

/// Columns with at least one missing cell, most-missing first
pub fn audit_missing(table: &Table) -> Vec<MissingValues> {
    let total = table.row_count();
    let mut findings: Vec<MissingValues> = table
        .columns()
        .iter()
        .filter_map(|name| {
            let count = table.column(name)?.filter(|v| v.is_missing()).count();
            (count > 0).then(|| MissingValues {
                column: name.clone(),
                count,
                percentage: percentage(count, total),
            })
        })
        .collect();
    // Stable sort keeps column order among equal counts
    findings.sort_by(|a, b| b.count.cmp(&a.count));
    findings
}

/// Find rows identical across every column
pub fn audit_duplicates(table: &Table) -> DuplicateAudit {
    let mut first_seen: HashMap<&Row, usize> = HashMap::new();
    let mut repeated_rows = Vec::new();
    let mut group_members: HashSet<usize> = HashSet::new();

    for (idx, row) in table.rows().iter().enumerate() {
        match first_seen.get(row) {
            Some(&first) => {
                repeated_rows.push(idx);
                group_members.insert(first);
                group_members.insert(idx);
            }
            None => {
                first_seen.insert(row, idx);
            }
        }
    }

    let mut members: Vec<usize> = group_members.into_iter().collect();
    members.sort_unstable();
    let track_idx = table.column_index(TRACK);
    members.sort_by(|a, b| {
        let ta = track_idx.and_then(|i| table.rows()[*a][i].as_text());
        let tb = track_idx.and_then(|i| table.rows()[*b][i].as_text());
        compare_missing_last(ta, tb)
    });

    let field = |row: usize, column: &str| {
        table
            .cell(row, column)
            .map(|v| v.to_string())
            .unwrap_or_default()
    };
    let examples = members
        .into_iter()
        .take(MAX_DUPLICATE_EXAMPLES)
        .map(|row| DuplicateExample {
            track: field(row, TRACK),
            artist: field(row, ARTIST),
            album: field(row, ALBUM_NAME),
        })
        .collect();

    DuplicateAudit {
        count: repeated_rows.len(),
        percentage: percentage(repeated_rows.len(), table.row_count()),
        examples,
        repeated_rows,
    }
}

fn compare_missing_last(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Scan text columns for U+FFFD left behind by lossy decoding upstream
pub fn audit_encoding(table: &Table) -> Vec<EncodingIssue> {
    let mut issues = Vec::new();
    for name in table.columns() {
        let Some(cells) = table.column(name) else {
            continue;
        };
        let texts: Vec<&str> = cells.filter_map(Value::as_text).collect();
        if texts.is_empty() {
            continue;
        }

        let mut count = 0;
        let mut examples: Vec<String> = Vec::new();
        for text in texts.into_iter().filter(|t| t.contains(REPLACEMENT_CHAR)) {
            count += 1;
            if examples.len() < MAX_ENCODING_EXAMPLES && !examples.iter().any(|e| e == text) {
                examples.push(text.to_string());
            }
        }
        if count > 0 {
            issues.push(EncodingIssue {
                column: name.clone(),
                count,
                examples,
            });
        }
    }
    issues
}

/// Count negative values in every column holding numbers
pub fn audit_negative_values(table: &Table) -> Vec<NegativeValues> {
    table
        .columns()
        .iter()
        .filter_map(|name| {
            let numbers = table.numbers(name)?;
            let count = numbers.iter().filter(|n| **n < 0.0).count();
            (count > 0).then(|| NegativeValues {
                column: name.clone(),
                count,
            })
        })
        .collect()
}

/// Quantile with linear interpolation between closest ranks. `sorted` must be ascending
/// and non-empty.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = (sorted.len() - 1) as f64 * q;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

fn plain_number(value: &Value) -> Option<Option<f64>> {
    match value {
        Value::Missing => Some(None),
        Value::Number(n) => Some(Some(*n)),
        Value::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()).map(Some),
    }
}

/// Statistics for every column whose non-missing cells all read as plain numbers.
/// Text with thousands separators does not count, so raw counter columns are left out
/// until normalization.
pub fn describe_numeric(table: &Table) -> Vec<ColumnStats> {
    table
        .columns()
        .iter()
        .filter_map(|name| {
            let cells: Option<Vec<Option<f64>>> = table.column(name)?.map(plain_number).collect();
            let mut values: Vec<f64> = cells?.into_iter().flatten().collect();
            if values.is_empty() {
                return None;
            }
            values.sort_by(|a, b| a.total_cmp(b));

            let count = values.len();
            let mean = values.iter().sum::<f64>() / count as f64;
            let std = (count > 1).then(|| {
                let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
                (ss / (count - 1) as f64).sqrt()
            });

            Some(ColumnStats {
                column: name.clone(),
                count,
                mean,
                std,
                min: values[0],
                p25: quantile(&values, 0.25),
                p50: quantile(&values, 0.5),
                p75: quantile(&values, 0.75),
                max: values[count - 1],
            })
        })
        .collect()
}

/// IQR fences for each named column. Absent or all-missing columns are skipped.
pub fn audit_outliers(table: &Table, columns: &[&str]) -> Vec<OutlierAudit> {
    columns
        .iter()
        .filter_map(|name| {
            let mut values = table.numbers(name)?;
            if values.is_empty() {
                return None;
            }
            values.sort_by(|a, b| a.total_cmp(b));

            let q1 = quantile(&values, 0.25);
            let q3 = quantile(&values, 0.75);
            let iqr = q3 - q1;
            let lower_bound = q1 - IQR_FENCE_FACTOR * iqr;
            let upper_bound = q3 + IQR_FENCE_FACTOR * iqr;
            let count = values
                .iter()
                .filter(|v| **v < lower_bound || **v > upper_bound)
                .count();

            Some(OutlierAudit {
                column: name.to_string(),
                q1,
                q3,
                iqr,
                lower_bound,
                upper_bound,
                count,
                percentage: percentage(count, table.row_count()),
            })
        })
        .collect()
}
