use std::path::Path;
use tracing::debug;

use crate::constants::{TRACK_TYPE, VIEW_NUMERIC_COLUMNS};
use crate::domain::{Table, TrackType};
use crate::error::Result;
use crate::pipeline::ingestion::{load_table, load_table_from_bytes, TextEncoding};
use crate::pipeline::processing::normalize::{coerce_number, derive_release_year, derive_track_type};
use crate::pipeline::storage::TableCache;

/// The cleaned table as the analytics view sees it: numeric columns coerced and the
/// `Release Year` / `Track Type` fields derived.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsTable {
    table: Table,
}

impl AnalyticsTable {
    pub fn from_cleaned(mut table: Table) -> Self {
        for column in VIEW_NUMERIC_COLUMNS {
            table.map_column(column, coerce_number);
        }
        derive_release_year(&mut table);
        derive_track_type(&mut table);
        debug!(rows = table.row_count(), "Prepared analytics table");
        Self { table }
    }

    /// Read the cleaned UTF-8 handoff file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_cleaned(load_table(path, TextEncoding::Utf8)?))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self::from_cleaned(load_table_from_bytes(bytes, TextEncoding::Utf8)?))
    }

    /// Load through a cache so unchanged files are parsed once
    pub fn load_cached(
        cache: &mut TableCache<AnalyticsTable>,
        path: impl AsRef<Path>,
    ) -> Result<std::sync::Arc<Self>> {
        cache.get_or_load(path, Self::from_bytes)
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn row_count(&self) -> usize {
        self.table.row_count()
    }

    /// Track types present in the data, in first-seen order
    pub fn track_types(&self) -> Vec<TrackType> {
        let mut seen = Vec::new();
        if let Some(cells) = self.table.column(TRACK_TYPE) {
            for t in cells.filter_map(|v| v.as_text()).filter_map(TrackType::parse) {
                if !seen.contains(&t) {
                    seen.push(t);
                }
            }
        }
        seen
    }
}
