use anyhow::{Context, Result};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use crate::analytics::{compute_view, AnalyticsTable, FilterBounds, FilterState, ViewResult};
use crate::observability::metrics::{increment, record, MetricName};
use crate::pipeline::storage::TableCache;
use crate::render::{render_text, ChartSpecBuilder};

fn record_view(view: &ViewResult<'_>) {
    let (selected, total) = view.showing();
    debug!(selected, total, "Computed analytics view");
    increment(MetricName::ViewComputations, 1);
    record(MetricName::ViewRowsSelected, selected as f64);
}

/// A dashboard session over one cleaned file. Every request re-reads the file through the
/// cache, so edits on disk show up on the next request without re-parsing unchanged data.
pub struct ViewSession {
    path: PathBuf,
    cache: TableCache<AnalyticsTable>,
}

impl ViewSession {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: TableCache::new(),
        }
    }

    pub fn table(&mut self) -> Result<Arc<AnalyticsTable>> {
        AnalyticsTable::load_cached(&mut self.cache, &self.path)
            .with_context(|| format!("Failed to load cleaned data from {}", self.path.display()))
    }

    pub fn bounds(&mut self) -> Result<FilterBounds> {
        let table = self.table()?;
        Ok(FilterBounds::from_table(&table))
    }

    /// Filter selection covering the whole dataset
    pub fn default_filters(&mut self) -> Result<FilterState> {
        Ok(FilterState::from_bounds(&self.bounds()?))
    }

    pub fn text_report(&mut self, filters: &FilterState) -> Result<String> {
        let table = self.table()?;
        let view = compute_view(&table, filters);
        record_view(&view);
        Ok(render_text(&view))
    }

    pub fn chart_spec(&mut self, filters: &FilterState) -> Result<Value> {
        let table = self.table()?;
        let view = compute_view(&table, filters);
        record_view(&view);
        Ok(ChartSpecBuilder::new(&view).build())
    }

    /// Force the next request to re-parse the file
    pub fn invalidate(&mut self) {
        self.cache.invalidate(&self.path);
    }

    /// (hits, misses) of the underlying cache
    pub fn cache_stats(&self) -> (u64, u64) {
        self.cache.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::metrics::CountingRecorder;
    use std::fs;

    #[test]
    fn test_session_reuses_parsed_table_until_file_changes() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("cleaned.csv");
        fs::write(&path, "Track,Track Score\na,10\nb,20\n")?;

        let mut session = ViewSession::open(&path);
        let first = session.table()?;
        let second = session.table()?;
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(session.cache_stats(), (1, 1));

        fs::write(&path, "Track,Track Score\na,10\n")?;
        assert_eq!(session.table()?.row_count(), 1);
        assert_eq!(session.cache_stats(), (1, 2));

        session.invalidate();
        session.table()?;
        assert_eq!(session.cache_stats(), (1, 3));
        Ok(())
    }

    #[test]
    fn test_default_filters_cover_everything() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("cleaned.csv");
        fs::write(&path, "Track,Track Score\na,10\nb,20\n")?;

        let mut session = ViewSession::open(&path);
        let filters = session.default_filters()?;
        assert_eq!(filters.score_range, Some((10.0, 20.0)));
        let report = session.text_report(&filters)?;
        assert!(report.contains("Showing 2 of 2 tracks"));

        let spec = session.chart_spec(&filters)?;
        assert_eq!(spec["rows"]["total"], 2);
        Ok(())
    }

    #[test]
    fn test_session_records_view_metrics() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("cleaned.csv");
        fs::write(&path, "Track,Track Score\na,10\n")?;

        let mut session = ViewSession::open(&path);
        let recorder = CountingRecorder::default();
        ::metrics::with_local_recorder(&recorder, || session.text_report(&FilterState::default()))?;
        assert_eq!(recorder.registrations(), 2);
        Ok(())
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let mut session = ViewSession::open("/nonexistent/cleaned.csv");
        assert!(session.table().is_err());
    }
}
