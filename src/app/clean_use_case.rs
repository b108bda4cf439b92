use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use crate::app::ports::TableSink;
use crate::observability::metrics::{increment, MetricName, TimingGuard};
use crate::pipeline::ingestion::{load_table, TextEncoding};
use crate::pipeline::{CleaningPipeline, CleaningReport};

/// Use case for turning the raw export into the cleaned handoff file
pub struct CleanUseCase {
    pipeline: CleaningPipeline,
    output: Box<dyn TableSink>,
}

impl CleanUseCase {
    pub fn new(pipeline: CleaningPipeline, output: Box<dyn TableSink>) -> Self {
        Self { pipeline, output }
    }

    /// Create a use case with the default column lists
    pub fn with_default_pipeline(output: Box<dyn TableSink>) -> Self {
        Self::new(CleaningPipeline::new(), output)
    }

    /// Load, clean and persist. Any load failure halts before output is written.
    pub fn run(&self, input: &Path, encoding: TextEncoding) -> Result<CleaningReport> {
        let _timing = TimingGuard::new(MetricName::CleanDuration);
        info!(input = %input.display(), %encoding, "Starting cleaning run");

        let raw = load_table(input, encoding)
            .with_context(|| format!("Failed to load raw data from {}", input.display()))?;
        let cleaned = self.pipeline.clean(raw);

        let location = self
            .output
            .write_table(&cleaned.table)
            .context("Failed to persist cleaned table")?;
        increment(MetricName::RowsWritten, cleaned.table.row_count() as u64);
        info!(
            rows = cleaned.table.row_count(),
            columns = cleaned.table.column_count(),
            output = %location,
            "Cleaning run complete"
        );

        let mut report = cleaned.report;
        report.output = Some(location);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Table;
    use std::cell::RefCell;
    use std::io::Write;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct MockSink {
        written: Rc<RefCell<Vec<Table>>>,
    }

    impl TableSink for MockSink {
        fn write_table(&self, table: &Table) -> crate::error::Result<String> {
            self.written.borrow_mut().push(table.clone());
            Ok("memory".to_string())
        }
    }

    #[test]
    fn test_run_cleans_and_persists() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(
            file,
            "Track,Artist,Spotify Streams,TIDAL Popularity\n\
             A,X,\"1,000\",\n\
             A,X,\"1,000\",\n\
             B,Y,oops,\n"
        )?;

        let sink = MockSink::default();
        let use_case = CleanUseCase::with_default_pipeline(Box::new(sink.clone()));
        let report = use_case.run(file.path(), TextEncoding::Utf8)?;

        assert_eq!(report.duplicates.count, 1);
        assert_eq!(report.output.as_deref(), Some("memory"));
        assert!(report.pruning.dropped.contains(&"TIDAL Popularity".to_string()));

        let written = sink.written.borrow();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].shape(), (2, 3));
        Ok(())
    }

    #[test]
    fn test_missing_input_writes_nothing() {
        let sink = MockSink::default();
        let use_case = CleanUseCase::with_default_pipeline(Box::new(sink.clone()));
        let result = use_case.run(Path::new("/nonexistent/raw.csv"), TextEncoding::Latin1);

        assert!(result.is_err());
        assert!(sink.written.borrow().is_empty());
    }
}
