use std::path::PathBuf;
use tracing::info;

use crate::app::ports::TableSink;
use crate::domain::Table;
use crate::error::Result;
use crate::pipeline::storage::write_table_file;

/// File-based implementation of TableSink
/// Writes the cleaned table as UTF-8 CSV, replacing any previous file
pub struct CsvFileSink {
    path: PathBuf,
}

impl CsvFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TableSink for CsvFileSink {
    fn write_table(&self, table: &Table) -> Result<String> {
        write_table_file(table, &self.path)?;
        info!("Cleaned data saved to {}", self.path.display());
        Ok(self.path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_sink_writes_csv_and_replaces_previous_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("out").join("cleaned.csv");
        fs::create_dir_all(path.parent().unwrap())?;
        fs::write(&path, "stale\n")?;

        let sink = CsvFileSink::new(&path);
        let table = Table::from_fields(&["Track", "Spotify Streams"], &[&["a", "10"]]);
        let location = sink.write_table(&table)?;

        assert_eq!(location, path.display().to_string());
        assert_eq!(fs::read_to_string(&path)?, "Track,Spotify Streams\na,10\n");
        assert!(!dir.path().join("out").join("cleaned.csv.tmp").exists());
        Ok(())
    }
}
