use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::{debug, instrument};

use crate::domain::Table;
use crate::error::Result;

/// Write a table as UTF-8 CSV with a header row and no index column
pub fn write_table<W: Write>(table: &Table, writer: W) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(table.columns())?;
    for row in table.rows() {
        out.write_record(row.iter().map(|v| v.to_field()))?;
    }
    out.flush()?;
    Ok(())
}

/// Write a table to `path`. The file is staged next to its destination and renamed into
/// place, so readers never observe a half-written table.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn write_table_file(table: &Table, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut staged = path.as_os_str().to_owned();
    staged.push(".tmp");
    let staged = Path::new(&staged);

    let file = fs::File::create(staged)?;
    write_table(table, std::io::BufWriter::new(file))?;
    fs::rename(staged, path)?;

    debug!(rows = table.row_count(), columns = table.column_count(), "Wrote table");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Value;

    #[test]
    fn test_write_table_quotes_and_formats_numbers() {
        let mut table = Table::from_fields(&["Track", "Spotify Streams"], &[&["Hello, World", "x"]]);
        table.set_column("Spotify Streams", vec![Value::Number(1234567.0)]);
        let mut buf = Vec::new();
        write_table(&table, &mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "Track,Spotify Streams\n\"Hello, World\",1234567\n"
        );
    }

    #[test]
    fn test_write_table_file_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("cleaned.csv");
        let table = Table::from_fields(&["A", "B"], &[&["1", ""], &["", "2"]]);
        write_table_file(&table, &path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "A,B\n1,\n,2\n");
        assert!(!dir.path().join("out").join("cleaned.csv.tmp").exists());
    }
}
