use crate::domain::Table;
use crate::error::Result;

/// Destination of a cleaned table
pub trait TableSink {
    /// Persist the table and return a human-readable location for the report
    fn write_table(&self, table: &Table) -> Result<String>;
}
