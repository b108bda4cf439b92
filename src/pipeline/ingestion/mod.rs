// Pipeline ingestion: decoding and parsing delimited files into a `Table`

use encoding_rs::WINDOWS_1252;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, instrument};

use crate::domain::{Table, Value};
use crate::error::{Result, StreamboardError};

/// Text encoding of an input file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextEncoding {
    /// Single-byte Western encoding. Decoded as windows-1252, the WHATWG reading of latin-1.
    #[default]
    Latin1,
    /// Strict UTF-8; invalid bytes are fatal
    Utf8,
    /// UTF-8 with invalid sequences replaced by U+FFFD
    Utf8Lossy,
}

impl FromStr for TextEncoding {
    type Err = StreamboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "latin1" | "latin-1" | "iso-8859-1" | "windows-1252" | "cp1252" => Ok(TextEncoding::Latin1),
            "utf8" | "utf-8" => Ok(TextEncoding::Utf8),
            "utf8-lossy" | "utf-8-lossy" => Ok(TextEncoding::Utf8Lossy),
            other => Err(StreamboardError::Config(format!("Unknown encoding '{}'", other))),
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TextEncoding::Latin1 => "latin1",
            TextEncoding::Utf8 => "utf8",
            TextEncoding::Utf8Lossy => "utf8-lossy",
        };
        f.write_str(name)
    }
}

/// Decode raw bytes into text
pub fn decode(bytes: &[u8], encoding: TextEncoding) -> Result<Cow<'_, str>> {
    let text = match encoding {
        TextEncoding::Latin1 => {
            let (cow, _, _) = WINDOWS_1252.decode(bytes);
            cow
        }
        TextEncoding::Utf8 => match std::str::from_utf8(bytes) {
            Ok(s) => Cow::Borrowed(s),
            Err(e) => {
                let line = bytes[..e.valid_up_to()].iter().filter(|b| **b == b'\n').count() as u64 + 1;
                return Err(StreamboardError::Decode {
                    line,
                    reason: format!("invalid UTF-8: {e}"),
                });
            }
        },
        TextEncoding::Utf8Lossy => String::from_utf8_lossy(bytes),
    };

    // Excel-exported files commonly start with a UTF-8 BOM
    Ok(match text {
        Cow::Borrowed(s) => Cow::Borrowed(s.strip_prefix('\u{feff}').unwrap_or(s)),
        Cow::Owned(s) => match s.strip_prefix('\u{feff}') {
            Some(rest) => Cow::Owned(rest.to_string()),
            None => Cow::Owned(s),
        },
    })
}

/// Parse comma-delimited text with a header row.
///
/// Rows shorter than the header are padded with missing cells; longer rows are an error.
pub fn parse_table(text: &str) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    if headers.is_empty() || (headers.len() == 1 && headers[0].is_empty()) {
        return Err(StreamboardError::EmptyInput);
    }

    let mut table = Table::new(headers);
    for record in reader.records() {
        let record = record?;
        if record.len() > table.column_count() {
            return Err(StreamboardError::RaggedRow {
                line: record.position().map(|p| p.line()).unwrap_or(0),
                expected: table.column_count(),
                found: record.len(),
            });
        }
        table.push_row(record.iter().map(Value::from_field).collect());
    }

    Ok(table)
}

/// Load a delimited file. Any failure aborts the load; no partial table is returned.
#[instrument(skip_all, fields(path = %path.as_ref().display(), encoding = %encoding))]
pub fn load_table(path: impl AsRef<Path>, encoding: TextEncoding) -> Result<Table> {
    let bytes = fs::read(path.as_ref())?;
    load_table_from_bytes(&bytes, encoding)
}

pub fn load_table_from_bytes(bytes: &[u8], encoding: TextEncoding) -> Result<Table> {
    if bytes.is_empty() {
        return Err(StreamboardError::EmptyInput);
    }
    let text = decode(bytes, encoding)?;
    let table = parse_table(&text)?;
    debug!(rows = table.row_count(), columns = table.column_count(), "Parsed table");
    Ok(table)
}
