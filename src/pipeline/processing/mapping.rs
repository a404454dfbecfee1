use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info, instrument};

use crate::constants::{CSV_DELIMITER, KEY_COLUMN, VALUE_COLUMN};
use crate::error::{ReplaceError, Result};

const UTF8_BOM: &str = "\u{feff}";

/// One row of the mapping source, before trimming
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingRow {
    pub key: String,
    pub value: String,
}

impl MappingRow {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Immutable `Postnr -> Id` lookup. Keys and values are stored trimmed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingTable {
    entries: HashMap<String, String>,
    rows_read: usize,
    overwritten: usize,
}

impl MappingTable {
    /// Build a table from rows. A key seen more than once keeps the value of its last row.
    pub fn build<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = MappingRow>,
    {
        let mut entries = HashMap::new();
        let mut rows_read = 0;
        let mut overwritten = 0;

        for row in rows {
            rows_read += 1;
            let key = row.key.trim().to_string();
            let value = row.value.trim().to_string();
            debug!("Mapping {} to {}", key, value);
            if let Some(previous) = entries.insert(key.clone(), value) {
                overwritten += 1;
                debug!("Key {} seen again, replacing earlier value {}", key, previous);
            }
        }

        Self {
            entries,
            rows_read,
            overwritten,
        }
    }

    /// Parse a `;`-delimited CSV with a header containing `Postnr` and `Id`.
    #[instrument(skip(reader))]
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(CSV_DELIMITER)
            .has_headers(true)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let column = |name: &str| {
            headers
                .iter()
                .enumerate()
                .position(|(i, h)| {
                    let h = if i == 0 { h.trim_start_matches(UTF8_BOM) } else { h };
                    h == name
                })
        };

        let (key_idx, value_idx) = match (column(KEY_COLUMN), column(VALUE_COLUMN)) {
            (Some(k), Some(v)) => (k, v),
            _ => {
                return Err(ReplaceError::Schema(format!(
                    "CSV file must contain '{}' and '{}' columns, found: {:?}",
                    KEY_COLUMN,
                    VALUE_COLUMN,
                    headers.iter().collect::<Vec<_>>()
                )))
            }
        };

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            // Equal-length records are enforced by the reader, so both indexes exist
            let key = record.get(key_idx).unwrap_or_default();
            let value = record.get(value_idx).unwrap_or_default();
            rows.push(MappingRow::new(key, value));
        }

        let table = Self::build(rows);
        info!(
            "Built mapping with {} keys from {} rows ({} overwritten)",
            table.len(),
            table.rows_read(),
            table.overwritten()
        );
        Ok(table)
    }

    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            ReplaceError::Parse(format!("Failed to open mapping file '{}': {}", path.display(), e))
        })?;
        Self::from_csv_reader(file)
    }

    /// Look up a value. The key is trimmed first, matching how keys were stored.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key.trim()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of rows consumed while building, including overwritten duplicates
    pub fn rows_read(&self) -> usize {
        self.rows_read
    }

    /// Number of rows whose key had already been seen
    pub fn overwritten(&self) -> usize {
        self.overwritten
    }

    /// Keys sorted for stable display
    pub fn sorted_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}
