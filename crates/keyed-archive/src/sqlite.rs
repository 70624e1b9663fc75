//! Table scans over SQLite columns that store archives.
//!
//! Every row of `SELECT column, extra... FROM table [extra SQL]` becomes a
//! [`BatchRow`] whose metadata echoes the extra columns.

use std::fmt;
use std::path::Path;

use indexmap::IndexMap;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use tracing::{debug, info};

use crate::batch::{decode_batch, BatchRow};
use crate::config::InputOutputConfiguration;
use crate::error::ArchiveError;
use crate::value::PrimitiveValue;

/// The query a table scan runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableScan {
    pub table: String,
    pub column: String,
    pub extra_columns: Vec<String>,
    /// Appended verbatim after the `FROM` clause, e.g. joins or `WHERE`.
    pub extra_sql: String,
}

impl TableScan {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            extra_columns: Vec::new(),
            extra_sql: String::new(),
        }
    }

    pub fn with_extra_columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.extra_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_extra_sql(mut self, extra_sql: impl Into<String>) -> Self {
        self.extra_sql = extra_sql.into();
        self
    }

    pub fn sql(&self) -> String {
        let columns: Vec<&str> = std::iter::once(self.column.as_str())
            .chain(self.extra_columns.iter().map(String::as_str))
            .collect();
        let mut sql = format!("SELECT {} FROM {}", columns.join(", "), self.table);
        let extra = self.extra_sql.trim();
        if !extra.is_empty() {
            sql.push(' ');
            sql.push_str(extra);
        }
        sql
    }
}

/// Extra column values of one row, in query order. NULL shows as `(null)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtraColumns(pub IndexMap<String, PrimitiveValue>);

impl ExtraColumns {
    pub fn get(&self, column: &str) -> Option<&PrimitiveValue> {
        self.0.get(column)
    }
}

impl fmt::Display for ExtraColumns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return Ok(());
        }
        write!(f, "{}", PrimitiveValue::Mapping(self.0.clone()))
    }
}

/// Opens the database at `path` without write access.
pub fn open_read_only(path: &Path) -> Result<Connection, ArchiveError> {
    Ok(Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?)
}

/// Runs `scan` and decodes the archive column of every row. Query errors
/// fail the scan; undecodable rows only fail their own [`BatchRow`].
pub fn archives_from_sqlite_table(
    connection: &Connection,
    scan: &TableScan,
    configuration: &InputOutputConfiguration,
) -> Result<Vec<BatchRow<ExtraColumns>>, ArchiveError> {
    let sql = scan.sql();
    info!(%sql, "scanning table");
    let mut statement = connection.prepare(&sql)?;
    let mut rows = statement.query([])?;
    let mut batch = Vec::new();
    while let Some(row) = rows.next()? {
        let bytes = archive_bytes(row.get_ref(0)?);
        let mut extra = IndexMap::with_capacity(scan.extra_columns.len());
        for (index, name) in scan.extra_columns.iter().enumerate() {
            extra.insert(name.clone(), column_value(row.get_ref(index + 1)?));
        }
        batch.push((bytes, ExtraColumns(extra)));
    }
    debug!(rows = batch.len(), "read table rows");
    Ok(decode_batch(batch, configuration))
}

fn archive_bytes(value: ValueRef<'_>) -> Vec<u8> {
    match value {
        ValueRef::Blob(bytes) | ValueRef::Text(bytes) => bytes.to_vec(),
        ValueRef::Null => Vec::new(),
        other => column_value(other).to_string().into_bytes(),
    }
}

fn column_value(value: ValueRef<'_>) -> PrimitiveValue {
    match value {
        ValueRef::Null => PrimitiveValue::Null,
        ValueRef::Integer(i) => PrimitiveValue::Integer(i.into()),
        ValueRef::Real(x) => PrimitiveValue::Float(x),
        ValueRef::Text(text) => PrimitiveValue::String(String::from_utf8_lossy(text).into_owned()),
        ValueRef::Blob(bytes) => PrimitiveValue::Data(bytes.to_vec()),
    }
}
