//! Storage layer for kocem.
//!
//! This module provides `SQLite`-backed dataset files (`.db`, `.sqlite`).
//! A file holds any number of named datasets. Rows are stored as JSON
//! objects keyed by column name and deduplicated by a BLAKE3 hash, so
//! writing the same quizzes twice leaves a single copy.

pub mod migrations;
pub mod schema;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::table::{Cell, Record, Table};

/// A dataset file.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

/// Summary of a stored dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetInfo {
    /// Dataset name.
    pub name: String,
    /// Column names in order.
    pub columns: Vec<String>,
    /// Number of stored rows.
    pub rows: usize,
}

impl Storage {
    /// Open or create a dataset file at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening dataset file at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;

        migrations::initialize_schema(&conn)?;

        Ok(Self { path, conn })
    }

    /// Open a dataset file that must already exist.
    ///
    /// Used on read paths: a mistyped path is reported instead of leaving an
    /// empty database behind, and files without the dataset schema are
    /// rejected rather than migrated.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InputNotFound`] if the file doesn't exist,
    /// [`Error::NotADatasetFile`] if it was not written by kocem, or an error
    /// if the database cannot be opened.
    pub fn open_existing(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(Error::InputNotFound { path });
        }

        debug!("Opening existing dataset file at {}", path.display());
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn =
            Connection::open_with_flags(&path, flags).map_err(|source| Error::DatabaseOpen {
                path: path.clone(),
                source,
            })?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;

        if !migrations::has_schema(&conn)? {
            return Err(Error::NotADatasetFile { path });
        }
        migrations::initialize_schema(&conn)?;

        Ok(Self { path, conn })
    }

    /// Create an in-memory dataset store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a table to the named dataset.
    ///
    /// New columns are added to the dataset's column list. Rows already
    /// present in the dataset are skipped. Returns the number of rows inserted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn write_table(&mut self, name: &str, table: &Table) -> Result<usize> {
        let mut columns = self.columns(name)?.unwrap_or_default();
        for column in table.columns() {
            if !columns.contains(column) {
                columns.push(column.clone());
            }
        }

        let tx = self.conn.transaction()?;
        tx.execute(
            r"
            INSERT INTO datasets (name, columns) VALUES (?1, ?2)
            ON CONFLICT(name) DO UPDATE SET columns = excluded.columns
            ",
            params![name, serde_json::to_string(&columns)?],
        )?;

        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO rows (dataset, cells, row_hash) VALUES (?1, ?2, ?3)",
            )?;
            for record in table.records() {
                let cells = record_to_json(record)?;
                let hash = blake3::hash(cells.as_bytes()).to_hex().to_string();
                inserted += stmt.execute(params![name, cells, hash])?;
            }
        }
        tx.commit()?;

        let skipped = table.len() - inserted;
        if skipped > 0 {
            debug!("Skipped {skipped} duplicate rows in dataset '{name}'");
        }
        info!(
            "Stored {inserted} rows in dataset '{name}' at {}",
            self.path.display()
        );
        Ok(inserted)
    }

    /// Read the named dataset in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SheetNotFound`] if the dataset doesn't exist, or an
    /// error if the database operation fails.
    pub fn read_table(&self, name: &str) -> Result<Table> {
        let columns = self.columns(name)?.ok_or_else(|| Error::SheetNotFound {
            path: self.path.clone(),
            sheet: name.to_string(),
        })?;

        let mut stmt = self
            .conn
            .prepare("SELECT cells FROM rows WHERE dataset = ?1 ORDER BY id")?;
        let raw = stmt
            .query_map([name], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut table = Table::new(columns.clone());
        for cells in raw {
            let object: Map<String, Value> = serde_json::from_str(&cells)?;
            let row = columns
                .iter()
                .map(|c| object.get(c).map_or(Cell::Empty, Cell::from_json))
                .collect();
            table.push_row(row);
        }
        Ok(table)
    }

    /// Number of rows stored in a dataset (0 if it doesn't exist).
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn row_count(&self, name: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM rows WHERE dataset = ?1",
            [name],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// List all datasets in the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn datasets(&self) -> Result<Vec<DatasetInfo>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT d.name, d.columns, COUNT(r.id)
            FROM datasets d LEFT JOIN rows r ON r.dataset = d.name
            GROUP BY d.name ORDER BY d.name
            ",
        )?;
        let raw = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        raw.into_iter()
            .map(|(name, columns, rows)| {
                Ok(DatasetInfo {
                    name,
                    columns: serde_json::from_str(&columns)?,
                    rows: usize::try_from(rows).unwrap_or(0),
                })
            })
            .collect()
    }

    /// Delete a dataset and its rows. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn drop_dataset(&mut self, name: &str) -> Result<bool> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM rows WHERE dataset = ?1", [name])?;
        let removed = tx.execute("DELETE FROM datasets WHERE name = ?1", [name])?;
        tx.commit()?;

        if removed > 0 {
            info!("Removed dataset '{name}' from {}", self.path.display());
        }
        Ok(removed > 0)
    }

    fn columns(&self, name: &str) -> Result<Option<Vec<String>>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT columns FROM datasets WHERE name = ?1",
                [name],
                |row| row.get(0),
            )
            .optional()?;
        raw.map(|json| serde_json::from_str(&json).map_err(Error::from))
            .transpose()
    }
}

/// Serialize a record as a JSON object with sorted keys, omitting empty cells.
///
/// Key order is fixed so the same record hashes identically whatever the
/// column order of the table it came from.
fn record_to_json(record: Record) -> Result<String> {
    let object: BTreeMap<String, Value> = record
        .into_iter()
        .filter(|(_, cell)| *cell != Cell::Empty)
        .map(|(name, cell)| (name, cell.to_json()))
        .collect();
    Ok(serde_json::to_string(&object)?)
}
