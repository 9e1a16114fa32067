//! Reading and writing tables in different file formats.
//!
//! The format is chosen by file extension:
//!
//! | Extension | Read | Write |
//! |---|---|---|
//! | `.xlsx` `.xlsm` `.xls` `.ods` | yes | `.xlsx` only |
//! | `.csv` | yes | yes |
//! | `.txt` `.tsv` (configurable delimiter) | yes | yes |
//! | `.json` (array or one object per line) | yes | yes |
//! | `.jsonl` | yes | yes |
//! | `.html` (configurable table index) | yes | yes |
//! | `.db` `.sqlite` | yes | yes |

mod delimited;
mod excel;
mod html;
mod json;

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::storage::Storage;
use crate::table::Table;

/// A supported file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Excel or OpenDocument spreadsheet.
    Excel,
    /// Comma-separated values.
    Csv,
    /// Delimited text with the configured delimiter.
    Text,
    /// JSON array or JSON lines, depending on configuration.
    Json,
    /// JSON lines.
    JsonLines,
    /// HTML table.
    Html,
    /// `SQLite` dataset file.
    Sqlite,
}

impl Format {
    /// Determine the format from a path's extension.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFormat`] for unknown or missing extensions.
    pub fn from_path(path: &Path, operation: &'static str) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "xlsx" | "xlsm" | "xls" | "ods" => Ok(Self::Excel),
            "csv" => Ok(Self::Csv),
            "txt" | "tsv" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "jsonl" => Ok(Self::JsonLines),
            "html" | "htm" => Ok(Self::Html),
            "db" | "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            _ => Err(Error::unsupported_format(extension, operation)),
        }
    }
}

/// Options that affect how files are read and written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    /// Sheet to read from spreadsheets. `None` reads the first sheet.
    pub sheet: Option<String>,
    /// Delimiter for `.txt`/`.tsv`.
    pub delimiter: u8,
    /// Write `.json` as one object per line.
    pub json_lines: bool,
    /// Dataset name inside `SQLite` files.
    pub sqlite_dataset: String,
    /// Index of the `<table>` read from HTML files.
    pub html_index: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            sheet: None,
            delimiter: b'\t',
            json_lines: true,
            sqlite_dataset: "records".to_string(),
            html_index: 0,
        }
    }
}

impl From<&Config> for FormatOptions {
    fn from(config: &Config) -> Self {
        Self {
            sheet: config.workbook.sheet.clone(),
            delimiter: config.delimiter_byte(),
            json_lines: config.convert.json_lines,
            sqlite_dataset: config.convert.sqlite_dataset.clone(),
            html_index: config.convert.html_index,
        }
    }
}

/// Read a table from a file.
///
/// # Errors
///
/// Returns an error if the format is unsupported or the file can't be read.
pub fn read_table(path: &Path, options: &FormatOptions) -> Result<Table> {
    debug!("Reading {}", path.display());
    match Format::from_path(path, "reading")? {
        Format::Excel => excel::read(path, options.sheet.as_deref()),
        Format::Csv => delimited::read(path, b','),
        Format::Text => delimited::read(path, options.delimiter),
        Format::Json | Format::JsonLines => json::read(path),
        Format::Html => html::read(path, options.html_index),
        Format::Sqlite => Storage::open_existing(path)?.read_table(&options.sqlite_dataset),
    }
}

/// Write a table to a file, creating parent directories as needed.
///
/// # Errors
///
/// Returns an error if the format is unsupported or the file can't be written.
pub fn write_table(path: &Path, table: &Table, options: &FormatOptions) -> Result<()> {
    let format = Format::from_path(path, "writing")?;
    if format == Format::Excel
        && !path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("xlsx"))
    {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        return Err(Error::unsupported_format(extension, "writing"));
    }

    ensure_parent(path)?;
    match format {
        Format::Excel => excel::write(path, table)?,
        Format::Csv => delimited::write(path, table, b',')?,
        Format::Text => delimited::write(path, table, options.delimiter)?,
        Format::Json => json::write(path, table, options.json_lines)?,
        Format::JsonLines => json::write(path, table, true)?,
        Format::Html => html::write(path, table)?,
        Format::Sqlite => {
            Storage::open(path)?.write_table(&options.sqlite_dataset, table)?;
        }
    }
    info!("Wrote {} rows to {}", table.len(), path.display());
    Ok(())
}

/// Create the parent directory of `path` if it doesn't exist.
pub(crate) fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    Ok(())
}

/// Converts files from one format to another.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    options: FormatOptions,
}

impl Converter {
    /// Create a converter with the given options.
    #[must_use]
    pub fn new(options: FormatOptions) -> Self {
        Self { options }
    }

    /// Read `input` and write it to `output`. Returns the number of rows.
    ///
    /// # Errors
    ///
    /// Returns an error if either side's format is unsupported or I/O fails.
    pub fn convert(&self, input: &Path, output: &Path) -> Result<usize> {
        let table = read_table(input, &self.options)?;
        write_table(output, &table, &self.options)?;
        Ok(table.len())
    }
}

/// Name the converted file for `input` inside `output_dir`.
///
/// The file keeps the input's stem. Without an explicit `extension`, the last
/// component of `output_dir` is used, so `out/csv` produces `*.csv`.
#[must_use]
pub fn output_path_for(input: &Path, output_dir: &Path, extension: Option<&str>) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default();
    let extension = extension
        .map(|e| e.trim_start_matches('.').to_string())
        .or_else(|| {
            output_dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
        })
        .unwrap_or_default();

    let mut name = stem.to_os_string();
    if !extension.is_empty() {
        name.push(".");
        name.push(extension);
    }
    output_dir.join(name)
}
