//! Whole-directory dataset operations.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::formats::{read_table, FormatOptions};
use crate::table::Table;

/// Regular files directly inside `dir`, sorted by name.
///
/// # Errors
///
/// Returns an error if the directory can't be listed.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Concatenate every file in `input_dir` whose name starts with `prefix`.
///
/// Files are read in name order. Files that can't be read are logged and
/// skipped. Columns are the union of all files' columns.
///
/// # Errors
///
/// Returns [`Error::EmptyDataset`] if no matching file could be read.
pub fn concat(input_dir: &Path, prefix: &str, options: &FormatOptions) -> Result<Table> {
    let mut combined: Option<Table> = None;

    for path in list_files(input_dir)? {
        let name = file_name(&path);
        if !name.starts_with(prefix) {
            continue;
        }

        match read_table(&path, options) {
            Ok(table) => {
                info!(
                    "Loaded {} ({} rows, {} columns)",
                    name,
                    table.len(),
                    table.columns().len()
                );
                match combined.as_mut() {
                    Some(all) => all.concat(table),
                    None => combined = Some(table),
                }
            }
            Err(e) => warn!("Skipping {}: {}", name, e),
        }
    }

    combined.ok_or_else(|| Error::EmptyDataset {
        dir: input_dir.to_path_buf(),
        prefix: prefix.to_string(),
    })
}

/// Replace `from` with `to` in the name of every file in `input_dir`.
///
/// Returns the new paths of renamed files.
///
/// # Errors
///
/// Returns an error if the directory can't be listed or a rename fails.
pub fn rename(input_dir: &Path, from: &str, to: &str) -> Result<Vec<PathBuf>> {
    if from.is_empty() {
        return Ok(Vec::new());
    }

    let mut renamed = Vec::new();
    for path in list_files(input_dir)? {
        let name = file_name(&path);
        if !name.contains(from) {
            continue;
        }
        let target = input_dir.join(name.replace(from, to));
        fs::rename(&path, &target)?;
        debug!("Renamed {} -> {}", path.display(), target.display());
        renamed.push(target);
    }

    info!("Renamed {} files in {}", renamed.len(), input_dir.display());
    Ok(renamed)
}
