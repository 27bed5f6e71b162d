// src/file.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::options::ExportOptions;
use crate::csv::to_export_string;
use crate::data::DataSet;
use crate::error::{Error, Result};

/// Write `data` to `export.out_path()` as CSV/TSV. Returns the path written.
pub fn write_export(export: &ExportOptions, data: &DataSet) -> Result<PathBuf> {
    let path = export.out_path();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_directory(parent)?;
        }
    }

    fs::write(&path, export_text(export, data))?;
    logf!("Exported {} rows to {}", data.rows.len(), path.display());
    Ok(path)
}

/// Same text Export writes; the Copy button puts this on the clipboard.
pub fn export_text(export: &ExportOptions, data: &DataSet) -> String {
    to_export_string(&data.headers, &data.rows, export.include_headers, export.delimiter())
}

pub fn ensure_directory(dir: &Path) -> Result<()> {
    if dir.exists() && !dir.is_dir() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("Path exists but is not a directory: {}", dir.display()),
        )));
    }
    if !dir.exists() { fs::create_dir_all(dir)?; }
    Ok(())
}

/// `name` next to `path` (same directory, or cwd for a bare filename).
pub fn sibling(path: &Path, name: &str) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.join(name),
        _ => PathBuf::from(name),
    }
}
