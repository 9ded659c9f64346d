// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Reading source reports and writing merged outputs
//!
//! Every input file is opened, fully parsed and closed before any
//! transformation runs. Outputs are written to a temporary file in the
//! destination directory and renamed into place.

use crate::classify::SkippedSource;
use crate::error::{Result, RetentionError};
use crate::record::Dataset;
use diagnostics::*;
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Datasets read from a directory plus the files that could not be used.
#[derive(Debug, Default)]
pub struct LoadedSources {
    pub datasets: Vec<Dataset>,
    pub skipped: Vec<SkippedSource>,
}

/// List `*.json` files in `dir` whose name contains `include_marker`, sorted
/// by filename. Not recursive.
pub fn discover(dir: &Path, include_marker: &str) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| RetentionError::io(dir, e))?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| RetentionError::io(dir, e))?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.ends_with(".json") && name.contains(include_marker) && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Read one JSON array of records. The dataset is named after the file.
pub fn read_dataset(path: &Path) -> Result<Dataset> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let file = File::open(path).map_err(|e| RetentionError::io(path, e))?;
    let value: Value =
        serde_json::from_reader(BufReader::new(file)).map_err(|e| RetentionError::json(path, e))?;
    Dataset::from_json(name, value)
}

/// Read every matching file of `dir`. Files that fail to read or parse are
/// skipped and reported; only an unreadable directory is an error.
pub fn load_sources(dir: &Path, include_marker: &str) -> Result<LoadedSources> {
    let mut loaded = LoadedSources::default();

    for path in discover(dir, include_marker)? {
        match read_dataset(&path) {
            Ok(dataset) => {
                log_debug!(
                    "Loaded {count} records from {path}",
                    count: dataset.len(),
                    path: path.display().to_string()
                );
                loaded.datasets.push(dataset);
            }
            Err(error) => {
                log_warn!(
                    "Skipping {path}: {error}",
                    path: path.display().to_string(),
                    error: error.to_string()
                );
                loaded.skipped.push(SkippedSource {
                    source: path.display().to_string(),
                    error,
                });
            }
        }
    }

    log_info!(
        "Loaded {loaded} of {total} source files from {dir}",
        loaded: loaded.datasets.len(),
        total: loaded.datasets.len() + loaded.skipped.len(),
        dir: dir.display().to_string()
    );
    Ok(loaded)
}

/// Write `value` as JSON to `path`, replacing any existing file atomically.
pub fn write_json(path: &Path, value: &Value) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| RetentionError::io(dir, e))?;
    {
        let mut writer = BufWriter::new(tmp.as_file());
        serde_json::to_writer(&mut writer, value).map_err(|e| RetentionError::json(path, e))?;
        writer.flush().map_err(|e| RetentionError::io(path, e))?;
    }
    _ = tmp
        .persist(path)
        .map_err(|e| RetentionError::io(path, e.error))?;
    Ok(())
}

pub fn write_dataset(path: &Path, dataset: &Dataset) -> Result<()> {
    write_json(path, &dataset.to_json())?;
    log_info!(
        "Wrote {count} records to {path}",
        count: dataset.len(),
        path: path.display().to_string()
    );
    Ok(())
}
