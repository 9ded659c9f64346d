// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use retention::{Dataset, PipelineConfig};

/// Environment variable naming the report directory when none is given
pub const DATA_DIR_ENV: &str = "RETENTION_DATA";

/// Get the data directory with an optional override, falling back to RETENTION_DATA
pub fn get_data_dir_with_override(override_path: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = override_path {
        return Ok(path);
    }

    env::var(DATA_DIR_ENV)
        .map(PathBuf::from)
        .map_err(|_| anyhow!("No data directory given and {DATA_DIR_ENV} is not set"))
}

/// Load the pipeline configuration, or the defaults when no file is given
pub fn load_pipeline_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(path) => retention::load_config(path)
            .with_context(|| format!("Failed to load config file: {}", path.display())),
        None => Ok(PipelineConfig::default()),
    }
}

/// Read a JSON report for a single-file command
pub fn read_report(path: &Path) -> Result<Dataset> {
    retention::source::read_dataset(path)
        .with_context(|| format!("Failed to read report: {}", path.display()))
}

/// `counts.json` → `counts-randomized.json`, next to the input
pub fn randomized_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}-randomized.json"))
}
