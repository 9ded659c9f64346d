// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::path::Path;

use anyhow::{Context, Result};
use diagnostics::{log_debug, log_info};

use crate::common::load_pipeline_config;

/// Merge every retention report in `data_dir` into the basic and expanded
/// outputs. Summary lines are passed to `output`.
pub fn union_command(
    data_dir: &Path,
    out_dir: Option<&Path>,
    config_path: Option<&Path>,
    mut output: impl FnMut(String),
) -> Result<()> {
    let config = load_pipeline_config(config_path)?;
    let out_dir = out_dir.unwrap_or(data_dir);

    log_debug!(
        "union_command called with data_dir: {data_dir}, out_dir: {out_dir}",
        data_dir: data_dir.display().to_string(),
        out_dir: out_dir.display().to_string()
    );

    let result = retention::run_directory(data_dir, out_dir, &config)
        .with_context(|| format!("Failed to merge reports in {}", data_dir.display()))?;

    output(format!(
        "{} ({} records)",
        out_dir.join(&config.output_basic).display(),
        result.basic.len()
    ));
    output(format!(
        "{} ({} records)",
        out_dir.join(&config.output_expanded).display(),
        result.expanded.len()
    ));

    for skipped in &result.report.skipped {
        output(format!("skipped {}: {}", skipped.source, skipped.error));
    }
    for issue in &result.report.merge.issues {
        output(format!("warning: {issue}"));
    }

    log_info!(
        "Union complete: {skipped} skipped, {issues} merge issues",
        skipped: result.report.skipped.len(),
        issues: result.report.merge.issues.len()
    );
    Ok(())
}
