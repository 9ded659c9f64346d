// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::path::Path;

use anyhow::{Context, Result};

use crate::common::read_report;

/// Render a JSON report as CSV.
pub fn csv_command(input: &Path, output_path: &Path, mut output: impl FnMut(String)) -> Result<()> {
    let dataset = read_report(input)?;
    retention::render::write_csv(output_path, &dataset)
        .with_context(|| format!("Failed to write CSV {}", output_path.display()))?;

    output(format!(
        "{} ({} rows, {} columns)",
        output_path.display(),
        dataset.len(),
        retention::render::columns(&dataset).len()
    ));
    Ok(())
}
