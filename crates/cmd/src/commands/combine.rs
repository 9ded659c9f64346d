// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::path::Path;

use anyhow::{Context, Result};
use retention::counts::combine_counts;

use crate::common::read_report;

/// Copy secondary count fields onto matching primary records and write the result.
pub fn combine_command(
    primary: &Path,
    secondary: &Path,
    output_path: &Path,
    primary_key: &str,
    secondary_key: &str,
    mut output: impl FnMut(String),
) -> Result<()> {
    let primary = read_report(primary)?;
    let secondary = read_report(secondary)?;

    let combined = combine_counts(&primary, &secondary, primary_key, secondary_key);
    retention::source::write_dataset(output_path, &combined)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    output(format!(
        "{} ({} records)",
        output_path.display(),
        combined.len()
    ));
    Ok(())
}
