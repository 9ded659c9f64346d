// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::path::Path;

use anyhow::{Context, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;
use retention::randomize::randomize;

use crate::common::{randomized_path, read_report};

/// Write a copy of `input` with every value except `preserve` randomized.
///
/// Without `seed` the output differs on every run.
pub fn randomize_command(
    input: &Path,
    output_path: Option<&Path>,
    preserve: &str,
    seed: Option<u64>,
    mut output: impl FnMut(String),
) -> Result<()> {
    let dataset = read_report(input)?;
    let output_path = output_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| randomized_path(input));

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let randomized = randomize(&dataset, preserve, &mut rng);

    retention::source::write_dataset(&output_path, &randomized)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    output(format!(
        "{} ({} records)",
        output_path.display(),
        randomized.len()
    ));
    Ok(())
}
