// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Retention union pipeline
//!
//! sources → rename + classify → fold each day/week bucket (seed join) →
//! fold day with week per variant (union join) → basic and expanded outputs.

use crate::classify::{Buckets, Granularity, SkippedSource, Variant, classify};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::merge::{JoinMode, MergeOptions, MergeReport, merge};
use crate::record::Dataset;
use crate::source::{load_sources, write_dataset};
use diagnostics::*;
use std::path::Path;

#[derive(Debug, Default)]
pub struct PipelineReport {
    /// Sources left out because they could not be read or renamed
    pub skipped: Vec<SkippedSource>,
    /// Data-quality findings from every merge of the run
    pub merge: MergeReport,
}

#[derive(Debug)]
pub struct PipelineOutput {
    pub basic: Dataset,
    pub expanded: Dataset,
    pub report: PipelineReport,
}

/// Fold the day and week buckets of one variant into a single dataset.
fn fold_variant(
    buckets: &mut Buckets,
    variant: Variant,
    config: &PipelineConfig,
    report: &mut MergeReport,
) -> Result<Dataset> {
    let options = MergeOptions::new(config.join_key.as_str()).with_unmatched(config.unmatched);

    let mut folded = Vec::with_capacity(2);
    for granularity in [Granularity::Day, Granularity::Week] {
        let label = format!("{granularity}/{variant}");
        let merged = merge(&label, buckets.take(granularity, variant), &options)?;
        report.extend(merged.report);
        folded.push(merged.dataset);
    }

    let merged = merge(
        &variant.to_string(),
        folded,
        &options.with_mode(JoinMode::Union),
    )?;
    report.extend(merged.report);
    Ok(merged.dataset)
}

/// Run the pipeline over already-loaded sources.
///
/// Sources are folded in the order given; within a bucket the last source is
/// the seed. Every bucket must receive at least one source.
pub fn run(sources: Vec<Dataset>, config: &PipelineConfig) -> Result<PipelineOutput> {
    config.validate()?;

    let mut buckets = classify(sources, config);
    let mut report = PipelineReport {
        skipped: std::mem::take(&mut buckets.skipped),
        merge: MergeReport::default(),
    };

    let basic = fold_variant(&mut buckets, Variant::Basic, config, &mut report.merge)?;
    let expanded = fold_variant(&mut buckets, Variant::Expanded, config, &mut report.merge)?;

    log_info!(
        "Merged {basic} basic and {expanded} expanded records ({issues} issues, {skipped} skipped sources)",
        basic: basic.len(),
        expanded: expanded.len(),
        issues: report.merge.issues.len(),
        skipped: report.skipped.len()
    );

    Ok(PipelineOutput {
        basic,
        expanded,
        report,
    })
}

/// Load sources from `data_dir`, run the pipeline and write both outputs
/// into `out_dir`.
pub fn run_directory(
    data_dir: &Path,
    out_dir: &Path,
    config: &PipelineConfig,
) -> Result<PipelineOutput> {
    let loaded = load_sources(data_dir, &config.include_marker)?;
    let mut output = run(loaded.datasets, config)?;

    let mut skipped = loaded.skipped;
    skipped.append(&mut output.report.skipped);
    output.report.skipped = skipped;

    write_dataset(&out_dir.join(&config.output_basic), &output.basic)?;
    write_dataset(&out_dir.join(&config.output_expanded), &output.expanded)?;
    Ok(output)
}
