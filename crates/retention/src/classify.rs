// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Classification of source files into buckets
//!
//! Filenames carry their classification: `retention-5657-week-expanded.json`
//! yields the identifier `-week-expanded`, which is both the rename suffix and
//! the input to classification (week granularity, expanded variant).

use crate::config::PipelineConfig;
use crate::error::RetentionError;
use crate::record::Dataset;
use crate::rename::rename_dataset;
use diagnostics::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Week,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Basic,
    Expanded,
}

impl Variant {
    /// Number of dash-separated parts following the cumulative marker.
    pub fn cumulative_arity(self) -> usize {
        match self {
            Variant::Basic => 3,
            Variant::Expanded => 4,
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Granularity::Day => "day",
            Granularity::Week => "week",
        })
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Variant::Basic => "basic",
            Variant::Expanded => "expanded",
        })
    }
}

/// Classification of one source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BucketKey {
    pub granularity: Granularity,
    pub variant: Variant,
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.granularity, self.variant)
    }
}

/// Identifier of a source file: the filename stem without its first `skip`
/// '-'-separated segments, prefixed with '-'.
///
/// `retention-5657-day-expanded.json` with `skip = 2` → `-day-expanded`.
pub fn derive_identifier(filename: &str, skip: usize) -> String {
    let stem = filename.strip_suffix(".json").unwrap_or(filename);
    let rest: Vec<&str> = stem.split('-').skip(skip).collect();
    format!("-{}", rest.join("-"))
}

/// Classify an identifier by its granularity and variant markers.
pub fn classify_identifier(identifier: &str, config: &PipelineConfig) -> BucketKey {
    let granularity = if identifier.contains(&config.week_marker) {
        Granularity::Week
    } else {
        Granularity::Day
    };
    let variant = if identifier.contains(&config.expanded_marker) {
        Variant::Expanded
    } else {
        Variant::Basic
    };
    BucketKey {
        granularity,
        variant,
    }
}

/// A source that was left out of the pipeline, and why.
#[derive(Debug)]
pub struct SkippedSource {
    pub source: String,
    pub error: RetentionError,
}

/// Renamed datasets grouped by classification, each group in source order.
#[derive(Debug, Default)]
pub struct Buckets {
    buckets: BTreeMap<BucketKey, Vec<Dataset>>,
    pub skipped: Vec<SkippedSource>,
}

impl Buckets {
    pub fn get(&self, granularity: Granularity, variant: Variant) -> &[Dataset] {
        self.buckets
            .get(&BucketKey {
                granularity,
                variant,
            })
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Remove and return the datasets of one bucket.
    pub fn take(&mut self, granularity: Granularity, variant: Variant) -> Vec<Dataset> {
        self.buckets
            .remove(&BucketKey {
                granularity,
                variant,
            })
            .unwrap_or_default()
    }

    pub fn push(&mut self, key: BucketKey, dataset: Dataset) {
        self.buckets.entry(key).or_default().push(dataset);
    }

    pub fn dataset_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }
}

/// Rename every source with its derived suffix and sort it into a bucket.
///
/// Sources are processed in the given order, which becomes the fold order of
/// each bucket. A source failing to rename, or whose suffix an earlier source
/// of the same bucket already uses, is recorded in [`Buckets::skipped`] and
/// the rest continue.
pub fn classify(sources: Vec<Dataset>, config: &PipelineConfig) -> Buckets {
    let rules = config.rename_rules();
    let mut buckets = Buckets::default();
    let mut suffixes: BTreeMap<BucketKey, BTreeSet<String>> = BTreeMap::new();

    for source in sources {
        let identifier = derive_identifier(&source.source, config.identifier_skip);
        let key = classify_identifier(&identifier, config);
        log_debug!(
            "Classified {source} as {bucket} with suffix {identifier}",
            source: source.source.as_str(),
            bucket: key.to_string(),
            identifier: identifier.as_str()
        );

        // Renamed fields of two sources sharing a suffix would collide
        let used = suffixes.entry(key).or_default();
        let renamed = if used.contains(&identifier) {
            Err(RetentionError::DuplicateSuffix {
                file: source.source.clone(),
                suffix: identifier.clone(),
                bucket: key.to_string(),
            })
        } else {
            rename_dataset(&source, &identifier, key.variant, &rules)
        };

        match renamed {
            Ok(renamed) => {
                _ = used.insert(identifier);
                buckets.push(key, renamed);
            }
            Err(error) => {
                log_warn!(
                    "Skipping {source}: {error}",
                    source: source.source.as_str(),
                    error: error.to_string()
                );
                buckets.skipped.push(SkippedSource {
                    source: source.source,
                    error,
                });
            }
        }
    }

    buckets
}
