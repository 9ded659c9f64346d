// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Dataset merger
//!
//! Folds an ordered list of datasets into one by joining on a shared key.
//! The *last* dataset is the seed: its records, in its order, form the
//! initial accumulator. The remaining datasets are folded in from last to
//! first, each contributing its non-key fields to the accumulator record
//! with the same key value (later folds overwrite on name collision).
//!
//! Two join modes are supported:
//! - [`JoinMode::Seed`]: the output key set is the seed's key set. A seed key
//!   missing from a folded dataset is an unmatched key, handled according to
//!   the [`UnmatchedPolicy`].
//! - [`JoinMode::Union`]: records of a folded dataset whose key is not yet in
//!   the accumulator are appended, so the output key set is the union.

use crate::config::UnmatchedPolicy;
use crate::error::{Result, RetentionError};
use crate::record::{Dataset, JoinKey, Record};
use diagnostics::*;
use std::collections::{HashMap, HashSet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinMode {
    #[default]
    Seed,
    Union,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergeOptions {
    pub join_key: String,
    pub mode: JoinMode,
    pub unmatched: UnmatchedPolicy,
}

impl MergeOptions {
    pub fn new(join_key: impl Into<String>) -> Self {
        Self {
            join_key: join_key.into(),
            mode: JoinMode::Seed,
            unmatched: UnmatchedPolicy::Tolerate,
        }
    }

    pub fn with_mode(mut self, mode: JoinMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_unmatched(mut self, unmatched: UnmatchedPolicy) -> Self {
        self.unmatched = unmatched;
        self
    }
}

/// A data-quality finding that did not stop the merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeIssue {
    /// The accumulator has a key with no record in `dataset`
    UnmatchedJoinKey { dataset: String, key: JoinKey },
    /// `dataset` has more than one record for `key`; the first one was used
    DuplicateJoinKey { dataset: String, key: JoinKey },
    /// Record `index` of `dataset` has no join-key field and cannot be matched
    MissingJoinKey { dataset: String, index: usize },
}

impl fmt::Display for MergeIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeIssue::UnmatchedJoinKey { dataset, key } => {
                write!(f, "no record for key {key} in {dataset}")
            }
            MergeIssue::DuplicateJoinKey { dataset, key } => {
                write!(f, "duplicate key {key} in {dataset}, first record used")
            }
            MergeIssue::MissingJoinKey { dataset, index } => {
                write!(f, "record {index} of {dataset} has no join key")
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeReport {
    pub issues: Vec<MergeIssue>,
}

impl MergeReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn unmatched_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|issue| matches!(issue, MergeIssue::UnmatchedJoinKey { .. }))
            .count()
    }

    pub fn extend(&mut self, other: MergeReport) {
        self.issues.extend(other.issues);
    }

    fn push(&mut self, issue: MergeIssue) {
        log_warn!("Merge: {issue}", issue: issue.to_string());
        self.issues.push(issue);
    }
}

/// Result of a merge: the folded dataset plus the issues found on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Merged {
    pub dataset: Dataset,
    pub report: MergeReport,
}

/// First-occurrence index of a dataset's join-key values.
struct KeyIndex {
    positions: HashMap<JoinKey, usize>,
}

impl KeyIndex {
    fn build(dataset: &Dataset, join_key: &str, report: &mut MergeReport) -> Self {
        let mut positions = HashMap::with_capacity(dataset.len());
        for (index, record) in dataset.records.iter().enumerate() {
            let Some(key) = JoinKey::of(record, join_key) else {
                report.push(MergeIssue::MissingJoinKey {
                    dataset: dataset.source.clone(),
                    index,
                });
                continue;
            };
            if positions.contains_key(&key) {
                report.push(MergeIssue::DuplicateJoinKey {
                    dataset: dataset.source.clone(),
                    key,
                });
            } else {
                _ = positions.insert(key, index);
            }
        }
        Self { positions }
    }

    fn get(&self, key: &JoinKey) -> Option<usize> {
        self.positions.get(key).copied()
    }
}

/// Copy every non-key field of `from` into `into`.
fn absorb(into: &mut Record, from: &Record, join_key: &str) {
    for (field, value) in from {
        if field != join_key {
            _ = into.insert(field.clone(), value.clone());
        }
    }
}

/// Fold `next` into the accumulator, producing the next accumulator.
fn fold_step(
    acc: Vec<Record>,
    next: &Dataset,
    options: &MergeOptions,
    report: &mut MergeReport,
) -> Result<Vec<Record>> {
    let join_key = options.join_key.as_str();
    let index = KeyIndex::build(next, join_key, report);
    let mut used = HashSet::new();
    let mut folded = Vec::with_capacity(acc.len());

    for mut record in acc {
        // Keyless accumulator records were reported when seeded
        if let Some(key) = JoinKey::of(&record, join_key) {
            match index.get(&key) {
                Some(position) => {
                    absorb(&mut record, &next.records[position], join_key);
                    _ = used.insert(position);
                }
                None if options.mode == JoinMode::Union => {}
                None => match options.unmatched {
                    UnmatchedPolicy::Fail => {
                        return Err(RetentionError::UnmatchedJoinKey {
                            dataset: next.source.clone(),
                            key: key.to_string(),
                        });
                    }
                    UnmatchedPolicy::Tolerate => report.push(MergeIssue::UnmatchedJoinKey {
                        dataset: next.source.clone(),
                        key,
                    }),
                },
            }
        }
        folded.push(record);
    }

    if options.mode == JoinMode::Union {
        let mut appended = 0usize;
        for (position, record) in next.records.iter().enumerate() {
            let first_occurrence = JoinKey::of(record, join_key)
                .and_then(|key| index.get(&key))
                .is_some_and(|first| first == position);
            if first_occurrence && !used.contains(&position) {
                folded.push(record.clone());
                appended += 1;
            }
        }
        log_debug!(
            "Union fold of {source} appended {appended} records",
            source: next.source.as_str(),
            appended: appended
        );
    }

    Ok(folded)
}

/// Merge `datasets` on `options.join_key`.
///
/// The output dataset is named `label` and keeps the record order of the
/// last dataset in the list, followed (in union mode) by keys first seen in
/// folded datasets. Duplicate seed keys keep their first record. An empty
/// list is an error; a single dataset is otherwise returned unchanged.
pub fn merge(label: &str, datasets: Vec<Dataset>, options: &MergeOptions) -> Result<Merged> {
    let mut report = MergeReport::default();
    let mut remaining = datasets.into_iter().rev();
    let seed = remaining
        .next()
        .ok_or_else(|| RetentionError::EmptyDatasetList {
            context: label.to_string(),
        })?;

    // One record per key: later seed duplicates are dropped, keyless records kept
    let seed_index = KeyIndex::build(&seed, &options.join_key, &mut report);
    let seed_records: Vec<Record> = seed
        .records
        .into_iter()
        .enumerate()
        .filter(|(position, record)| {
            JoinKey::of(record, &options.join_key)
                .and_then(|key| seed_index.get(&key))
                .is_none_or(|first| first == *position)
        })
        .map(|(_, record)| record)
        .collect();
    log_debug!(
        "Merging {label} seeded from {seed} ({count} records)",
        label: label,
        seed: seed.source.as_str(),
        count: seed_records.len()
    );

    let records = remaining.try_fold(seed_records, |acc, next| {
        fold_step(acc, &next, options, &mut report)
    })?;

    Ok(Merged {
        dataset: Dataset::new(label, records),
        report,
    })
}

/// Seed-mode merge on `join_key`, tolerating unmatched keys.
pub fn merge_on(datasets: Vec<Dataset>, join_key: &str) -> Result<Dataset> {
    let label = datasets
        .last()
        .map(|seed| seed.source.clone())
        .unwrap_or_default();
    merge(&label, datasets, &MergeOptions::new(join_key)).map(|merged| merged.dataset)
}
