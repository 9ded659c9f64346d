// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Combining add-on count reports
//!
//! The release report is keyed by `submission_date`, the nightly report by
//! `build_id`. Records line up when the two values are equal; the nightly
//! fields are copied onto the release record.

use crate::record::{Dataset, JoinKey, Record};
use diagnostics::*;
use std::collections::HashMap;

pub const DEFAULT_PRIMARY_KEY: &str = "submission_date";
pub const DEFAULT_SECONDARY_KEY: &str = "build_id";

/// Copy fields from `secondary` onto matching `primary` records.
///
/// A primary record matches every secondary record whose `secondary_key`
/// value equals its `primary_key` value; matches are applied in secondary
/// order, so later ones overwrite earlier ones. The secondary key itself is
/// not copied. Unmatched primary records are returned unchanged.
pub fn combine_counts(
    primary: &Dataset,
    secondary: &Dataset,
    primary_key: &str,
    secondary_key: &str,
) -> Dataset {
    let mut by_key: HashMap<JoinKey, Vec<&Record>> = HashMap::new();
    for record in &secondary.records {
        if let Some(key) = JoinKey::of(record, secondary_key) {
            by_key.entry(key).or_default().push(record);
        }
    }

    let mut matched = 0usize;
    let records = primary
        .records
        .iter()
        .map(|record| {
            let mut combined = record.clone();
            let matches = JoinKey::of(record, primary_key)
                .and_then(|key| by_key.get(&key))
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            if !matches.is_empty() {
                matched += 1;
            }
            for other in matches {
                for (field, value) in other.iter() {
                    if field != secondary_key {
                        _ = combined.insert(field.clone(), value.clone());
                    }
                }
            }
            combined
        })
        .collect::<Vec<_>>();

    log_info!(
        "Combined {primary} with {secondary}: {matched} of {total} records matched",
        primary: primary.source.as_str(),
        secondary: secondary.source.as_str(),
        matched: matched,
        total: records.len()
    );

    Dataset::new(primary.source.clone(), records)
}
