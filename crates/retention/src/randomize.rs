// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Randomized copies of reports, for publishing dashboards without real counts

use crate::record::Dataset;
use rand::Rng;
use serde_json::Value;
use std::ops::RangeInclusive;

pub const DEFAULT_PRESERVE: &str = "submission_date";

/// Fields containing this substring are totals and get the larger range.
pub const TOTAL_MARKER: &str = "_total";

pub const TOTAL_RANGE: RangeInclusive<u64> = 10_000..=20_000;
pub const VALUE_RANGE: RangeInclusive<u64> = 0..=10_000;

/// Replace every value except `preserve` with a random integer.
pub fn randomize<R: Rng>(dataset: &Dataset, preserve: &str, rng: &mut R) -> Dataset {
    let records = dataset
        .records
        .iter()
        .map(|record| {
            let mut out = record.clone();
            for (field, value) in out.iter_mut() {
                if field == preserve {
                    continue;
                }
                let range = if field.contains(TOTAL_MARKER) {
                    TOTAL_RANGE
                } else {
                    VALUE_RANGE
                };
                *value = Value::from(rng.gen_range(range));
            }
            out
        })
        .collect();

    Dataset::new(dataset.source.clone(), records)
}
