// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Key renamer
//!
//! Gives every metric field of a dataset a source-identifying suffix so that
//! datasets folded into the same output never collide. With suffix `-week`:
//!   - `n_day` / `week` → `date` (passthrough fields become the join key)
//!   - `retained` → `retained-week`
//!   - `retained_std` → dropped
//!   - `retained_cumm-7-all-users` → `7_retained-week`

use crate::classify::Variant;
use crate::error::{Result, RetentionError};
use crate::field_name::{CumulativeField, FieldNameError};
use crate::record::{Dataset, Record};
use diagnostics::*;
use std::collections::BTreeSet;

/// Field-name rules shared by every rename pass of a pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct RenameRules {
    pub join_key: String,
    pub passthrough: BTreeSet<String>,
    pub drop_marker: String,
    pub cumulative_marker: String,
}

impl Default for RenameRules {
    fn default() -> Self {
        crate::config::PipelineConfig::default().rename_rules()
    }
}

impl RenameRules {
    /// New name for `field`, or `None` when the field is dropped.
    pub fn rename_field(
        &self,
        field: &str,
        suffix: &str,
        variant: Variant,
    ) -> std::result::Result<Option<String>, FieldNameError> {
        if self.passthrough.contains(field) {
            return Ok(Some(self.join_key.clone()));
        }

        let suffixed = format!("{field}{suffix}");
        if suffixed.contains(&self.drop_marker) {
            return Ok(None);
        }
        // Only the source name is decomposed; the suffix is re-appended after
        if !field.contains(&self.cumulative_marker) {
            return Ok(Some(suffixed));
        }

        let parsed = CumulativeField::parse(field, &self.cumulative_marker, variant)?;
        Ok(Some(parsed.renamed(suffix)))
    }

    pub fn rename_record(
        &self,
        record: &Record,
        suffix: &str,
        variant: Variant,
        source: &str,
    ) -> Result<Record> {
        let mut renamed = Record::new();
        for (field, value) in record {
            let new_name = self
                .rename_field(field, suffix, variant)
                .map_err(|e| RetentionError::MalformedFieldName {
                    file: source.to_string(),
                    field: field.clone(),
                    reason: e.to_string(),
                })?;

            let Some(new_name) = new_name else {
                continue;
            };
            if renamed.insert(new_name.clone(), value.clone()).is_some() {
                log_warn!(
                    "Field {field} in {source} renamed to {new_name}, overwriting an earlier field",
                    field: field.as_str(),
                    source: source,
                    new_name: new_name.as_str()
                );
            }
        }
        Ok(renamed)
    }
}

/// Rename every record of `dataset`, producing a new dataset.
///
/// The record count is unchanged. Fails on the first cumulative field whose
/// name does not decompose for `variant`.
pub fn rename_dataset(
    dataset: &Dataset,
    suffix: &str,
    variant: Variant,
    rules: &RenameRules,
) -> Result<Dataset> {
    let records = dataset
        .records
        .iter()
        .map(|record| rules.rename_record(record, suffix, variant, &dataset.source))
        .collect::<Result<Vec<_>>>()?;

    log_debug!(
        "Renamed {count} records of {source} with suffix {suffix}",
        count: records.len(),
        source: dataset.source.as_str(),
        suffix: suffix
    );

    Ok(Dataset::new(dataset.source.clone(), records))
}
