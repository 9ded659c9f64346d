// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Pipeline configuration
//!
//! Every field has a default matching the layout of the retention reports, so
//! an empty YAML document (or no file at all) is a valid configuration.

use crate::error::{Result, RetentionError};
use crate::rename::RenameRules;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// What the merger does when a seed key has no record in a folded dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnmatchedPolicy {
    /// Keep the record without the folded dataset's fields and report the gap
    #[default]
    Tolerate,
    /// Abort the merge with `RetentionError::UnmatchedJoinKey`
    Fail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PipelineConfig {
    /// Canonical join-key name written to every output record
    pub join_key: String,

    /// Source fields that carry the join key under another name
    pub passthrough: BTreeSet<String>,

    /// Renamed fields containing this substring are dropped
    pub drop_marker: String,

    /// Substring identifying cumulative fields
    pub cumulative_marker: String,

    /// Only filenames containing this substring are loaded
    pub include_marker: String,

    /// Identifier substring selecting week granularity
    pub week_marker: String,

    /// Identifier substring selecting the expanded variant
    pub expanded_marker: String,

    /// Number of leading '-'-separated filename segments dropped when deriving
    /// a dataset's suffix
    pub identifier_skip: usize,

    pub unmatched: UnmatchedPolicy,

    pub output_basic: String,
    pub output_expanded: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            join_key: "date".to_string(),
            passthrough: ["n_day", "week"].into_iter().map(String::from).collect(),
            drop_marker: "std".to_string(),
            cumulative_marker: "_cumm".to_string(),
            include_marker: "-5657-".to_string(),
            week_marker: "week".to_string(),
            expanded_marker: "expanded".to_string(),
            identifier_skip: 2,
            unmatched: UnmatchedPolicy::Tolerate,
            output_basic: "retention.json".to_string(),
            output_expanded: "retention-expanded.json".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Parse a YAML document and validate it.
    pub fn from_yaml(text: &str) -> Result<Self> {
        let config: Self = serde_yaml_ng::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let required = [
            ("join_key", &self.join_key),
            ("drop_marker", &self.drop_marker),
            ("cumulative_marker", &self.cumulative_marker),
            ("week_marker", &self.week_marker),
            ("expanded_marker", &self.expanded_marker),
            ("output_basic", &self.output_basic),
            ("output_expanded", &self.output_expanded),
        ];
        for (name, value) in required {
            if value.is_empty() {
                return Err(RetentionError::Config(format!("{name} cannot be empty")));
            }
        }

        if self.join_key.contains(&self.drop_marker) {
            return Err(RetentionError::Config(format!(
                "join_key '{}' contains drop_marker '{}' and would be dropped",
                self.join_key, self.drop_marker
            )));
        }

        if self.output_basic == self.output_expanded {
            return Err(RetentionError::Config(
                "output_basic and output_expanded must differ".to_string(),
            ));
        }

        Ok(())
    }

    pub fn rename_rules(&self) -> RenameRules {
        RenameRules {
            join_key: self.join_key.clone(),
            passthrough: self.passthrough.clone(),
            drop_marker: self.drop_marker.clone(),
            cumulative_marker: self.cumulative_marker.clone(),
        }
    }
}

/// Load configuration from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PipelineConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| RetentionError::io(path, e))?;
    PipelineConfig::from_yaml(&content)
}
