// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Retention report merging
//!
//! Upstream jobs publish one JSON report per metric source, per day or week,
//! in a basic and an expanded variant. This crate renames each report's fields
//! with a source suffix and joins the reports by date into one basic and one
//! expanded retention table.

pub mod classify;
pub mod config;
pub mod counts;
pub mod error;
pub mod field_name;
pub mod merge;
pub mod pipeline;
pub mod randomize;
pub mod record;
pub mod rename;
pub mod render;
pub mod source;

pub use classify::{BucketKey, Buckets, Granularity, SkippedSource, Variant, classify};
pub use config::{PipelineConfig, UnmatchedPolicy, load_config};
pub use error::{Result, RetentionError};
pub use merge::{JoinMode, MergeIssue, MergeOptions, MergeReport, Merged, merge, merge_on};
pub use pipeline::{PipelineOutput, PipelineReport, run, run_directory};
pub use record::{Dataset, JoinKey, Record};
pub use rename::{RenameRules, rename_dataset};
