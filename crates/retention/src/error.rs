// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

// Error types for the retention pipeline
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum RetentionError {
    #[error("Malformed field name '{field}' in {file}: {reason}")]
    MalformedFieldName {
        file: String,
        field: String,
        reason: String,
    },

    #[error("Join key {key} has no matching record in {dataset}")]
    UnmatchedJoinKey { dataset: String, key: String },

    #[error("Suffix {suffix} of {file} is already used in bucket {bucket}")]
    DuplicateSuffix {
        file: String,
        suffix: String,
        bucket: String,
    },

    #[error("Cannot merge an empty dataset list ({context})")]
    EmptyDatasetList { context: String },

    #[error("Invalid records in {file}: {reason}")]
    InvalidRecord { file: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl RetentionError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, RetentionError>;
