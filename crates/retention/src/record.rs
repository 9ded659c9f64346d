// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Records, datasets and join keys
//!
//! A record is a JSON object as produced by the upstream reporting jobs. Field
//! order is preserved (serde_json `preserve_order`) so rendered outputs keep
//! the column order of their sources.

use crate::error::{Result, RetentionError};
use serde_json::Value;
use std::fmt;

/// One point of a time series: field name to JSON value.
pub type Record = serde_json::Map<String, Value>;

/// Canonical form of a join-key value used for lookups.
///
/// Two values match when their JSON text is identical, so the string `"1"`
/// and the number `1` are distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JoinKey(String);

impl JoinKey {
    pub fn from_value(value: &Value) -> Self {
        Self(value.to_string())
    }

    /// Key of `record` under `field`, if the record carries one.
    pub fn of(record: &Record, field: &str) -> Option<Self> {
        record.get(field).map(Self::from_value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JoinKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One source file's contribution: an ordered list of records sharing a join key.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    /// Identifier used in diagnostics (usually the source filename)
    pub source: String,
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn new(source: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            source: source.into(),
            records,
        }
    }

    /// Build a dataset from parsed JSON, which must be an array of objects.
    pub fn from_json(source: impl Into<String>, value: Value) -> Result<Self> {
        let source = source.into();
        let Value::Array(items) = value else {
            return Err(RetentionError::InvalidRecord {
                file: source,
                reason: "top-level value is not an array".to_string(),
            });
        };

        let mut records = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            match item {
                Value::Object(record) => records.push(record),
                other => {
                    return Err(RetentionError::InvalidRecord {
                        file: source,
                        reason: format!("element {index} is not an object: {other}"),
                    });
                }
            }
        }

        Ok(Self { source, records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Join-key values in record order. Records without the key are skipped.
    pub fn keys(&self, join_key: &str) -> Vec<JoinKey> {
        self.records
            .iter()
            .filter_map(|record| JoinKey::of(record, join_key))
            .collect()
    }

    pub fn to_json(&self) -> Value {
        Value::Array(self.records.iter().cloned().map(Value::Object).collect())
    }
}
