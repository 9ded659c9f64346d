// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Cumulative field-name grammar
//!
//! Cumulative metrics encode several dimensions in the field name:
//!
//! ```text
//! name      := tag MARKER '-' value '-' group '-' type [ '-' expansion ]
//! ```
//!
//! With the default marker `_cumm`, `retained_cumm-7-all-users` parses to
//! tag `retained`, value `7`, group `all`, type `users`. Basic datasets carry
//! three dash-separated parts after the marker, expanded datasets four.

use crate::classify::Variant;

/// Separator between the marker and the first part, and between parts.
pub const PART_SEPARATOR: char = '-';

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldNameError {
    #[error("cumulative marker '{0}' not found")]
    MissingMarker(String),

    #[error("cumulative marker '{0}' appears more than once")]
    RepeatedMarker(String),

    #[error("expected '-' immediately after the cumulative marker")]
    MissingSeparator,

    #[error("expected {expected} '-'-separated parts for a {variant} field, found {found}")]
    Arity {
        variant: Variant,
        expected: usize,
        found: usize,
    },

    #[error("value part is empty")]
    EmptyValue,
}

/// A decomposed cumulative field name, borrowing from the source field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CumulativeField<'a> {
    pub tag: &'a str,
    pub value: &'a str,
    pub group: &'a str,
    pub kind: &'a str,
    /// Present only for expanded datasets
    pub expansion: Option<&'a str>,
}

impl<'a> CumulativeField<'a> {
    pub fn parse(name: &'a str, marker: &str, variant: Variant) -> Result<Self, FieldNameError> {
        let (tag, rest) = name
            .split_once(marker)
            .ok_or_else(|| FieldNameError::MissingMarker(marker.to_string()))?;
        if rest.contains(marker) {
            return Err(FieldNameError::RepeatedMarker(marker.to_string()));
        }
        let rest = rest
            .strip_prefix(PART_SEPARATOR)
            .ok_or(FieldNameError::MissingSeparator)?;

        let parts: Vec<&str> = rest.split(PART_SEPARATOR).collect();
        let expected = variant.cumulative_arity();
        if parts.len() != expected {
            return Err(FieldNameError::Arity {
                variant,
                expected,
                found: parts.len(),
            });
        }
        if parts[0].is_empty() {
            return Err(FieldNameError::EmptyValue);
        }

        Ok(Self {
            tag,
            value: parts[0],
            group: parts[1],
            kind: parts[2],
            expansion: parts.get(3).copied(),
        })
    }

    /// Output name: `value_tag` followed by the dataset suffix.
    pub fn renamed(&self, suffix: &str) -> String {
        format!("{}_{}{}", self.value, self.tag, suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let field = CumulativeField::parse("retained_cumm-7-all-users", "_cumm", Variant::Basic)
            .expect("basic parse");
        assert_eq!(field.tag, "retained");
        assert_eq!(field.value, "7");
        assert_eq!(field.group, "all");
        assert_eq!(field.kind, "users");
        assert_eq!(field.expansion, None);
        assert_eq!(field.renamed("-day"), "7_retained-day");
    }

    #[test]
    fn test_parse_expanded() {
        let field =
            CumulativeField::parse("tag_cumm-value-group-type-exp", "_cumm", Variant::Expanded)
                .expect("expanded parse");
        assert_eq!(field.expansion, Some("exp"));
        assert_eq!(field.renamed("-src"), "value_tag-src");
    }

    #[test]
    fn test_arity_mismatch_is_reported() {
        let err = CumulativeField::parse("tag_cumm-value-group-type-exp", "_cumm", Variant::Basic)
            .unwrap_err();
        assert_eq!(
            err,
            FieldNameError::Arity {
                variant: Variant::Basic,
                expected: 3,
                found: 4
            }
        );

        let err = CumulativeField::parse("tag_cumm-value-group", "_cumm", Variant::Expanded)
            .unwrap_err();
        assert!(matches!(err, FieldNameError::Arity { expected: 4, found: 2, .. }));
    }

    #[test]
    fn test_missing_separator() {
        let err = CumulativeField::parse("tag_cummvalue-group-type", "_cumm", Variant::Basic)
            .unwrap_err();
        assert_eq!(err, FieldNameError::MissingSeparator);
    }

    #[test]
    fn test_missing_and_repeated_marker() {
        assert!(matches!(
            CumulativeField::parse("plain", "_cumm", Variant::Basic),
            Err(FieldNameError::MissingMarker(_))
        ));
        assert!(matches!(
            CumulativeField::parse("a_cumm-b_cumm-c-d", "_cumm", Variant::Basic),
            Err(FieldNameError::RepeatedMarker(_))
        ));
    }

    #[test]
    fn test_empty_value() {
        assert_eq!(
            CumulativeField::parse("tag_cumm--group-type", "_cumm", Variant::Basic),
            Err(FieldNameError::EmptyValue)
        );
    }
}
