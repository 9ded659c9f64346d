// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! CSV rendering of merged tables

use crate::error::{Result, RetentionError};
use crate::record::Dataset;
use serde_json::Value;
use std::io::Write;
use std::path::Path;

/// Column names in order of first appearance across all records.
pub fn columns(dataset: &Dataset) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for record in &dataset.records {
        for field in record.keys() {
            if !columns.contains(field) {
                columns.push(field.clone());
            }
        }
    }
    columns
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Render `dataset` as CSV with a header row. Missing fields are empty cells.
pub fn render_csv<W: Write>(dataset: &Dataset, out: W) -> Result<()> {
    let columns = columns(dataset);
    if columns.is_empty() {
        return Ok(());
    }
    let mut writer = csv::Writer::from_writer(out);

    writer.write_record(&columns)?;
    for record in &dataset.records {
        writer.write_record(columns.iter().map(|c| cell(record.get(c))))?;
    }
    writer.flush().map_err(|e| RetentionError::Csv(e.into()))?;
    Ok(())
}

pub fn write_csv(path: &Path, dataset: &Dataset) -> Result<()> {
    let file = std::fs::File::create(path).map_err(|e| RetentionError::io(path, e))?;
    render_csv(dataset, file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_header_union_and_empty_cells() {
        let ds = Dataset::from_json(
            "t",
            json!([
                {"date": "w1", "a": 1.5},
                {"date": "w2", "b": "x,y", "c": null, "d": true}
            ]),
        )
        .expect("dataset");

        let mut out = Vec::new();
        render_csv(&ds, &mut out).expect("render");
        let text = String::from_utf8(out).expect("utf8");
        assert_eq!(
            text,
            "date,a,b,c,d\nw1,1.5,,,\nw2,,\"x,y\",,true\n"
        );
    }

    #[test]
    fn test_nested_values_render_as_json() {
        let ds = Dataset::from_json("t", json!([{"k": [1, 2]}])).expect("dataset");
        let mut out = Vec::new();
        render_csv(&ds, &mut out).expect("render");
        assert_eq!(String::from_utf8(out).expect("utf8"), "k\n\"[1,2]\"\n");
    }
}
