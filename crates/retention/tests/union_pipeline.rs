// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use retention::{
    Dataset, JoinKey, PipelineConfig, RetentionError, UnmatchedPolicy, run, run_directory,
    source::read_dataset,
};
use serde_json::{Value, json};
use std::collections::BTreeSet;
use std::path::Path;
use tempfile::tempdir;

const DAY_DATES: [&str; 3] = ["2020-01-01", "2020-01-02", "2020-01-03"];
const WEEK_DATES: [&str; 2] = ["2020-W01", "2020-W02"];

fn day_report(scale: i64) -> Value {
    Value::Array(
        DAY_DATES
            .iter()
            .enumerate()
            .map(|(i, date)| {
                let i = i as i64;
                json!({
                    "n_day": date,
                    "active": scale * 10 + i,
                    "active_std": 0.5,
                    "retained_cumm-1-all-users": scale * 100 + i,
                })
            })
            .collect(),
    )
}

fn week_report(scale: i64) -> Value {
    Value::Array(
        WEEK_DATES
            .iter()
            .enumerate()
            .map(|(i, week)| {
                let i = i as i64;
                json!({
                    "week": week,
                    "active": scale * 10 + i,
                    "retained_cumm-4-all-users": scale * 100 + i,
                })
            })
            .collect(),
    )
}

fn expanded_report(key: &str, dates: &[&str]) -> Value {
    Value::Array(
        dates
            .iter()
            .map(|date| json!({ key: date, "retained_cumm-2-all-users-os": 1 }))
            .collect(),
    )
}

fn write(dir: &Path, name: &str, value: &Value) -> Result<()> {
    std::fs::write(dir.join(name), serde_json::to_vec(value)?)?;
    Ok(())
}

fn populate(dir: &Path) -> Result<()> {
    write(dir, "retention-5657-day-release.json", &day_report(1))?;
    write(dir, "retention-5657-day-beta.json", &day_report(2))?;
    write(dir, "retention-5657-week-release.json", &week_report(3))?;
    write(dir, "retention-5657-week-beta.json", &week_report(4))?;
    write(
        dir,
        "retention-5657-day-release-expanded.json",
        &expanded_report("n_day", &DAY_DATES),
    )?;
    write(
        dir,
        "retention-5657-week-release-expanded.json",
        &expanded_report("week", &WEEK_DATES),
    )?;
    Ok(())
}

fn dates(dataset: &Dataset) -> Vec<String> {
    dataset
        .records
        .iter()
        .map(|r| r["date"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[test]
fn test_end_to_end_union_of_day_and_week() -> Result<()> {
    let dir = tempdir()?;
    populate(dir.path())?;

    let output = run_directory(dir.path(), dir.path(), &PipelineConfig::default())?;
    assert!(output.report.skipped.is_empty());
    assert!(output.report.merge.is_clean());

    let basic = read_dataset(&dir.path().join("retention.json"))?;
    assert_eq!(basic, Dataset::new("retention.json", output.basic.records.clone()));

    // Five distinct dates, none duplicated or dropped
    let all: Vec<String> = dates(&basic);
    let unique: BTreeSet<&String> = all.iter().collect();
    assert_eq!(all.len(), 5);
    assert_eq!(unique.len(), 5);

    for record in &basic.records {
        assert_eq!(record.keys().filter(|k| *k == "date").count(), 1);
        assert!(!record.keys().any(|k| k.contains("std")));
        assert!(!record.contains_key("n_day") && !record.contains_key("week"));
    }

    let day = basic
        .records
        .iter()
        .find(|r| r["date"] == json!("2020-01-02"))
        .expect("day record");
    assert_eq!(day["active-day-release"], json!(11));
    assert_eq!(day["active-day-beta"], json!(21));
    assert_eq!(day["1_retained-day-release"], json!(101));
    assert_eq!(day["1_retained-day-beta"], json!(201));
    assert_eq!(day.len(), 5);

    let week = basic
        .records
        .iter()
        .find(|r| r["date"] == json!("2020-W02"))
        .expect("week record");
    assert_eq!(week["active-week-release"], json!(31));
    assert_eq!(week["4_retained-week-beta"], json!(401));
    assert_eq!(week.len(), 5);

    let expanded = read_dataset(&dir.path().join("retention-expanded.json"))?;
    assert_eq!(expanded.len(), 5);
    assert!(
        expanded
            .records
            .iter()
            .any(|r| r.get("2_retained-day-release-expanded") == Some(&json!(1)))
    );
    assert!(
        expanded
            .records
            .iter()
            .any(|r| r.get("2_retained-week-release-expanded") == Some(&json!(1)))
    );
    Ok(())
}

#[test]
fn test_week_records_lead_the_output() -> Result<()> {
    let dir = tempdir()?;
    populate(dir.path())?;

    let output = run_directory(dir.path(), dir.path(), &PipelineConfig::default())?;
    let mut expected: Vec<String> = WEEK_DATES.iter().map(|d| d.to_string()).collect();
    expected.extend(DAY_DATES.iter().map(|d| d.to_string()));
    assert_eq!(dates(&output.basic), expected);
    Ok(())
}

#[test]
fn test_bad_files_are_skipped_and_unrelated_files_ignored() -> Result<()> {
    let dir = tempdir()?;
    populate(dir.path())?;
    std::fs::write(dir.path().join("retention-5657-day-broken.json"), "{not json")?;
    write(
        dir.path(),
        "retention-5657-day-malformed.json",
        &json!([{"n_day": "2020-01-01", "x_cumm-1-2": 1}]),
    )?;
    write(dir.path(), "addon-counts.json", &json!([{"n_day": "2020-01-01"}]))?;

    let output = run_directory(dir.path(), dir.path(), &PipelineConfig::default())?;
    let skipped: Vec<&str> = output
        .report
        .skipped
        .iter()
        .map(|s| s.source.as_str())
        .collect();
    assert_eq!(skipped.len(), 2);
    assert!(skipped.iter().any(|s| s.ends_with("retention-5657-day-broken.json")));
    assert!(skipped.contains(&"retention-5657-day-malformed.json"));
    assert!(matches!(
        output
            .report
            .skipped
            .iter()
            .find(|s| s.source == "retention-5657-day-malformed.json")
            .map(|s| &s.error),
        Some(RetentionError::MalformedFieldName { .. })
    ));
    assert_eq!(output.basic.len(), 5);
    Ok(())
}

#[test]
fn test_unmatched_policy() -> Result<()> {
    let sources = || {
        vec![
            Dataset::from_json(
                "retention-5657-day-a.json",
                json!([{"n_day": "d1", "x": 1}]),
            )
            .expect("dataset"),
            Dataset::from_json(
                "retention-5657-day-b.json",
                json!([{"n_day": "d1", "y": 1}, {"n_day": "d2", "y": 2}]),
            )
            .expect("dataset"),
            Dataset::from_json("retention-5657-week.json", json!([{"week": "w1"}]))
                .expect("dataset"),
            Dataset::from_json("retention-5657-day-expanded.json", json!([{"n_day": "d1"}]))
                .expect("dataset"),
            Dataset::from_json("retention-5657-week-expanded.json", json!([{"week": "w1"}]))
                .expect("dataset"),
        ]
    };

    let tolerant = run(sources(), &PipelineConfig::default())?;
    assert_eq!(tolerant.report.merge.unmatched_count(), 1);
    let d2 = tolerant
        .basic
        .records
        .iter()
        .find(|r| r["date"] == json!("d2"))
        .expect("d2 kept");
    assert_eq!(d2.get("y-day-b"), Some(&json!(2)));
    assert!(!d2.contains_key("x-day-a"));
    assert_eq!(
        JoinKey::of(d2, "date").map(|k| k.to_string()),
        Some("\"d2\"".to_string())
    );

    let strict = PipelineConfig {
        unmatched: UnmatchedPolicy::Fail,
        ..PipelineConfig::default()
    };
    let err = run(sources(), &strict).unwrap_err();
    assert!(matches!(
        err,
        RetentionError::UnmatchedJoinKey { ref dataset, ref key }
            if dataset == "retention-5657-day-a.json" && key == "\"d2\""
    ));
    Ok(())
}

#[test]
fn test_sources_sharing_a_suffix_keep_the_first() -> Result<()> {
    let dir = tempdir()?;
    populate(dir.path())?;
    // Sorts before retention-5657-day-release.json and derives the same suffix
    write(dir.path(), "other-5657-day-release.json", &day_report(9))?;

    let output = run_directory(dir.path(), dir.path(), &PipelineConfig::default())?;
    assert_eq!(output.report.skipped.len(), 1);
    let skipped = &output.report.skipped[0];
    assert_eq!(skipped.source, "retention-5657-day-release.json");
    assert!(matches!(
        skipped.error,
        RetentionError::DuplicateSuffix { ref suffix, .. } if suffix == "-day-release"
    ));

    let day = output
        .basic
        .records
        .iter()
        .find(|r| r["date"] == json!("2020-01-02"))
        .expect("day record");
    assert_eq!(day["active-day-release"], json!(91));
    assert_eq!(day["active-day-beta"], json!(21));
    assert_eq!(output.basic.len(), 5);
    Ok(())
}
