use std::fs;

use chrono::NaiveDate;
use serde_json::json;
use xg_rolling::record::MatchRecord;
use xg_rolling::snapshot::{latest_snapshot, load_snapshot, save_snapshot, snapshot_path};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

#[test]
fn saved_snapshot_keeps_nulls_and_extra_columns() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut played = MatchRecord::played("20.08.2023", "S", 1.9, 0.8);
    played.extra.insert("Gegner".to_string(), json!("Mainz 05"));
    let records = vec![played, MatchRecord::scheduled("16.09.2023")];

    let path = snapshot_path(&dir.path().join("data"), "Union-Berlin", date(2024, 1, 7));
    save_snapshot(&path, &records).expect("snapshot written");
    assert!(path.ends_with("data/Union-Berlin_20240107.json"));
    assert!(!path.with_extension("json.tmp").exists());

    let raw = fs::read_to_string(&path).expect("snapshot readable");
    let values: Vec<serde_json::Value> = serde_json::from_str(&raw).expect("json array");
    assert_eq!(values[1]["Ergebnis"], serde_json::Value::Null);
    assert!(values[1].as_object().is_some_and(|o| o.contains_key("xGA")));

    let loaded = load_snapshot(&path).expect("snapshot loads");
    assert_eq!(loaded, records);
}

#[test]
fn latest_snapshot_prefers_newest_dated_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    for name in [
        "Bochum_20231101.json",
        "Bochum_20240215.json",
        "Bochum.json",
        "Bochum_notes.json",
        "Dortmund_20250101.json",
    ] {
        fs::write(dir.path().join(name), "[]").expect("write");
    }

    let found = latest_snapshot(dir.path(), "Bochum").expect("dir readable");
    assert_eq!(found, Some(dir.path().join("Bochum_20240215.json")));
}

#[test]
fn latest_snapshot_falls_back_to_undated_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    fs::write(dir.path().join("Stuttgart.json"), "[]").expect("write");
    let found = latest_snapshot(dir.path(), "Stuttgart").expect("dir readable");
    assert_eq!(found, Some(dir.path().join("Stuttgart.json")));
    assert_eq!(latest_snapshot(dir.path(), "Bochum").expect("dir readable"), None);
}

#[test]
fn missing_directory_has_no_snapshot() {
    let dir = tempfile::tempdir().expect("temp dir");
    let found = latest_snapshot(&dir.path().join("nope"), "Bochum").expect("no error");
    assert!(found.is_none());
}
