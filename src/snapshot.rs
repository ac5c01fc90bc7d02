use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde_json::Value;

use crate::record::{MatchRecord, decode_records};

const SNAPSHOT_EXT: &str = "json";

pub fn snapshot_file_name(team: &str, date: NaiveDate) -> String {
    format!("{team}_{}.{SNAPSHOT_EXT}", date.format("%Y%m%d"))
}

pub fn snapshot_path(dir: &Path, team: &str, date: NaiveDate) -> PathBuf {
    dir.join(snapshot_file_name(team, date))
}

pub fn save_snapshot(path: &Path, records: &[MatchRecord]) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string(records).context("serialize snapshot")?;
    fs::write(&tmp, json).context("write snapshot")?;
    fs::rename(&tmp, path).context("swap snapshot")?;
    log::debug!("snapshot written: {}", path.display());
    Ok(())
}

pub fn load_snapshot(path: &Path) -> Result<Vec<MatchRecord>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read snapshot {}", path.display()))?;
    parse_snapshot_json(&raw).with_context(|| format!("decode snapshot {}", path.display()))
}

/// An empty body or `null` is an empty dataset.
pub fn parse_snapshot_json(raw: &str) -> Result<Vec<MatchRecord>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let values: Vec<Value> = serde_json::from_str(trimmed).context("invalid snapshot json")?;
    Ok(decode_records(&values)?)
}

/// Newest `<team>_<YYYYMMDD>.json` in `dir`. An undated `<team>.json` is
/// used only when no dated file exists.
pub fn latest_snapshot(dir: &Path, team: &str) -> Result<Option<PathBuf>> {
    if !dir.is_dir() {
        return Ok(None);
    }

    let prefix = format!("{team}_");
    let undated = format!("{team}.{SNAPSHOT_EXT}");
    let mut best: Option<(NaiveDate, PathBuf)> = None;
    let mut fallback = None;

    for entry in fs::read_dir(dir).with_context(|| format!("list {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name == undated {
            fallback = Some(path.clone());
            continue;
        }
        let Some(stamp) = name
            .strip_prefix(&prefix)
            .and_then(|rest| rest.strip_suffix(".json"))
        else {
            continue;
        };
        let Ok(date) = NaiveDate::parse_from_str(stamp, "%Y%m%d") else {
            continue;
        };
        if best.as_ref().is_none_or(|(d, _)| date > *d) {
            best = Some((date, path));
        }
    }

    Ok(best.map(|(_, path)| path).or(fallback))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_carries_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).expect("valid date");
        assert_eq!(snapshot_file_name("Bochum", date), "Bochum_20240309.json");
    }

    #[test]
    fn null_snapshot_is_empty() {
        assert!(parse_snapshot_json("null").expect("null parses").is_empty());
        assert!(parse_snapshot_json("  ").expect("blank parses").is_empty());
    }
}
