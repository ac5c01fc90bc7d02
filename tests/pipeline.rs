use std::cell::RefCell;

use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use xg_rolling::config::Config;
use xg_rolling::fbref::{MatchSource, fetch_team_dataset};
use xg_rolling::pipeline::{DataOrigin, load_dataset, run};
use xg_rolling::record::MatchRecord;
use xg_rolling::teams::{TeamInfo, team_info};

/// Serves canned season tables and records which seasons were asked for.
struct FakeSource {
    calls: RefCell<Vec<String>>,
}

impl FakeSource {
    fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl MatchSource for FakeSource {
    fn fetch_season(&self, _team: &TeamInfo, season: &str) -> Result<Vec<MatchRecord>> {
        self.calls.borrow_mut().push(season.to_string());
        match season {
            "2022-2023" => Ok(vec![
                MatchRecord::played("06.08.2022", "U", 1.4, 0.5),
                MatchRecord::played("14.08.2022", "U", 0.9, 1.1),
            ]),
            "2023-2024" => Ok(vec![
                MatchRecord::played("20.08.2023", "S", 1.9, 0.8),
                MatchRecord::scheduled("26.08.2023"),
            ]),
            other => Err(anyhow!("no table for {other}")),
        }
    }
}

struct OfflineSource;

impl MatchSource for OfflineSource {
    fn fetch_season(&self, _team: &TeamInfo, _season: &str) -> Result<Vec<MatchRecord>> {
        Err(anyhow!("network disabled"))
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 2, 1).expect("valid date")
}

#[test]
fn seasons_are_fetched_in_order_and_concatenated() {
    let source = FakeSource::new();
    let team = team_info("Union-Berlin").expect("registered");
    let seasons = vec!["2022-2023".to_string(), "2023-2024".to_string()];
    let records = fetch_team_dataset(&source, team, &seasons).expect("fetch ok");
    assert_eq!(records.len(), 4);
    assert_eq!(records[2].date, "20.08.2023");
    assert_eq!(*source.calls.borrow(), seasons);
}

#[test]
fn failed_season_aborts_with_context() {
    let source = FakeSource::new();
    let team = team_info("Union-Berlin").expect("registered");
    let seasons = vec!["2021-2022".to_string()];
    let err = fetch_team_dataset(&source, team, &seasons).unwrap_err();
    assert!(format!("{err:#}").contains("season 2021-2022"));
}

#[test]
fn live_run_saves_snapshot_and_builds_report() {
    let dir = tempfile::tempdir().expect("temp dir");
    let cfg = Config {
        data_dir: dir.path().to_path_buf(),
        save_snapshot: true,
        ..Config::default()
    };

    let report = run(&cfg, &FakeSource::new(), today()).expect("pipeline ok");
    let expected = dir.path().join("Union-Berlin_20240201.json");
    assert_eq!(
        report.origin,
        DataOrigin::Live {
            saved_to: Some(expected.clone())
        }
    );
    assert!(expected.exists());
    assert_eq!(report.raw_rows, 4);
    assert_eq!(report.series.len(), 3);
    assert!((report.series.xg_for[2] - (1.4 + 0.9 + 1.9) / 3.0).abs() < 1e-9);
    assert_eq!(report.chart.positions, vec![1, 2, 3]);
}

#[test]
fn snapshot_run_reads_latest_snapshot_without_network() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut cfg = Config {
        data_dir: dir.path().to_path_buf(),
        save_snapshot: true,
        ..Config::default()
    };
    run(&cfg, &FakeSource::new(), today()).expect("seed snapshot");

    cfg.use_snapshot = true;
    cfg.save_snapshot = false;
    let loaded = load_dataset(&cfg, &OfflineSource, today()).expect("snapshot load");
    assert!(matches!(loaded.origin, DataOrigin::Snapshot(_)));
    assert_eq!(loaded.records.len(), 4);

    let report = run(&cfg, &OfflineSource, today()).expect("pipeline ok");
    assert_eq!(report.series.len(), 3);
}

#[test]
fn preferred_snapshot_missing_falls_back_to_fetch() {
    let dir = tempfile::tempdir().expect("temp dir");
    let cfg = Config {
        data_dir: dir.path().to_path_buf(),
        use_snapshot: true,
        ..Config::default()
    };
    let loaded = load_dataset(&cfg, &FakeSource::new(), today()).expect("live fallback");
    assert_eq!(loaded.origin, DataOrigin::Live { saved_to: None });
    assert!(run(&cfg, &OfflineSource, today()).is_err());
}
