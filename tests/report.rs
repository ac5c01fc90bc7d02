use anyhow::Result;
use chrono::NaiveDate;
use xg_rolling::config::Config;
use xg_rolling::fbref::MatchSource;
use xg_rolling::pipeline::run;
use xg_rolling::record::MatchRecord;
use xg_rolling::report::{report_rows, write_csv, write_json, write_table};
use xg_rolling::teams::TeamInfo;

/// A season that has not kicked off: the first row is already a fixture.
struct PreseasonSource;

impl MatchSource for PreseasonSource {
    fn fetch_season(&self, _team: &TeamInfo, _season: &str) -> Result<Vec<MatchRecord>> {
        Ok(vec![
            MatchRecord::scheduled("18.08.2023"),
            MatchRecord::played("26.08.2023", "S", 1.2, 0.9),
        ])
    }
}

fn preseason_config(dir: &tempfile::TempDir) -> Config {
    Config {
        data_dir: dir.path().to_path_buf(),
        seasons: vec!["2023-2024".to_string()],
        ..Config::default()
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 8, 10).expect("valid date")
}

#[test]
fn unplayed_first_row_gives_empty_report() {
    let dir = tempfile::tempdir().expect("temp dir");
    let report = run(&preseason_config(&dir), &PreseasonSource, today()).expect("not an error");
    assert_eq!(report.raw_rows, 2);
    assert!(report.series.is_empty());
    assert!(report.chart.is_empty());
    assert!(report_rows(&report.series).is_empty());
}

#[test]
fn empty_series_prints_headers_only() {
    let dir = tempfile::tempdir().expect("temp dir");
    let report = run(&preseason_config(&dir), &PreseasonSource, today()).expect("not an error");
    let rows = report_rows(&report.series);

    let mut json = Vec::new();
    write_json(&mut json, &rows).expect("json");
    assert_eq!(String::from_utf8(json).expect("utf8").trim(), "[]");

    let mut csv = Vec::new();
    write_csv(&mut csv, &rows).expect("csv");
    assert_eq!(
        String::from_utf8(csv).expect("utf8"),
        "position,date,xg_for,xg_against\n"
    );

    let mut table = Vec::new();
    write_table(&mut table, &report.chart, &rows).expect("table");
    let table = String::from_utf8(table).expect("utf8");
    assert!(table.starts_with("Union Berlin\n"));
    let last = table.lines().last().expect("header line");
    assert!(last.contains("Datum") && last.contains("xGA"));
}

#[test]
fn table_marks_season_change() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut cfg = preseason_config(&dir);
    cfg.season_boundary = 1;
    let records = vec![
        MatchRecord::played("01.08.2023", "1:0", 1.5, 0.8),
        MatchRecord::played("08.08.2023", "2:1", 2.0, 1.2),
    ];
    let team = cfg.team_info().expect("registered");
    let series = xg_rolling::transform::process(&records, cfg.window).expect("valid");
    let chart = xg_rolling::chart::build_chart_model(team, &cfg, &series);

    let mut out = Vec::new();
    write_table(&mut out, &chart, &report_rows(&series)).expect("table");
    let text = String::from_utf8(out).expect("utf8");
    let first_row = text
        .lines()
        .find(|line| line.contains("01.08.2023"))
        .expect("row printed");
    assert!(first_row.ends_with("<- Bundesliga Season Change"));
}
