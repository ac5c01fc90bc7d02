use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::chart::{ChartModel, build_chart_model};
use crate::config::Config;
use crate::fbref::{MatchSource, fetch_team_dataset};
use crate::record::MatchRecord;
use crate::snapshot::{latest_snapshot, load_snapshot, save_snapshot, snapshot_path};
use crate::teams::TeamInfo;
use crate::transform::{ProcessedSeries, process};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataOrigin {
    Snapshot(PathBuf),
    Live { saved_to: Option<PathBuf> },
}

#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub origin: DataOrigin,
    pub records: Vec<MatchRecord>,
}

#[derive(Debug, Clone)]
pub struct TeamReport {
    pub team: &'static TeamInfo,
    pub origin: DataOrigin,
    pub raw_rows: usize,
    pub series: ProcessedSeries,
    pub chart: ChartModel,
}

/// Snapshot first when `use_snapshot` is set and one exists, otherwise a live
/// fetch (saved as `<team>_<today>.json` when `save_snapshot` is set).
pub fn load_dataset(
    cfg: &Config,
    source: &dyn MatchSource,
    today: NaiveDate,
) -> Result<LoadedDataset> {
    let team = cfg.team_info()?;

    if cfg.use_snapshot {
        match latest_snapshot(&cfg.data_dir, team.key)? {
            Some(path) => {
                let records = load_snapshot(&path)?;
                log::info!(
                    "Data for {} loaded from snapshot {}",
                    team.key,
                    path.display()
                );
                return Ok(LoadedDataset {
                    origin: DataOrigin::Snapshot(path),
                    records,
                });
            }
            None => log::info!(
                "No snapshot for {} in {}; fetching live",
                team.key,
                cfg.data_dir.display()
            ),
        }
    }

    let records = fetch_team_dataset(source, team, &cfg.seasons)?;
    let saved_to = if cfg.save_snapshot {
        let path = snapshot_path(&cfg.data_dir, team.key, today);
        save_snapshot(&path, &records)
            .with_context(|| format!("save snapshot for {}", team.key))?;
        log::info!("Data for {} successfully saved as JSON.", team.key);
        Some(path)
    } else {
        None
    };

    Ok(LoadedDataset {
        origin: DataOrigin::Live { saved_to },
        records,
    })
}

/// Fetcher → transformer → chart model for the configured team.
pub fn run(cfg: &Config, source: &dyn MatchSource, today: NaiveDate) -> Result<TeamReport> {
    cfg.validate()?;
    let team = cfg.team_info()?;
    let loaded = load_dataset(cfg, source, today)?;
    let series = process(&loaded.records, cfg.window)
        .with_context(|| format!("process data for {}", team.key))?;
    log::info!(
        "Data successfully processed: {} of {} rows played",
        series.len(),
        loaded.records.len()
    );
    let chart = build_chart_model(team, cfg, &series);

    Ok(TeamReport {
        team,
        origin: loaded.origin,
        raw_rows: loaded.records.len(),
        series,
        chart,
    })
}
