use std::env;
use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::Args;

use crate::teams::{TEAMS, TeamInfo, team_info};
use crate::transform::DEFAULT_WINDOW;

pub const DEFAULT_TEAM: &str = "Union-Berlin";
pub const DEFAULT_SEASONS: &[&str] = &["2022-2023", "2023-2024"];
pub const DEFAULT_SEASON_BOUNDARY: usize = 34;

/// Everything a run needs, threaded explicitly through fetch, transform and
/// render.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub team: String,
    /// Oldest first; datasets are concatenated in this order.
    pub seasons: Vec<String>,
    pub data_dir: PathBuf,
    pub plots_dir: PathBuf,
    pub use_snapshot: bool,
    pub save_snapshot: bool,
    pub window: usize,
    pub season_boundary: usize,
    pub competition: String,
    pub competition_id: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            team: DEFAULT_TEAM.to_string(),
            seasons: DEFAULT_SEASONS.iter().map(|s| s.to_string()).collect(),
            data_dir: PathBuf::from("data"),
            plots_dir: PathBuf::from("plots"),
            use_snapshot: false,
            save_snapshot: false,
            window: DEFAULT_WINDOW,
            season_boundary: DEFAULT_SEASON_BOUNDARY,
            competition: "Bundesliga".to_string(),
            competition_id: "c20".to_string(),
        }
    }
}

impl Config {
    /// Defaults, then `.env.local` / `.env`, then `XG_*` variables.
    pub fn from_env() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");

        let mut cfg = Self::default();
        if let Some(team) = env_string("XG_TEAM") {
            cfg.team = team;
        }
        if let Some(seasons) = env_string("XG_SEASONS") {
            cfg.seasons = split_seasons(&seasons);
        }
        if let Some(dir) = env_string("XG_DATA_DIR") {
            cfg.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = env_string("XG_PLOTS_DIR") {
            cfg.plots_dir = PathBuf::from(dir);
        }
        if let Some(flag) = env_string("XG_USE_SNAPSHOT").and_then(|v| parse_flag(&v)) {
            cfg.use_snapshot = flag;
        }
        if let Some(flag) = env_string("XG_SAVE_SNAPSHOT").and_then(|v| parse_flag(&v)) {
            cfg.save_snapshot = flag;
        }
        cfg.window = env_string("XG_WINDOW")
            .and_then(|val| val.parse::<usize>().ok())
            .unwrap_or(cfg.window);
        cfg.season_boundary = env_string("XG_SEASON_BOUNDARY")
            .and_then(|val| val.parse::<usize>().ok())
            .unwrap_or(cfg.season_boundary);
        cfg
    }

    pub fn team_info(&self) -> Result<&'static TeamInfo> {
        team_info(&self.team).ok_or_else(|| {
            let known = TEAMS.iter().map(|t| t.key).collect::<Vec<_>>().join(", ");
            anyhow!("unknown team {:?} (known: {known})", self.team)
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.team_info()?;
        if self.seasons.is_empty() {
            return Err(anyhow!("no seasons configured"));
        }
        if self.window == 0 {
            return Err(anyhow!("rolling window must be at least 1"));
        }
        Ok(())
    }

    /// Label like `22/23 & 23/24` for chart subtitles.
    pub fn seasons_label(&self) -> String {
        self.seasons
            .iter()
            .map(|s| short_season(s))
            .collect::<Vec<_>>()
            .join(" & ")
    }
}

/// Command-line overrides shared by every binary.
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigArgs {
    /// Team key, e.g. Union-Berlin
    #[arg(short, long)]
    pub team: Option<String>,

    /// Comma-separated seasons, oldest first (e.g. 2022-2023,2023-2024)
    #[arg(long)]
    pub seasons: Option<String>,

    /// Directory holding JSON snapshots
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Directory PNG charts are written to
    #[arg(long)]
    pub plots_dir: Option<PathBuf>,

    /// Use the newest local snapshot when one exists; fetch live otherwise
    #[arg(long)]
    pub prefer_snapshot: bool,

    /// Write a dated snapshot after a live fetch
    #[arg(long)]
    pub save: bool,

    /// Rolling window size
    #[arg(long)]
    pub window: Option<usize>,
}

impl ConfigArgs {
    pub fn apply(&self, cfg: &mut Config) {
        if let Some(team) = self.team.as_deref() {
            cfg.team = team.to_string();
        }
        if let Some(seasons) = self.seasons.as_deref() {
            cfg.seasons = split_seasons(seasons);
        }
        if let Some(dir) = self.data_dir.as_ref() {
            cfg.data_dir = dir.clone();
        }
        if let Some(dir) = self.plots_dir.as_ref() {
            cfg.plots_dir = dir.clone();
        }
        if self.prefer_snapshot {
            cfg.use_snapshot = true;
        }
        if self.save {
            cfg.save_snapshot = true;
        }
        if let Some(window) = self.window {
            cfg.window = window;
        }
    }
}

fn env_string(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn split_seasons(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn short_season(season: &str) -> String {
    let parts = season.split('-').collect::<Vec<_>>();
    match parts.as_slice() {
        [a, b] if a.len() == 4 && b.len() == 4 => format!("{}/{}", &a[2..], &b[2..]),
        _ => season.to_string(),
    }
}
