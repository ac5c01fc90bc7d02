//! Season schedule tables from fbref.com (German locale).
//!
//! Each season page carries the team's match log as its first `<table>`. The
//! table is flattened into JSON objects keyed by header text, then decoded
//! through [`MatchRecord::from_json`] so a live fetch and a snapshot share the
//! same presence checks.

use std::collections::HashMap;

use anyhow::{Context, Result, anyhow};
use scraper::{ElementRef, Html, Selector};
use serde_json::{Map, Value};

use crate::http_client::{fetch_text, http_client};
use crate::record::{MatchRecord, XG_FIELD, XGA_FIELD, decode_records, parse_decimal};
use crate::teams::TeamInfo;

const FBREF_TEAMS_URL: &str = "https://fbref.com/de/mannschaften";

/// Supplies one season's raw table for a team.
pub trait MatchSource {
    fn fetch_season(&self, team: &TeamInfo, season: &str) -> Result<Vec<MatchRecord>>;
}

#[derive(Debug, Clone)]
pub struct FbrefSource {
    competition_id: String,
}

impl FbrefSource {
    pub fn new(competition_id: impl Into<String>) -> Self {
        Self {
            competition_id: competition_id.into(),
        }
    }
}

impl MatchSource for FbrefSource {
    fn fetch_season(&self, team: &TeamInfo, season: &str) -> Result<Vec<MatchRecord>> {
        let client = http_client()?;
        let url = season_url(team, season, &self.competition_id);
        log::debug!("GET {url}");
        let html = fetch_text(client, &url).context("schedule request failed")?;
        parse_schedule_html(&html).with_context(|| format!("parse {} {season}", team.key))
    }
}

pub fn season_url(team: &TeamInfo, season: &str, competition_id: &str) -> String {
    format!(
        "{FBREF_TEAMS_URL}/{}/{season}/spielprotokolle/{competition_id}/schedule/{}-Punkte-und-Eckdaten-Bundesliga",
        team.fbref_id, team.key
    )
}

/// Fetches every season in order and concatenates the tables.
///
/// The result is in fetch order, not date order.
pub fn fetch_team_dataset(
    source: &dyn MatchSource,
    team: &TeamInfo,
    seasons: &[String],
) -> Result<Vec<MatchRecord>> {
    let mut out = Vec::new();
    for season in seasons {
        let rows = source
            .fetch_season(team, season)
            .with_context(|| format!("fetch {} season {season}", team.key))?;
        log::debug!("{} {season}: {} rows", team.key, rows.len());
        out.extend(rows);
    }
    log::info!("Data for {} successfully loaded.", team.key);
    Ok(out)
}

/// Parses the first table of a schedule page.
pub fn parse_schedule_html(html: &str) -> Result<Vec<MatchRecord>> {
    let document = Html::parse_document(html);
    let table_sel = selector("table")?;
    let header_row_sel = selector("thead tr")?;
    let header_cell_sel = selector("th")?;
    let body_row_sel = selector("tbody tr")?;
    let cell_sel = selector("th, td")?;

    let table = document
        .select(&table_sel)
        .next()
        .ok_or_else(|| anyhow!("no table in page"))?;

    let header_row = table
        .select(&header_row_sel)
        .last()
        .ok_or_else(|| anyhow!("table has no header row"))?;
    let headers = dedup_headers(
        header_row
            .select(&header_cell_sel)
            .map(|cell| cell_text(&cell))
            .collect(),
    );

    let mut objects = Vec::new();
    for (row_idx, row) in table.select(&body_row_sel).enumerate() {
        if is_filler_row(&row) {
            continue;
        }
        let cells = row.select(&cell_sel).map(|c| cell_text(&c)).collect::<Vec<_>>();
        if cells.iter().all(|c| c.is_empty()) {
            continue;
        }
        if cells.len() < headers.len() {
            log::warn!(
                "row {row_idx}: {} cells for {} columns",
                cells.len(),
                headers.len()
            );
        }

        let mut obj = Map::new();
        for (header, text) in headers.iter().zip(cells) {
            obj.insert(header.clone(), cell_value(header, text));
        }
        objects.push(Value::Object(obj));
    }

    Ok(decode_records(&objects)?)
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|err| anyhow!("invalid selector {css:?}: {err:?}"))
}

fn cell_text(cell: &ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}

fn is_filler_row(row: &ElementRef<'_>) -> bool {
    row.value()
        .attr("class")
        .is_some_and(|classes| {
            classes
                .split_whitespace()
                .any(|c| matches!(c, "thead" | "spacer" | "over_header"))
        })
}

fn cell_value(header: &str, text: String) -> Value {
    if text.is_empty() {
        return Value::Null;
    }
    if header == XG_FIELD || header == XGA_FIELD {
        if let Some(n) = parse_decimal(&text).and_then(serde_json::Number::from_f64) {
            return Value::Number(n);
        }
    }
    Value::String(text)
}

/// Repeated headers get `.1`, `.2`, ... suffixes.
fn dedup_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    headers
        .into_iter()
        .map(|h| {
            let count = seen.entry(h.clone()).or_insert(0);
            let name = if *count == 0 {
                h
            } else {
                format!("{h}.{count}")
            };
            *count += 1;
            name
        })
        .collect()
}
