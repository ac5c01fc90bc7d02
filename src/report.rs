use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::chart::ChartModel;
use crate::transform::ProcessedSeries;

const CSV_HEADER: [&str; 4] = ["position", "date", "xg_for", "xg_against"];

/// One printed line of a team's rolling series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub position: usize,
    pub date: String,
    pub xg_for: f64,
    pub xg_against: f64,
}

pub fn report_rows(series: &ProcessedSeries) -> Vec<ReportRow> {
    series
        .positions
        .iter()
        .zip(&series.dates)
        .zip(series.xg_for.iter().zip(&series.xg_against))
        .map(|((position, date), (xg_for, xg_against))| ReportRow {
            position: *position,
            date: date.format("%d.%m.%Y").to_string(),
            xg_for: *xg_for,
            xg_against: *xg_against,
        })
        .collect()
}

/// Header block plus one aligned line per match. No rows still prints the header.
pub fn write_table<W: Write>(out: &mut W, chart: &ChartModel, rows: &[ReportRow]) -> Result<()> {
    writeln!(out, "{}", chart.title)?;
    writeln!(out, "{}", chart.subtitle)?;
    writeln!(out, "logo: {}", chart.logo_url)?;
    writeln!(out)?;
    writeln!(out, "{:>4}  {:<10}  {:>7}  {:>7}", "#", "Datum", "xG", "xGA")?;
    for row in rows {
        let marker = if chart.season_boundary == Some(row.position) {
            format!("  <- {}", chart.boundary_label)
        } else {
            String::new()
        };
        writeln!(
            out,
            "{:>4}  {:<10}  {:>7.2}  {:>7.2}{marker}",
            row.position, row.date, row.xg_for, row.xg_against
        )?;
    }
    Ok(())
}

/// Pretty JSON array; `NaN` averages come out as `null`.
pub fn write_json<W: Write>(out: &mut W, rows: &[ReportRow]) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, rows).context("serialize rows")?;
    writeln!(out)?;
    Ok(())
}

/// CSV with the header always present, even for an empty series.
pub fn write_csv<W: Write>(out: W, rows: &[ReportRow]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(out);
    writer.write_record(CSV_HEADER).context("write csv header")?;
    for row in rows {
        writer.serialize(row).context("write csv row")?;
    }
    writer.flush().context("flush csv")?;
    Ok(())
}
