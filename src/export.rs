//! PNG export of a team's chart into `plots_dir/<team>.png`.
//!
//! Text (title, legend, logo) lives in the terminal header and the report
//! output; the image carries the lines, the shaded gap, the grid and the
//! dotted season boundary.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use plotters::coord::Shift;
use plotters::prelude::*;

use crate::chart::{ChartModel, Lead, hex_rgb, points};

/// 5 x 2.5 inches at 200 dpi.
pub const PNG_SIZE: (u32, u32) = (1000, 500);

const BACKGROUND: RGBColor = RGBColor(0xEF, 0xE9, 0xE6);
const GRID: RGBColor = RGBColor(0xD3, 0xD3, 0xD3);
const AXIS: RGBColor = RGBColor(0x80, 0x80, 0x80);
const FALLBACK_FOR: RGBColor = RGBColor(0xE3, 0x22, 0x21);
const FILL_ALPHA: f64 = 0.85;
const BOUNDARY_DASHES: usize = 40;

pub fn png_path(plots_dir: &Path, team_key: &str) -> PathBuf {
    plots_dir.join(format!("{team_key}.png"))
}

/// Draws `model` and writes it to `<plots_dir>/<team>.png`, creating the
/// directory when needed. An existing file is overwritten.
pub fn export_png(model: &ChartModel, plots_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(plots_dir)
        .with_context(|| format!("create plots dir {}", plots_dir.display()))?;
    let path = png_path(plots_dir, &model.team_key);
    draw_chart(model, &path).with_context(|| format!("draw {}", path.display()))?;
    log::info!("Plot for {} saved to {}", model.team_key, path.display());
    Ok(path)
}

fn draw_chart(model: &ChartModel, path: &Path) -> Result<()> {
    let root = BitMapBackend::new(path, PNG_SIZE).into_drawing_area();
    root.fill(&BACKGROUND).map_err(draw_error)?;
    plot(&root, model)?;
    root.present().map_err(draw_error)?;
    Ok(())
}

fn plot(root: &DrawingArea<BitMapBackend<'_>, Shift>, model: &ChartModel) -> Result<()> {
    let for_color = team_rgb(&model.for_color).unwrap_or(FALLBACK_FOR);
    let against_color = team_rgb(&model.against_color).unwrap_or(GRID);

    let mut chart = ChartBuilder::on(root)
        .margin(24)
        .build_cartesian_2d(0f64..model.x_max, 0f64..model.y_max)
        .map_err(draw_error)?;

    chart
        .draw_series(
            grid_lines(model)
                .into_iter()
                .map(|line| PathElement::new(line, GRID.stroke_width(1))),
        )
        .map_err(draw_error)?;
    chart
        .draw_series([
            PathElement::new(vec![(0.0, 0.0), (model.x_max, 0.0)], AXIS.stroke_width(2)),
            PathElement::new(vec![(0.0, 0.0), (0.0, model.y_max)], AXIS.stroke_width(2)),
        ])
        .map_err(draw_error)?;

    if let Some(boundary) = model.season_boundary {
        chart
            .draw_series(
                dashes(boundary as f64, model.y_max)
                    .into_iter()
                    .map(|dash| PathElement::new(dash, AXIS.stroke_width(2))),
            )
            .map_err(draw_error)?;
    }

    chart
        .draw_series(model.fill_polygons().into_iter().map(|(lead, polygon)| {
            let color = match lead {
                Lead::For => for_color,
                Lead::Against => against_color,
            };
            Polygon::new(polygon, color.mix(FILL_ALPHA).filled())
        }))
        .map_err(draw_error)?;

    chart
        .draw_series(LineSeries::new(
            points(&model.positions, &model.xg_for),
            for_color.stroke_width(3),
        ))
        .map_err(draw_error)?;
    chart
        .draw_series(LineSeries::new(
            points(&model.positions, &model.xg_against),
            against_color.stroke_width(3),
        ))
        .map_err(draw_error)?;
    Ok(())
}

fn team_rgb(hex: &str) -> Option<RGBColor> {
    hex_rgb(hex).map(|(r, g, b)| RGBColor(r, g, b))
}

fn grid_lines(model: &ChartModel) -> Vec<Vec<(f64, f64)>> {
    let x_step = model.x_tick_step.max(1) as f64;
    let vertical = (1..)
        .map(|k| k as f64 * x_step)
        .take_while(|x| *x <= model.x_max)
        .map(|x| vec![(x, 0.0), (x, model.y_max)]);
    let horizontal = (1..)
        .map(|k| k as f64 * model.y_tick_step)
        .take_while(|y| *y <= model.y_max + f64::EPSILON)
        .map(|y| vec![(0.0, y), (model.x_max, y)]);
    vertical.chain(horizontal).collect()
}

/// Every other segment of a vertical line split into `BOUNDARY_DASHES` pieces.
fn dashes(x: f64, y_max: f64) -> Vec<Vec<(f64, f64)>> {
    let step = y_max / BOUNDARY_DASHES as f64;
    (0..BOUNDARY_DASHES)
        .step_by(2)
        .map(|k| vec![(x, k as f64 * step), (x, (k + 1) as f64 * step)])
        .collect()
}

fn draw_error<E: fmt::Display>(err: E) -> anyhow::Error {
    anyhow!("{err}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashes_stay_inside_the_axis() {
        let dashes = dashes(34.0, 2.0);
        assert_eq!(dashes.len(), BOUNDARY_DASHES / 2);
        assert!(dashes.iter().flatten().all(|(x, y)| *x == 34.0 && *y <= 2.0));
    }

    #[test]
    fn png_is_named_after_team_key() {
        assert_eq!(
            png_path(Path::new("plots"), "Union-Berlin"),
            Path::new("plots").join("Union-Berlin.png")
        );
    }
}
