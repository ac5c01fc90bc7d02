//! Chart model and terminal rendering for the rolling xG lines.
//!
//! [`ChartModel`] holds everything a renderer needs (series, branding,
//! season marker, axis scaling). [`XgChart`] draws it with ratatui: two
//! line datasets, a dotted season boundary, and the gap between the lines
//! shaded in the colour of whichever side is ahead.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols;
use ratatui::text::Span;
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Widget};

use crate::config::Config;
use crate::teams::TeamInfo;
use crate::transform::ProcessedSeries;

const X_TICK_STEP: usize = 5;
const Y_TICK_STEP: f64 = 0.5;
const FILL_ROWS: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lead {
    For,
    Against,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartModel {
    pub team_key: String,
    pub title: String,
    pub subtitle: String,
    pub for_color: String,
    pub against_color: String,
    pub logo_url: String,
    pub positions: Vec<usize>,
    pub xg_for: Vec<f64>,
    pub xg_against: Vec<f64>,
    pub season_boundary: Option<usize>,
    pub boundary_label: String,
    pub x_max: f64,
    pub y_max: f64,
    pub x_tick_step: usize,
    pub y_tick_step: f64,
}

impl ChartModel {
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Which line is on top at each position. Ties go to `Against`.
    pub fn leads(&self) -> Vec<Lead> {
        self.xg_for
            .iter()
            .zip(&self.xg_against)
            .map(|(f, a)| if f > a { Lead::For } else { Lead::Against })
            .collect()
    }

    /// Scatter points shading the gap between the lines, split by leader.
    pub fn fill_points(&self) -> (Vec<(f64, f64)>, Vec<(f64, f64)>) {
        let step = (self.y_max / FILL_ROWS).max(f64::EPSILON);
        let mut for_fill = Vec::new();
        let mut against_fill = Vec::new();

        for (((pos, f), a), lead) in self
            .positions
            .iter()
            .zip(&self.xg_for)
            .zip(&self.xg_against)
            .zip(self.leads())
        {
            if !f.is_finite() || !a.is_finite() {
                continue;
            }
            let (lo, hi) = if f < a { (*f, *a) } else { (*a, *f) };
            let rows = ((hi - lo) / step).floor() as usize;
            let target = match lead {
                Lead::For => &mut for_fill,
                Lead::Against => &mut against_fill,
            };
            for k in 0..=rows {
                target.push((*pos as f64, (lo + k as f64 * step).min(hi)));
            }
        }
        (for_fill, against_fill)
    }

    /// Closed polygons between the two lines, one per segment or part of one.
    ///
    /// A segment where the lead changes is split at the crossing so each part
    /// carries a single colour. Segments touching a `NaN` are skipped.
    pub fn fill_polygons(&self) -> Vec<(Lead, Vec<(f64, f64)>)> {
        let lead_of = |diff: f64| if diff > 0.0 { Lead::For } else { Lead::Against };
        let mut polygons = Vec::new();

        let samples = self
            .positions
            .iter()
            .zip(&self.xg_for)
            .zip(&self.xg_against)
            .map(|((pos, f), a)| (*pos as f64, *f, *a))
            .collect::<Vec<_>>();

        for pair in samples.windows(2) {
            let ((x0, f0, a0), (x1, f1, a1)) = (pair[0], pair[1]);
            if ![f0, a0, f1, a1].iter().all(|v| v.is_finite()) {
                continue;
            }
            let (d0, d1) = (f0 - a0, f1 - a1);
            let (lead0, lead1) = (lead_of(d0), lead_of(d1));
            if lead0 == lead1 {
                polygons.push((lead0, vec![(x0, a0), (x0, f0), (x1, f1), (x1, a1)]));
            } else {
                let t = d0 / (d0 - d1);
                let cross = (x0 + t * (x1 - x0), f0 + t * (f1 - f0));
                polygons.push((lead0, vec![(x0, a0), (x0, f0), cross]));
                polygons.push((lead1, vec![cross, (x1, f1), (x1, a1)]));
            }
        }
        polygons
    }

    pub fn x_labels(&self) -> Vec<String> {
        let mut labels = Vec::new();
        let mut x = 0usize;
        while (x as f64) <= self.x_max {
            labels.push(x.to_string());
            x += self.x_tick_step.max(1);
        }
        labels
    }

    pub fn y_labels(&self) -> Vec<String> {
        let steps = (self.y_max / self.y_tick_step).round() as usize;
        (0..=steps)
            .map(|k| format!("{:.1}", k as f64 * self.y_tick_step))
            .collect()
    }
}

pub fn build_chart_model(team: &TeamInfo, cfg: &Config, series: &ProcessedSeries) -> ChartModel {
    let n = series.len();
    let season_boundary = (cfg.season_boundary > 0 && cfg.season_boundary < n)
        .then_some(cfg.season_boundary);

    let peak = series
        .xg_for
        .iter()
        .chain(&series.xg_against)
        .copied()
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);
    let y_max = ((peak / Y_TICK_STEP).ceil() * Y_TICK_STEP).max(Y_TICK_STEP);
    let x_max = n.max(season_boundary.unwrap_or(0)).max(1) as f64;

    ChartModel {
        team_key: team.key.to_string(),
        title: team.display_name(),
        subtitle: format!(
            "Expected goals for and against // {}-game average | {} Season {}",
            cfg.window,
            cfg.competition,
            cfg.seasons_label()
        ),
        for_color: team.primary_color.to_string(),
        against_color: team.secondary_color.to_string(),
        logo_url: team.logo_url(),
        positions: series.positions.clone(),
        xg_for: series.xg_for.clone(),
        xg_against: series.xg_against.clone(),
        season_boundary,
        boundary_label: format!("{} Season Change", cfg.competition),
        x_max,
        y_max,
        x_tick_step: X_TICK_STEP,
        y_tick_step: Y_TICK_STEP,
    }
}

/// `#RRGGBB` to its channels.
pub fn hex_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.trim().strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(digits.get(0..2)?, 16).ok()?;
    let g = u8::from_str_radix(digits.get(2..4)?, 16).ok()?;
    let b = u8::from_str_radix(digits.get(4..6)?, 16).ok()?;
    Some((r, g, b))
}

pub fn hex_color(hex: &str) -> Option<Color> {
    hex_rgb(hex).map(|(r, g, b)| Color::Rgb(r, g, b))
}

pub struct XgChart<'a> {
    model: &'a ChartModel,
}

impl<'a> XgChart<'a> {
    pub fn new(model: &'a ChartModel) -> Self {
        Self { model }
    }
}

impl Widget for XgChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let model = self.model;
        let for_color = hex_color(&model.for_color).unwrap_or(Color::Red);
        let against_color = hex_color(&model.against_color).unwrap_or(Color::Gray);

        let for_line = points(&model.positions, &model.xg_for);
        let against_line = points(&model.positions, &model.xg_against);
        let (for_fill, against_fill) = model.fill_points();
        let boundary = model
            .season_boundary
            .map(|b| vec![(b as f64, 0.0), (b as f64, model.y_max)])
            .unwrap_or_default();

        let mut datasets = vec![
            Dataset::default()
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(for_color).add_modifier(Modifier::DIM))
                .data(&for_fill),
            Dataset::default()
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(against_color).add_modifier(Modifier::DIM))
                .data(&against_fill),
            Dataset::default()
                .name("xG for")
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(for_color).add_modifier(Modifier::BOLD))
                .data(&for_line),
            Dataset::default()
                .name("xG against")
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(against_color).add_modifier(Modifier::BOLD))
                .data(&against_line),
        ];
        if !boundary.is_empty() {
            datasets.push(
                Dataset::default()
                    .name(model.boundary_label.clone())
                    .marker(symbols::Marker::Dot)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(Color::DarkGray))
                    .data(&boundary),
            );
        }

        let axis_style = Style::default().fg(Color::Gray);
        let x_labels = model.x_labels().into_iter().map(Span::raw).collect::<Vec<_>>();
        let y_labels = model.y_labels().into_iter().map(Span::raw).collect::<Vec<_>>();

        let title = format!(" {} | {} ", model.title, model.subtitle);
        Chart::new(datasets)
            .block(Block::default().title(title).borders(Borders::ALL))
            .x_axis(
                Axis::default()
                    .title("Match")
                    .style(axis_style)
                    .bounds([0.0, model.x_max])
                    .labels(x_labels),
            )
            .y_axis(
                Axis::default()
                    .title("xG")
                    .style(axis_style)
                    .bounds([0.0, model.y_max])
                    .labels(y_labels),
            )
            .render(area, buf);
    }
}

pub(crate) fn points(positions: &[usize], values: &[f64]) -> Vec<(f64, f64)> {
    positions
        .iter()
        .zip(values)
        .filter(|(_, v)| v.is_finite())
        .map(|(p, v)| (*p as f64, *v))
        .collect()
}
