use std::collections::VecDeque;
use std::fs::{self, File};
use std::io;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use xg_rolling::chart::XgChart;
use xg_rolling::config::{Config, ConfigArgs};
use xg_rolling::export::export_png;
use xg_rolling::fbref::FbrefSource;
use xg_rolling::pipeline::{self, DataOrigin, TeamReport};
use xg_rolling::teams::{TEAMS, team_index};

const LOG_FILE: &str = "xg_rolling.log";
const MAX_LOGS: usize = 200;

#[derive(Parser)]
#[command(name = "xg_rolling")]
#[command(about = "Rolling expected-goals chart in the terminal", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    /// Debug-level log file output
    #[arg(short, long)]
    verbose: bool,
}

struct App {
    cfg: Config,
    source: FbrefSource,
    team_idx: usize,
    report: Option<TeamReport>,
    pending_load: bool,
    force_live: bool,
    logs: VecDeque<String>,
    help_overlay: bool,
    should_quit: bool,
}

impl App {
    fn new(cfg: Config) -> Self {
        let team_idx = team_index(&cfg.team).unwrap_or(0);
        let source = FbrefSource::new(cfg.competition_id.clone());
        Self {
            cfg,
            source,
            team_idx,
            report: None,
            pending_load: true,
            force_live: false,
            logs: VecDeque::new(),
            help_overlay: false,
            should_quit: false,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('n') | KeyCode::Right | KeyCode::Char('l') => self.cycle_team(1),
            KeyCode::Char('p') | KeyCode::Left | KeyCode::Char('h') => {
                self.cycle_team(TEAMS.len() - 1)
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.force_live = true;
                self.pending_load = true;
                self.push_log("[INFO] Live refresh requested");
            }
            KeyCode::Char('e') | KeyCode::Char('E') => self.export_current(),
            KeyCode::Char('?') => self.help_overlay = !self.help_overlay,
            _ => {}
        }
    }

    fn export_current(&mut self) {
        let Some(report) = self.report.as_ref() else {
            self.push_log("[WARN] Nothing to export yet");
            return;
        };
        let msg = match export_png(&report.chart, &self.cfg.plots_dir) {
            Ok(path) => format!("[INFO] Plot saved to {}", path.display()),
            Err(err) => {
                log::error!("{err:#}");
                format!("[WARN] Export failed: {err:#}")
            }
        };
        self.push_log(msg);
    }

    fn cycle_team(&mut self, step: usize) {
        if TEAMS.is_empty() {
            return;
        }
        self.team_idx = (self.team_idx + step) % TEAMS.len();
        self.cfg.team = TEAMS[self.team_idx].key.to_string();
        self.report = None;
        self.pending_load = true;
        self.push_log(format!("[INFO] Team: {}", self.cfg.team));
    }

    fn load_current(&mut self) {
        self.pending_load = false;
        let mut cfg = self.cfg.clone();
        if self.force_live {
            cfg.use_snapshot = false;
            self.force_live = false;
        }

        let today = chrono::Local::now().date_naive();
        match pipeline::run(&cfg, &self.source, today) {
            Ok(report) => {
                let origin = match &report.origin {
                    DataOrigin::Snapshot(path) => format!("snapshot {}", path.display()),
                    DataOrigin::Live { saved_to: Some(path) } => {
                        format!("live, saved to {}", path.display())
                    }
                    DataOrigin::Live { saved_to: None } => "live".to_string(),
                };
                self.push_log(format!(
                    "[INFO] {}: {} matches played ({} rows, {origin})",
                    report.team.key,
                    report.series.len(),
                    report.raw_rows
                ));
                self.report = Some(report);
            }
            Err(err) => {
                log::error!("{err:#}");
                self.push_log(format!("[WARN] {}: {err:#}", self.cfg.team));
                self.report = None;
            }
        }
    }

    fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut cfg = Config::from_env();
    cli.config.apply(&mut cfg);
    cfg.validate()?;
    init_file_logging(&cfg, cli.verbose)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut app = App::new(cfg);
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn init_file_logging(cfg: &Config, verbose: bool) -> anyhow::Result<()> {
    use anyhow::Context;

    fs::create_dir_all(&cfg.data_dir)
        .with_context(|| format!("create {}", cfg.data_dir.display()))?;
    let path = cfg.data_dir.join(LOG_FILE);
    let file = File::create(&path).with_context(|| format!("open {}", path.display()))?;
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui(f, app))?;

        if app.pending_load {
            app.load_current();
            continue;
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(6),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(app)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match &app.report {
        Some(report) if !report.chart.is_empty() => {
            frame.render_widget(XgChart::new(&report.chart), chunks[1]);
        }
        Some(report) => {
            let msg = format!("{}: no played matches yet", report.team.display_name());
            frame.render_widget(
                Paragraph::new(msg).block(Block::default().borders(Borders::ALL)),
                chunks[1],
            );
        }
        None => {
            let msg = if app.pending_load {
                format!("Loading {} ...", app.cfg.team)
            } else {
                format!("No data for {}", app.cfg.team)
            };
            frame.render_widget(
                Paragraph::new(msg).block(Block::default().borders(Borders::ALL)),
                chunks[1],
            );
        }
    }

    let console = Paragraph::new(console_text(app, chunks[2].height.saturating_sub(2)))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new("n/→ Next team | p/← Prev team | r Live refresh | e Save PNG | ? Help | q Quit");
    frame.render_widget(footer, chunks[3]);

    if app.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(app: &App) -> String {
    let team = &TEAMS[app.team_idx];
    let mode = if app.cfg.use_snapshot {
        "snapshot"
    } else {
        "live"
    };
    let line1 = format!(
        "  xG ROLLING | {} ({}/{}) | {} | window {}",
        team.display_name(),
        app.team_idx + 1,
        TEAMS.len(),
        mode,
        app.cfg.window
    );
    let line2 = format!("  logo: {}", team.logo_url());
    format!("{line1}\n{line2}")
}

fn console_text(app: &App, rows: u16) -> String {
    let rows = rows as usize;
    let skip = app.logs.len().saturating_sub(rows);
    app.logs
        .iter()
        .skip(skip)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 50, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "xG Rolling - Help",
        "",
        "  n / l / →    Next team",
        "  p / h / ←    Previous team",
        "  r            Refetch live (ignores snapshots)",
        "  e            Save chart as PNG in the plots dir",
        "  ?            Toggle help",
        "  q / Esc      Quit",
        "",
        "Shaded gaps use the colour of the side with the higher rolling xG.",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
