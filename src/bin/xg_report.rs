use std::io;

use anyhow::Result;
use clap::{Parser, ValueEnum};

use xg_rolling::config::{Config, ConfigArgs};
use xg_rolling::export::export_png;
use xg_rolling::fbref::FbrefSource;
use xg_rolling::pipeline;
use xg_rolling::report::{report_rows, write_csv, write_json, write_table};

#[derive(Parser)]
#[command(name = "xg_report")]
#[command(about = "Print the rolling xG series for a team", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Also write the chart to <plots-dir>/<team>.png
    #[arg(long)]
    png: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();

    let mut cfg = Config::from_env();
    cli.config.apply(&mut cfg);

    let source = FbrefSource::new(cfg.competition_id.clone());
    let today = chrono::Local::now().date_naive();
    let report = pipeline::run(&cfg, &source, today)?;
    if report.series.is_empty() {
        log::warn!("{} has no played matches yet", report.team.key);
    }

    let rows = report_rows(&report.series);
    let mut stdout = io::stdout().lock();
    match cli.format {
        OutputFormat::Table => write_table(&mut stdout, &report.chart, &rows)?,
        OutputFormat::Json => write_json(&mut stdout, &rows)?,
        OutputFormat::Csv => write_csv(&mut stdout, &rows)?,
    }

    if cli.png {
        let path = export_png(&report.chart, &cfg.plots_dir)?;
        eprintln!("Plot for {} saved to {}", report.team.key, path.display());
    }
    Ok(())
}
