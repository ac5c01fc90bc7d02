use anyhow::{Context, Result, anyhow};
use clap::Parser;

use xg_rolling::config::{Config, ConfigArgs};
use xg_rolling::fbref::{FbrefSource, fetch_team_dataset};
use xg_rolling::snapshot::{save_snapshot, snapshot_path};
use xg_rolling::teams::{TEAMS, TeamInfo};

#[derive(Parser)]
#[command(name = "xg_snapshot")]
#[command(about = "Fetch season tables and store them as dated JSON snapshots", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    /// Snapshot every registered team instead of one
    #[arg(long)]
    all: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();

    let mut cfg = Config::from_env();
    cli.config.apply(&mut cfg);
    cfg.validate()?;

    let teams: Vec<&'static TeamInfo> = if cli.all {
        TEAMS.iter().collect()
    } else {
        vec![cfg.team_info()?]
    };

    let source = FbrefSource::new(cfg.competition_id.clone());
    let today = chrono::Local::now().date_naive();
    let mut errors = Vec::new();
    let mut written = 0usize;

    for team in &teams {
        let result = fetch_team_dataset(&source, team, &cfg.seasons).and_then(|records| {
            let path = snapshot_path(&cfg.data_dir, team.key, today);
            save_snapshot(&path, &records)
                .with_context(|| format!("save snapshot for {}", team.key))?;
            Ok((path, records.len()))
        });
        match result {
            Ok((path, rows)) => {
                written += 1;
                println!("{}: {rows} rows -> {}", team.key, path.display());
            }
            Err(err) => errors.push(format!("{}: {err:#}", team.key)),
        }
    }

    println!("Snapshots written: {written}/{}", teams.len());
    if !errors.is_empty() {
        println!("Errors: {}", errors.len());
        for err in errors.iter().take(8) {
            println!(" - {err}");
        }
        if written == 0 {
            return Err(anyhow!("no snapshot written"));
        }
    }

    Ok(())
}
