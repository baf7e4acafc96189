mod console;
mod stdin;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use niyam_agent::client_from_config;
use niyam_core::{config::Config, persistence::RunStore, policy::CuePolicy, record::CaseRecord};
use niyam_court::{Simulation, SimulationSettings};
use tracing::info;

use crate::{console::ConsoleNarrator, stdin::StdinInput};

#[derive(Parser)]
#[command(
    name = "niyam-court",
    version,
    about = "Interactive consumer-court simulation over a judgment prediction"
)]
struct Cli {
    /// Judgment prediction JSON to argue over.
    #[arg(short = 'f', long)]
    case_file: PathBuf,
}

fn validate_case_file(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("case file not found: {}", path.display());
    }
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if !is_json {
        bail!("case file must be a JSON file: {}", path.display());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "niyam_cli=info,niyam_court=info,niyam_core=info,niyam_agent=info".into()
            }),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    validate_case_file(&cli.case_file)?;

    let config = Config::from_env()?;
    let record = CaseRecord::load(&cli.case_file)
        .with_context(|| format!("loading case file {}", cli.case_file.display()))?;

    let judge = client_from_config(&config, config.judge_temperature)?;
    let defense = client_from_config(&config, config.defense_temperature)?;
    info!(
        backend = %judge.describe(),
        case_file = %cli.case_file.display(),
        "starting courtroom simulation"
    );

    let policy = CuePolicy::with_extra_cues(&config.next_hearing_cues, &config.closing_cues);
    let mut simulation = Simulation::new(record, judge, defense, SimulationSettings::from_config(&config))
        .with_policy(policy);
    let store = RunStore::new(&config.simulation_dir);

    let report = simulation
        .run(&mut StdinInput::new(), &mut ConsoleNarrator::stdout(), &store)
        .await?;
    info!(
        termination = ?report.termination,
        turns = report.turns,
        hearings = report.hearings,
        dir = %report.artifacts.dir.display(),
        "simulation finished"
    );
    Ok(())
}
