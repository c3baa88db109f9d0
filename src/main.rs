use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use pbs_lint::domain::diagnostics::EventCatalog;
use pbs_lint::domain::job::Invocation;
use pbs_lint::report::Report;
use pbs_lint::{check_script, load_config, logger};

/// Checks a PBS job script for syntax errors and for requests the cluster
/// can not satisfy.
#[derive(Parser, Debug)]
#[command(name = "pbs_lint", version, about)]
struct Cli {
    /// Job script to check.
    script: PathBuf,

    /// Site configuration (JSON).
    #[arg(long, default_value = "data/config.json")]
    config: PathBuf,

    /// Event catalog (JSON).
    #[arg(long, default_value = "data/events.json")]
    events: PathBuf,

    /// Cluster inventory, overrides `cluster_db` of the configuration.
    #[arg(long)]
    inventory: Option<PathBuf>,

    /// Directive marker, overrides `pbs_directive` of the configuration.
    #[arg(long)]
    directive: Option<String>,

    /// Only check the script's syntax, skip the cluster checks.
    #[arg(long)]
    syntax_only: bool,

    /// Also write the findings as CSV to this file.
    #[arg(long)]
    csv: Option<PathBuf>,
}

fn run(cli: Cli) -> anyhow::Result<bool> {
    let mut config = load_config(&cli.config).with_context(|| format!("loading configuration '{}'", cli.config.display()))?;
    if let Some(inventory) = cli.inventory {
        config.cluster_db = inventory;
    }
    if let Some(directive) = cli.directive {
        config.pbs_directive = directive;
    }
    let catalog = EventCatalog::from_file(&cli.events).with_context(|| format!("loading event catalog '{}'", cli.events.display()))?;
    let catalog = Arc::new(catalog);

    let outcome = check_script(&cli.script, Arc::new(config), catalog.clone(), Invocation::from_env(), cli.syntax_only)
        .with_context(|| format!("checking '{}'", cli.script.display()))?;

    let report = Report::new(&outcome.events, &catalog)?;
    print!("{}", report.render_colored());

    if let Some(csv_path) = cli.csv {
        let file = File::create(&csv_path).with_context(|| format!("creating '{}'", csv_path.display()))?;
        report.write_csv(file)?;
        log::info!("Findings written to '{}'.", csv_path.display());
    }
    Ok(report.nr_errors() == 0)
}

fn main() -> ExitCode {
    logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::from(2)
        }
    }
}
