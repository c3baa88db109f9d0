use std::path::Path;
use std::sync::Arc;

use crate::api::config_dto::Config;
use crate::domain::checker::JobChecker;
use crate::domain::diagnostics::{Event, EventCatalog};
use crate::domain::job::{Invocation, Job};
use crate::domain::parser::ScriptParser;
use crate::error::Result;
use crate::loader::parser::parse_json_file;

pub mod api;
pub mod domain;
pub mod error;
pub mod loader;
pub mod logger;
pub mod report;

/// Parsed job together with everything found wrong with it.
#[derive(Debug)]
pub struct LintOutcome {
    pub job: Job,
    pub events: Vec<Event>,
}

impl LintOutcome {
    pub fn nr_errors(&self) -> usize {
        self.events.iter().filter(|event| event.is_error()).count()
    }

    pub fn nr_warnings(&self) -> usize {
        self.events.iter().filter(|event| event.is_warning()).count()
    }
}

pub fn load_config(file_path: impl AsRef<Path>) -> Result<Config> {
    let config: Config = parse_json_file(file_path.as_ref())?;
    log::debug!("Configuration '{}' loaded.", file_path.as_ref().display());
    Ok(config)
}

/// Parses the script at `file_path` and, unless `syntax_only` is set, checks
/// the resulting job against the inventory configured in `config`.
///
/// Syntax events come first, in line order, followed by semantic events.
pub fn check_script(
    file_path: impl AsRef<Path>,
    config: Arc<Config>,
    catalog: Arc<EventCatalog>,
    invocation: Invocation,
    syntax_only: bool,
) -> Result<LintOutcome> {
    let mut parser = ScriptParser::new(config.clone(), catalog.clone(), invocation)?;
    parser.parse_file(file_path)?;
    let mut events = parser.events().to_vec();
    let job = parser.into_job();
    log::debug!("Parsed job:\n{}", job.attrs_to_string());

    if !syntax_only {
        let mut checker = JobChecker::new(config, catalog)?;
        checker.check(&job)?;
        events.extend(checker.into_events());
    }
    Ok(LintOutcome { job, events })
}
