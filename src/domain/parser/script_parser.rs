use std::path::Path;
use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;

use crate::api::config_dto::Config;
use crate::domain::diagnostics::{Event, EventCatalog, EventContext, EventId, EventLog};
use crate::domain::job::{Invocation, Job};
use crate::domain::parser::option_parser::OptionParser;
use crate::error::Result;
use crate::loader::parser::read_script_file;

const DEFAULT_DIRECTIVE: &str = "#PBS";

lazy_static! {
    static ref COMMENT_RE: Regex = Regex::new(r"^\s*#").unwrap();
    static ref SPACED_DEFAULT_DIRECTIVE_RE: Regex = Regex::new(r"^\s*#\s+PBS\s+").unwrap();
    static ref OPTION_START_RE: Regex = Regex::new(r"^\s*-[A-Za-z]").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    Start,
    Directives,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    Unix,
    Dos,
    Mac,
    None,
}

/// Splits text into lines the way a universal-newline reader does, keeping
/// track of how each line was terminated.
pub fn split_lines(text: &str) -> Vec<(&str, LineEnding)> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut index = 0;

    while index < bytes.len() {
        match bytes[index] {
            b'\n' => {
                lines.push((&text[start..index], LineEnding::Unix));
                index += 1;
                start = index;
            }
            b'\r' if bytes.get(index + 1) == Some(&b'\n') => {
                lines.push((&text[start..index], LineEnding::Dos));
                index += 2;
                start = index;
            }
            b'\r' => {
                lines.push((&text[start..index], LineEnding::Mac));
                index += 1;
                start = index;
            }
            _ => index += 1,
        }
    }
    if start < bytes.len() {
        lines.push((&text[start..], LineEnding::None));
    }
    lines
}

/// Recognizes directive lines for one marker.
#[derive(Debug, Clone)]
struct DirectiveMatcher {
    is_default: bool,
    directive_re: Regex,
    indented_re: Regex,
}

impl DirectiveMatcher {
    fn new(marker: &str) -> Result<Self> {
        let marker_re = regex::escape(marker);
        Ok(Self {
            is_default: marker == DEFAULT_DIRECTIVE,
            directive_re: Regex::new(&format!(r"^\s*{}\s+(.+)$", marker_re))?,
            indented_re: Regex::new(&format!(r"^\s+{}\s+(.+)$", marker_re))?,
        })
    }

    fn is_shebang(line: &str) -> bool {
        line.starts_with("#!")
    }

    /// `# PBS -l ...`, only detected for the default marker.
    fn is_spaced(&self, line: &str) -> bool {
        self.is_default && SPACED_DEFAULT_DIRECTIVE_RE.is_match(line)
    }

    fn is_directive(&self, line: &str) -> bool {
        self.directive_re.is_match(line)
    }

    fn is_indented(&self, line: &str) -> bool {
        self.indented_re.is_match(line)
    }

    fn extract<'a>(&self, line: &'a str) -> Option<&'a str> {
        self.directive_re.captures(line).and_then(|caps| caps.get(1)).map(|option| option.as_str())
    }

    fn is_comment(&self, line: &str) -> bool {
        COMMENT_RE.is_match(line)
            && !(Self::is_shebang(line) || self.is_spaced(line) || self.is_indented(line) || self.is_directive(line))
    }
}

/// Line-oriented parser for job scripts: shebang, directive block, body.
///
/// Produces a [`Job`] and the syntax events found on the way, each tagged
/// with the line it was found on.
#[derive(Debug)]
pub struct ScriptParser {
    config: Arc<Config>,
    invocation: Invocation,
    job: Job,
    log: EventLog,
    option_parser: OptionParser,
    matcher: DirectiveMatcher,
    state: ParserState,
    line_nr: usize,
    script_first_line_nr: Option<usize>,
}

impl ScriptParser {
    pub fn new(config: Arc<Config>, catalog: Arc<EventCatalog>, invocation: Invocation) -> Result<Self> {
        let marker = config.pbs_directive.clone();
        Self::with_directive(config, catalog, invocation, &marker)
    }

    pub fn with_directive(config: Arc<Config>, catalog: Arc<EventCatalog>, invocation: Invocation, marker: &str) -> Result<Self> {
        Ok(Self {
            job: Job::new(&config, &invocation),
            log: EventLog::new(catalog.clone(), EventContext::File),
            option_parser: OptionParser::new(config.clone(), catalog, invocation.clone()),
            config,
            invocation,
            matcher: DirectiveMatcher::new(marker)?,
            state: ParserState::Start,
            line_nr: 0,
            script_first_line_nr: None,
        })
    }

    pub fn parse_file(&mut self, file_path: impl AsRef<Path>) -> Result<()> {
        let file_path = file_path.as_ref();
        let text = read_script_file(file_path)?;
        self.reset();
        self.job.name = file_path.file_name().map(|name| name.to_string_lossy().into_owned());
        log::debug!("Parsing job script '{}'.", file_path.display());
        self.parse_text(&text)
    }

    /// Parses `text` as a new script. The job and events of a previous parse
    /// are discarded.
    pub fn parse_str(&mut self, text: &str) -> Result<()> {
        self.reset();
        self.parse_text(text)
    }

    fn reset(&mut self) {
        self.job = Job::new(&self.config, &self.invocation);
        self.log = EventLog::new(self.log.catalog().clone(), EventContext::File);
        self.state = ParserState::Start;
        self.line_nr = 0;
        self.script_first_line_nr = None;
    }

    fn parse_text(&mut self, text: &str) -> Result<()> {
        for (line, ending) in split_lines(text) {
            self.line_nr += 1;
            self.log.set_line(self.line_nr);
            self.check_encoding(line, ending)?;

            if self.matcher.is_comment(line) || line.trim().is_empty() {
                continue;
            }
            match self.state {
                ParserState::Start => self.parse_shebang(line)?,
                ParserState::Directives => self.parse_directive(line)?,
                ParserState::Script => self.parse_script(line)?,
            }
        }

        if self.state != ParserState::Script {
            self.log.register_plain(EventId::NoScript)?;
        }
        self.option_parser.apply_queue_walltime(&mut self.job);
        Ok(())
    }

    fn check_encoding(&mut self, line: &str, ending: LineEnding) -> Result<()> {
        if !line.is_ascii() {
            self.log.register_plain(EventId::NonAscii)?;
        }
        match ending {
            LineEnding::Dos => self.log.register_plain(EventId::DosFormat),
            LineEnding::Mac => self.log.register_plain(EventId::MacFormat),
            LineEnding::Unix | LineEnding::None => Ok(()),
        }
    }

    fn parse_shebang(&mut self, line: &str) -> Result<()> {
        self.state = ParserState::Directives;
        if DirectiveMatcher::is_shebang(line) {
            self.job.shebang = Some(line.trim().to_string());
            if self.line_nr > 1 {
                self.log.register_plain(EventId::MisplacedShebang)?;
            }
            Ok(())
        } else {
            self.log.register_plain(EventId::MissingShebang)?;
            self.parse_directive(line)
        }
    }

    fn parse_directive(&mut self, line: &str) -> Result<()> {
        if DirectiveMatcher::is_shebang(line) {
            return self.log.register_plain(EventId::MisplacedShebang);
        }
        if self.matcher.is_spaced(line) {
            return self.log.register_plain(EventId::SpaceInPbsDir);
        }
        if !self.matcher.is_directive(line) {
            log::debug!("Directive block ends at line {}.", self.line_nr);
            self.state = ParserState::Script;
            self.script_first_line_nr.get_or_insert(self.line_nr);
            return self.parse_script(line);
        }

        if self.matcher.is_indented(line) {
            self.log.register_plain(EventId::IndentedPbsDir)?;
        }
        match self.matcher.extract(line) {
            Some(option_line) if OPTION_START_RE.is_match(option_line) => {
                let events = self.option_parser.parse_args(&mut self.job, option_line)?;
                self.log.merge(events)
            }
            _ => self.log.register_plain(EventId::MalformedPbsDir),
        }
    }

    fn parse_script(&mut self, line: &str) -> Result<()> {
        if DirectiveMatcher::is_shebang(line) {
            self.log.register_plain(EventId::MisplacedShebang)?;
        }
        if self.matcher.is_directive(line) {
            self.log.register_plain(EventId::MisplacedPbsDir)?;
        }
        self.job.add_script_line(self.line_nr, line);
        Ok(())
    }

    pub fn job(&self) -> &Job {
        &self.job
    }

    pub fn into_job(self) -> Job {
        self.job
    }

    pub fn events(&self) -> &[Event] {
        self.log.events()
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Line number of the first body line, if the script has a body.
    pub fn script_first_line_nr(&self) -> Option<usize> {
        self.script_first_line_nr
    }
}
