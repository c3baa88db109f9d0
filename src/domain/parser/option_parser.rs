use std::collections::BTreeMap;
use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;

use crate::api::config_dto::Config;
use crate::domain::diagnostics::{Event, EventCatalog, EventContext, EventId, EventLog};
use crate::domain::job::{Invocation, Job, NodeSpec, NodeSpecIssue, SizeResource, TimeResource};
use crate::domain::utils::id::QueueName;
use crate::domain::utils::units::{size_to_bytes, walltime_to_seconds};
use crate::error::Result;

lazy_static! {
    // [[[[[CC]YY]MM]DD]hh]mm[.SS]
    static ref DATETIME_RE: Regex = Regex::new(r"^\s*(?:(?:(?:(?:(?:\d{2})?\d{2})?\d{2})?\d{2})?\d{2})?\d{4}(?:\.\d{2})?\s*$").unwrap();
    static ref IDENTIFIER_RE: Regex = Regex::new(r"^[A-Za-z]\w*$").unwrap();
    static ref JOB_NAME_RE: Regex = Regex::new(r"^[A-Za-z]\w{0,14}$").unwrap();
    static ref KEEP_RE: Regex = Regex::new(r"^[eo]+$").unwrap();
    static ref MAIL_EVENTS_RE: Regex = Regex::new(r"^[bea]+$").unwrap();
    static ref EMAIL_RE: Regex = Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*$"
    )
    .unwrap();
}

/// Options understood in a directive. The declaration order is the order
/// in which collected options are applied to the job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OptionKind {
    StartTime,
    Project,
    ErrorPath,
    Join,
    Keep,
    Resources,
    MailEvents,
    MailAddresses,
    JobName,
    OutputPath,
    Queue,
}

impl OptionKind {
    /// `-l` accumulates, every other option keeps its last value.
    pub fn is_repeatable(&self) -> bool {
        matches!(self, OptionKind::Resources)
    }
}

pub const OPTION_TABLE: &[(char, OptionKind)] = &[
    ('a', OptionKind::StartTime),
    ('A', OptionKind::Project),
    ('e', OptionKind::ErrorPath),
    ('j', OptionKind::Join),
    ('k', OptionKind::Keep),
    ('l', OptionKind::Resources),
    ('m', OptionKind::MailEvents),
    ('M', OptionKind::MailAddresses),
    ('N', OptionKind::JobName),
    ('o', OptionKind::OutputPath),
    ('q', OptionKind::Queue),
];

/// Resources understood by `-l`, selected by key prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Time(TimeResource),
    Size(SizeResource),
    Nodes,
    Procs,
    Partition,
    Feature,
    Qos,
}

pub const RESOURCE_TABLE: &[(&str, ResourceKind)] = &[
    ("walltime=", ResourceKind::Time(TimeResource::Walltime)),
    ("cput=", ResourceKind::Time(TimeResource::Cput)),
    ("pcput=", ResourceKind::Time(TimeResource::Pcput)),
    ("mem=", ResourceKind::Size(SizeResource::Mem)),
    ("pmem=", ResourceKind::Size(SizeResource::Pmem)),
    ("vmem=", ResourceKind::Size(SizeResource::Vmem)),
    ("pvmem=", ResourceKind::Size(SizeResource::Pvmem)),
    ("nodes=", ResourceKind::Nodes),
    ("procs=", ResourceKind::Procs),
    ("partition=", ResourceKind::Partition),
    ("feature", ResourceKind::Feature),
    ("qos", ResourceKind::Qos),
];

pub fn lookup_option(token: &str) -> Option<OptionKind> {
    let mut chars = token.chars();
    if chars.next() != Some('-') {
        return None;
    }
    let letter = chars.next()?;
    OPTION_TABLE.iter().find(|(option, _)| *option == letter).map(|(_, kind)| *kind)
}

pub fn lookup_resource(token: &str) -> Option<ResourceKind> {
    RESOURCE_TABLE.iter().find(|(prefix, _)| token.starts_with(prefix)).map(|(_, kind)| *kind)
}

/// Groups the values of a directive's options by kind.
///
/// A value is either glued to its letter (`-lwalltime=1:00:00`) or the next
/// token. Tokens that are not a known option, and options whose value is
/// missing, are skipped.
pub fn collect_options(option_line: &str) -> BTreeMap<OptionKind, Vec<String>> {
    let tokens: Vec<&str> = option_line.split_whitespace().collect();
    let mut options: BTreeMap<OptionKind, Vec<String>> = BTreeMap::new();

    let mut index = 0;
    while index < tokens.len() {
        let token = tokens[index];
        index += 1;

        let Some(kind) = lookup_option(token) else {
            continue;
        };

        let value = if token.len() > 2 {
            token[2..].to_string()
        } else if index < tokens.len() && !tokens[index].starts_with('-') {
            index += 1;
            tokens[index - 1].to_string()
        } else {
            continue;
        };

        let values = options.entry(kind).or_default();
        if !kind.is_repeatable() {
            values.clear();
        }
        values.push(value);
    }
    options
}

/// Parses the option part of a directive into contributions to a [`Job`].
#[derive(Debug)]
pub struct OptionParser {
    config: Arc<Config>,
    invocation: Invocation,
    log: EventLog,
}

impl OptionParser {
    pub fn new(config: Arc<Config>, catalog: Arc<EventCatalog>, invocation: Invocation) -> Self {
        Self { config, invocation, log: EventLog::new(catalog, EventContext::Global) }
    }

    /// Applies one directive's options to `job` and returns the problems
    /// found. Events carry no line; the caller attributes them.
    pub fn parse_args(&mut self, job: &mut Job, option_line: &str) -> Result<Vec<Event>> {
        self.log.take_events();

        for (kind, values) in collect_options(option_line) {
            match kind {
                OptionKind::Resources => self.check_resources(job, &values)?,
                _ => {
                    if let Some(value) = values.last() {
                        self.handle_option(job, kind, value.trim())?;
                    }
                }
            }
        }

        Ok(self.log.take_events())
    }

    /// Gives a job without an explicit walltime the ceiling of its queue.
    pub fn apply_queue_walltime(&self, job: &mut Job) {
        if job.is_time_limit_set {
            return;
        }
        let Some(queue) = &job.queue else {
            return;
        };
        if let Some(walltime_limit) = self.config.queue_walltime_limit(queue.as_str()) {
            log::debug!("No walltime requested, using limit {}s of queue {}.", walltime_limit, queue);
            job.resources.walltime = walltime_limit;
        }
    }

    fn handle_option(&mut self, job: &mut Job, kind: OptionKind, value: &str) -> Result<()> {
        match kind {
            OptionKind::StartTime => self.check_start_time(value),
            OptionKind::Project => self.check_project(job, value),
            OptionKind::ErrorPath => {
                let (host, path) = split_host_path(value);
                job.set_error(path, host);
                Ok(())
            }
            OptionKind::OutputPath => {
                let (host, path) = split_host_path(value);
                job.set_output(path, host);
                Ok(())
            }
            OptionKind::Join => self.check_join(job, value),
            OptionKind::Keep => self.check_keep(job, value),
            OptionKind::MailEvents => self.check_mail_events(job, value),
            OptionKind::MailAddresses => self.check_mail_addresses(job, value),
            OptionKind::JobName => self.check_job_name(job, value),
            OptionKind::Queue => self.check_queue(job, value),
            OptionKind::Resources => self.check_resources(job, &[value.to_string()]),
        }
    }

    fn check_start_time(&mut self, value: &str) -> Result<()> {
        if !DATETIME_RE.is_match(value) {
            self.log.register(EventId::InvalidDatetime, [("val", value.to_string())])?;
        }
        Ok(())
    }

    fn check_project(&mut self, job: &mut Job, value: &str) -> Result<()> {
        if IDENTIFIER_RE.is_match(value) {
            job.project = Some(value.to_string());
            Ok(())
        } else {
            self.log.register(EventId::InvalidProjectName, [("val", value.to_string())])
        }
    }

    fn check_queue(&mut self, job: &mut Job, value: &str) -> Result<()> {
        if IDENTIFIER_RE.is_match(value) {
            job.queue = Some(QueueName::new(value));
            Ok(())
        } else {
            self.log.register(EventId::InvalidQueueName, [("val", value.to_string())])
        }
    }

    fn check_job_name(&mut self, job: &mut Job, value: &str) -> Result<()> {
        if JOB_NAME_RE.is_match(value) {
            job.name = Some(value.to_string());
            Ok(())
        } else {
            self.log.register(EventId::InvalidJobName, [("val", value.to_string())])
        }
    }

    fn check_join(&mut self, job: &mut Job, value: &str) -> Result<()> {
        if matches!(value, "oe" | "eo" | "n") {
            job.io.join = value.to_string();
            Ok(())
        } else {
            self.log.register(EventId::InvalidJoin, [("val", value.to_string())])
        }
    }

    fn check_keep(&mut self, job: &mut Job, value: &str) -> Result<()> {
        if KEEP_RE.is_match(value) || value == "n" {
            job.io.keep = value.to_string();
            Ok(())
        } else {
            self.log.register(EventId::InvalidKeep, [("val", value.to_string())])
        }
    }

    fn check_mail_events(&mut self, job: &mut Job, value: &str) -> Result<()> {
        if MAIL_EVENTS_RE.is_match(value) || value == "n" {
            job.mail.events = value.to_string();
            Ok(())
        } else {
            self.log.register(EventId::InvalidMailEvent, [("val", value.to_string())])
        }
    }

    fn check_mail_addresses(&mut self, job: &mut Job, value: &str) -> Result<()> {
        job.mail.addresses = value.split(',').map(str::to_string).collect();
        for address in &job.mail.addresses {
            if !EMAIL_RE.is_match(address) && *address != self.invocation.user {
                self.log.register(EventId::InvalidMailAddress, [("address", address.clone())])?;
            }
        }
        Ok(())
    }

    fn check_resources(&mut self, job: &mut Job, values: &[String]) -> Result<()> {
        let mut procs_seen = false;

        for spec in values.iter().flat_map(|value| value.split(',')).map(str::trim).filter(|spec| !spec.is_empty()) {
            let kind = lookup_resource(spec);
            let value = spec.split_once('=').map(|(_, value)| value);

            match (kind, value) {
                (Some(ResourceKind::Time(resource)), Some(value)) => match walltime_to_seconds(value) {
                    Some(seconds) => {
                        job.resources.set_time(resource, seconds);
                        if resource == TimeResource::Walltime {
                            job.is_time_limit_set = true;
                        }
                    }
                    None => self.log.register(resource.format_event(), [("time", value.to_string())])?,
                },
                (Some(ResourceKind::Size(resource)), Some(value)) => match size_to_bytes(value) {
                    Some(bytes) => {
                        job.resources.set_size(resource, bytes);
                        if resource == SizeResource::Pmem {
                            job.has_default_pmem = false;
                        }
                    }
                    None => self.log.register(resource.format_event(), [("size", value.to_string())])?,
                },
                (Some(ResourceKind::Nodes), Some(value)) => {
                    let (node_specs, issues) = NodeSpec::parse_all(value);
                    job.resources.nodes = node_specs;
                    for issue in issues {
                        match issue {
                            NodeSpecIssue::PpnNoNumber(number) => self.log.register(EventId::PpnNoNumber, [("number", number)])?,
                            NodeSpecIssue::GpusNoNumber(number) => self.log.register(EventId::GpusNoNumber, [("number", number)])?,
                        }
                    }
                }
                (Some(ResourceKind::Procs), Some(value)) => {
                    if procs_seen {
                        self.log.register_plain(EventId::MultipleProcsSpecs)?;
                    }
                    procs_seen = true;
                    match value.parse::<u64>() {
                        Ok(procs) if value.bytes().all(|b| b.is_ascii_digit()) => job.resources.procs = Some(procs),
                        _ => self.log.register(EventId::NonIntegerProcs, [("procs", value.to_string())])?,
                    }
                }
                (Some(ResourceKind::Partition), Some(value)) => job.resources.partition = value.to_string(),
                (Some(ResourceKind::Feature), Some(value)) => {
                    job.resources.features = value.split(':').filter(|feature| !feature.is_empty()).map(str::to_string).collect();
                }
                (Some(ResourceKind::Qos), Some(value)) => job.resources.qos = value.to_string(),
                _ => self.log.register(EventId::UnknownResourceSpec, [("spec", spec.to_string())])?,
            }
        }
        Ok(())
    }
}

fn split_host_path(value: &str) -> (Option<&str>, &str) {
    match value.split_once(':') {
        Some((host, path)) => (Some(host), path),
        None => (None, value),
    }
}
