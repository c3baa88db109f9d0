use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::api::config_dto::Config;
use crate::domain::job::invocation::Invocation;
use crate::domain::job::resource_specs::ResourceSpecs;
use crate::domain::utils::id::QueueName;
use crate::domain::utils::units::seconds_to_walltime;

/// Where a job's output or error stream ends up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IoTarget {
    pub host: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IoSpecs {
    pub join: String,
    pub keep: String,
    pub error: IoTarget,
    pub output: IoTarget,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailSpecs {
    pub events: String,
    pub addresses: Vec<String>,
}

/// A job as described by a submission script.
///
/// Starts out with the site defaults and is filled in by the parsers, one
/// directive at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub name: Option<String>,
    pub project: Option<String>,
    pub queue: Option<QueueName>,
    pub shebang: Option<String>,
    pub resources: ResourceSpecs,
    pub io: IoSpecs,
    pub mail: MailSpecs,

    /// False once an explicit `pmem=` has been parsed.
    pub has_default_pmem: bool,

    /// True once an explicit `walltime=` has been parsed.
    pub is_time_limit_set: bool,

    script: Vec<(usize, String)>,
}

impl Job {
    pub fn new(config: &Config, invocation: &Invocation) -> Self {
        let default_target = IoTarget { host: invocation.host.clone(), path: invocation.cwd.clone() };

        Self {
            name: None,
            project: None,
            queue: config.default_queue.as_deref().map(QueueName::new),
            shebang: None,
            resources: ResourceSpecs::from_config(config),
            io: IoSpecs {
                join: config.default_join.clone(),
                keep: config.default_keep.clone(),
                error: default_target.clone(),
                output: default_target,
            },
            mail: MailSpecs { events: config.default_mail_events.clone(), addresses: vec![invocation.user.clone()] },
            has_default_pmem: true,
            is_time_limit_set: false,
            script: Vec::new(),
        }
    }

    pub fn set_error(&mut self, path: &str, host: Option<&str>) {
        Self::redirect(&mut self.io.error, path, host);
    }

    pub fn set_output(&mut self, path: &str, host: Option<&str>) {
        Self::redirect(&mut self.io.output, path, host);
    }

    // Relative paths are taken relative to the path recorded so far.
    fn redirect(target: &mut IoTarget, path: &str, host: Option<&str>) {
        let path = Path::new(path);
        target.path = if path.is_absolute() { path.to_path_buf() } else { target.path.join(path) };
        if let Some(host) = host {
            target.host = host.to_string();
        }
    }

    pub fn add_script_line(&mut self, line_nr: usize, line: &str) {
        self.script.push((line_nr, line.to_string()));
    }

    pub fn script_lines(&self) -> &[(usize, String)] {
        &self.script
    }

    /// The command part of the script.
    pub fn script(&self) -> String {
        self.script.iter().map(|(_, line)| line.as_str()).collect::<Vec<_>>().join("\n")
    }

    /// Multi-line dump of the job's attributes, for debugging.
    pub fn attrs_to_string(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "name = '{}'", self.name.as_deref().unwrap_or("None"));
        let _ = writeln!(out, "project = '{}'", self.project.as_deref().unwrap_or("None"));
        let _ = writeln!(out, "resources:");
        let resources = &self.resources;
        let _ = writeln!(out, "\twalltime = '{}'", seconds_to_walltime(resources.walltime));
        for (key, value) in [
            ("cput", resources.cput),
            ("pcput", resources.pcput),
            ("mem", resources.mem),
            ("pmem", resources.pmem),
            ("vmem", resources.vmem),
            ("pvmem", resources.pvmem),
            ("procs", resources.procs),
        ] {
            if let Some(value) = value {
                let _ = writeln!(out, "\t{} = '{}'", key, value);
            }
        }
        for node_spec in &resources.nodes {
            let _ = writeln!(
                out,
                "\tnodes = '{}' ppn = '{}' gpus = '{}' properties = '{}'",
                node_spec.count,
                node_spec.ppn.map(|ppn| ppn.to_string()).unwrap_or_default(),
                node_spec.gpus.map(|gpus| gpus.to_string()).unwrap_or_default(),
                node_spec.properties.join(":")
            );
        }
        let _ = writeln!(out, "\tpartition = '{}'", resources.partition);
        let _ = writeln!(out, "\tqos = '{}'", resources.qos);
        if !resources.features.is_empty() {
            let features: Vec<&str> = resources.features.iter().map(String::as_str).collect();
            let _ = writeln!(out, "\tfeatures = '{}'", features.join(":"));
        }
        let _ = writeln!(out, "queue = {}", self.queue.as_ref().map(|queue| queue.to_string()).unwrap_or_else(|| "None".to_string()));
        let _ = writeln!(out, "I/O:");
        let _ = writeln!(out, "\tjoin = '{}'", self.io.join);
        let _ = writeln!(out, "\tkeep = '{}'", self.io.keep);
        let _ = writeln!(out, "\terror = '{}:{}'", self.io.error.host, self.io.error.path.display());
        let _ = writeln!(out, "\toutput = '{}:{}'", self.io.output.host, self.io.output.path.display());
        let _ = writeln!(out, "mail:");
        let _ = writeln!(out, "\tevents = '{}'", self.mail.events);
        let _ = write!(out, "\taddresses = '{}'", self.mail.addresses.join(","));
        out
    }
}
