use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::api::event_catalog_dto::EventCategoryDto;

/// Named template parameters of an event.
pub type Extra = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    /// Single letter tag used in reports.
    pub fn tag(&self) -> &'static str {
        match self {
            Severity::Error => "E",
            Severity::Warning => "W",
        }
    }
}

impl From<EventCategoryDto> for Severity {
    fn from(category: EventCategoryDto) -> Self {
        match category {
            EventCategoryDto::Error => Severity::Error,
            EventCategoryDto::Warning => Severity::Warning,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventId {
    // Encoding and layout
    NonAscii,
    DosFormat,
    MacFormat,
    MissingShebang,
    MisplacedShebang,
    SpaceInPbsDir,
    IndentedPbsDir,
    MalformedPbsDir,
    MisplacedPbsDir,
    NoScript,

    // Option values
    InvalidDatetime,
    InvalidProjectName,
    InvalidQueueName,
    InvalidJobName,
    InvalidJoin,
    InvalidKeep,
    InvalidMailEvent,
    InvalidMailAddress,
    InvalidWalltimeFormat,
    InvalidCputFormat,
    InvalidPcputFormat,
    InvalidMemFormat,
    InvalidPmemFormat,
    InvalidVmemFormat,
    InvalidPvmemFormat,
    PpnNoNumber,
    GpusNoNumber,
    MultipleProcsSpecs,
    NonIntegerProcs,
    UnknownResourceSpec,

    // Semantics
    UnknownPartition,
    InsufficientNodes,
    UnknownProperty,
    UnknownFeature,
    UnknownQos,
    InsufficientPpnNodes,
    InsufficientNodesMem,
    InsufficientMem,
    BothMemPmemSpecs,

    // Accounting
    NoCreditAccount,
    NoDefaultCreditAccount,
    UnknownCreditAccount,
    InsufficientCredits,
}

impl EventId {
    /// Key of this event in the catalog.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventId::NonAscii => "non_ascii",
            EventId::DosFormat => "dos_format",
            EventId::MacFormat => "mac_format",
            EventId::MissingShebang => "missing_shebang",
            EventId::MisplacedShebang => "misplaced_shebang",
            EventId::SpaceInPbsDir => "space_in_pbs_dir",
            EventId::IndentedPbsDir => "indented_pbs_dir",
            EventId::MalformedPbsDir => "malformed_pbs_dir",
            EventId::MisplacedPbsDir => "misplaced_pbs_dir",
            EventId::NoScript => "no_script",
            EventId::InvalidDatetime => "invalid_datetime",
            EventId::InvalidProjectName => "invalid_project_name",
            EventId::InvalidQueueName => "invalid_queue_name",
            EventId::InvalidJobName => "invalid_job_name",
            EventId::InvalidJoin => "invalid_join",
            EventId::InvalidKeep => "invalid_keep",
            EventId::InvalidMailEvent => "invalid_mail_event",
            EventId::InvalidMailAddress => "invalid_mail_address",
            EventId::InvalidWalltimeFormat => "invalid_walltime_format",
            EventId::InvalidCputFormat => "invalid_cput_format",
            EventId::InvalidPcputFormat => "invalid_pcput_format",
            EventId::InvalidMemFormat => "invalid_mem_format",
            EventId::InvalidPmemFormat => "invalid_pmem_format",
            EventId::InvalidVmemFormat => "invalid_vmem_format",
            EventId::InvalidPvmemFormat => "invalid_pvmem_format",
            EventId::PpnNoNumber => "ppn_no_number",
            EventId::GpusNoNumber => "gpus_no_number",
            EventId::MultipleProcsSpecs => "multiple_procs_specs",
            EventId::NonIntegerProcs => "non_integer_procs",
            EventId::UnknownResourceSpec => "unknown_resource_spec",
            EventId::UnknownPartition => "unknown_partition",
            EventId::InsufficientNodes => "insufficient_nodes",
            EventId::UnknownProperty => "unknown_property",
            EventId::UnknownFeature => "unknown_feature",
            EventId::UnknownQos => "unknown_qos",
            EventId::InsufficientPpnNodes => "insufficient_ppn_nodes",
            EventId::InsufficientNodesMem => "insufficient_nodes_mem",
            EventId::InsufficientMem => "insufficient_mem",
            EventId::BothMemPmemSpecs => "both_mem_pmem_specs",
            EventId::NoCreditAccount => "no_credit_account",
            EventId::NoDefaultCreditAccount => "no_default_credit_account",
            EventId::UnknownCreditAccount => "unknown_credit_account",
            EventId::InsufficientCredits => "insufficient_credits",
        }
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single diagnostic. Immutable once registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub id: EventId,

    /// Script line, only set for events raised while reading a file.
    pub line: Option<usize>,
    pub severity: Severity,
    pub extra: Extra,
}

impl Event {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }

    /// Value of a named parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.extra.get(name).map(String::as_str)
    }
}
