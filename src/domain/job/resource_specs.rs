use std::collections::BTreeSet;

use serde::Serialize;

use crate::api::config_dto::Config;
use crate::domain::diagnostics::EventId;
use crate::domain::job::node_spec::NodeSpec;

/// Time limits accepted by `-l`, all in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeResource {
    Walltime,
    Cput,
    Pcput,
}

impl TimeResource {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Walltime => "walltime",
            Self::Cput => "cput",
            Self::Pcput => "pcput",
        }
    }

    pub fn format_event(&self) -> EventId {
        match self {
            Self::Walltime => EventId::InvalidWalltimeFormat,
            Self::Cput => EventId::InvalidCputFormat,
            Self::Pcput => EventId::InvalidPcputFormat,
        }
    }
}

/// Memory limits accepted by `-l`, all in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeResource {
    Mem,
    Pmem,
    Vmem,
    Pvmem,
}

impl SizeResource {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Mem => "mem",
            Self::Pmem => "pmem",
            Self::Vmem => "vmem",
            Self::Pvmem => "pvmem",
        }
    }

    pub fn format_event(&self) -> EventId {
        match self {
            Self::Mem => EventId::InvalidMemFormat,
            Self::Pmem => EventId::InvalidPmemFormat,
            Self::Vmem => EventId::InvalidVmemFormat,
            Self::Pvmem => EventId::InvalidPvmemFormat,
        }
    }
}

/// Resources requested by a job. Each key is last-write-wins; `nodes` is
/// only ever replaced as a whole.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceSpecs {
    pub walltime: u64,
    pub cput: Option<u64>,
    pub pcput: Option<u64>,
    pub mem: Option<u64>,
    pub pmem: Option<u64>,
    pub vmem: Option<u64>,
    pub pvmem: Option<u64>,
    pub procs: Option<u64>,
    pub nodes: Vec<NodeSpec>,
    pub partition: String,
    pub qos: String,
    pub features: BTreeSet<String>,
}

impl ResourceSpecs {
    pub fn from_config(config: &Config) -> Self {
        let mut default_node = NodeSpec::new(config.default_nodes);
        default_node.ppn = Some(config.default_ppn);

        Self {
            walltime: config.default_walltime,
            cput: None,
            pcput: None,
            mem: None,
            pmem: Some(config.default_pmem),
            vmem: None,
            pvmem: None,
            procs: None,
            nodes: vec![default_node],
            partition: config.default_partition.clone(),
            qos: config.default_qos.clone(),
            features: BTreeSet::new(),
        }
    }

    pub fn time(&self, resource: TimeResource) -> Option<u64> {
        match resource {
            TimeResource::Walltime => Some(self.walltime),
            TimeResource::Cput => self.cput,
            TimeResource::Pcput => self.pcput,
        }
    }

    pub fn set_time(&mut self, resource: TimeResource, seconds: u64) {
        match resource {
            TimeResource::Walltime => self.walltime = seconds,
            TimeResource::Cput => self.cput = Some(seconds),
            TimeResource::Pcput => self.pcput = Some(seconds),
        }
    }

    pub fn size(&self, resource: SizeResource) -> Option<u64> {
        match resource {
            SizeResource::Mem => self.mem,
            SizeResource::Pmem => self.pmem,
            SizeResource::Vmem => self.vmem,
            SizeResource::Pvmem => self.pvmem,
        }
    }

    pub fn set_size(&mut self, resource: SizeResource, bytes: u64) {
        let slot = match resource {
            SizeResource::Mem => &mut self.mem,
            SizeResource::Pmem => &mut self.pmem,
            SizeResource::Vmem => &mut self.vmem,
            SizeResource::Pvmem => &mut self.pvmem,
        };
        *slot = Some(bytes);
    }

    /// Total number of nodes over all node specs.
    pub fn total_nodes(&self) -> u64 {
        self.nodes.iter().map(|node_spec| u64::from(node_spec.count)).sum()
    }
}
