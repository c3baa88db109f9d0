#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::Arc;

use pbs_lint::api::config_dto::Config;
use pbs_lint::domain::diagnostics::{Event, EventCatalog, EventId};
use pbs_lint::domain::inventory::ClusterInventory;
use pbs_lint::domain::job::{Invocation, Job};
use pbs_lint::domain::parser::ScriptParser;
use pbs_lint::load_config;

pub fn data_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data").join(relative)
}

/// Site configuration of the test cluster, with the inventory path made
/// absolute.
pub fn test_config() -> Config {
    let mut config = load_config(data_path("config.json")).unwrap();
    config.cluster_db = data_path("test/cluster.json");
    config
}

pub fn catalog() -> Arc<EventCatalog> {
    Arc::new(EventCatalog::from_file(data_path("events.json")).unwrap())
}

pub fn invocation() -> Invocation {
    Invocation::new("vsc30140", "login1", "/user/leuven/301/vsc30140")
}

pub fn parse_with(config: Config, script: &str) -> (Job, Vec<Event>) {
    let mut parser = ScriptParser::new(Arc::new(config), catalog(), invocation()).unwrap();
    parser.parse_str(script).unwrap();
    let events = parser.events().to_vec();
    (parser.into_job(), events)
}

pub fn parse(script: &str) -> (Job, Vec<Event>) {
    parse_with(test_config(), script)
}

pub fn event_ids(events: &[Event]) -> Vec<EventId> {
    events.iter().map(|event| event.id).collect()
}

/// Inventory of a single partition, built by hand.
#[derive(Debug, Clone, Default)]
pub struct MockInventory {
    pub partition: String,
    pub ppn: BTreeMap<u32, u32>,
    pub mem: BTreeMap<u64, u32>,
    pub qos_levels: BTreeSet<String>,
    pub features: BTreeSet<String>,
    pub properties: BTreeSet<String>,
}

impl MockInventory {
    pub fn new(partition: &str) -> MockInventory {
        MockInventory { partition: partition.to_string(), qos_levels: BTreeSet::from(["normal".to_string()]), ..Default::default() }
    }

    pub fn with_ppn(mut self, ppn: u32, nodes: u32) -> MockInventory {
        self.ppn.insert(ppn, nodes);
        self
    }

    pub fn with_mem(mut self, mem: u64, nodes: u32) -> MockInventory {
        self.mem.insert(mem, nodes);
        self
    }

    pub fn with_property(mut self, property: &str) -> MockInventory {
        self.properties.insert(property.to_string());
        self
    }
}

impl ClusterInventory for MockInventory {
    fn partitions(&self) -> BTreeMap<String, u32> {
        BTreeMap::from([(self.partition.clone(), self.ppn.values().sum())])
    }

    fn ppn_histogram(&self, partition: &str) -> BTreeMap<u32, u32> {
        if partition == self.partition { self.ppn.clone() } else { BTreeMap::new() }
    }

    fn mem_histogram(&self, partition: &str) -> BTreeMap<u64, u32> {
        if partition == self.partition { self.mem.clone() } else { BTreeMap::new() }
    }

    fn qos_levels(&self) -> BTreeSet<String> {
        self.qos_levels.clone()
    }

    fn features(&self) -> BTreeSet<String> {
        self.features.clone()
    }

    fn properties(&self) -> BTreeSet<String> {
        self.properties.clone()
    }

    fn partition_properties(&self, partition: &str) -> BTreeSet<String> {
        if partition == self.partition { self.properties.clone() } else { BTreeSet::new() }
    }
}
