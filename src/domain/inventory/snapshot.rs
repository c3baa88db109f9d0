use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::api::inventory_dto::{InventoryDto, InventoryNodeDto};
use crate::domain::inventory::cluster_inventory::ClusterInventory;
use crate::error::{Error, Result};
use crate::loader::parser::parse_json_file;

/// Inventory loaded from a JSON node listing.
#[derive(Debug, Clone, Default)]
pub struct InventorySnapshot {
    nodes: Vec<InventoryNodeDto>,
    qos_levels: BTreeSet<String>,
}

impl InventorySnapshot {
    pub fn new(dto: InventoryDto) -> Self {
        Self { nodes: dto.nodes, qos_levels: dto.qos_levels.into_iter().collect() }
    }

    /// Opens the inventory at `file_path`. Any failure is reported as
    /// [`Error::InventoryUnavailable`].
    pub fn open(file_path: impl AsRef<Path>) -> Result<Self> {
        let file_path = file_path.as_ref();
        let dto: InventoryDto = parse_json_file(file_path)
            .map_err(|e| Error::InventoryUnavailable(format!("{}: {}", file_path.display(), e)))?;

        log::debug!("Loaded inventory '{}' with {} nodes.", file_path.display(), dto.nodes.len());
        Ok(Self::new(dto))
    }

    pub fn nr_nodes(&self) -> usize {
        self.nodes.len()
    }

    fn partition_nodes<'a>(&'a self, partition: &'a str) -> impl Iterator<Item = &'a InventoryNodeDto> + 'a {
        self.nodes.iter().filter(move |node| node.partition == partition)
    }
}

impl ClusterInventory for InventorySnapshot {
    fn partitions(&self) -> BTreeMap<String, u32> {
        let mut partitions = BTreeMap::new();
        for node in &self.nodes {
            *partitions.entry(node.partition.clone()).or_insert(0) += 1;
        }
        partitions
    }

    fn ppn_histogram(&self, partition: &str) -> BTreeMap<u32, u32> {
        let mut histogram = BTreeMap::new();
        for node in self.partition_nodes(partition) {
            *histogram.entry(node.np).or_insert(0) += 1;
        }
        histogram
    }

    fn mem_histogram(&self, partition: &str) -> BTreeMap<u64, u32> {
        let mut histogram = BTreeMap::new();
        for node in self.partition_nodes(partition) {
            *histogram.entry(node.mem).or_insert(0) += 1;
        }
        histogram
    }

    fn qos_levels(&self) -> BTreeSet<String> {
        self.qos_levels.clone()
    }

    fn features(&self) -> BTreeSet<String> {
        self.nodes.iter().flat_map(|node| node.features.iter().cloned()).collect()
    }

    fn properties(&self) -> BTreeSet<String> {
        self.nodes.iter().flat_map(|node| node.properties.iter().cloned()).collect()
    }

    fn partition_properties(&self, partition: &str) -> BTreeSet<String> {
        self.partition_nodes(partition).flat_map(|node| node.properties.iter().cloned()).collect()
    }
}
