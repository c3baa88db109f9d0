use std::collections::{BTreeMap, BTreeSet};

/// Read-only view of the cluster the checker validates jobs against.
///
/// Histograms are returned by value so callers can consume them freely.
pub trait ClusterInventory: std::fmt::Debug {
    /// Partition name to number of nodes.
    fn partitions(&self) -> BTreeMap<String, u32>;

    /// Cores per node to number of nodes, for one partition.
    fn ppn_histogram(&self, partition: &str) -> BTreeMap<u32, u32>;

    /// Memory per node in bytes to number of nodes, for one partition.
    fn mem_histogram(&self, partition: &str) -> BTreeMap<u64, u32>;

    fn qos_levels(&self) -> BTreeSet<String>;

    fn features(&self) -> BTreeSet<String>;

    fn properties(&self) -> BTreeSet<String>;

    /// Properties of the nodes in one partition.
    fn partition_properties(&self, partition: &str) -> BTreeSet<String>;
}
