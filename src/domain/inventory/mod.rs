pub mod cluster_inventory;
pub mod snapshot;

pub use cluster_inventory::ClusterInventory;
pub use snapshot::InventorySnapshot;
