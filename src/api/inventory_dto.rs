use serde::{Deserialize, Serialize};

/// Snapshot of the cluster as exported by the node-status tooling.
#[derive(Debug, Deserialize, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct InventoryDto {
    pub nodes: Vec<InventoryNodeDto>,
    #[serde(default)]
    pub qos_levels: Vec<String>,
}

#[derive(Debug, Deserialize, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryNodeDto {
    pub hostname: String,
    pub partition: String,

    /// Number of cores.
    pub np: u32,
    #[serde(default)]
    pub gpus: u32,

    /// Bytes.
    pub mem: u64,
    #[serde(default)]
    pub properties: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
}
