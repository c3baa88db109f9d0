use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Site configuration of the checker.
///
/// Loaded once from JSON and shared read-only (`Arc<Config>`) by the
/// parsers, the checker and the quote calculator. Every field is optional
/// in the file.
#[derive(Debug, Deserialize, Clone, Serialize)]
#[serde(default)]
pub struct Config {
    pub default_partition: String,
    pub default_qos: String,

    /// Bytes per core.
    pub default_pmem: u64,
    pub default_nodes: u32,
    pub default_ppn: u32,

    /// Seconds.
    pub default_walltime: u64,
    pub default_queue: Option<String>,
    pub default_keep: String,
    pub default_join: String,
    pub default_mail_events: String,

    /// Account label used for balance rows without a name.
    pub default_project: String,

    /// Directive marker, `#PBS` unless the site uses another prefix.
    pub pbs_directive: String,

    /// Location of the cluster inventory snapshot.
    pub cluster_db: PathBuf,

    /// Credits per node-hour. Rates written per node-second must be
    /// multiplied by 3600.
    pub node_rate: f64,
    pub node_type_credits: BTreeMap<String, f64>,

    pub check_accounting: bool,
    pub mock_balance: Option<PathBuf>,
    pub balance_cmd: String,
    pub queue_definitions: Vec<QueueDefinition>,
}

#[derive(Debug, Deserialize, Clone, Serialize, PartialEq, Eq)]
pub struct QueueDefinition {
    pub name: String,

    /// Seconds.
    pub walltime_limit: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_partition: "thinking".to_string(),
            default_qos: "normal".to_string(),
            default_pmem: 5 * 1024 * 1024 * 1024,
            default_nodes: 1,
            default_ppn: 1,
            default_walltime: 3600,
            default_queue: None,
            default_keep: "n".to_string(),
            default_join: "n".to_string(),
            default_mail_events: "a".to_string(),
            default_project: "default_project".to_string(),
            pbs_directive: "#PBS".to_string(),
            cluster_db: PathBuf::from("cluster.json"),
            node_rate: 1.0,
            node_type_credits: BTreeMap::new(),
            check_accounting: false,
            mock_balance: None,
            balance_cmd: "gbalance".to_string(),
            queue_definitions: Vec::new(),
        }
    }
}

impl Config {
    /// Walltime ceiling of the named queue, if the queue is configured.
    pub fn queue_walltime_limit(&self, queue_name: &str) -> Option<u64> {
        self.queue_definitions.iter().find(|queue| queue.name == queue_name).map(|queue| queue.walltime_limit)
    }
}
