use std::sync::Arc;

use crate::api::config_dto::Config;
use crate::domain::inventory::ClusterInventory;
use crate::domain::job::{Job, NodeSpec};
use crate::error::{Error, Result};

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Computes what a job costs in credits.
///
/// The rate of a node spec is the highest configured rate among the
/// properties it may run on, so the quote errs on the expensive side.
#[derive(Debug, Clone)]
pub struct QuoteCalculator {
    config: Arc<Config>,
}

impl QuoteCalculator {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    /// Credits for `job`: node-hours weighted by node type rate, times
    /// the global `node_rate`.
    pub fn compute(&self, job: &Job, inventory: &dyn ClusterInventory) -> Result<f64> {
        let partition = &job.resources.partition;
        let mut node_credits = 0.0;

        for node_spec in &job.resources.nodes {
            let rate = self.node_type_rate(node_spec, partition, inventory)?;
            node_credits += f64::from(node_spec.count) * rate;
        }

        let hours = job.resources.walltime as f64 / SECONDS_PER_HOUR;
        let cost = node_credits * hours * self.config.node_rate;
        log::debug!("Quote for partition '{}': {:.2} credits.", partition, cost);
        Ok(cost)
    }

    fn node_type_rate(&self, node_spec: &NodeSpec, partition: &str, inventory: &dyn ClusterInventory) -> Result<f64> {
        let node_types: Vec<String> = if node_spec.properties.is_empty() {
            inventory.partition_properties(partition).into_iter().collect()
        } else {
            node_spec.properties.clone()
        };

        let type_costs = &self.config.node_type_credits;
        let rate = node_types.iter().filter_map(|node_type| type_costs.get(node_type)).copied().reduce(f64::max);

        match rate {
            Some(rate) => Ok(rate),
            None => type_costs.get(partition).copied().ok_or_else(|| Error::UnknownNodeRate(partition.to_string())),
        }
    }
}
