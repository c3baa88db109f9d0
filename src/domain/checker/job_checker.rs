use std::sync::Arc;

use crate::api::config_dto::Config;
use crate::domain::accounting::{balance_source_from_config, Account, BalanceSheetParser, BalanceSource, QuoteCalculator};
use crate::domain::checker::feasibility::{fit_node_mem, fit_ppn, uncovered_mem};
use crate::domain::diagnostics::{Event, EventCatalog, EventContext, EventId, EventLog};
use crate::domain::inventory::{ClusterInventory, InventorySnapshot};
use crate::domain::job::Job;
use crate::domain::utils::units::{bytes_to_size, SizeUnit};
use crate::error::{Error, Result};

/// Semantic checks of a parsed job against the cluster inventory and,
/// when enabled, the credit balance.
///
/// Every check only reads the inventory; histograms are copied per check.
#[derive(Debug)]
pub struct JobChecker {
    config: Arc<Config>,
    inventory: Box<dyn ClusterInventory>,
    balance_source: Box<dyn BalanceSource>,
    quote_calculator: QuoteCalculator,
    log: EventLog,
}

impl JobChecker {
    /// Opens the inventory named by `config.cluster_db`. Failing to open it
    /// is fatal.
    pub fn new(config: Arc<Config>, catalog: Arc<EventCatalog>) -> Result<Self> {
        let inventory = InventorySnapshot::open(&config.cluster_db)?;
        Ok(Self::with_inventory(config, catalog, Box::new(inventory)))
    }

    pub fn with_inventory(config: Arc<Config>, catalog: Arc<EventCatalog>, inventory: Box<dyn ClusterInventory>) -> Self {
        Self {
            balance_source: balance_source_from_config(&config),
            quote_calculator: QuoteCalculator::new(config.clone()),
            log: EventLog::new(catalog, EventContext::Global),
            inventory,
            config,
        }
    }

    pub fn with_balance_source(mut self, balance_source: Box<dyn BalanceSource>) -> Self {
        self.balance_source = balance_source;
        self
    }

    /// Runs all checks on `job`. Events of a previous run are discarded.
    pub fn check(&mut self, job: &Job) -> Result<()> {
        self.log.take_events();

        self.check_partition(job)?;
        self.check_ppn(job)?;
        self.check_qos(job)?;
        self.check_properties(job)?;
        self.check_features(job)?;
        self.check_total_pmem(job)?;
        self.check_mem(job)?;
        self.check_mem_vs_pmem(job)?;
        if self.config.check_accounting {
            self.check_credit_account(job)?;
        }
        Ok(())
    }

    pub fn events(&self) -> &[Event] {
        self.log.events()
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn into_events(self) -> Vec<Event> {
        self.log.into_events()
    }

    fn check_partition(&mut self, job: &Job) -> Result<()> {
        let partition = &job.resources.partition;
        let partitions = self.inventory.partitions();

        let Some(max_nodes) = partitions.get(partition) else {
            return self.log.register(EventId::UnknownPartition, [("partition", partition.clone())]);
        };
        let nodes = job.resources.total_nodes();
        if nodes > u64::from(*max_nodes) {
            self.log.register(EventId::InsufficientNodes, [("nodes", nodes.to_string()), ("max_nodes", max_nodes.to_string())])?;
        }
        Ok(())
    }

    fn check_ppn(&mut self, job: &Job) -> Result<()> {
        let mut histogram = self.inventory.ppn_histogram(&job.resources.partition);

        for node_spec in &job.resources.nodes {
            let Some(ppn) = node_spec.ppn else {
                continue;
            };
            if !fit_ppn(node_spec.count, ppn, &mut histogram).satisfied {
                self.log.register(EventId::InsufficientPpnNodes, [("ppn", ppn.to_string())])?;
            }
        }
        Ok(())
    }

    fn check_qos(&mut self, job: &Job) -> Result<()> {
        let qos = &job.resources.qos;
        if !self.inventory.qos_levels().contains(qos) {
            self.log.register(EventId::UnknownQos, [("qos", qos.clone())])?;
        }
        Ok(())
    }

    fn check_properties(&mut self, job: &Job) -> Result<()> {
        let known = self.inventory.properties();
        for node_spec in &job.resources.nodes {
            for property in node_spec.properties.iter().filter(|property| !known.contains(*property)) {
                self.log.register(EventId::UnknownProperty, [("property", property.clone())])?;
            }
        }
        Ok(())
    }

    fn check_features(&mut self, job: &Job) -> Result<()> {
        let known = self.inventory.features();
        for feature in job.resources.features.iter().filter(|feature| !known.contains(*feature)) {
            self.log.register(EventId::UnknownFeature, [("feature", feature.clone())])?;
        }
        Ok(())
    }

    /// Nodes must have more memory than `ppn * pmem`.
    fn check_total_pmem(&mut self, job: &Job) -> Result<()> {
        let Some(pmem) = job.resources.pmem else {
            return Ok(());
        };
        let mut histogram = self.inventory.mem_histogram(&job.resources.partition);

        for node_spec in &job.resources.nodes {
            let Some(ppn) = node_spec.ppn else {
                continue;
            };
            let node_mem = u64::from(ppn).saturating_mul(pmem);
            if !fit_node_mem(node_spec.count, node_mem, &mut histogram).satisfied {
                self.log.register(
                    EventId::InsufficientNodesMem,
                    [("mem", bytes_to_size(node_mem, SizeUnit::Gb)), ("nodes", node_spec.count.to_string())],
                )?;
            }
        }
        Ok(())
    }

    fn check_mem(&mut self, job: &Job) -> Result<()> {
        let Some(mem) = job.resources.mem else {
            return Ok(());
        };
        let histogram = self.inventory.mem_histogram(&job.resources.partition);
        let node_counts: Vec<u32> = job.resources.nodes.iter().map(|node_spec| node_spec.count).collect();

        if let Some(remaining) = uncovered_mem(mem, &node_counts, &histogram) {
            self.log.register(EventId::InsufficientMem, [("mem", bytes_to_size(remaining, SizeUnit::Gb))])?;
        }
        Ok(())
    }

    fn check_mem_vs_pmem(&mut self, job: &Job) -> Result<()> {
        if job.resources.mem.is_some() && !job.has_default_pmem {
            self.log.register_plain(EventId::BothMemPmemSpecs)?;
        }
        Ok(())
    }

    fn check_credit_account(&mut self, job: &Job) -> Result<()> {
        let Some(balance_sheet) = self.balance_source.fetch()? else {
            return Ok(());
        };
        let accounts = BalanceSheetParser::new(self.config.default_project.as_str()).parse(&balance_sheet)?;
        if accounts.is_empty() {
            return self.log.register_plain(EventId::NoCreditAccount);
        }

        let Some(account) = self.resolve_account(job, &accounts)? else {
            return Ok(());
        };
        log::debug!("Charging job to account '{}' ({}).", account.name, account.id);

        let partition = &job.resources.partition;
        if !self.inventory.partitions().contains_key(partition) {
            log::warn!("Partition '{}' is unknown, skipping credit check.", partition);
            return Ok(());
        }
        let credits = match self.quote_calculator.compute(job, self.inventory.as_ref()) {
            Ok(credits) => credits,
            Err(Error::UnknownNodeRate(node_type)) => {
                log::warn!("No credit rate for '{}', skipping credit check.", node_type);
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        if !account.can_afford(credits) {
            self.log.register(
                EventId::InsufficientCredits,
                [
                    ("account", account.name.clone()),
                    ("credits", format!("{:.2}", credits)),
                    ("available", format!("{:.2}", account.available)),
                ],
            )?;
        }
        Ok(())
    }

    /// Finds the account to charge, registering an event if there is none.
    fn resolve_account<'a>(&mut self, job: &Job, accounts: &'a [Account]) -> Result<Option<&'a Account>> {
        match &job.project {
            None => {
                let default_project = &self.config.default_project;
                let account = accounts.iter().find(|account| account.name.is_empty() || account.name == *default_project);
                if account.is_none() {
                    self.log.register_plain(EventId::NoDefaultCreditAccount)?;
                }
                Ok(account)
            }
            Some(project) => {
                let account = accounts.iter().find(|account| account.name == *project);
                if account.is_none() {
                    self.log.register(EventId::UnknownCreditAccount, [("account", project.clone())])?;
                }
                Ok(account)
            }
        }
    }
}
