mod common;

use std::io::Write;
use std::sync::Arc;

use common::{catalog, data_path, event_ids, parse, test_config, MockInventory};
use pbs_lint::api::config_dto::Config;
use pbs_lint::domain::accounting::StaticBalance;
use pbs_lint::domain::checker::JobChecker;
use pbs_lint::domain::diagnostics::{Event, EventId};
use pbs_lint::domain::job::Job;
use pbs_lint::error::Error;
use pbs_lint::{check_script, LintOutcome};

const GIB: u64 = 1024 * 1024 * 1024;

fn check_against(inventory: MockInventory, job: &Job) -> Vec<Event> {
    let mut checker = JobChecker::with_inventory(Arc::new(test_config()), catalog(), Box::new(inventory));
    checker.check(job).unwrap();
    checker.into_events()
}

fn check_file(name: &str, config: Config) -> LintOutcome {
    check_script(data_path(name), Arc::new(config), catalog(), common::invocation(), false).unwrap()
}

fn accounting_config() -> Config {
    let mut config = test_config();
    config.check_accounting = true;
    config.mock_balance = Some(data_path("test/gbalance.txt"));
    config
}

#[test]
fn test_partition_capacity() {
    let inventory = MockInventory::new("thinking").with_ppn(20, 10).with_mem(128 * GIB, 10);

    let (job, _) = parse("#!/bin/bash\n#PBS -l nodes=10:ppn=20\necho\n");
    assert!(check_against(inventory.clone(), &job).is_empty());

    let (job, _) = parse("#!/bin/bash\n#PBS -l nodes=12:ppn=20\necho\n");
    let events = check_against(inventory, &job);
    let insufficient: Vec<&Event> = events.iter().filter(|event| event.id == EventId::InsufficientNodes).collect();
    assert_eq!(insufficient.len(), 1);
    assert_eq!(insufficient[0].param("nodes"), Some("12"));
    assert_eq!(insufficient[0].param("max_nodes"), Some("10"));
    assert_eq!(insufficient[0].line, None);
}

#[test]
fn test_unknown_partition() {
    let (job, _) = parse("#!/bin/bash\n#PBS -l partition=gpu\necho\n");
    let events = check_against(MockInventory::new("thinking").with_ppn(20, 10), &job);
    assert_eq!(events[0].id, EventId::UnknownPartition);
    assert_eq!(events[0].param("partition"), Some("gpu"));
}

#[test]
fn test_ppn_feasibility() {
    let (job, _) = parse("#!/bin/bash\n#PBS -l nodes=2:ppn=4\necho\n");
    let inventory = MockInventory::new("thinking").with_ppn(4, 5).with_mem(64 * GIB, 5);
    assert!(check_against(inventory, &job).is_empty());

    let (job, _) = parse("#!/bin/bash\n#PBS -l nodes=2:ppn=64,pmem=1gb\necho\n");
    let inventory = MockInventory::new("thinking").with_ppn(36, 100).with_mem(192 * GIB, 100);
    let events = check_against(inventory, &job);
    assert_eq!(event_ids(&events), vec![EventId::InsufficientPpnNodes]);
    assert_eq!(events[0].param("ppn"), Some("64"));
}

#[test]
fn test_ppn_classes_are_shared_between_node_specs() {
    let (job, _) = parse("#!/bin/bash\n#PBS -l nodes=3:ppn=20+2:ppn=20\necho\n");
    let inventory = MockInventory::new("thinking").with_ppn(20, 4).with_mem(64 * GIB, 4);
    let events = check_against(inventory, &job);
    assert!(event_ids(&events).contains(&EventId::InsufficientPpnNodes));
}

#[test]
fn test_partly_used_ppn_class_keeps_its_remainder() {
    let (job, _) = parse("#!/bin/bash\n#PBS -l nodes=3:ppn=20+1:ppn=20\necho\n");
    let inventory = MockInventory::new("thinking").with_ppn(20, 4).with_mem(64 * GIB, 4);
    let events = check_against(inventory, &job);
    assert!(!event_ids(&events).contains(&EventId::InsufficientPpnNodes), "unexpected events: {:?}", events);
}

#[test]
fn test_mem_and_pmem_exclusion() {
    let inventory = MockInventory::new("thinking").with_ppn(20, 10).with_mem(64 * GIB, 10);

    let (job, _) = parse("#!/bin/bash\n#PBS -l mem=1gb,pmem=100mb\necho\n");
    let events = check_against(inventory.clone(), &job);
    assert_eq!(events.iter().filter(|event| event.id == EventId::BothMemPmemSpecs).count(), 1);

    let (job, _) = parse("#!/bin/bash\n#PBS -l mem=1gb\necho\n");
    let events = check_against(inventory, &job);
    assert!(!event_ids(&events).contains(&EventId::BothMemPmemSpecs));
}

#[test]
fn test_node_memory() {
    let inventory = MockInventory::new("thinking").with_ppn(20, 10).with_mem(64 * GIB, 10);
    let (job, _) = parse("#!/bin/bash\n#PBS -l nodes=2:ppn=20,pmem=4gb\necho\n");
    let events = check_against(inventory, &job);

    assert_eq!(event_ids(&events), vec![EventId::InsufficientNodesMem]);
    assert_eq!(events[0].param("mem"), Some("80gb"));
    assert_eq!(events[0].param("nodes"), Some("2"));
}

#[test]
fn test_total_memory() {
    let inventory = MockInventory::new("thinking").with_ppn(20, 10).with_mem(64 * GIB, 10);
    let (job, _) = parse("#!/bin/bash\n#PBS -l nodes=1:ppn=1,mem=100gb\necho\n");
    let events = check_against(inventory, &job);

    assert_eq!(event_ids(&events), vec![EventId::InsufficientMem]);
    assert_eq!(events[0].param("mem"), Some("36gb"));
}

#[test]
fn test_unknown_property_feature_and_qos() {
    let inventory = MockInventory::new("thinking").with_ppn(20, 10).with_mem(64 * GIB, 10).with_property("ivybridge");
    let (job, _) = parse("#!/bin/bash\n#PBS -l nodes=1:ppn=1:ivybridge:skylake,feature=gpu,qos=urgent\necho\n");
    let events = check_against(inventory, &job);

    assert_eq!(event_ids(&events), vec![EventId::UnknownQos, EventId::UnknownProperty, EventId::UnknownFeature]);
    assert_eq!(events[0].param("qos"), Some("urgent"));
    assert_eq!(events[1].param("property"), Some("skylake"));
    assert_eq!(events[2].param("feature"), Some("gpu"));
}

#[test]
fn test_checking_is_deterministic() {
    let (job, _) = parse("#!/bin/bash\n#PBS -l nodes=20:ppn=20,mem=1gb,pmem=100mb\necho\n");
    let inventory = MockInventory::new("thinking").with_ppn(20, 10).with_mem(64 * GIB, 10);
    let mut checker = JobChecker::with_inventory(Arc::new(test_config()), catalog(), Box::new(inventory));

    checker.check(&job).unwrap();
    let first = checker.events().to_vec();
    checker.check(&job).unwrap();
    assert_eq!(first, checker.events());
    assert!(!first.is_empty());
}

#[test]
fn test_infeasible_script_against_snapshot() {
    let outcome = check_file("test/infeasible.pbs", test_config());
    assert_eq!(
        event_ids(&outcome.events),
        vec![
            EventId::InsufficientNodes,
            EventId::InsufficientPpnNodes,
            EventId::UnknownQos,
            EventId::UnknownFeature,
            EventId::InsufficientNodesMem,
            EventId::BothMemPmemSpecs,
        ]
    );
    assert_eq!(outcome.events[0].param("max_nodes"), Some("16"));
    assert_eq!(outcome.events[4].param("mem"), Some("2gb"));
    assert_eq!(outcome.nr_errors(), 5);
    assert_eq!(outcome.nr_warnings(), 1);
}

#[test]
fn test_correct_script_with_accounting() {
    let outcome = check_file("test/correct.pbs", accounting_config());
    assert!(outcome.events.is_empty(), "unexpected events: {:?}", outcome.events);
}

#[test]
fn test_default_account_without_credits() {
    let script = std::fs::read_to_string(data_path("test/correct.pbs")).unwrap().replace("#PBS -A lp_qlint\n", "");
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(script.as_bytes()).unwrap();

    let outcome = check_script(file.path(), Arc::new(accounting_config()), catalog(), common::invocation(), false).unwrap();
    assert_eq!(event_ids(&outcome.events), vec![EventId::InsufficientCredits]);
    assert_eq!(outcome.events[0].param("account"), Some("default_project"));
}

#[test]
fn test_unknown_credit_account() {
    let (job, _) = parse("#!/bin/bash\n#PBS -A lp_other\n#PBS -l nodes=1:ppn=1\necho\n");
    let inventory = MockInventory::new("thinking").with_ppn(20, 10).with_mem(64 * GIB, 10).with_property("ivybridge");
    let mut config = accounting_config();
    config.node_type_credits.insert("ivybridge".to_string(), 1.0);
    let mut checker = JobChecker::with_inventory(Arc::new(config), catalog(), Box::new(inventory));

    checker.check(&job).unwrap();
    assert_eq!(event_ids(checker.events()), vec![EventId::UnknownCreditAccount]);
    assert_eq!(checker.events()[0].param("account"), Some("lp_other"));
}

#[test]
fn test_empty_balance_sheet() {
    let (job, _) = parse("#!/bin/bash\n#PBS -l nodes=1:ppn=1\necho\n");
    let inventory = MockInventory::new("thinking").with_ppn(20, 10).with_mem(64 * GIB, 10);
    let mut checker = JobChecker::with_inventory(Arc::new(accounting_config()), catalog(), Box::new(inventory))
        .with_balance_source(Box::new(StaticBalance("Id   Name Available Allocated\n---- ---- --------- ---------\n".to_string())));

    checker.check(&job).unwrap();
    assert_eq!(event_ids(checker.events()), vec![EventId::NoCreditAccount]);
}

#[test]
fn test_no_default_credit_account() {
    let (job, _) = parse("#!/bin/bash\n#PBS -l nodes=1:ppn=1\necho\n");
    let inventory = MockInventory::new("thinking").with_ppn(20, 10).with_mem(64 * GIB, 10);
    let balance = "Id   Name         Available Allocated\n---- ------------ --------- ---------\n1311 lp_h_biology 11696     15000\n";
    let mut checker = JobChecker::with_inventory(Arc::new(accounting_config()), catalog(), Box::new(inventory))
        .with_balance_source(Box::new(StaticBalance(balance.to_string())));

    checker.check(&job).unwrap();
    assert_eq!(event_ids(checker.events()), vec![EventId::NoDefaultCreditAccount]);
}

#[test]
fn test_failing_balance_command_skips_accounting() {
    let mut config = accounting_config();
    config.mock_balance = None;
    config.balance_cmd = "/nonexistent/gbalance".to_string();
    let outcome = check_file("test/correct.pbs", config);
    assert!(outcome.events.is_empty());
}

#[test]
fn test_unavailable_inventory_is_fatal() {
    let mut config = test_config();
    config.cluster_db = data_path("test/missing.json");
    let result = JobChecker::new(Arc::new(config), catalog());
    assert!(matches!(result, Err(Error::InventoryUnavailable(_))));
}

#[test]
fn test_unknown_partition_with_accounting() {
    let (job, _) = parse("#!/bin/bash\n#PBS -A lp_qlint\n#PBS -l nodes=1,partition=gpuu\necho\n");
    let inventory = MockInventory::new("thinking").with_ppn(20, 10).with_mem(64 * GIB, 10);
    let mut checker = JobChecker::with_inventory(Arc::new(accounting_config()), catalog(), Box::new(inventory));

    checker.check(&job).unwrap();
    assert_eq!(event_ids(checker.events()), vec![EventId::UnknownPartition]);
    assert_eq!(checker.events()[0].param("partition"), Some("gpuu"));
}

#[test]
fn test_missing_node_rate_skips_credit_check() {
    let (job, _) = parse("#!/bin/bash\n#PBS -A lp_qlint\n#PBS -l nodes=1,partition=gpu\necho\n");
    let inventory = MockInventory::new("gpu").with_ppn(20, 2).with_mem(64 * GIB, 2);
    let mut checker = JobChecker::with_inventory(Arc::new(accounting_config()), catalog(), Box::new(inventory));

    checker.check(&job).unwrap();
    assert!(checker.events().is_empty(), "unexpected events: {:?}", checker.events());
}
