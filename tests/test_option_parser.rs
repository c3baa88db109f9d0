mod common;

use std::path::PathBuf;
use std::sync::Arc;

use common::{catalog, event_ids, invocation, test_config};
use pbs_lint::domain::diagnostics::{Event, EventId};
use pbs_lint::domain::job::Job;
use pbs_lint::domain::parser::OptionParser;

fn apply(option_lines: &[&str]) -> (Job, Vec<Event>) {
    let config = Arc::new(test_config());
    let mut job = Job::new(&config, &invocation());
    let mut parser = OptionParser::new(config, catalog(), invocation());
    let mut events = Vec::new();
    for option_line in option_lines {
        events.extend(parser.parse_args(&mut job, option_line).unwrap());
    }
    (job, events)
}

#[test]
fn test_size_grammar() {
    let (job, events) = apply(&["-l mem=4kb"]);
    assert!(events.is_empty());
    assert_eq!(job.resources.mem, Some(4096));

    let (job, _) = apply(&["-l mem=12tw"]);
    assert_eq!(job.resources.mem, Some(13194139533312));

    let (job, events) = apply(&["-l mem=bogus"]);
    assert_eq!(event_ids(&events), vec![EventId::InvalidMemFormat]);
    assert_eq!(events[0].line, None);
    assert_eq!(job.resources.mem, None);
}

#[test]
fn test_resources_accumulate_over_directives() {
    let (job, events) = apply(&["-l nodes=2:ppn=4:ivybridge -l walltime=72:00:00", "-l vmem=8gb,pvmem=1gb -l cput=10:00"]);
    assert!(events.is_empty(), "unexpected events: {:?}", events);
    assert_eq!(job.resources.total_nodes(), 2);
    assert_eq!(job.resources.nodes[0].properties, vec!["ivybridge".to_string()]);
    assert_eq!(job.resources.walltime, 72 * 3600);
    assert_eq!(job.resources.vmem, Some(8 * 1024 * 1024 * 1024));
    assert_eq!(job.resources.pvmem, Some(1024 * 1024 * 1024));
    assert_eq!(job.resources.cput, Some(600));
}

#[test]
fn test_nodes_are_replaced_not_merged() {
    let (job, _) = apply(&["-l nodes=2:ppn=4+1:ppn=20", "-l nodes=3"]);
    assert_eq!(job.resources.nodes.len(), 1);
    assert_eq!(job.resources.nodes[0].count, 3);
    assert_eq!(job.resources.nodes[0].ppn, None);
}

#[test]
fn test_failed_walltime_does_not_set_time_limit() {
    let (job, events) = apply(&["-l walltime=1:2:3"]);
    assert_eq!(event_ids(&events), vec![EventId::InvalidWalltimeFormat]);
    assert_eq!(events[0].param("time"), Some("1:2:3"));
    assert!(!job.is_time_limit_set);
    assert_eq!(job.resources.walltime, test_config().default_walltime);
}

#[test]
fn test_failed_pmem_keeps_default_flag() {
    let (job, events) = apply(&["-l pmem=2 gb"]);
    assert_eq!(event_ids(&events), vec![EventId::InvalidPmemFormat]);
    assert!(job.has_default_pmem);

    let (job, _) = apply(&["-l pmem=2gb"]);
    assert!(!job.has_default_pmem);
}

#[test]
fn test_procs() {
    let (job, events) = apply(&["-l procs=4,procs=8"]);
    assert_eq!(event_ids(&events), vec![EventId::MultipleProcsSpecs]);
    assert_eq!(job.resources.procs, Some(8));

    let (_, events) = apply(&["-l procs=4", "-l procs=8"]);
    assert!(events.is_empty());

    let (_, events) = apply(&["-l procs=four"]);
    assert_eq!(event_ids(&events), vec![EventId::NonIntegerProcs]);
}

#[test]
fn test_partition_qos_and_features() {
    let (job, events) = apply(&["-l partition=superdome,qos=debugging,feature=mem128:numa"]);
    assert!(events.is_empty());
    assert_eq!(job.resources.partition, "superdome");
    assert_eq!(job.resources.qos, "debugging");
    assert_eq!(job.resources.features.iter().map(String::as_str).collect::<Vec<_>>(), vec!["mem128", "numa"]);
}

#[test]
fn test_gpus_no_number() {
    let (job, events) = apply(&["-l nodes=1:ppn=9:gpus=all"]);
    assert_eq!(event_ids(&events), vec![EventId::GpusNoNumber]);
    assert_eq!(events[0].param("number"), Some("all"));
    assert_eq!(job.resources.nodes[0].gpus, None);
}

#[test]
fn test_value_options() {
    let (job, events) = apply(&["-A lp_qlint -q q1h -N my_job -j eo -k oe -m bea"]);
    assert!(events.is_empty(), "unexpected events: {:?}", events);
    assert_eq!(job.project.as_deref(), Some("lp_qlint"));
    assert_eq!(job.queue.as_ref().map(|queue| queue.as_str()), Some("q1h"));
    assert_eq!(job.name.as_deref(), Some("my_job"));
    assert_eq!(job.io.join, "eo");
    assert_eq!(job.io.keep, "oe");
    assert_eq!(job.mail.events, "bea");
}

#[test]
fn test_invalid_value_options() {
    let (job, events) = apply(&["-A 1project -q my-queue -N this_name_is_too_long -j x -k y -m z -a 12:00"]);
    assert_eq!(
        event_ids(&events),
        vec![
            EventId::InvalidDatetime,
            EventId::InvalidProjectName,
            EventId::InvalidJoin,
            EventId::InvalidKeep,
            EventId::InvalidMailEvent,
            EventId::InvalidJobName,
            EventId::InvalidQueueName,
        ]
    );
    assert_eq!(job.project, None);
    assert_eq!(job.io.join, "n");
}

#[test]
fn test_mail_addresses() {
    let (job, events) = apply(&["-M someone@kuleuven.be,vsc30140,not-an-address"]);
    assert_eq!(event_ids(&events), vec![EventId::InvalidMailAddress]);
    assert_eq!(events[0].param("address"), Some("not-an-address"));
    assert_eq!(job.mail.addresses.len(), 3);
}

#[test]
fn test_output_and_error_paths() {
    let (job, events) = apply(&["-o logs/out.txt -e login2:/scratch/err.txt"]);
    assert!(events.is_empty());
    assert_eq!(job.io.output.host, "login1");
    assert_eq!(job.io.output.path, PathBuf::from("/user/leuven/301/vsc30140/logs/out.txt"));
    assert_eq!(job.io.error.host, "login2");
    assert_eq!(job.io.error.path, PathBuf::from("/scratch/err.txt"));
}

#[test]
fn test_unknown_resource_and_glued_value() {
    let (job, events) = apply(&["-lwalltime=10:00,naccesspolicy=singlejob"]);
    assert_eq!(event_ids(&events), vec![EventId::UnknownResourceSpec]);
    assert_eq!(events[0].param("spec"), Some("naccesspolicy=singlejob"));
    assert_eq!(job.resources.walltime, 600);
}
