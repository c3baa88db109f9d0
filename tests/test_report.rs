mod common;

use common::{catalog, parse};
use pbs_lint::report::Report;

const SCRIPT: &str = "#PBS -j x\n#PBS -l nodes=1:ppn=4\necho\n";

#[test]
fn test_render_text_report() {
    let (_, events) = parse(SCRIPT);
    let report = Report::new(&events, &catalog()).unwrap();

    assert_eq!(report.nr_errors(), 1);
    assert_eq!(report.nr_warnings(), 1);
    assert_eq!(
        report.render(),
        "W line 1:\n  problem: script has no shebang, it will be executed by your login shell\n  remedy: add a shebang such as '#!/bin/bash -l' as the first line\n\
         E line 1:\n  problem: invalid join value 'x'\n  remedy: use 'oe', 'eo' or 'n'\n\
         1 errors, 1 warnings\n"
    );
}

#[test]
fn test_write_csv_report() {
    let (_, events) = parse(SCRIPT);
    let report = Report::new(&events, &catalog()).unwrap();

    let mut buffer = Vec::new();
    report.write_csv(&mut buffer).unwrap();
    let csv = String::from_utf8(buffer).unwrap();
    let mut lines = csv.lines();

    assert_eq!(lines.next(), Some("severity;id;line;problem;remedy"));
    assert_eq!(lines.next(), Some("W;missing_shebang;1;script has no shebang, it will be executed by your login shell;add a shebang such as '#!/bin/bash -l' as the first line"));
    assert_eq!(lines.next(), Some("E;invalid_join;1;invalid join value 'x';use 'oe', 'eo' or 'n'"));
    assert_eq!(lines.next(), None);
}

#[test]
fn test_empty_report() {
    let report = Report::new(&[], &catalog()).unwrap();
    assert_eq!(report.render(), "0 errors, 0 warnings\n");
}
