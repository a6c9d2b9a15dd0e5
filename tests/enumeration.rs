use beaver::{Enumerator, Limits, LogLoader, Machine, Seed, Status, DONE};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufWriter;
use tempfile::tempdir;

#[test]
fn test_four_state_enumeration() {
    let dir = tempdir().unwrap();
    let root = Machine::root(4);
    let path = dir.path().join(format!("{}.txt", root.raw()));

    let mut enumerator = Enumerator::new(Limits::BB4);
    let summary = enumerator
        .run(BufWriter::new(File::create(&path).unwrap()))
        .unwrap();

    // Every 4-state machine is decided by the small-machine bounds.
    assert_eq!(summary.visited, 614_630);
    assert_eq!(summary.halting, 183_096);
    assert_eq!(summary.non_halting, 431_534);
    assert_eq!(summary.undecided_space, 0);
    assert_eq!(summary.undecided_time, 0);
    assert_eq!(summary.peak_queue, 522_841);
    assert_eq!(enumerator.pending(), 0);

    let (champion, steps) = summary.longest_halt.unwrap();
    assert_eq!(steps, 107);
    assert_eq!(champion.to_string(), "1RB1LB_1LA0LC_---1LD_1RD0RA");

    let log = LogLoader::load_log(&path).unwrap();
    assert!(log.complete);
    assert_eq!(log.records.len() as u64, summary.visited);
    assert_eq!(log.records[0].machine, root);
    assert_eq!(
        log.with_status(Status::Halting).count() as u64,
        summary.halting
    );

    let unique: HashSet<Machine> = log.records.iter().map(|r| r.machine).collect();
    assert_eq!(unique.len(), log.records.len());

    assert!(Seed::collect(&log.records).is_empty());
}

#[test]
fn test_log_ends_with_done() {
    // Starting from a machine that runs off to the right ends the search immediately.
    let machine: Machine = "1RB---_1RB---_------".parse().unwrap();
    let mut enumerator = Enumerator::from_machines(Limits::BB5, [machine]);

    let mut out = Vec::new();
    enumerator.run(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert_eq!(text.lines().last(), Some(DONE));
    assert_eq!(text.lines().count(), 2);
    assert!(text.starts_with(&machine.raw().to_string()));
}
