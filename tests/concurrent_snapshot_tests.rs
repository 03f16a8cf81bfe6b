/// Concurrent snapshot access tests
///
/// Readers load topology and rule snapshots while a writer applies
/// mutations; every observed snapshot must be one of the published states,
/// never a mix.
/// Run with: cargo test --test concurrent_snapshot_tests
mod support;

use rustshardproxy::{Command, Namespace, NamespaceManager, ShardRule, TableRule};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use support::{MockDatasource, group_ids};

const READERS: usize = 4;
const MUTATIONS: usize = 200;

#[test]
fn test_readers_observe_only_published_topologies() {
    let ns = Arc::new(Namespace::new("race"));
    let stop = Arc::new(AtomicBool::new(false));
    let barrier = Arc::new(Barrier::new(READERS + 1));

    // The writer appends ds0, ds1, ... in order, so every published
    // snapshot holds an exact prefix of that sequence.
    let mut handles = vec![];
    for reader_id in 0..READERS {
        let ns = Arc::clone(&ns);
        let stop = Arc::clone(&stop);
        let barrier = Arc::clone(&barrier);

        handles.push(thread::spawn(move || {
            barrier.wait();
            loop {
                let topology = ns.current_topology();
                let ids = group_ids(&topology, "g1");
                for (i, id) in ids.iter().enumerate() {
                    assert_eq!(
                        id,
                        &format!("ds{i}"),
                        "reader {reader_id} saw a torn snapshot: {ids:?}"
                    );
                }
                if stop.load(Ordering::SeqCst) {
                    break;
                }
            }
        }));
    }

    barrier.wait();
    for i in 0..MUTATIONS {
        ns.apply(Command::upsert_db(
            "g1",
            MockDatasource::new(&format!("ds{i}")),
        ))
        .unwrap();
    }
    stop.store(true, Ordering::SeqCst);

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(ns.current_topology().group("g1").unwrap().len(), MUTATIONS);
}

#[test]
fn test_reader_held_snapshot_survives_newer_publishes() {
    let ns = Namespace::new("race");
    ns.apply(Command::upsert_db("g1", MockDatasource::new("a")))
        .unwrap();

    let held = ns.current_topology();
    ns.apply(Command::upsert_db("g1", MockDatasource::new("b")))
        .unwrap();
    ns.apply(Command::remove_node("g1", "a")).unwrap();
    ns.apply(Command::remove_group("g1")).unwrap();

    assert_eq!(group_ids(&held, "g1"), vec!["a"]);
    assert!(ns.current_topology().is_empty());
}

#[test]
fn test_rule_swaps_are_atomic() {
    let ns = Arc::new(Namespace::new("race"));
    let stop = Arc::new(AtomicBool::new(false));
    let barrier = Arc::new(Barrier::new(READERS + 1));

    // Rule version i holds tables t0..t{i-1}; a mixed rule would have a
    // table count that does not match its members.
    let mut handles = vec![];
    for _ in 0..READERS {
        let ns = Arc::clone(&ns);
        let stop = Arc::clone(&stop);
        let barrier = Arc::clone(&barrier);

        handles.push(thread::spawn(move || {
            barrier.wait();
            while !stop.load(Ordering::SeqCst) {
                let rule = ns.current_rule();
                let count = rule.table_count();
                for i in 0..count {
                    assert!(
                        rule.table(&format!("t{i}")).is_some(),
                        "rule with {count} tables is missing t{i}"
                    );
                }
            }
        }));
    }

    barrier.wait();
    for version in 1..=50usize {
        let mut rule = ShardRule::new();
        for i in 0..version {
            rule = rule.with_table(format!("t{i}"), TableRule::new("id", 4, 8));
        }
        ns.apply(Command::update_rule(rule)).unwrap();
    }
    stop.store(true, Ordering::SeqCst);

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(ns.current_rule().table_count(), 50);
}

#[test]
fn test_namespaces_mutate_independently() {
    let manager = Arc::new(NamespaceManager::new());
    manager.register(Namespace::new("orders")).unwrap();
    manager.register(Namespace::new("users")).unwrap();

    let barrier = Arc::new(Barrier::new(2));
    let mut handles = vec![];
    for name in ["orders", "users"] {
        let manager = Arc::clone(&manager);
        let barrier = Arc::clone(&barrier);

        handles.push(thread::spawn(move || {
            let ns = manager.get(name).unwrap();
            barrier.wait();
            for i in 0..100 {
                ns.apply(Command::upsert_db(
                    "g1",
                    MockDatasource::new(&format!("{name}-ds{i}")),
                ))
                .unwrap();
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    for name in ["orders", "users"] {
        let ns = manager.get(name).unwrap();
        let ids = group_ids(&ns.current_topology(), "g1");
        assert_eq!(ids.len(), 100);
        assert!(ids.iter().all(|id| id.starts_with(name)));
    }
}

#[test]
fn test_manager_lookups_race_registration() {
    let manager = Arc::new(NamespaceManager::new());
    let stop = Arc::new(AtomicBool::new(false));
    let barrier = Arc::new(Barrier::new(READERS + 1));

    let mut handles = vec![];
    for _ in 0..READERS {
        let manager = Arc::clone(&manager);
        let stop = Arc::clone(&stop);
        let barrier = Arc::clone(&barrier);

        handles.push(thread::spawn(move || {
            barrier.wait();
            while !stop.load(Ordering::SeqCst) {
                let names = manager.names();
                for name in &names {
                    assert!(manager.get(name).is_some(), "listed namespace vanished");
                }
            }
        }));
    }

    barrier.wait();
    for i in 0..50 {
        manager.register(Namespace::new(format!("ns{i}"))).unwrap();
    }
    stop.store(true, Ordering::SeqCst);

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(manager.len(), 50);
}
