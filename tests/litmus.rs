//! Classic litmus tests: the executions each memory model admits.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use memograph::{verify, Config, MemOrd, MemoryModel, SAddr, SchedulePolicy, Stats};

fn config(model: MemoryModel) -> Config {
    let _ = env_logger::builder().is_test(true).try_init();
    Config::builder().with_model(model).build()
}

#[test]
fn load_vs_concurrent_store() {
    let x = SAddr::global(0);
    let seen: Rc<RefCell<HashSet<u64>>> = Rc::new(RefCell::new(HashSet::new()));
    let record = seen.clone();
    let stats = verify(config(MemoryModel::Sc), move |t| {
        let writer = t.spawn(move |t| t.store(x, MemOrd::Relaxed, 1u64))?;
        let v = t.load(x, MemOrd::Relaxed)?;
        record.borrow_mut().insert(v.get());
        t.join(writer)
    });
    assert_eq!(stats.execs, 2);
    assert_eq!(stats.block, 0);
    assert!(stats.errors.is_empty());
    assert_eq!(*seen.borrow(), HashSet::from([0, 1]));
}

fn store_buffering(model: MemoryModel, policy: SchedulePolicy) -> Stats {
    let x = SAddr::global(0);
    let y = SAddr::global(1);
    let conf = Config::builder()
        .with_model(model)
        .with_policy(policy)
        .with_seed(0x5b)
        .build();
    verify(conf, move |t| {
        let a = t.spawn(move |t| {
            t.store(x, MemOrd::Relaxed, 1u64)?;
            t.load(y, MemOrd::Relaxed).map(|_| ())
        })?;
        let b = t.spawn(move |t| {
            t.store(y, MemOrd::Relaxed, 1u64)?;
            t.load(x, MemOrd::Relaxed).map(|_| ())
        })?;
        t.join(a)?;
        t.join(b)
    })
}

// SC forbids both loads reading the initial value; TSO and RA allow it.
#[test]
fn store_buffering_sc() {
    assert_eq!(store_buffering(MemoryModel::Sc, SchedulePolicy::LTR).execs, 3);
}

#[test]
fn store_buffering_tso() {
    assert_eq!(store_buffering(MemoryModel::Tso, SchedulePolicy::LTR).execs, 4);
}

#[test]
fn store_buffering_relaxed_ra() {
    assert_eq!(store_buffering(MemoryModel::Ra, SchedulePolicy::LTR).execs, 4);
}

// The schedule only affects discovery order, never the set of executions.
#[test]
fn store_buffering_arbitrary_schedule() {
    let stats = store_buffering(MemoryModel::Sc, SchedulePolicy::Arbitrary);
    assert_eq!(stats.execs, 3);
}

fn message_passing(model: MemoryModel, write_ord: MemOrd, read_ord: MemOrd) -> Stats {
    let data = SAddr::global(0);
    let flag = SAddr::global(1);
    let conf = Config::builder()
        .with_model(model)
        .with_keep_going_after_error(true)
        .build();
    verify(conf, move |t| {
        let producer = t.spawn(move |t| {
            t.store(data, write_ord, 42u64)?;
            t.store(flag, write_ord, 1u64)
        })?;
        let consumer = t.spawn(move |t| {
            let f = t.load(flag, read_ord)?;
            let d = t.load(data, read_ord)?;
            t.assert_true(f.get() == 0 || d.get() == 42, "stale data behind the flag")
        })?;
        t.join(producer)?;
        t.join(consumer)
    })
}

#[test]
fn message_passing_sc() {
    let stats = message_passing(MemoryModel::Sc, MemOrd::Relaxed, MemOrd::Relaxed);
    assert_eq!(stats.execs, 3);
    assert!(stats.errors.is_empty());
}

#[test]
fn message_passing_release_acquire() {
    let stats = message_passing(MemoryModel::Ra, MemOrd::Release, MemOrd::Acquire);
    assert_eq!(stats.execs, 3);
    assert!(stats.errors.is_empty());
}

// Without the release/acquire pair the stale read is a real execution.
#[test]
fn message_passing_relaxed_ra_fails() {
    let stats = message_passing(MemoryModel::Ra, MemOrd::Relaxed, MemOrd::Relaxed);
    assert_eq!(stats.execs, 3);
    assert_eq!(stats.block, 1);
    assert_eq!(stats.errors.len(), 1);
}
