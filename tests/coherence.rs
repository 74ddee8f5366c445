//! Coherence-order enumeration and read-modify-write atomicity.

use memograph::{verify, Config, MemOrd, MemoryModel, SAddr};

fn config(model: MemoryModel) -> Config {
    Config::builder().with_model(model).build()
}

// Two po-ordered writes stay adjacent in mo; the concurrent one can land
// before, between, or after them.
#[test]
fn concurrent_write_against_ordered_pair() {
    let x = SAddr::global(0);
    let stats = verify(config(MemoryModel::Sc), move |t| {
        let other = t.spawn(move |t| t.store(x, MemOrd::Relaxed, 3u64))?;
        t.store(x, MemOrd::Relaxed, 1u64)?;
        t.store(x, MemOrd::Relaxed, 2u64)?;
        t.join(other)
    });
    assert_eq!(stats.execs, 3);
    assert!(stats.errors.is_empty());
}

// Three concurrent writes to one location: one execution per coherence
// order, six in total.
#[test]
fn three_concurrent_writes() {
    let x = SAddr::global(0);
    let stats = verify(config(MemoryModel::Sc), move |t| {
        let a = t.spawn(move |t| t.store(x, MemOrd::Relaxed, 1u64))?;
        let b = t.spawn(move |t| t.store(x, MemOrd::Relaxed, 2u64))?;
        let c = t.spawn(move |t| t.store(x, MemOrd::Relaxed, 3u64))?;
        t.join(a)?;
        t.join(b)?;
        t.join(c)
    });
    assert_eq!(stats.execs, 6);
}

// Concurrent increments must not lose an update: only the two chained
// orders survive, the overlapping one is not atomic.
#[test]
fn concurrent_increments() {
    let x = SAddr::global(0);
    let stats = verify(config(MemoryModel::Sc), move |t| {
        let a = t.spawn(move |t| t.fetch_add(x, MemOrd::Relaxed, 1u64).map(|_| ()))?;
        let b = t.spawn(move |t| t.fetch_add(x, MemOrd::Relaxed, 1u64).map(|_| ()))?;
        t.join(a)?;
        t.join(b)?;
        let total = t.load(x, MemOrd::Relaxed)?;
        t.assert_true(total.get() == 2, "an increment was lost")
    });
    assert_eq!(stats.execs, 2);
    assert!(stats.errors.is_empty());
}

// Exactly one of two competing compare-and-swaps wins.
#[test]
fn competing_cas() {
    let x = SAddr::global(0);
    let stats = verify(config(MemoryModel::Sc), move |t| {
        let a = t.spawn(move |t| t.cas(x, MemOrd::AcqRel, 0u64, 1u64).map(|_| ()))?;
        let b = t.spawn(move |t| t.cas(x, MemOrd::AcqRel, 0u64, 2u64).map(|_| ()))?;
        t.join(a)?;
        t.join(b)?;
        let winner = t.load(x, MemOrd::Relaxed)?;
        t.assert_true(winner.get() == 1 || winner.get() == 2, "no cas won")
    });
    assert_eq!(stats.execs, 2);
    assert!(stats.errors.is_empty());
}

// A compare-exchange that can never succeed leaves only its read behind;
// it must not pin coherence placements for a concurrent store.
#[test]
fn failed_cas_leaves_placements_free() {
    let x = SAddr::global(0);
    let stats = verify(config(MemoryModel::Sc), move |t| {
        let w = t.spawn(move |t| t.store(x, MemOrd::Relaxed, 1u64))?;
        let (_, ok) = t.cas(x, MemOrd::AcqRel, 5u64, 6u64)?;
        t.assert_true(!ok, "swapped a value that was never there")?;
        t.join(w)
    });
    assert_eq!(stats.execs, 2);
    assert!(stats.errors.is_empty());
}

// Three rf choices for the failing cas read times two coherence orders.
#[test]
fn failed_cas_does_not_restrict_write_order() {
    let x = SAddr::global(0);
    let stats = verify(config(MemoryModel::Sc), move |t| {
        let a = t.spawn(move |t| t.store(x, MemOrd::Relaxed, 1u64))?;
        let b = t.spawn(move |t| t.store(x, MemOrd::Relaxed, 2u64))?;
        let (_, ok) = t.cas(x, MemOrd::AcqRel, 7u64, 9u64)?;
        t.assert_true(!ok, "swapped a value that was never there")?;
        t.join(a)?;
        t.join(b)
    });
    assert_eq!(stats.execs, 6);
    assert!(stats.errors.is_empty());
}

#[test]
fn single_thread_rmw_reads_latest() {
    let x = SAddr::global(0);
    let stats = verify(config(MemoryModel::Rc11), move |t| {
        t.store(x, MemOrd::Relaxed, 1u64)?;
        let old = t.fetch_add(x, MemOrd::Relaxed, 1u64)?;
        let now = t.load(x, MemOrd::Relaxed)?;
        t.assert_true(old.get() == 1 && now.get() == 2, "rmw skipped a write")
    });
    assert_eq!(stats.execs, 1);
    assert!(stats.errors.is_empty());
}
