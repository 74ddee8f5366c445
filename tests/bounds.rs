//! Bounded exploration: graphs beyond the scheduling budget are pruned.

use memograph::{verify, BoundType, Config, MemOrd, MemoryModel, SAddr, Stats};

// The reader must observe the writer mid-stream twice, which no schedule
// can do with fewer than two preemptions.
fn staircase(bound: Option<(BoundType, usize)>) -> Stats {
    let x = SAddr::global(0);
    let mut builder = Config::builder().with_model(MemoryModel::Sc);
    if let Some((btype, k)) = bound {
        builder = builder.with_bound(btype, k);
    }
    verify(builder.build(), move |t| {
        let writer = t.spawn(move |t| {
            t.store(x, MemOrd::Relaxed, 1u64)?;
            t.store(x, MemOrd::Relaxed, 2u64)?;
            t.store(x, MemOrd::Relaxed, 3u64)
        })?;
        let reader = t.spawn(move |t| {
            let first = t.load(x, MemOrd::Relaxed)?;
            t.assume(first.get() == 1)?;
            let second = t.load(x, MemOrd::Relaxed)?;
            t.assume(second.get() == 2)
        })?;
        t.join(writer)?;
        t.join(reader)
    })
}

#[test]
fn unbounded_finds_the_interleaving() {
    let stats = staircase(None);
    assert_eq!(stats.execs, 1);
}

#[test]
fn context_bound_below_the_needed_switches_prunes() {
    let stats = staircase(Some((BoundType::Context, 1)));
    assert_eq!(stats.execs, 0);
    assert_eq!(stats.pruned_by_bound, 1);
}

#[test]
fn context_bound_at_the_needed_switches_admits() {
    let stats = staircase(Some((BoundType::Context, 2)));
    assert_eq!(stats.execs, 1);
    assert_eq!(stats.pruned_by_bound, 0);
}

fn spawned_writer(bound: Option<(BoundType, usize)>) -> Stats {
    let x = SAddr::global(0);
    let mut builder = Config::builder().with_model(MemoryModel::Sc);
    if let Some((btype, k)) = bound {
        builder = builder.with_bound(btype, k);
    }
    verify(builder.build(), move |t| {
        let writer = t.spawn(move |t| t.store(x, MemOrd::Relaxed, 1u64))?;
        t.load(x, MemOrd::Relaxed)?;
        t.join(writer)
    })
}

// Both executions are reachable without any preemption: the main thread
// simply stalls on the dependency or the join.
#[test]
fn context_bound_zero_keeps_stall_switches_free() {
    let stats = spawned_writer(Some((BoundType::Context, 0)));
    assert_eq!(stats.execs, 2);
    assert_eq!(stats.pruned_by_bound, 0);
}

// Round-robin needs a second pass for the join either way.
#[test]
fn round_bound_two_passes_suffice() {
    let stats = spawned_writer(Some((BoundType::Round, 2)));
    assert_eq!(stats.execs, 2);
    assert_eq!(stats.pruned_by_bound, 0);
}

#[test]
fn round_bound_single_pass_prunes_everything() {
    let stats = spawned_writer(Some((BoundType::Round, 1)));
    assert_eq!(stats.execs, 0);
    assert_eq!(stats.pruned_by_bound, 2);
}
