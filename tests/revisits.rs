//! Backward revisits, blocking primitives, error reporting and races.

use memograph::{verify, Config, MemOrd, MemoryModel, SAddr};

fn config(model: MemoryModel) -> Config {
    Config::builder().with_model(model).build()
}

// The writer shows up after the reader finished, so both reads are reached
// by backward revisits; re-running the truncated reader keeps the reads
// coherent and (1, 0) is never produced.
#[test]
fn revisited_read_reruns_its_dependents() {
    let x = SAddr::global(0);
    let stats = verify(config(MemoryModel::Sc), move |t| {
        let reader = t.spawn(move |t| {
            let first = t.load(x, MemOrd::Relaxed)?;
            let second = t.load(x, MemOrd::Relaxed)?;
            t.assert_true(first.get() <= second.get(), "reads went backwards")
        })?;
        let writer = t.spawn(move |t| t.store(x, MemOrd::Relaxed, 1u64))?;
        t.join(reader)?;
        t.join(writer)
    });
    assert_eq!(stats.execs, 3);
    assert!(stats.errors.is_empty());
}

#[test]
fn lock_protects_a_plain_counter() {
    let l = SAddr::global(0);
    let c = SAddr::global(1);
    let stats = verify(config(MemoryModel::Rc11), move |t| {
        let a = t.spawn(move |t| {
            t.lock(l)?;
            let v = t.load(c, MemOrd::NotAtomic)?;
            t.store(c, MemOrd::NotAtomic, v.get() + 1)?;
            t.unlock(l)
        })?;
        let b = t.spawn(move |t| {
            t.lock(l)?;
            let v = t.load(c, MemOrd::NotAtomic)?;
            t.store(c, MemOrd::NotAtomic, v.get() + 1)?;
            t.unlock(l)
        })?;
        t.join(a)?;
        t.join(b)?;
        let total = t.load(c, MemOrd::NotAtomic)?;
        t.assert_true(total.get() == 2, "lost update under the lock")
    });
    assert_eq!(stats.execs, 2);
    assert!(stats.errors.is_empty());
    // The executions where the second locker finds the lock held.
    assert!(stats.block >= 1);
}

#[test]
fn unsynchronized_writes_race() {
    let x = SAddr::global(0);
    let conf = Config::builder()
        .with_model(MemoryModel::Rc11)
        .with_keep_going_after_error(true)
        .build();
    let stats = verify(conf, move |t| {
        let a = t.spawn(move |t| t.store(x, MemOrd::NotAtomic, 1u64))?;
        let b = t.spawn(move |t| t.store(x, MemOrd::NotAtomic, 2u64))?;
        t.join(a)?;
        t.join(b)
    });
    // Both coherence orders complete and each reports the same race pair.
    assert_eq!(stats.execs, 2);
    assert_eq!(stats.races, 2);
    assert!(!stats.errors.is_empty());
}

#[test]
fn first_error_stops_exploration_and_dumps_a_trace() {
    let x = SAddr::global(0);
    let path = std::env::temp_dir().join("memograph-error-trace.json");
    let path_str = path.to_str().unwrap().to_string();
    let conf = Config::builder()
        .with_model(MemoryModel::Sc)
        .with_error_trace(&path_str)
        .build();
    let stats = verify(conf, move |t| {
        let a = t.spawn(move |t| t.store(x, MemOrd::Relaxed, 1u64))?;
        let v = t.load(x, MemOrd::Relaxed)?;
        t.assert_true(v.get() == 0, "observed the concurrent store")?;
        t.join(a)
    });
    assert_eq!(stats.execs, 1);
    assert_eq!(stats.errors.len(), 1);
    assert!(path.exists());
    std::fs::remove_file(path).ok();
}

#[test]
fn assume_discards_executions() {
    let x = SAddr::global(0);
    let stats = verify(config(MemoryModel::Sc), move |t| {
        let a = t.spawn(move |t| t.store(x, MemOrd::Relaxed, 1u64))?;
        let v = t.load(x, MemOrd::Relaxed)?;
        t.assume(v.get() == 1)?;
        t.join(a)
    });
    assert_eq!(stats.execs, 1);
    assert_eq!(stats.block, 1);
}

#[test]
fn spinloop_blocks_instead_of_unrolling() {
    let flag = SAddr::global(0);
    let stats = verify(config(MemoryModel::Sc), move |t| {
        let setter = t.spawn(move |t| t.store(flag, MemOrd::Relaxed, 1u64))?;
        let seen = t.load(flag, MemOrd::Relaxed)?;
        t.spin_end(seen.get() == 1)?;
        t.join(setter)
    });
    assert_eq!(stats.execs, 1);
    assert_eq!(stats.block, 1);
}

// A forward revisit can cut the graph back to a point where main still
// blocks on a join; the revisited child has to run again regardless of
// its parent never getting scheduled.
#[test]
fn revisit_reruns_a_child_while_its_parent_waits() {
    let x = SAddr::global(0);
    let stats = verify(config(MemoryModel::Sc), move |t| {
        let writer = t.spawn(move |t| t.store(x, MemOrd::Relaxed, 1u64))?;
        let reader = t.spawn(move |t| {
            let v = t.load(x, MemOrd::Relaxed)?;
            t.assume(v.get() == 1)
        })?;
        t.join(reader)?;
        t.join(writer)
    });
    assert_eq!(stats.execs, 1);
    assert_eq!(stats.block, 1);
    assert!(stats.errors.is_empty());
}

// A revisit of the confirming cas re-points the speculative read and
// re-runs the confirmation against the new value. Were the speculation
// left behind, the fresh confirmation would fail and the execution would
// block.
#[test]
fn speculative_read_follows_its_confirmation() {
    let x = SAddr::global(0);
    let stats = verify(config(MemoryModel::Sc), move |t| {
        let writer = t.spawn(move |t| t.store(x, MemOrd::Relaxed, 1u64))?;
        let guess = t.speculative_load(x, MemOrd::Relaxed)?;
        let confirmed = t.confirm(x, MemOrd::Relaxed, guess, guess.get() + 10)?;
        t.assume(confirmed)?;
        t.join(writer)
    });
    assert_eq!(stats.execs, 2);
    assert_eq!(stats.block, 0);
    assert!(stats.errors.is_empty());
}
