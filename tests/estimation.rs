//! Sampling-based estimation of the number of consistent executions.

use memograph::{estimate_execs_with_samples, Config, MemOrd, MemoryModel, SAddr};

fn config(model: MemoryModel) -> Config {
    Config::builder().with_model(model).with_seed(0xfeed).build()
}

// Every sampled path of this program multiplies the same fan-outs, so the
// estimate is exact whatever the rng does.
#[test]
fn deterministic_fanout_is_exact() {
    let x = SAddr::global(0);
    let est = estimate_execs_with_samples(
        config(MemoryModel::Sc),
        move |t| {
            let writer = t.spawn(move |t| t.store(x, MemOrd::Relaxed, 1u64))?;
            t.load(x, MemOrd::Relaxed)?;
            t.join(writer)
        },
        50,
    );
    assert_eq!(est, 2.0);
}

// No reads means no revisit jumps: the sample is always the product of the
// coherence placements, 1 * 2 * 3.
#[test]
fn concurrent_writes_estimate_is_exact() {
    let x = SAddr::global(0);
    let est = estimate_execs_with_samples(
        config(MemoryModel::Sc),
        move |t| {
            let a = t.spawn(move |t| t.store(x, MemOrd::Relaxed, 1u64))?;
            let b = t.spawn(move |t| t.store(x, MemOrd::Relaxed, 2u64))?;
            let c = t.spawn(move |t| t.store(x, MemOrd::Relaxed, 3u64))?;
            t.join(a)?;
            t.join(b)?;
            t.join(c)
        },
        50,
    );
    assert_eq!(est, 6.0);
}

// Store buffering under SC has three consistent executions; the sampled
// estimator is unbiased, so the mean over many samples lands close.
#[test]
fn store_buffering_estimate_converges() {
    let x = SAddr::global(0);
    let y = SAddr::global(1);
    let est = estimate_execs_with_samples(
        config(MemoryModel::Sc),
        move |t| {
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
        },
        2000,
    );
    assert!(
        (2.5..3.5).contains(&est),
        "estimate {est} strayed from the exact count 3"
    );
}
