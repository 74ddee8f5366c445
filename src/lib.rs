//! A stateless model checker for concurrent programs under relaxed memory.
//!
//! Test programs are written as closures over a [`Thread`] context and
//! explored exhaustively: every consistent execution graph the selected
//! memory model allows is produced exactly once. Reads-from and coherence
//! choices are explored through forward and backward revisits; an optional
//! scheduling bound prunes the reported executions, and a sampling mode
//! estimates how many executions a full verification would visit.
//!
//! ```no_run
//! use memograph::{verify, Config, MemOrd, SAddr};
//!
//! let x = SAddr::global(0);
//! let stats = verify(Config::builder().build(), move |t| {
//!     let child = t.spawn(move |t| t.store(x, MemOrd::Release, 1u64))?;
//!     let _seen = t.load(x, MemOrd::Acquire)?;
//!     t.join(child)
//! });
//! assert_eq!(stats.execs, 2);
//! ```

mod bound;
mod cons;
mod driver;
mod event;
mod event_label;
mod exec_graph;
mod indexed_map;
mod program;
mod revisit;
mod value;
mod vector_clock;

pub use bound::BoundType;
pub use event::ThreadId;
pub use program::{Blocked, Thread, ThreadHandle};
pub use value::{MemOrd, MemoryModel, SAddr, SVal};

use std::rc::Rc;

use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use program::{Explorer, ThreadBody};

/// Exploration statistics returned by [`verify`].
#[derive(Clone, Debug, Default)]
pub struct Stats {
    /// Complete, consistent executions within the bound (if any).
    pub execs: usize,
    /// Blocked executions: an assume failed, a lock was held, a spinloop
    /// made no progress, or a join never unblocked.
    pub block: usize,
    /// Complete, consistent executions suppressed by the scheduling bound.
    pub pruned_by_bound: usize,
    /// Data races found (counted per execution they show up in).
    pub races: usize,
    /// Assertion failures and race reports, in the order they were found.
    pub errors: Vec<String>,
}

/// The order threads are scheduled within an execution. This never changes
/// which executions exist, only the order they are discovered in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchedulePolicy {
    /// Left-to-right: threads run in spawn order.
    #[default]
    LTR,
    /// Shuffle the threads with the seeded rng on every pass.
    Arbitrary,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum ExplorationMode {
    /// Exhaustive exploration of all executions.
    Verification,
    /// Sample one random execution path per run and record the product of
    /// the choice-point fan-outs, an unbiased estimator of the total.
    Estimation,
}

/// Exploration options. Construct with [`Config::builder`].
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    pub(crate) model: MemoryModel,
    pub(crate) mode: ExplorationMode,
    pub(crate) schedule_policy: SchedulePolicy,
    pub(crate) seed: u64,
    pub(crate) max_iterations: Option<u64>,
    pub(crate) verbose: usize,
    pub(crate) progress_report: usize,
    pub(crate) thread_threshold: u32,
    pub(crate) warnings_as_errors: bool,
    pub(crate) keep_going_after_error: bool,
    pub(crate) check_races: bool,
    pub(crate) bound: Option<(BoundType, usize)>,
    pub(crate) error_trace_file: Option<String>,
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            model: MemoryModel::Rc11,
            mode: ExplorationMode::Verification,
            schedule_policy: SchedulePolicy::default(),
            seed: OsRng.next_u64(),
            max_iterations: None,
            verbose: 0,
            progress_report: 0,
            thread_threshold: 500,
            warnings_as_errors: false,
            keep_going_after_error: false,
            check_races: true,
            bound: None,
            error_trace_file: None,
        }
    }
}

#[derive(Default)]
pub struct ConfigBuilder(Config);

impl ConfigBuilder {
    /// The memory model to check against. Defaults to RC11.
    pub fn with_model(mut self, model: MemoryModel) -> Self {
        self.0.model = model;
        self
    }

    /// How threads are scheduled within an execution.
    pub fn with_policy(mut self, policy: SchedulePolicy) -> Self {
        self.0.schedule_policy = policy;
        self
    }

    /// Seed for the rng behind [`SchedulePolicy::Arbitrary`] and estimation.
    /// Defaults to an OS-provided random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.0.seed = seed;
        self
    }

    /// Stop after this many executions (complete plus blocked).
    pub fn with_max_iterations(mut self, n: u64) -> Self {
        self.0.max_iterations = Some(n);
        self
    }

    /// 1 prints every complete execution, 2 adds blocked ones, 3 adds the
    /// revisits as they are applied.
    pub fn with_verbose(mut self, level: usize) -> Self {
        self.0.verbose = level;
        self
    }

    /// Print a progress line every `n` executions instead of the default
    /// logarithmic thinning.
    pub fn with_progress_report(mut self, n: usize) -> Self {
        self.0.progress_report = n;
        self
    }

    /// Warn when a thread grows beyond this many events; unbounded loops in
    /// a test program show up this way.
    pub fn with_thread_threshold(mut self, n: u32) -> Self {
        self.0.thread_threshold = n;
        self
    }

    /// Exit the process on the first warning.
    pub fn with_warnings_as_errors(mut self, yes: bool) -> Self {
        self.0.warnings_as_errors = yes;
        self
    }

    /// Keep exploring after an assertion failure or race, collecting every
    /// error instead of stopping at the first.
    pub fn with_keep_going_after_error(mut self, yes: bool) -> Self {
        self.0.keep_going_after_error = yes;
        self
    }

    /// Check every complete execution for data races. On by default.
    pub fn with_race_detection(mut self, yes: bool) -> Self {
        self.0.check_races = yes;
        self
    }

    /// Only report executions some schedule within the bound can produce.
    /// Verify with increasing bounds to find the smallest one exposing a
    /// behavior.
    pub fn with_bound(mut self, btype: BoundType, bound: usize) -> Self {
        self.0.bound = Some((btype, bound));
        self
    }

    /// Write the erroneous execution graph to this file as json.
    pub fn with_error_trace(mut self, path: &str) -> Self {
        self.0.error_trace_file = Some(path.to_string());
        self
    }

    pub fn build(self) -> Config {
        self.0
    }
}

/// Explore every execution of the program under the configured model.
pub fn verify<F>(conf: Config, f: F) -> Stats
where
    F: Fn(&mut Thread<'_>) -> Result<(), Blocked> + 'static,
{
    let body: Rc<ThreadBody> = Rc::new(f);
    Explorer::new(conf, body).explore()
}

/// Estimate the number of consistent executions with 1000 samples.
pub fn estimate_execs<F>(conf: Config, f: F) -> f64
where
    F: Fn(&mut Thread<'_>) -> Result<(), Blocked> + 'static,
{
    estimate_execs_with_samples(conf, f, 1000)
}

/// Estimate the number of consistent executions of the program: the mean
/// over `samples` runs of the choice-fan-out product of one sampled path.
/// Use it to judge whether a full [`verify`] is feasible.
pub fn estimate_execs_with_samples<F>(mut conf: Config, f: F, samples: u64) -> f64
where
    F: Fn(&mut Thread<'_>) -> Result<(), Blocked> + 'static,
{
    assert!(samples > 0, "estimation needs at least one sample");
    conf.mode = ExplorationMode::Estimation;
    let body: Rc<ThreadBody> = Rc::new(f);
    let base_seed = conf.seed;
    let mut sum = 0.0;
    for i in 0..samples {
        let mut sample_conf = conf.clone();
        sample_conf.seed = base_seed.wrapping_add(i);
        let explorer = Explorer::new(sample_conf, body.clone());
        let _ = explorer.explore();
        sum += explorer.exec_estimate();
    }
    sum / samples as f64
}
