//! Exploration bounding.
//!
//! A bound decider judges whether an execution graph can be produced by a
//! schedule within the configured budget. Bounded exploration does not
//! change which graphs are generated, only which ones are reported.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::event::{Event, ThreadId};
use crate::event_label::LabelEnum;
use crate::exec_graph::ExecutionGraph;

/// Which bound the exploration enforces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundType {
    /// Number of preemptive context switches.
    Context,
    /// Number of round-robin rounds.
    Round,
}

pub(crate) trait BoundDecider {
    /// Whether some schedule produces the graph within `bound`.
    fn doesnt_exceed(&self, g: &ExecutionGraph, bound: usize) -> bool;
}

pub(crate) fn make_decider(t: BoundType) -> Box<dyn BoundDecider> {
    match t {
        BoundType::Context => Box::new(ContextBoundDecider {}),
        BoundType::Round => Box::new(RoundBoundDecider {}),
    }
}

/// A scheduling frontier: how many events of each thread have run.
type Frontier = Vec<usize>;

fn thread_ids(g: &ExecutionGraph) -> Vec<ThreadId> {
    g.threads.iter().map(|t| t.tid).collect()
}

fn total_events(g: &ExecutionGraph) -> usize {
    g.threads.iter().map(|t| t.labels.len()).sum()
}

/// Whether the next event of `tid` is schedulable given the frontier. A
/// schedule here is an actual run: dependencies must already have run,
/// same-location writes run in mo order, and a read observes the latest
/// write to its location that has run so far.
fn schedulable(g: &ExecutionGraph, tids: &[ThreadId], frontier: &Frontier, ti: usize) -> bool {
    let tid = tids[ti];
    let idx = frontier[ti];
    if idx >= g.thread_size(tid) {
        return false;
    }
    let pos = Event::new(tid, idx as u32);
    let done = |e: Event| {
        tids.iter()
            .position(|&t| t == e.thread())
            .is_some_and(|i| (e.index() as usize) < frontier[i])
    };
    match g.label(pos) {
        LabelEnum::Begin(blab) => blab.parent().is_none_or(done),
        LabelEnum::Read(rlab) => {
            // Writes run in mo order, so the done writes to the location
            // form a chain prefix; the read must sit right at its end.
            let chain = g.stores_to_loc(rlab.addr());
            match rlab.rf() {
                None => chain.first().copied().is_none_or(|w| !done(w)),
                Some(w) => {
                    done(w) && g.store_succs(w).first().copied().is_none_or(|s| !done(s))
                }
            }
        }
        LabelEnum::Write(_) => g.store_pred(pos).is_none_or(done),
        LabelEnum::TJoin(jlab) => {
            let last = g.thread_last(jlab.cid()).unwrap().pos();
            done(last)
        }
        _ => true,
    }
}

pub(crate) struct ContextBoundDecider {}

impl BoundDecider for ContextBoundDecider {
    fn doesnt_exceed(&self, g: &ExecutionGraph, bound: usize) -> bool {
        let within = Self::search(g, bound);
        #[cfg(debug_assertions)]
        debug_assert_eq!(within, Self::min_switches(g).is_some_and(|m| m <= bound));
        within
    }
}

impl ContextBoundDecider {
    /// Depth-first search over scheduling states with an explicit stack.
    /// A state is (frontier, active thread, switches spent); continuing the
    /// active thread is free, switching to another costs one.
    fn search(g: &ExecutionGraph, bound: usize) -> bool {
        let tids = thread_ids(g);
        let total = total_events(g);

        let mut stack: Vec<(Frontier, Option<usize>, usize)> =
            vec![(vec![0; tids.len()], None, 0)];
        let mut visited: HashSet<(Frontier, Option<usize>, usize)> = HashSet::new();

        while let Some((frontier, active, switches)) = stack.pop() {
            if frontier.iter().sum::<usize>() == total {
                return true;
            }
            if !visited.insert((frontier.clone(), active, switches)) {
                continue;
            }
            for ti in 0..tids.len() {
                if !schedulable(g, &tids, &frontier, ti) {
                    continue;
                }
                let is_switch = active.is_some_and(|a| a != ti)
                    // A switch away from a still-runnable thread is preemptive
                    && schedulable(g, &tids, &frontier, active.unwrap());
                let cost = if is_switch { 1 } else { 0 };
                if switches + cost > bound {
                    continue;
                }
                let mut next = frontier.clone();
                next[ti] += 1;
                stack.push((next, Some(ti), switches + cost));
            }
        }
        false
    }

    /// Exact minimum over all schedules, recursively. Only used to
    /// cross-check the iterative search in debug builds.
    #[cfg(debug_assertions)]
    fn min_switches(g: &ExecutionGraph) -> Option<usize> {
        fn go(
            g: &ExecutionGraph,
            tids: &[ThreadId],
            total: usize,
            frontier: &mut Frontier,
            active: Option<usize>,
        ) -> Option<usize> {
            if frontier.iter().sum::<usize>() == total {
                return Some(0);
            }
            let mut best: Option<usize> = None;
            for ti in 0..tids.len() {
                if !schedulable(g, tids, frontier, ti) {
                    continue;
                }
                let is_switch = active.is_some_and(|a| a != ti)
                    && schedulable(g, tids, frontier, active.unwrap());
                let cost = usize::from(is_switch);
                frontier[ti] += 1;
                if let Some(rest) = go(g, tids, total, frontier, Some(ti)) {
                    let cand = cost + rest;
                    best = Some(best.map_or(cand, |b| b.min(cand)));
                }
                frontier[ti] -= 1;
            }
            best
        }
        let tids = thread_ids(g);
        let total = total_events(g);
        go(g, &tids, total, &mut vec![0; tids.len()], None)
    }
}

pub(crate) struct RoundBoundDecider {}

impl BoundDecider for RoundBoundDecider {
    fn doesnt_exceed(&self, g: &ExecutionGraph, bound: usize) -> bool {
        Self::rounds(g).is_some_and(|r| r <= bound)
    }
}

impl RoundBoundDecider {
    /// Rounds of the greedy round-robin schedule: visit the threads in id
    /// order, running each as far as its dependencies allow; the number of
    /// full passes needed is minimal for round-robin schedules. `None`
    /// means no round-robin schedule produces this graph at all (a read
    /// observes a write the greedy run has already overwritten).
    fn rounds(g: &ExecutionGraph) -> Option<usize> {
        let tids = thread_ids(g);
        let total = total_events(g);
        let mut frontier: Frontier = vec![0; tids.len()];
        let mut rounds = 0;

        while frontier.iter().sum::<usize>() != total {
            rounds += 1;
            let before: usize = frontier.iter().sum();
            for ti in 0..tids.len() {
                while schedulable(g, &tids, &frontier, ti) {
                    frontier[ti] += 1;
                }
            }
            if frontier.iter().sum::<usize>() == before {
                return None;
            }
        }
        Some(rounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::main_thread_id;
    use crate::event_label::{Begin, LabelEnum, TCreate};

    // A graph where t1 must preempt t0 in the middle: t0 spawns t1, then
    // t0's remaining events depend on nothing, but scheduling everything
    // needs at least one switch into t1.
    fn two_thread_graph() -> ExecutionGraph {
        let mut g = ExecutionGraph::new();
        let t0 = main_thread_id();
        let t1 = crate::event::construct_thread_id(1);
        let create = Event::new(t0, 1);
        g.add_label(LabelEnum::TCreate(TCreate::new(create, t1)));
        g.add_new_thread(t1);
        g.add_label(LabelEnum::Begin(Begin::new(Event::new(t1, 0), Some(create))));
        g
    }

    #[test]
    fn context_bound_counts_switches() {
        let g = two_thread_graph();
        let d = ContextBoundDecider {};
        // Running t0 to completion and then t1 needs no preemption
        assert!(d.doesnt_exceed(&g, 0));
    }

    #[test]
    fn round_bound_single_pass() {
        let g = two_thread_graph();
        let d = RoundBoundDecider {};
        assert!(d.doesnt_exceed(&g, 1));
        assert!(!d.doesnt_exceed(&g, 0));
    }
}
