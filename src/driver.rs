//! The exploration driver: owns the current execution graph and the
//! revisit worklist, and decides which execution to produce next.
//!
//! Forward revisits (a read observing an already-added write, a write
//! placed lower in mo) restore the current graph truncated at the revisited
//! event. Backward revisits (a new write revisiting an older read) cut the
//! graph to the revisit view and push the previous state, so exploration
//! forms a stack of alternatives ordered by stamp.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write as IoWrite;

use log::info;
use rand::prelude::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use serde::{Deserialize, Serialize};

use crate::bound::make_decider;
use crate::cons::Consistency;
use crate::event::{Event, ThreadId};
use crate::event_label::{
    AsEventLabel, Begin, Block, BlockType, End, Fence, Free, LabelEnum, Malloc, Read, ReadKind,
    TCreate, TJoin, Write,
};
use crate::exec_graph::ExecutionGraph;
use crate::revisit::RevisitEnum;
use crate::value::{SAddr, SVal};
use crate::vector_clock::VectorClock;
use crate::{Config, ExplorationMode, SchedulePolicy, Stats};

/// The worklist of pending revisits, keyed by the stamp of the event whose
/// alternatives they are. Popped highest stamp first; within a stamp, LIFO.
type RQueue = BTreeMap<usize, Vec<RevisitEnum>>;

fn push_worklist(rqueue: &mut RQueue, stamp: usize, rev: RevisitEnum) {
    rqueue.entry(stamp).or_default().push(rev);
}

fn pop_worklist(rqueue: &mut RQueue) -> RevisitEnum {
    let (&stamp, revs) = rqueue
        .iter_mut()
        .next_back()
        .expect("pop on an empty worklist");
    let rev = revs.pop().expect("empty stamp bucket in the worklist");
    if revs.is_empty() {
        rqueue.remove(&stamp);
    }
    rev
}

/// A graph together with its pending revisits. Backward revisits push the
/// previous state; when a graph's worklist runs dry we pop back to it.
#[derive(Clone, Default, Serialize, Deserialize)]
pub(crate) struct DriverState {
    graph: ExecutionGraph,
    rqueue: RQueue,
}

type StateStack = Vec<DriverState>;

pub(crate) struct Driver {
    states: StateStack,
    current: DriverState,
    checker: Consistency,
    pub(crate) config: Config,
    rng: Pcg64Mcg,
    /// Ends the current execution early (estimation jumps, errors).
    stop: bool,
    /// Ends the whole exploration.
    done: bool,
    warn_limit: usize,
    stats: Stats,
    /// Running product of the choice-point fan-outs of this sample.
    est_factor: f64,
    /// The sample value recorded at the end of the last execution.
    est_last: f64,
}

impl Driver {
    pub(crate) fn new(config: Config) -> Self {
        let checker = Consistency::new(config.model);
        if config.schedule_policy == SchedulePolicy::Arbitrary
            || config.mode == ExplorationMode::Estimation
        {
            info!("Using random seed {}", config.seed);
        }
        let rng = Pcg64Mcg::seed_from_u64(config.seed);
        Self {
            states: Vec::new(),
            current: DriverState::default(),
            checker,
            config,
            rng,
            stop: false,
            done: false,
            warn_limit: 10,
            stats: Stats::default(),
            est_factor: 1.0,
            est_last: 0.0,
        }
    }

    pub(crate) fn begin_execution(&mut self) {
        self.current.graph.initialize_for_execution();
    }

    pub(crate) fn graph(&self) -> &ExecutionGraph {
        &self.current.graph
    }

    pub(crate) fn stats(&self) -> Stats {
        self.stats.clone()
    }

    pub(crate) fn exec_estimate(&self) -> f64 {
        self.est_last
    }

    pub(crate) fn is_stopped(&self) -> bool {
        self.stop
    }

    fn stop(&mut self) {
        self.stop = true;
    }

    fn unstop(&mut self) {
        self.stop = false;
    }

    fn is_replay(&self, pos: Event) -> bool {
        self.current.graph.contains(pos)
    }

    /// Stamp the label, wire it into the graph, and compute its views.
    fn add_to_graph(&mut self, lab: LabelEnum) -> Event {
        let tindex = self.current.graph.thread_size(lab.thread());
        if tindex > self.config.thread_threshold as usize && self.warn_limit > 0 {
            self.warn(&format!(
                "Thread {} has more than {} events. Is the test bounded?",
                lab.thread(),
                self.config.thread_threshold
            ));
            self.stop();
        }
        let pos = self.current.graph.add_label(lab);
        self.checker.calc_views(&mut self.current.graph, pos);
        pos
    }

    fn warn(&mut self, msg: &str) {
        eprintln!("Warning: {}", msg);
        self.warn_limit -= 1;
        if self.config.warnings_as_errors {
            eprintln!("Exiting because warnings_as_errors is set");
            std::process::exit(exitcode::DATAERR);
        }
    }

    // === Memory accesses ===

    /// Handle a load, returning the value it observes. `None` means the
    /// thread blocks: no coherent rf exists for an exclusive read.
    pub(crate) fn handle_load(&mut self, rlab: Read) -> Option<SVal> {
        let pos = rlab.pos();
        if self.is_replay(pos) {
            info!("| Replay Mode for {}", rlab);
            self.current
                .graph
                .validate_replay_event(&LabelEnum::Read(rlab));
            let rlab = self.current.graph.read_label(pos).unwrap();
            return Some(self.current.graph.read_value(rlab));
        }
        info!("| Handle Mode for {}", rlab);

        let pos = self.add_to_graph(LabelEnum::Read(rlab));
        let rfs = {
            let rlab = self.current.graph.read_label(pos).unwrap();
            self.checker.rfs(&self.current.graph, rlab)
        };
        if rfs.is_empty() {
            // No coherent candidate. Block here; a revisit that frees one
            // cuts this event and re-runs the thread.
            self.add_to_graph(LabelEnum::Block(Block::new(pos, BlockType::Assume)));
            return None;
        }

        let stamp = self.current.graph.label(pos).stamp();
        let chosen = if self.config.mode == ExplorationMode::Estimation {
            self.est_factor *= rfs.len() as f64;
            rfs[self.rng.gen_range(0..rfs.len())]
        } else {
            for &rf in rfs.iter().skip(1) {
                push_worklist(
                    &mut self.current.rqueue,
                    stamp,
                    RevisitEnum::new_read_forward(pos, rf),
                );
            }
            rfs[0]
        };
        self.current.graph.change_rf(pos, chosen);
        self.current.graph.register_read(&pos);

        let rlab = self.current.graph.read_label(pos).unwrap();
        Some(self.current.graph.read_value(rlab))
    }

    pub(crate) fn handle_store(&mut self, wlab: Write) {
        let pos = wlab.pos();
        if self.is_replay(pos) {
            info!("| Replay Mode for {}", wlab);
            self.current
                .graph
                .validate_replay_event(&LabelEnum::Write(wlab));
            return;
        }
        info!("| Handle Mode for {}", wlab);

        let pos = self.add_to_graph(LabelEnum::Write(wlab));
        self.current.graph.add_store_maximal(pos);

        let stamp = self.current.graph.label(pos).stamp();
        let (places, rmw) = {
            let wlab = self.current.graph.write_label(pos).unwrap();
            (
                self.checker.co_places(&self.current.graph, wlab),
                wlab.is_rmw(),
            )
        };
        debug_assert!(!places.is_empty());

        if rmw {
            // Atomicity pins the write; no alternatives to enumerate.
            self.current.graph.reposition_store(pos, places[0]);
        } else if self.config.mode == ExplorationMode::Estimation {
            self.est_factor *= places.len() as f64;
            let pred = places[self.rng.gen_range(0..places.len())];
            self.current.graph.reposition_store(pos, pred);
        } else {
            // The write already sits at places[0] (mo-maximal).
            for &pred in places.iter().skip(1) {
                push_worklist(
                    &mut self.current.rqueue,
                    stamp,
                    RevisitEnum::new_write_forward(pos, pred),
                );
            }
        }

        self.calc_revisits(pos);
    }

    // === Backward revisits ===

    /// Enumerate the reads the new write at `pos` can backward-revisit.
    /// Candidates are walked in decreasing stamp order; the two take_whiles
    /// implement the maximality condition that prevents duplication.
    fn calc_revisits(&mut self, pos: Event) {
        let stamp;
        let revs: Vec<Event> = {
            let g = &self.current.graph;
            let wlab = g.write_label(pos).unwrap();
            stamp = wlab.stamp();
            let wporf = wlab.porf();
            g.rev_matching_reads(wlab.addr())
                .filter(|rlab| !wporf.contains(rlab.pos()))
                .filter(|rlab| !self.deferred_to_confirmation(rlab))
                .take_while(|rlab| self.is_maximal_read(rlab, pos))
                .filter(|rlab| self.checker.is_revisit_consistent(g, rlab, wlab))
                .take_while(|rlab| self.is_maximal_extension(rlab.pos(), pos))
                .map(|rlab| rlab.pos())
                .collect()
        };

        if self.config.mode == ExplorationMode::Estimation {
            self.pick_revisit(revs, pos);
            return;
        }

        for &r in &revs {
            let view = self.current.graph.revisit_view(r, pos);
            let spec = self.spec_partner(r);
            push_worklist(
                &mut self.current.rqueue,
                stamp,
                RevisitEnum::new_backward(r, pos, view, spec),
            );
        }
    }

    /// A speculative read with a po-later confirmation is only re-pointed
    /// through a revisit of the confirming read; revisiting it directly
    /// would produce the confirmed execution a second time.
    fn deferred_to_confirmation(&self, rlab: &Read) -> bool {
        if !matches!(rlab.kind(), ReadKind::Speculative) {
            return false;
        }
        let pos = rlab.pos();
        self.current.graph.get_thr(&pos.thread()).labels[pos.index() as usize + 1..]
            .iter()
            .any(|lab| {
                matches!(lab, LabelEnum::Read(r)
                    if matches!(r.kind(), ReadKind::Confirming { .. }) && r.addr() == rlab.addr())
            })
    }

    /// The speculative read a confirming read drags along in a revisit.
    fn spec_partner(&self, r: Event) -> Option<Event> {
        let g = &self.current.graph;
        let rlab = g.read_label(r).unwrap();
        if !matches!(rlab.kind(), ReadKind::Confirming { .. }) {
            return None;
        }
        g.get_thr(&r.thread()).labels[..r.index() as usize]
            .iter()
            .rev()
            .find_map(|lab| match lab {
                LabelEnum::Read(s)
                    if matches!(s.kind(), ReadKind::Speculative) && s.addr() == rlab.addr() =>
                {
                    Some(s.pos())
                }
                _ => None,
            })
    }

    fn is_maximal_read(&self, rlab: &Read, wpos: Event) -> bool {
        !self.revisited_by_deleted(rlab, wpos)
            && rlab.is_revisitable()
            && self
                .checker
                .reads_tiebreaker(&self.current.graph, rlab, wpos)
    }

    /// A read whose rf would be deleted by the cut has already been
    /// produced through the other side; skip it.
    fn revisited_by_deleted(&self, rlab: &Read, wpos: Event) -> bool {
        let g = &self.current.graph;
        rlab.rf().is_some_and(|rf| {
            g.label(rf).stamp() > rlab.stamp()
                && !g.write_label(wpos).unwrap().porf().contains(rf)
        })
    }

    /// The part of the graph the revisit would delete must be a maximal
    /// extension of the kept prefix: every deleted read still observes its
    /// first coherent choice and every deleted write still sits at its
    /// insertion position.
    fn is_maximal_extension(&self, rpos: Event, wpos: Event) -> bool {
        let g = &self.current.graph;
        let stamp = g.label(rpos).stamp();
        let porf = g.write_label(wpos).unwrap().porf();
        for thread in g.threads.iter() {
            let i = thread
                .labels
                .partition_point(|lab| lab.stamp() <= stamp || porf.contains(lab.pos()));
            if thread.labels[i..].iter().any(|lab| !self.is_maximal(lab, wpos)) {
                return false;
            }
        }
        true
    }

    fn is_maximal(&self, lab: &LabelEnum, wpos: Event) -> bool {
        match lab {
            LabelEnum::Read(rlab) => self.is_maximal_read(rlab, wpos),
            LabelEnum::Write(wlab) => {
                let s = wlab.stamp();
                self.current
                    .graph
                    .store_succs(wlab.pos())
                    .iter()
                    .all(|&w| self.current.graph.label(w).stamp() > s)
            }
            _ => true,
        }
    }

    /// Estimation mode: instead of pushing every backward revisit, pick one
    /// of the `revs.len() + 1` continuations uniformly. Picking a revisit
    /// abandons the current execution and jumps to the revisited one.
    fn pick_revisit(&mut self, revs: Vec<Event>, pos: Event) {
        if revs.is_empty() {
            return;
        }
        self.est_factor *= (revs.len() + 1) as f64;
        let idx = self.rng.gen_range(0..=revs.len());
        if idx == revs.len() {
            return; // keep going with the current execution
        }
        let r = revs[idx];
        let stamp = self.current.graph.label(pos).stamp();
        let view = self.current.graph.revisit_view(r, pos);
        let spec = self.spec_partner(r);
        push_worklist(
            &mut self.current.rqueue,
            stamp,
            RevisitEnum::new_backward(r, pos, view, spec),
        );
        self.block_exec();
        self.stop();
    }

    /// Block every unfinished thread so the execution ends right away.
    fn block_exec(&mut self) {
        let tids: Vec<ThreadId> = self
            .current
            .graph
            .thread_ids()
            .into_iter()
            .filter(|&t| {
                !self.current.graph.is_thread_complete(t) && !self.current.graph.is_thread_blocked(t)
            })
            .collect();
        for t in tids {
            let pos = self.current.graph.thread_last(t).unwrap().pos().next();
            self.add_to_graph(LabelEnum::Block(Block::new(pos, BlockType::Assume)));
        }
    }

    // === Thread lifecycle ===

    pub(crate) fn handle_tcreate(&mut self, pos: Event) -> ThreadId {
        let cid = self.current.graph.tid_for_spawn(&pos);
        let lab = LabelEnum::TCreate(TCreate::new(pos, cid));
        if self.is_replay(pos) {
            info!("| Replay Mode for {}", lab);
            self.current.graph.validate_replay_event(&lab);
            return cid;
        }
        info!("| Handle Mode for {}", lab);
        let spawn = self.add_to_graph(lab);
        self.current.graph.add_new_thread(cid);
        self.add_to_graph(LabelEnum::Begin(Begin::new(Event::new(cid, 0), Some(spawn))));
        cid
    }

    /// Returns whether the join succeeded. A false return means the joining
    /// thread blocked on the child and must stop running for now.
    pub(crate) fn handle_tjoin(&mut self, pos: Event, cid: ThreadId) -> bool {
        if self.is_replay(pos) {
            self.current
                .graph
                .validate_replay_event(&LabelEnum::TJoin(TJoin::new(pos, cid)));
            return true;
        }
        if self.current.graph.is_thread_complete(cid) {
            self.add_to_graph(LabelEnum::TJoin(TJoin::new(pos, cid)));
            true
        } else {
            self.add_to_graph(LabelEnum::Block(Block::new(pos, BlockType::Join(cid))));
            false
        }
    }

    pub(crate) fn handle_tend(&mut self, pos: Event) {
        let lab = LabelEnum::End(End::new(pos));
        if self.is_replay(pos) {
            self.current.graph.validate_replay_event(&lab);
            return;
        }
        self.add_to_graph(lab);
    }

    pub(crate) fn handle_fence(&mut self, flab: Fence) {
        let lab = LabelEnum::Fence(flab);
        if self.is_replay(lab.pos()) {
            self.current.graph.validate_replay_event(&lab);
            return;
        }
        self.add_to_graph(lab);
    }

    pub(crate) fn handle_block(&mut self, blab: Block) {
        let lab = LabelEnum::Block(blab);
        if self.is_replay(lab.pos()) {
            self.current.graph.validate_replay_event(&lab);
            return;
        }
        self.add_to_graph(lab);
    }

    pub(crate) fn handle_malloc(&mut self, pos: Event, size: usize) -> SAddr {
        if self.is_replay(pos) {
            let expected = Malloc::new(pos, SAddr::dynamic(pos.thread(), pos.index()), size);
            self.current
                .graph
                .validate_replay_event(&LabelEnum::Malloc(expected));
            if let LabelEnum::Malloc(m) = self.current.graph.label(pos) {
                return m.addr();
            }
            unreachable!("replay validation admitted a non-malloc label");
        }
        let addr = SAddr::dynamic(pos.thread(), pos.index());
        self.add_to_graph(LabelEnum::Malloc(Malloc::new(pos, addr, size)));
        addr
    }

    pub(crate) fn handle_free(&mut self, flab: Free) {
        let lab = LabelEnum::Free(flab);
        if self.is_replay(lab.pos()) {
            self.current.graph.validate_replay_event(&lab);
            return;
        }
        self.add_to_graph(lab);
    }

    // === Scheduling support ===

    /// Whether `tid` can run. Unblocks a join whose child has since ended.
    pub(crate) fn thread_runnable(&mut self, tid: ThreadId) -> bool {
        if self.current.graph.get_thr_opt(&tid).is_none() {
            return false;
        }
        let unblock = match self.current.graph.thread_last(tid) {
            Some(LabelEnum::End(_)) => return false,
            Some(LabelEnum::Block(blab)) => match blab.btype() {
                BlockType::Join(cid) => {
                    if self.current.graph.is_thread_complete(*cid) {
                        true
                    } else {
                        return false;
                    }
                }
                _ => return false,
            },
            _ => return true,
        };
        if unblock {
            self.current.graph.remove_last(tid);
        }
        true
    }

    pub(crate) fn schedule(&mut self, order: &mut [ThreadId]) {
        if self.config.schedule_policy == SchedulePolicy::Arbitrary {
            order.shuffle(&mut self.rng);
        }
    }

    // === Ending an execution ===

    /// Record the execution that just ended and move to the next one.
    /// Returns true when exploration is over.
    pub(crate) fn complete_execution(&mut self) -> bool {
        let maybe_block = self.check_blocked();
        let exceeded = self.record_ending(&maybe_block);
        if exceeded || self.done {
            return true;
        }
        self.unstop();
        !self.try_revisit()
    }

    fn check_blocked(&self) -> Option<BlockType> {
        for t in self.current.graph.thread_ids() {
            if let Some(LabelEnum::Block(blab)) = self.current.graph.thread_last(t) {
                return Some(blab.btype().clone());
            }
        }
        None
    }

    fn record_ending(&mut self, maybe_block: &Option<BlockType>) -> bool {
        let consistent = self.checker.is_consistent(&self.current.graph);

        match maybe_block {
            Some(btype) => {
                self.est_last = 0.0;
                if consistent {
                    self.stats.block += 1;
                    if self.config.verbose >= 2 {
                        println!("One more blocked execution ({:?})", btype);
                        println!("{}", self.current.graph);
                    }
                }
            }
            None => {
                self.est_last = if consistent { self.est_factor } else { 0.0 };
                if consistent {
                    if self.within_bound() {
                        self.stats.execs += 1;
                        if self.config.verbose >= 1 {
                            println!("One more complete execution");
                            println!("{}", self.current.graph);
                        }
                        if self.config.check_races {
                            self.report_races();
                        }
                    } else {
                        self.stats.pruned_by_bound += 1;
                    }
                }
            }
        }

        let num_total = (self.stats.execs + self.stats.block + self.stats.pruned_by_bound) as u64;
        let progress_desc = format!(
            "Executions attempted so far: {} total, {} finished normally, {} blocked.",
            num_total, self.stats.execs, self.stats.block
        );
        if self.config.progress_report > 0 {
            if num_total % (self.config.progress_report as u64) == 0 {
                println!("{}", progress_desc);
            }
        } else if Self::should_report(num_total) {
            info!("{}", progress_desc);
        }

        if let Some(n) = self.config.max_iterations {
            if num_total >= n {
                println!("Stopping exploration: max_iterations reached.");
                return true;
            }
        }
        false
    }

    // Report at 1, 2, .. 9, 10, 20, .. 90, 100, 200, ...
    fn should_report(mut n: u64) -> bool {
        if n == 0 {
            return false;
        }
        while n % 10 == 0 {
            n /= 10;
        }
        n < 10
    }

    fn within_bound(&self) -> bool {
        match self.config.bound {
            None => true,
            Some((btype, k)) => make_decider(btype).doesnt_exceed(&self.current.graph, k),
        }
    }

    fn report_races(&mut self) {
        let races = self.checker.find_races(&self.current.graph);
        self.stats.races += races.len();
        for (a, b) in races {
            let msg = format!("Data race between {} and {}", a, b);
            eprintln!("{}", msg);
            self.report_error(msg);
        }
    }

    /// Record an assertion failure, unless the observing execution is
    /// inconsistent (then it can never actually happen).
    pub(crate) fn report_assert_failure(&mut self, msg: &str) {
        if self.checker.is_consistent(&self.current.graph) {
            self.report_error(format!("Assertion failed: {}", msg));
        }
    }

    pub(crate) fn report_error(&mut self, msg: String) {
        self.stats.errors.push(msg);
        self.store_counterexample();
        if !self.config.keep_going_after_error {
            self.done = true;
            self.stop();
        }
    }

    fn store_counterexample(&self) {
        let Some(path) = self.config.error_trace_file.as_ref() else {
            return;
        };
        match serde_json::to_string_pretty(&self.current) {
            Ok(json) => match File::create(path) {
                Ok(mut file) => {
                    if let Err(e) = writeln!(file, "{}", json) {
                        eprintln!("Can't write the error trace to {}: {}", path, e);
                    }
                }
                Err(e) => eprintln!("Can't create the error trace file {}: {}", path, e),
            },
            Err(e) => eprintln!("Can't serialize the graph to json: {}", e),
        }
    }

    // === The revisit loop ===

    /// Pop and apply the next revisit, restoring popped states as their
    /// worklists run dry. Returns false when exploration is exhausted.
    fn try_revisit(&mut self) -> bool {
        loop {
            if self.current.rqueue.is_empty() {
                if self.try_pop_state() {
                    continue;
                }
                return false;
            }
            let rev = pop_worklist(&mut self.current.rqueue);
            if self.config.verbose >= 3 {
                println!("Applying revisit {:?}", rev);
                println!("{}", self.current.graph);
            }
            match rev {
                RevisitEnum::ReadForward { pos, rf } => self.read_forward_revisit(pos, rf),
                RevisitEnum::WriteForward { pos, pred } => self.write_forward_revisit(pos, pred),
                RevisitEnum::Backward {
                    pos,
                    rev,
                    view,
                    spec,
                } => self.backward_revisit(pos, rev, &view, spec),
            }
            if self.config.verbose >= 3 {
                println!("Graph after the revisit:");
                println!("{}", self.current.graph);
            }
            return true;
        }
    }

    fn read_forward_revisit(&mut self, pos: Event, rf: Option<Event>) {
        info!("================ begin forward revisit ===================");
        let stamp = self.current.graph.label(pos).stamp();
        self.current.graph.change_rf(pos, rf);
        self.current.graph.cut_to_stamp(stamp);
    }

    fn write_forward_revisit(&mut self, pos: Event, pred: Option<Event>) {
        info!("================ begin forward revisit ===================");
        let stamp = self.current.graph.label(pos).stamp();
        self.current.graph.reposition_store(pos, pred);
        self.current.graph.cut_to_stamp(stamp);
    }

    fn backward_revisit(
        &mut self,
        pos: Event,
        rev: Event,
        view: &VectorClock,
        spec: Option<Event>,
    ) {
        info!("================ begin backward revisit ===================");
        let ng = self.current.graph.copy_to_view(view);
        self.push_state();
        self.current.graph = ng;
        self.mark_prefix_non_revisitable(rev);
        match spec {
            None => self.current.graph.change_rf(pos, Some(rev)),
            // A confirming read's payload depends on its speculative partner,
            // so the stored label would no longer match a replay. Re-point
            // the speculation and drop the confirmation; the re-run body
            // issues it afresh with the newly observed value.
            Some(s) => {
                self.current.graph.change_rf(s, Some(rev));
                self.current.graph.remove_last(pos.thread());
            }
        }
    }

    /// Reads in the porf prefix of the revisiting write must keep their rf
    /// in every execution descending from this one.
    fn mark_prefix_non_revisitable(&mut self, write: Event) {
        let prefix = self
            .current
            .graph
            .write_label(write)
            .unwrap()
            .porf()
            .clone();
        for thread in self.current.graph.threads.iter_mut() {
            let j = thread
                .labels
                .partition_point(|lab| prefix.contains(lab.pos()));
            for lab in &mut thread.labels[..j] {
                if let LabelEnum::Read(rlab) = lab {
                    rlab.set_revisitable(false);
                }
            }
        }
    }

    fn push_state(&mut self) {
        let state = std::mem::take(&mut self.current);
        self.states.push(state);
    }

    fn try_pop_state(&mut self) -> bool {
        match self.states.pop() {
            Some(state) => {
                self.current = state;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::main_thread_id;

    #[test]
    fn worklist_pops_highest_stamp_lifo() {
        let mut rqueue = RQueue::new();
        let pos = Event::new(main_thread_id(), 1);
        push_worklist(&mut rqueue, 3, RevisitEnum::new_read_forward(pos, None));
        push_worklist(
            &mut rqueue,
            7,
            RevisitEnum::new_write_forward(pos, None),
        );
        push_worklist(&mut rqueue, 7, RevisitEnum::new_read_forward(pos, None));

        assert!(matches!(
            pop_worklist(&mut rqueue),
            RevisitEnum::ReadForward { .. }
        ));
        assert!(matches!(
            pop_worklist(&mut rqueue),
            RevisitEnum::WriteForward { .. }
        ));
        assert!(matches!(
            pop_worklist(&mut rqueue),
            RevisitEnum::ReadForward { .. }
        ));
        assert!(rqueue.is_empty());
    }

    #[test]
    fn progress_reporting_thins_out() {
        assert!(Driver::should_report(1));
        assert!(Driver::should_report(90));
        assert!(Driver::should_report(4000));
        assert!(!Driver::should_report(11));
        assert!(!Driver::should_report(4001));
    }
}
