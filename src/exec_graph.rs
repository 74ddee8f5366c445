use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::event::{construct_thread_id, main_thread_id, Event};
use crate::event_label::*;
use crate::indexed_map::IndexedMap;
use crate::value::{SAddr, SVal};
use crate::vector_clock::VectorClock;
use crate::ThreadId;

/// Encapsulates the execution information about a single thread
#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct ThreadInfo {
    pub(crate) tid: ThreadId,
    pub(crate) labels: Vec<LabelEnum>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct ExecutionGraph {
    pub(crate) threads: IndexedMap<ThreadInfo>,
    stamp: usize,
    pub(crate) finished_threads: HashSet<ThreadId>,
    /// Modification order: per location, the writes to it in coherence
    /// order. The implicit initializing write is not stored; it precedes
    /// every chain.
    ///
    /// This is authoritative state, not a cache: coherence order is chosen
    /// by the exploration and cannot be re-derived from the labels.
    mo: HashMap<SAddr, Vec<Event>>,
    /// A cache of the reads per location, sorted by increasing stamp.
    #[serde(skip)]
    reads: HashMap<SAddr, Vec<Event>>,
}

impl ExecutionGraph {
    pub(crate) fn new() -> ExecutionGraph {
        let t0 = main_thread_id();
        ExecutionGraph {
            threads: IndexedMap::new_with_first(ThreadInfo {
                tid: t0,
                labels: vec![LabelEnum::Begin(Begin::main())],
            }),
            stamp: 0,
            finished_threads: HashSet::new(),
            mo: HashMap::new(),
            reads: HashMap::new(),
        }
    }

    /// Called just before we start an execution. When doing a forwards or
    /// backwards revisit, the graph is cloned (not constructed fresh) so it
    /// can contain stale per-execution state.
    pub(crate) fn initialize_for_execution(&mut self) {
        self.finished_threads.clear();
        let tids = self.threads.iter().map(|t| t.tid).collect::<Vec<_>>();
        tids.iter().for_each(|tid| self.on_thread_changed(tid));
    }

    pub(crate) fn on_thread_changed(&mut self, tid: &ThreadId) {
        if let Some(LabelEnum::End(_)) = self.get_thr(tid).labels.last() {
            self.finished_threads.insert(*tid);
        } else {
            self.finished_threads.remove(tid);
        }
    }

    pub(crate) fn validate_replay_event(&self, actual: &LabelEnum) {
        let expected = &self.get_thr(&actual.thread()).labels[actual.index() as usize];
        Self::panic_if_err(expected.compare_for_replay(actual));
    }

    pub(crate) fn panic_if_err(res: Result<(), String>) {
        if let Err(e) = res {
            panic!("Incorrect test program. Modeled programs must be deterministic. Any nondeterminism must come from the modeled memory accesses themselves.\n{}",
            e);
        }
    }

    /// Find the ThreadInfo structure for a thread, or panic with an error message.
    pub(crate) fn get_thr(&self, tid: &ThreadId) -> &ThreadInfo {
        self.get_thr_opt(tid).unwrap_or_else(|| {
            panic!(
                "Can't find thread {} in graph with thread ids {:?}",
                *tid,
                self.threads.iter().map(|t| t.tid).collect::<Vec<_>>()
            )
        })
    }

    pub(crate) fn get_thr_opt(&self, tid: &ThreadId) -> Option<&ThreadInfo> {
        self.threads.get(Into::<usize>::into(*tid))
    }

    pub(crate) fn get_thr_opt_mut(&mut self, tid: &ThreadId) -> Option<&mut ThreadInfo> {
        self.threads.get_mut(Into::<usize>::into(*tid))
    }

    pub(crate) fn get_thr_mut(&mut self, tid: &ThreadId) -> &mut ThreadInfo {
        self.get_thr_opt_mut(tid).unwrap_or_else(|| {
            panic!("Can't find thread {}", *tid);
        })
    }

    // ====

    pub(crate) fn stamp(&self) -> usize {
        self.stamp
    }

    pub(crate) fn next_stamp(&mut self) -> usize {
        self.stamp += 1;
        self.stamp
    }

    pub(crate) fn add_new_thread(&mut self, tid: ThreadId) {
        assert!(self.get_thr_opt(&tid).is_none());
        let index: usize = tid.into();
        self.threads.set(index, ThreadInfo { tid, labels: vec![] });
    }

    pub(crate) fn thread_ids(&self) -> BTreeSet<ThreadId> {
        self.threads.iter().map(|t| t.tid).collect()
    }

    /// Fresh thread id for a spawn at `pos`. During replay the TCreate is
    /// already in the graph and the same id must come back.
    pub(crate) fn tid_for_spawn(&self, pos: &Event) -> ThreadId {
        if self.contains(*pos) {
            if let LabelEnum::TCreate(tclab) = self.label(*pos) {
                return tclab.cid();
            }
            let msg = format!(
                "Expected spawn event at {:?} but have {:?}",
                pos,
                self.label(*pos)
            );
            Self::panic_if_err(Result::Err(msg));
        }

        // Return a new thread id one larger than any existing.
        let opaque_id = self
            .threads
            .iter()
            .max_by_key(|t| t.tid.to_number())
            .expect("Didn't expect zero threads!")
            .tid
            .to_number();
        construct_thread_id(opaque_id + 1)
    }

    pub(crate) fn thread_size(&self, t: ThreadId) -> usize {
        self.get_thr(&t).labels.len()
    }

    pub(crate) fn thread_last(&self, t: ThreadId) -> Option<&LabelEnum> {
        self.get_thr(&t).labels.last()
    }

    pub(crate) fn is_thread_blocked(&self, t: ThreadId) -> bool {
        matches!(self.thread_last(t).unwrap(), LabelEnum::Block(_))
    }

    pub(crate) fn is_thread_complete(&self, t: ThreadId) -> bool {
        self.finished_threads.contains(&t)
    }

    /// Add a label to the graph, giving it a new stamp if it does not have one.
    pub(crate) fn add_label(&mut self, lab: LabelEnum) -> Event {
        self.add(lab).pos()
    }

    fn add(&mut self, mut lab: LabelEnum) -> &LabelEnum {
        if !lab.stamped() {
            lab.set_stamp(self.next_stamp());
        }

        let pos = lab.pos();

        let existing_label_count = self.thread_size(lab.thread());

        // Allow label overwrites
        match (lab.index() as usize).cmp(&existing_label_count) {
            Ordering::Greater => {
                panic!(
                    "Label index {} must be <= {}",
                    lab.index(),
                    existing_label_count
                );
            }
            Ordering::Equal => {
                self.get_thr_mut(&pos.thread).labels.push(lab);
            }
            Ordering::Less => {
                // Overwriting a label. Validate it so that the existing
                // execution graph remains consistent.
                let old_label = &self.get_thr(&pos.thread).labels[pos.index as usize];
                let old_is_tcreate = matches!(old_label, LabelEnum::TCreate(_));
                let new_is_tcreate = matches!(lab, LabelEnum::TCreate(_));
                assert_eq!(
                    old_is_tcreate, new_is_tcreate,
                    "Overwriting a spawn label at {} with a non-spawn label",
                    pos
                );
                self.get_thr_mut(&pos.thread).labels[pos.index as usize] = lab;
            }
        }
        self.on_thread_changed(&pos.thread);
        &self.get_thr(&pos.thread).labels[pos.index as usize]
    }

    pub(crate) fn contains(&self, e: Event) -> bool {
        self.get_thr_opt(&e.thread).is_some() && (e.index as usize) < self.thread_size(e.thread)
    }

    pub(crate) fn remove_last(&mut self, t: ThreadId) {
        let last = self
            .get_thr(&t)
            .labels
            .last()
            .map(|lab| (lab.pos(), lab.addr()));
        if let Some((pos, addr)) = last {
            if let Some(addr) = addr {
                if self.is_read(pos) {
                    self.remove_from_readers(pos);
                    if let Some(vec) = self.reads.get_mut(&addr) {
                        vec.retain(|&e| e != pos);
                    }
                } else if let Some(wlab) = self.write_label(pos) {
                    assert!(
                        wlab.is_unread(),
                        "Removing a write that is still being read"
                    );
                    if let Some(chain) = self.mo.get_mut(&addr) {
                        chain.retain(|&e| e != pos);
                    }
                }
            }
        }
        self.get_thr_mut(&t).labels.pop();
        self.on_thread_changed(&t);
    }

    pub(crate) fn label(&self, e: Event) -> &LabelEnum {
        &self.get_thr(&e.thread).labels[e.index as usize]
    }

    pub(crate) fn label_mut(&mut self, e: Event) -> &mut LabelEnum {
        &mut self.get_thr_mut(&e.thread).labels[e.index as usize]
    }

    pub(crate) fn is_read(&self, e: Event) -> bool {
        matches!(self.label(e), LabelEnum::Read(_))
    }

    pub(crate) fn read_label(&self, e: Event) -> Option<&Read> {
        if let LabelEnum::Read(l) = self.label(e) {
            Some(l)
        } else {
            None
        }
    }

    pub(crate) fn read_label_mut(&mut self, e: Event) -> Option<&mut Read> {
        if let LabelEnum::Read(l) = self.label_mut(e) {
            Some(l)
        } else {
            None
        }
    }

    pub(crate) fn is_write(&self, e: Event) -> bool {
        matches!(self.label(e), LabelEnum::Write(_))
    }

    pub(crate) fn write_label(&self, e: Event) -> Option<&Write> {
        if let LabelEnum::Write(l) = self.label(e) {
            Some(l)
        } else {
            None
        }
    }

    pub(crate) fn write_label_mut(&mut self, e: Event) -> Option<&mut Write> {
        if let LabelEnum::Write(l) = self.label_mut(e) {
            Some(l)
        } else {
            None
        }
    }

    /// The value observed by a read: its rf's value, or 0 for the implicit
    /// initializing write.
    pub(crate) fn read_value(&self, rlab: &Read) -> SVal {
        match rlab.rf() {
            None => SVal::new(0),
            Some(w) => self.write_label(w).unwrap().value(),
        }
    }

    // === Modification order ===

    /// The writes to a location, in coherence order. The initializing write
    /// is implicit and precedes the chain.
    pub(crate) fn stores_to_loc(&self, addr: SAddr) -> &[Event] {
        self.mo.get(&addr).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Append a write at the end (mo-maximal position) of its chain.
    pub(crate) fn add_store_maximal(&mut self, w: Event) {
        let addr = self.write_label(w).unwrap().addr();
        let chain = self.mo.entry(addr).or_default();
        debug_assert!(!chain.contains(&w));
        chain.push(w);
    }

    /// Insert a write immediately after `pred` (`None` is the chain head,
    /// right after the initializing write).
    pub(crate) fn add_store_after(&mut self, w: Event, pred: Option<Event>) {
        let addr = self.write_label(w).unwrap().addr();
        let chain = self.mo.entry(addr).or_default();
        debug_assert!(!chain.contains(&w));
        let at = match pred {
            None => 0,
            Some(p) => {
                chain
                    .iter()
                    .position(|&e| e == p)
                    .expect("mo predecessor must be in the chain")
                    + 1
            }
        };
        chain.insert(at, w);
    }

    /// Move an already-placed write to immediately after `pred`.
    pub(crate) fn reposition_store(&mut self, w: Event, pred: Option<Event>) {
        let addr = self.write_label(w).unwrap().addr();
        self.mo.get_mut(&addr).unwrap().retain(|&e| e != w);
        self.add_store_after(w, pred);
    }

    /// The mo-predecessor of a write (`None` is the initializing write).
    pub(crate) fn store_pred(&self, w: Event) -> Option<Event> {
        let addr = self.write_label(w).unwrap().addr();
        let chain = self.stores_to_loc(addr);
        let i = chain
            .iter()
            .position(|&e| e == w)
            .expect("write must be in its chain");
        if i == 0 {
            None
        } else {
            Some(chain[i - 1])
        }
    }

    /// The mo-successors of a write, in coherence order.
    pub(crate) fn store_succs(&self, w: Event) -> &[Event] {
        let addr = self.write_label(w).unwrap().addr();
        let chain = self.stores_to_loc(addr);
        let i = chain
            .iter()
            .position(|&e| e == w)
            .expect("write must be in its chain");
        &chain[i + 1..]
    }

    pub(crate) fn mo_before(&self, a: Event, b: Event) -> bool {
        let addr = self.write_label(a).unwrap().addr();
        let chain = self.stores_to_loc(addr);
        let ia = chain.iter().position(|&e| e == a);
        let ib = chain.iter().position(|&e| e == b);
        match (ia, ib) {
            (Some(ia), Some(ib)) => ia < ib,
            _ => false,
        }
    }

    /// Iterate over all writes in the execution.
    pub(crate) fn all_store_iter(&self) -> impl Iterator<Item = &Write> {
        self.threads.iter().flat_map(|t| {
            t.labels.iter().filter_map(|l| {
                if let LabelEnum::Write(w) = l {
                    Some(w)
                } else {
                    None
                }
            })
        })
    }

    /// Iterate over all thread-create labels in the execution.
    pub(crate) fn thread_creates(&self) -> impl Iterator<Item = &TCreate> {
        self.threads.iter().flat_map(|t| {
            t.labels.iter().filter_map(|l| {
                if let LabelEnum::TCreate(tc) = l {
                    Some(tc)
                } else {
                    None
                }
            })
        })
    }

    /// The reads of a location, in *decreasing* stamp order. These are the
    /// backward-revisit candidates of a new write.
    pub(crate) fn rev_matching_reads(&self, addr: SAddr) -> impl Iterator<Item = &Read> {
        self.reads
            .get(&addr)
            .into_iter()
            .flat_map(|v| v.iter().rev())
            .map(move |&pos| self.read_label(pos).unwrap())
    }

    // Cache the read in the per-location map.
    pub(crate) fn register_read(&mut self, read: &Event) {
        let rlab = self.read_label(*read);
        // We might have been called with a Block event, ignore it
        if rlab.is_none() {
            return;
        }
        let addr = rlab.unwrap().addr();
        let reads = self.reads.entry(addr).or_default();
        debug_assert!(!reads.contains(read));
        reads.push(*read);
    }

    /// The exclusive read observing this write, if any. Two exclusive reads
    /// of the same write would break RMW atomicity.
    pub(crate) fn exclusive_reader(&self, w: Event) -> Option<Event> {
        self.write_label(w)
            .unwrap()
            .readers()
            .iter()
            .copied()
            .find(|&r| self.read_label(r).is_some_and(|rlab| rlab.is_exclusive()))
    }

    /// Whether the exclusive read at r has produced its write half. A failed
    /// compare-exchange leaves an exclusive read with no write half behind it.
    pub(crate) fn has_rmw_write(&self, r: Event) -> bool {
        let next = r.next();
        (next.index as usize) < self.get_thr(&next.thread).labels.len()
            && self.write_label(next).is_some_and(|w| w.is_rmw())
    }

    // === rf maintenance ===

    // Removes the read from its rf's readers
    fn remove_from_readers(&mut self, read: Event) {
        let rlab = self.read_label(read).unwrap();
        if let Some(old_write) = rlab.rf() {
            self.write_label_mut(old_write).unwrap().remove_reader(read);
        }
    }

    /// Change rf in-place, updating the writes' readers
    pub(crate) fn change_rf(&mut self, read: Event, write: Option<Event>) {
        assert!(self.is_read(read));
        assert!(write.is_none() || self.is_write(write.unwrap()));

        self.remove_from_readers(read);

        if let Some(new_write) = write {
            self.write_label_mut(new_write).unwrap().add_reader(read);
        }

        self.read_label_mut(read).unwrap().set_rf(write);
    }

    /// vector clock with events stamp-{before or equal} the revisited read
    /// (inclusive) and the porf-prefix of the revisiting write (inclusive)
    // N.B. it doesn't include the revisited read's rf dependency
    pub(crate) fn revisit_view(&self, read: Event, write: Event) -> VectorClock {
        let mut v = self.view_from_stamp(self.label(read).stamp());
        v.update(self.write_label(write).unwrap().porf());

        // v.update() may cause more TCreate labs to be visible in the vector
        // clock. Find those TCreate labels and add their corresponding Begin
        // labels to the clock, since view_from_stamp may not have chosen to
        // expose them.
        for thr in self.threads.iter() {
            if let Some(vc_limit_inclusive) = v.get(thr.tid) {
                for lab in thr.labels.iter().take(vc_limit_inclusive as usize + 1) {
                    if let LabelEnum::TCreate(tclab) = lab {
                        // update_or_set is idempotent--does nothing if the VC
                        // already has this event.
                        v.update_or_set(Event::new(tclab.cid(), 0));
                    }
                }
            }
        }

        v
    }

    /// Return a view with all the events up to the stamp (inclusive)
    pub(crate) fn view_from_stamp(&self, s: usize) -> VectorClock {
        let mut v = VectorClock::new();
        for thread in self.threads.iter() {
            // Labels are sorted by stamp. Find the last, if any, s.t. stamp <= s.
            let i = thread.labels.partition_point(|lab| lab.stamp() <= s);
            if i != 0 {
                v.update_or_set(thread.labels[i - 1].pos());
            }
        }
        v
    }

    pub(crate) fn cut_to_view(&mut self, v: &VectorClock) {
        // mo chains: remove the writes which are not visible in the view
        self.mo
            .values_mut()
            .for_each(|chain| chain.retain(|e| v.contains(*e)));
        self.mo.retain(|_, chain| !chain.is_empty());

        // Read cache: same
        self.reads
            .values_mut()
            .for_each(|vec| vec.retain(|e| v.contains(*e)));
        self.reads.retain(|_, vec| !vec.is_empty());

        // Readers cache: remove the deleted reads from the writes' readers
        let mut deleted_reads = vec![];
        for threads in self.threads.iter() {
            let j = threads.labels.partition_point(|lab| v.contains(lab.pos()));
            for lab in threads.labels[j..].iter() {
                if let LabelEnum::Read(rlab) = lab {
                    deleted_reads.push(rlab.pos());
                }
            }
        }

        for deleted in deleted_reads {
            self.remove_from_readers(deleted);
        }

        // Erase all the threads not found in the vector clock.
        self.threads.retain(|t| v.get(t.tid).is_some());

        // Remove the labels from each thread which are not visible in the view
        let tids = self.threads.iter().map(|t| t.tid).collect::<Vec<_>>();
        for tid in tids {
            let event_idx = v
                .get(tid)
                .expect("any thread not in the vector clock should already be erased")
                as usize
                + 1;
            let ind: usize = tid.into();
            self.threads[ind].labels.truncate(event_idx);
            self.on_thread_changed(&tid);
        }

        self.check_invariants();
    }

    pub(crate) fn cut_to_stamp(&mut self, s: usize) {
        let v = self.view_from_stamp(s);
        self.cut_to_view(&v);
    }

    pub(crate) fn copy_to_view(&self, v: &VectorClock) -> ExecutionGraph {
        // Implement copy to view by cloning and then using cut_to_view.
        // This might be inefficient but it avoids duplicating a bunch of
        // subtle logic from cut_to_view
        let mut other = self.clone();
        other.cut_to_view(v);
        other
    }

    pub(crate) fn check_invariants(&self) {
        self.check_spawn_invariants();
        self.check_rf_invariants();
        self.check_mo_invariants();
    }

    fn check_spawn_invariants(&self) {
        // Check the consistency of the information about which thread spawned
        // which, represented 2 ways:
        // 1. self.threads events, filtered for TCreate
        // 2. self.threads events, filtered for Begin, examining parent
        // Construct 2 maps of (child -> (parent, spawn_event_index)) and
        // assert they are equal. The main thread is in neither.

        let child_thread_ids: Vec<ThreadId> = self
            .thread_ids()
            .iter()
            .copied()
            .filter(|&tid| tid != main_thread_id())
            .collect();

        let mut threads_from_tcreate: BTreeMap<ThreadId, (ThreadId, usize)> = BTreeMap::new();
        for thread_info in self.threads.iter() {
            let parent_thread_id = thread_info.tid;
            for (event_idx, event) in thread_info.labels.iter().enumerate() {
                if let LabelEnum::TCreate(tc) = &event {
                    let child_thread_id = tc.cid();
                    assert!(!threads_from_tcreate.contains_key(&child_thread_id));
                    threads_from_tcreate.insert(child_thread_id, (parent_thread_id, event_idx));
                }
            }
        }

        // Assert every thread has a TCreate entry.
        let thread_ids_from_tcreate = threads_from_tcreate.keys().copied().collect::<Vec<_>>();
        assert_eq!(
            child_thread_ids, thread_ids_from_tcreate,
            "threads and TCreate labels aren't consistent"
        );

        let mut threads_from_begin: BTreeMap<ThreadId, (ThreadId, usize)> = BTreeMap::new();
        for thread_info in self.threads.iter() {
            if thread_info.tid == main_thread_id() {
                continue;
            }
            let child_thread_id = thread_info.tid;
            if let Some(LabelEnum::Begin(blab)) = thread_info.labels.first() {
                if let Some(parent) = blab.parent() {
                    assert!(!threads_from_begin.contains_key(&child_thread_id));
                    threads_from_begin
                        .insert(child_thread_id, (parent.thread(), parent.index() as usize));
                } else {
                    panic!("Every thread other than main must have a parent");
                }
            } else {
                panic!("First event must be Begin");
            }
        }

        assert_eq!(
            threads_from_begin, threads_from_tcreate,
            "begin and tcreate events are inconsistent"
        );
    }

    fn check_rf_invariants(&self) {
        for thread_info in self.threads.iter() {
            for lab in &thread_info.labels {
                match lab {
                    LabelEnum::Read(rlab) => {
                        if let Some(w) = rlab.rf() {
                            assert!(self.contains(w), "rf of {} dangles", rlab.pos());
                            assert!(
                                self.write_label(w).unwrap().readers().contains(&rlab.pos()),
                                "rf and readers disagree at {}",
                                rlab.pos()
                            );
                        }
                    }
                    LabelEnum::Write(wlab) => {
                        for &r in wlab.readers() {
                            assert!(
                                self.read_label(r)
                                    .is_some_and(|rlab| rlab.rf() == Some(wlab.pos())),
                                "readers and rf disagree at {}",
                                wlab.pos()
                            );
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    fn check_mo_invariants(&self) {
        let mut in_mo: HashSet<Event> = HashSet::new();
        for (addr, chain) in &self.mo {
            for &w in chain {
                assert!(self.contains(w), "mo entry {} dangles", w);
                let wlab = self.write_label(w).unwrap_or_else(|| {
                    panic!("mo entry {} is not a write", w);
                });
                assert_eq!(wlab.addr(), *addr, "mo entry {} is in the wrong chain", w);
                assert!(in_mo.insert(w), "mo entry {} appears twice", w);
            }
        }
        for wlab in self.all_store_iter() {
            assert!(
                in_mo.contains(&wlab.pos()),
                "write {} is missing from mo",
                wlab.pos()
            );
        }
    }
}

impl Default for ExecutionGraph {
    fn default() -> Self {
        ExecutionGraph::new()
    }
}

impl std::fmt::Display for ExecutionGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Printing exec graph")?;
        for thread_info in self.threads.iter() {
            writeln!(f, "thread {}:", thread_info.tid)?;
            for lab in thread_info.labels.iter() {
                writeln!(f, "\t{}", lab)?;
            }
        }
        let mut addrs: Vec<&SAddr> = self.mo.keys().collect();
        addrs.sort();
        for addr in addrs {
            let chain = self.mo[addr]
                .iter()
                .map(|e| format!("{}", e))
                .collect::<Vec<_>>()
                .join(" -> ");
            writeln!(f, "mo[{}]: init -> {}", addr, chain)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{MemOrd, SAddr, SVal};

    fn write_at(g: &mut ExecutionGraph, tid: ThreadId, addr: SAddr, val: u64) -> Event {
        let pos = Event::new(tid, g.thread_size(tid) as u32);
        let w = Write::new(pos, addr, MemOrd::Relaxed, SVal::new(val), false);
        let pos = g.add_label(LabelEnum::Write(w));
        g.add_store_maximal(pos);
        pos
    }

    fn read_at(g: &mut ExecutionGraph, tid: ThreadId, addr: SAddr) -> Event {
        let pos = Event::new(tid, g.thread_size(tid) as u32);
        let r = Read::new(pos, addr, MemOrd::Relaxed, ReadKind::Plain, None);
        let pos = g.add_label(LabelEnum::Read(r));
        g.register_read(&pos);
        pos
    }

    #[test]
    fn mo_placement() {
        let mut g = ExecutionGraph::new();
        let t0 = main_thread_id();
        let x = SAddr::global(0);
        let w1 = write_at(&mut g, t0, x, 1);
        let w2 = write_at(&mut g, t0, x, 2);
        assert_eq!(g.stores_to_loc(x), &[w1, w2]);
        assert!(g.mo_before(w1, w2));
        assert!(g.store_succs(w2).is_empty());
        assert_eq!(g.store_pred(w1), None);
        assert_eq!(g.store_pred(w2), Some(w1));

        let w3 = write_at(&mut g, t0, x, 3);
        g.reposition_store(w3, None);
        assert_eq!(g.stores_to_loc(x), &[w3, w1, w2]);
        assert_eq!(g.store_succs(w3), &[w1, w2]);
    }

    #[test]
    fn rf_and_readers_stay_in_sync() {
        let mut g = ExecutionGraph::new();
        let t0 = main_thread_id();
        let x = SAddr::global(0);
        let w1 = write_at(&mut g, t0, x, 1);
        let r = read_at(&mut g, t0, x);

        g.change_rf(r, Some(w1));
        assert_eq!(g.read_label(r).unwrap().rf(), Some(w1));
        assert_eq!(g.write_label(w1).unwrap().readers(), &vec![r]);
        assert_eq!(g.read_value(g.read_label(r).unwrap()), SVal::new(1));

        g.change_rf(r, None);
        assert!(g.write_label(w1).unwrap().is_unread());
        assert_eq!(g.read_value(g.read_label(r).unwrap()), SVal::new(0));
        g.check_invariants();
    }

    #[test]
    fn cut_to_stamp_trims_mo_and_readers() {
        let mut g = ExecutionGraph::new();
        let t0 = main_thread_id();
        let x = SAddr::global(0);
        let w1 = write_at(&mut g, t0, x, 1);
        let keep = g.label(w1).stamp();
        let w2 = write_at(&mut g, t0, x, 2);
        assert_eq!(g.stores_to_loc(x), &[w1, w2]);

        g.cut_to_stamp(keep);
        assert_eq!(g.stores_to_loc(x), &[w1]);
        assert!(!g.contains(w2));
        g.check_invariants();
    }
}
