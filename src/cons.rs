use std::collections::HashMap;

use crate::event::Event;
use crate::event_label::{AsEventLabel, LabelEnum, Read, Write};
use crate::exec_graph::ExecutionGraph;
use crate::value::{MemOrd, MemoryModel, SAddr};
use crate::vector_clock::VectorClock;

// The consistency oracle for the supported memory models.
//
// The intended semantics of consistent(G) is
// 1. porf-acyclic(G)
// 2. the coherence axioms of the selected model hold for every location
// 3. the model's global axiom (SC order, TSO order, PSC) holds, checked
//    once the execution is complete
//
// During exploration only the incremental, prefix-closed part (2) filters
// rf and mo candidates; (3) is decided by `is_consistent` on full graphs.

pub(crate) struct Consistency {
    model: MemoryModel,
}

impl Consistency {
    pub(crate) fn new(model: MemoryModel) -> Self {
        match model {
            MemoryModel::Sc | MemoryModel::Tso | MemoryModel::Ra | MemoryModel::Rc11 => {
                Self { model }
            }
            MemoryModel::Imm | MemoryModel::Lkmm => {
                unimplemented!("the {} oracle is not implemented", model)
            }
        }
    }

    /// The view that orders writes for incremental filtering: porf for the
    /// strong models, hb for the weak ones (where only synchronizing rf
    /// edges order events).
    fn before_view<'a>(&self, lab: &'a LabelEnum) -> &'a VectorClock {
        match self.model {
            MemoryModel::Sc | MemoryModel::Tso => lab.cached_porf(),
            MemoryModel::Ra | MemoryModel::Rc11 => lab.cached_hb(),
            m => unimplemented!("the {} oracle is not implemented", m),
        }
    }

    /// Returns the subset of the writes that can be read by rlab after
    /// (possibly) restricting the graph to the view.
    /// The view implicitly excludes one event: View = (VectorClock, excluded Event)
    /// Lack of view implies we consider the whole graph.
    ///
    /// `None` in the result is the implicit initializing write.
    fn coherent_rfs_in_view(
        &self,
        g: &ExecutionGraph,
        // an optional view, excluding one event (a newly added write)
        view: Option<(&VectorClock, Event)>,
        rlab: &Read,
    ) -> Vec<Option<Event>> {
        let rpos = rlab.pos();
        let addr = rlab.addr();
        let reader_view = self.before_view(g.label(rpos));

        let in_view = |e: Event| {
            view.is_none_or(|(v, excl)| e != excl && v.contains(e))
        };

        // A candidate w is overwritten if some other write to the location
        // is ordered after w and before the read.
        let overwritten = |w: Option<Event>| {
            g.stores_to_loc(addr).iter().any(|&w2| {
                Some(w2) != w
                    && in_view(w2)
                    && reader_view.contains(w2)
                    && w.is_none_or(|w| self.before_view(g.label(w2)).contains(w))
            })
        };

        // N.B. a write already claimed by another exclusive read stays a
        // candidate. Two exclusive reads observing the same write violate
        // atomicity, but only at completion: the claiming RMW's write half,
        // once added, backward-revisits the other read, which is how the
        // symmetric RMW orders are reached at all.
        let mut rfs: Vec<Option<Event>> = Vec::new();
        if !overwritten(None) {
            rfs.push(None);
        }

        let mut writes: Vec<Event> = g
            .stores_to_loc(addr)
            .iter()
            .copied()
            .filter(|&w| in_view(w) && !overwritten(Some(w)))
            .collect();

        // Oldest stamp first, after the initializer. The first entry is the
        // deterministic non-revisit pick, and `reads_tiebreaker` compares
        // against the same order; stamps of events surviving a cut are
        // stable, so both sides of a revisit agree on it.
        writes.sort_by_key(|&w| g.label(w).stamp());
        rfs.extend(writes.into_iter().map(Some));
        rfs
    }

    /// Returns the rf options for rlab, with the first being the non-revisit rf step
    pub(crate) fn rfs(&self, g: &ExecutionGraph, rlab: &Read) -> Vec<Option<Event>> {
        self.coherent_rfs_in_view(g, None, rlab)
    }

    /// Returns the mo placement options for a newly added write, each given
    /// as the mo-predecessor (`None` places the write right after the
    /// initializing write). The first option is the mo-maximal one.
    pub(crate) fn co_places(&self, g: &ExecutionGraph, wlab: &Write) -> Vec<Option<Event>> {
        let addr = wlab.addr();
        let chain = g.stores_to_loc(addr);

        // The write half of an RMW is pinned right after the write its read
        // half observes.
        if wlab.is_rmw() {
            let read = wlab.pos().prev();
            let rf = g.read_label(read).unwrap().rf();
            return vec![rf];
        }

        let wview = self.before_view(g.label(wlab.pos()));

        // The write is assumed to already sit at the end of its chain;
        // enumerate placements among the others.
        let others: Vec<Event> = chain
            .iter()
            .copied()
            .filter(|&w| w != wlab.pos())
            .collect();

        // Writes ordered before wlab must stay mo-before it: placements only
        // start after the last such write.
        let first_valid = others
            .iter()
            .rposition(|&w2| wview.contains(w2))
            .map(|i| i + 1)
            .unwrap_or(0);

        // A placement must not split an RMW from the write it reads. Only
        // exclusive reads that produced a write half count: a failed
        // compare-exchange pins nothing.
        let splits_rmw = |pred: Option<Event>| match pred {
            Some(p) => g.exclusive_reader(p).is_some_and(|r| g.has_rmw_write(r)),
            None => g
                .rev_matching_reads(addr)
                .any(|r2| r2.is_exclusive() && r2.rf().is_none() && g.has_rmw_write(r2.pos())),
        };

        let mut places: Vec<Option<Event>> = Vec::new();
        // Maximal placement first, then towards the head.
        for i in (first_valid..=others.len()).rev() {
            let pred = if i == 0 { None } else { Some(others[i - 1]) };
            if !splits_rmw(pred) {
                places.push(pred);
            }
        }
        places
    }

    /// Calculates and populates the porf and hb caches for pos.
    pub(crate) fn calc_views(&self, g: &mut ExecutionGraph, pos: Event) {
        // Prefix-closed clocks; dependency-tracking models need DepView holes.
        debug_assert!(!self.model.tracks_dependencies());
        if pos.index() == 0 {
            let mut empty = VectorClock::new();
            empty.set_tid(pos.thread());
            g.label_mut(pos).set_porf_cache(empty.clone());
            g.label_mut(pos).set_hb_cache(empty);
            self.calc_msg_view(g, pos);
            return;
        }

        let prev = pos.prev();
        let mut porf = g.label(prev).cached_porf().clone();
        let mut hb = g.label(prev).cached_hb().clone();

        porf.update_idx(pos);
        hb.update_idx(pos);

        // Cached views do not include prev's direct dependencies
        // (rf/TCreate/TEnd). Adjust them to do so.

        // rf dependencies
        if let Some(rlab) = g.read_label(prev) {
            if let Some(rf) = rlab.rf() {
                porf.update(g.label(rf).cached_porf());
                if self.read_synchronizes(rlab) {
                    hb.update(g.write_label(rf).unwrap().msg_view());
                }
            }
        }

        // TCreate dependencies
        if let LabelEnum::Begin(blab) = g.label(prev) {
            if let Some(parent) = blab.parent() {
                porf.update(g.label(parent).cached_porf());
                // Create -> Begin contributes to sw as well
                hb.update(g.label(parent).cached_hb());
            }
        }

        // TEnd dependencies
        if let LabelEnum::TJoin(jlab) = g.label(prev) {
            porf.update(g.thread_last(jlab.cid()).unwrap().cached_porf());
            // Join -> End contributes to sw as well
            hb.update(g.thread_last(jlab.cid()).unwrap().cached_hb());
        }

        // An acquire fence synchronizes with the writes observed by all
        // po-earlier atomic reads, upgrading their relaxed rf edges.
        if let LabelEnum::Fence(flab) = g.label(pos) {
            if flab.ordering().is_at_least_acquire() {
                let upgrades: Vec<VectorClock> = g
                    .get_thr(&pos.thread())
                    .labels[..pos.index() as usize]
                    .iter()
                    .filter_map(|lab| {
                        if let LabelEnum::Read(rlab) = lab {
                            if rlab.ordering() != MemOrd::NotAtomic {
                                return rlab
                                    .rf()
                                    .map(|w| g.write_label(w).unwrap().msg_view().clone());
                            }
                        }
                        None
                    })
                    .collect();
                for v in upgrades {
                    hb.update(&v);
                }
            }
        }

        // Cache the views
        g.label_mut(pos).set_porf_cache(porf);
        g.label_mut(pos).set_hb_cache(hb);

        self.calc_msg_view(g, pos);
    }

    /// The message view of a write: what an acquire reader of it acquires.
    /// A release write carries its own hb view. A relaxed write carries the
    /// view of the last po-earlier release fence, if any. The write half of
    /// an RMW additionally extends the release sequence of the write its
    /// read half observes.
    fn calc_msg_view(&self, g: &mut ExecutionGraph, pos: Event) {
        let Some(wlab) = g.write_label(pos) else {
            return;
        };

        let mut msg_view = if wlab.ordering().is_at_least_release() {
            g.label(pos).cached_hb().clone()
        } else {
            let fence_hb = g.get_thr(&pos.thread()).labels[..pos.index() as usize]
                .iter()
                .rev()
                .find_map(|lab| {
                    if let LabelEnum::Fence(flab) = lab {
                        if flab.ordering().is_at_least_release() {
                            return Some(lab.cached_hb().clone());
                        }
                    }
                    None
                });
            fence_hb.unwrap_or_else(VectorClock::new)
        };

        if g.write_label(pos).unwrap().is_rmw() {
            let read = pos.prev();
            if let Some(rf) = g.read_label(read).unwrap().rf() {
                msg_view.update(g.write_label(rf).unwrap().msg_view());
            }
        }

        g.write_label_mut(pos).unwrap().set_msg_view(msg_view);
    }

    fn read_synchronizes(&self, rlab: &Read) -> bool {
        match self.model {
            // Every rf edge orders events under the strong models.
            MemoryModel::Sc | MemoryModel::Tso => rlab.ordering() != MemOrd::NotAtomic,
            MemoryModel::Ra | MemoryModel::Rc11 => rlab.ordering().is_at_least_acquire(),
            m => unimplemented!("the {} oracle is not implemented", m),
        }
    }

    /// Returns whether an affected read stays maximal during a revisit:
    /// its current rf must be the first coherent pick in the view of a
    /// hypothetical [wpos -> rlab] revisit.
    pub(crate) fn reads_tiebreaker(&self, g: &ExecutionGraph, rlab: &Read, wpos: Event) -> bool {
        // rlab is not in the prefix of the revisitor
        assert!(!g.write_label(wpos).unwrap().porf().contains(rlab.pos()));

        let view = g.revisit_view(rlab.pos(), wpos);

        let cands = self.coherent_rfs_in_view(g, Some((&view, wpos)), rlab);
        cands.first() == Some(&rlab.rf())
    }

    /// Returns whether the resulting execution would be consistent if wlab
    /// backward-revisited rlab.
    ///
    /// Assumes that rlab is not porf-before wlab.
    pub(crate) fn is_revisit_consistent(
        &self,
        g: &ExecutionGraph,
        rlab: &Read,
        wlab: &Write,
    ) -> bool {
        assert_eq!(rlab.addr(), wlab.addr());

        let rpos = rlab.pos();
        let wpos = wlab.pos();
        let view = g.revisit_view(rpos, wpos);

        let in_view = |e: Event| e != wpos && view.contains(e);

        // The revisiting write must not be overwritten in the restricted
        // execution.
        let wview = self.before_view(g.label(wpos));
        let overwritten = g.stores_to_loc(rlab.addr()).iter().any(|&w2| {
            w2 != wpos
                && in_view(w2)
                && wview.contains(w2)
                && self.before_view(g.label(rpos)).contains(w2)
        });
        if overwritten {
            return false;
        }

        // RMW atomicity after the cut
        if rlab.is_exclusive() {
            if let Some(r2) = g.exclusive_reader(wpos) {
                if r2 != rpos && in_view(r2) {
                    return false;
                }
            }
        }

        true
    }

    /// Full-graph validity for the selected model. Exploration counts an
    /// execution only when this holds.
    pub(crate) fn is_consistent(&self, g: &ExecutionGraph) -> bool {
        if !Self::rmws_atomic(g) {
            return false;
        }
        match self.model {
            MemoryModel::Sc => self.acyclic(g, EdgeSet::Sc),
            MemoryModel::Tso => self.acyclic(g, EdgeSet::Tso) && self.sc_per_location(g),
            MemoryModel::Ra => self.hb_coherent(g),
            MemoryModel::Rc11 => self.hb_coherent(g) && self.psc_acyclic(g),
            m => unimplemented!("the {} oracle is not implemented", m),
        }
    }

    /// RMW atomicity: nothing comes mo-between an RMW write and the write
    /// its read half observes. Exploration can pass through graphs where
    /// this is broken (two exclusive reads of one write, pending their
    /// resolving revisit); such graphs are never counted.
    fn rmws_atomic(g: &ExecutionGraph) -> bool {
        for t in g.threads.iter() {
            for lab in &t.labels {
                if let LabelEnum::Write(wlab) = lab {
                    if wlab.is_rmw() {
                        let rf = g.read_label(wlab.pos().prev()).unwrap().rf();
                        if g.store_pred(wlab.pos()) != rf {
                            return false;
                        }
                    }
                }
            }
        }
        true
    }

    fn event_index(g: &ExecutionGraph) -> (Vec<Event>, HashMap<Event, usize>) {
        let events: Vec<Event> = g
            .threads
            .iter()
            .flat_map(|t| t.labels.iter().map(|l| l.pos()))
            .collect();
        let index = events
            .iter()
            .enumerate()
            .map(|(i, &e)| (e, i))
            .collect::<HashMap<_, _>>();
        (events, index)
    }

    /// Kahn's algorithm over po/rf/mo/fr edges; the edge set varies by model.
    fn acyclic(&self, g: &ExecutionGraph, edges: EdgeSet) -> bool {
        let (events, index) = Self::event_index(g);
        let n = events.len();
        let mut succs: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut indegree = vec![0usize; n];

        let mut add_edge = |from: Event, to: Event| {
            let (f, t) = (index[&from], index[&to]);
            succs[f].push(t);
            indegree[t] += 1;
        };

        // program order
        for t in g.threads.iter() {
            for (i, a) in t.labels.iter().enumerate() {
                for b in &t.labels[i + 1..] {
                    let keep = match edges {
                        EdgeSet::Sc => {
                            // po is transitive; consecutive edges suffice
                            b.index() == a.index() + 1
                        }
                        EdgeSet::Tso => {
                            // The store buffer relaxes write-to-read order.
                            !(matches!(a, LabelEnum::Write(_)) && matches!(b, LabelEnum::Read(_)))
                        }
                    };
                    if keep {
                        add_edge(a.pos(), b.pos());
                    }
                }
            }
        }

        // rf, mo, fr
        for t in g.threads.iter() {
            for lab in &t.labels {
                match lab {
                    LabelEnum::Read(rlab) => {
                        match rlab.rf() {
                            Some(w) => {
                                // TSO forgives reading your own buffered write early
                                let internal = w.thread() == rlab.pos().thread();
                                if !(matches!(edges, EdgeSet::Tso) && internal) {
                                    add_edge(w, rlab.pos());
                                }
                                // fr: the read precedes the rf's mo-successor
                                if let Some(&succ) = g.store_succs(w).first() {
                                    add_edge(rlab.pos(), succ);
                                }
                            }
                            None => {
                                // Reading the initializer precedes the whole chain
                                if let Some(&first) = g.stores_to_loc(rlab.addr()).first() {
                                    add_edge(rlab.pos(), first);
                                }
                            }
                        }
                    }
                    LabelEnum::Write(wlab) => {
                        if let Some(&succ) = g.store_succs(wlab.pos()).first() {
                            add_edge(wlab.pos(), succ);
                        }
                    }
                    _ => {}
                }
            }
        }

        Self::kahn(&succs, indegree)
    }

    fn kahn(succs: &[Vec<usize>], mut indegree: Vec<usize>) -> bool {
        let mut queue: Vec<usize> = indegree
            .iter()
            .enumerate()
            .filter(|(_, &d)| d == 0)
            .map(|(i, _)| i)
            .collect();
        let mut seen = 0;
        while let Some(i) = queue.pop() {
            seen += 1;
            for &j in &succs[i] {
                indegree[j] -= 1;
                if indegree[j] == 0 {
                    queue.push(j);
                }
            }
        }
        seen == succs.len()
    }

    /// Per-location SC: po-loc U rf U mo U fr is acyclic for every location.
    fn sc_per_location(&self, g: &ExecutionGraph) -> bool {
        let mut addrs: Vec<SAddr> = Vec::new();
        for t in g.threads.iter() {
            for lab in &t.labels {
                match lab {
                    LabelEnum::Read(r) => addrs.push(r.addr()),
                    LabelEnum::Write(w) => addrs.push(w.addr()),
                    _ => {}
                }
            }
        }
        addrs.sort();
        addrs.dedup();

        for addr in addrs {
            let mut events: Vec<Event> = Vec::new();
            for t in g.threads.iter() {
                for lab in &t.labels {
                    let touches = match lab {
                        LabelEnum::Read(r) => r.addr() == addr,
                        LabelEnum::Write(w) => w.addr() == addr,
                        _ => false,
                    };
                    if touches {
                        events.push(lab.pos());
                    }
                }
            }

            let index: HashMap<Event, usize> = events
                .iter()
                .enumerate()
                .map(|(i, &e)| (e, i))
                .collect();
            let n = events.len();
            let mut succs: Vec<Vec<usize>> = vec![Vec::new(); n];
            let mut indegree = vec![0usize; n];
            let mut add_edge = |from: Event, to: Event| {
                succs[index[&from]].push(index[&to]);
                indegree[index[&to]] += 1;
            };

            for (i, &a) in events.iter().enumerate() {
                // po-loc
                for &b in &events[i + 1..] {
                    if a.thread() == b.thread() && a.index() < b.index() {
                        add_edge(a, b);
                    }
                }
                // rf and fr
                if let Some(rlab) = g.read_label(a) {
                    match rlab.rf() {
                        Some(w) => {
                            add_edge(w, a);
                            if let Some(&fr_succ) = g.store_succs(w).first() {
                                add_edge(a, fr_succ);
                            }
                        }
                        None => {
                            if let Some(&first) = g.stores_to_loc(addr).first() {
                                add_edge(a, first);
                            }
                        }
                    }
                }
                // mo
                if g.is_write(a) {
                    if let Some(&succ) = g.store_succs(a).first() {
                        add_edge(a, succ);
                    }
                }
            }

            if !Self::kahn(&succs, indegree) {
                return false;
            }
        }
        true
    }

    /// Coherence wrt hb, for the weak models: mo agrees with hb, no read
    /// observes an overwritten or hb-later write, and RMWs stay atomic.
    fn hb_coherent(&self, g: &ExecutionGraph) -> bool {
        let hbs = self.full_hbs(g);
        let hb_before = |a: Event, b: Event| a != b && hbs[&b].contains(a);

        for wlab in g.all_store_iter() {
            let wpos = wlab.pos();

            // write-write coherence
            for &succ in g.store_succs(wpos) {
                if hb_before(succ, wpos) {
                    return false;
                }
            }

            for &r in wlab.readers() {
                // no reading from the hb-future
                if hb_before(r, wpos) {
                    return false;
                }
                // read coherence: no hb-intervening mo-successor
                if g.store_succs(wpos)
                    .iter()
                    .any(|&w2| hb_before(w2, r))
                {
                    return false;
                }
                // fr coherence
                let rlab = g.read_label(r).unwrap();
                let fr_violated = g
                    .stores_to_loc(rlab.addr())
                    .iter()
                    .take_while(|&&w2| w2 != wpos)
                    .any(|&w2| hb_before(r, w2));
                if fr_violated {
                    return false;
                }
                // read-read coherence: an hb-earlier read must not have
                // observed a mo-later write
                let corr_violated = g.store_succs(wpos).iter().any(|&w2| {
                    g.write_label(w2)
                        .unwrap()
                        .readers()
                        .iter()
                        .any(|&r2| hb_before(r2, r))
                });
                if corr_violated {
                    return false;
                }
            }
        }

        // init coherence: a read of the initializer must not be hb-after
        // any write to the location, or any read of a real write
        for t in g.threads.iter() {
            for lab in &t.labels {
                if let LabelEnum::Read(rlab) = lab {
                    if rlab.rf().is_none() {
                        let stale = g.stores_to_loc(rlab.addr()).iter().any(|&w| {
                            hb_before(w, rlab.pos())
                                || g.write_label(w)
                                    .unwrap()
                                    .readers()
                                    .iter()
                                    .any(|&r2| hb_before(r2, rlab.pos()))
                        });
                        if stale {
                            return false;
                        }
                    }
                }
            }
        }

        true
    }

    /// PSC acyclicity over the SeqCst accesses: hb, mo, rf and fr edges
    /// restricted to SC events must not form a cycle.
    fn psc_acyclic(&self, g: &ExecutionGraph) -> bool {
        let hbs = self.full_hbs(g);

        let mut sc_events: Vec<Event> = Vec::new();
        for t in g.threads.iter() {
            for lab in &t.labels {
                let is_sc = match lab {
                    LabelEnum::Read(r) => r.ordering().is_sc(),
                    LabelEnum::Write(w) => w.ordering().is_sc(),
                    LabelEnum::Fence(f) => f.ordering().is_sc(),
                    _ => false,
                };
                if is_sc {
                    sc_events.push(lab.pos());
                }
            }
        }

        let index: HashMap<Event, usize> = sc_events
            .iter()
            .enumerate()
            .map(|(i, &e)| (e, i))
            .collect();
        let n = sc_events.len();
        let mut succs: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut indegree = vec![0usize; n];

        let ordered = |a: Event, b: Event| -> bool {
            if a == b {
                return false;
            }
            if hbs[&b].contains(a) {
                return true;
            }
            if g.is_write(a) && g.is_write(b) && g.mo_before(a, b) {
                return true;
            }
            if let Some(rlab) = g.read_label(b) {
                if rlab.rf() == Some(a) {
                    return true;
                }
            }
            // fr
            if let (Some(rlab), Some(wlab)) = (g.read_label(a), g.write_label(b)) {
                if rlab.addr() == wlab.addr() {
                    match rlab.rf() {
                        // The initializer is mo-before every write
                        None => return true,
                        Some(w) => {
                            if w != b && g.mo_before(w, b) {
                                return true;
                            }
                        }
                    }
                }
            }
            false
        };

        for (i, &a) in sc_events.iter().enumerate() {
            for &b in &sc_events[..] {
                if ordered(a, b) {
                    let j = index[&b];
                    succs[i].push(j);
                    indegree[j] += 1;
                }
            }
        }

        Self::kahn(&succs, indegree)
    }

    /// Full hb views (caches plus each event's own direct dependencies).
    fn full_hbs(&self, g: &ExecutionGraph) -> HashMap<Event, VectorClock> {
        let mut hbs = HashMap::new();
        for t in g.threads.iter() {
            for lab in &t.labels {
                let mut hb = lab.cached_hb().clone();
                match lab {
                    LabelEnum::Read(rlab) => {
                        if self.read_synchronizes(rlab) {
                            if let Some(rf) = rlab.rf() {
                                hb.update(g.write_label(rf).unwrap().msg_view());
                            }
                        }
                    }
                    LabelEnum::Begin(blab) => {
                        if let Some(parent) = blab.parent() {
                            hb.update(g.label(parent).cached_hb());
                        }
                    }
                    LabelEnum::TJoin(jlab) => {
                        hb.update(g.thread_last(jlab.cid()).unwrap().cached_hb());
                    }
                    _ => {}
                }
                hbs.insert(lab.pos(), hb);
            }
        }
        hbs
    }

    /// Data races on a complete, consistent execution: two conflicting
    /// accesses (same location, at least one write, at least one NotAtomic)
    /// that hb leaves unordered. Free conflicts with every access.
    pub(crate) fn find_races(&self, g: &ExecutionGraph) -> Vec<(Event, Event)> {
        let hbs = self.full_hbs(g);

        struct Access {
            pos: Event,
            addr: SAddr,
            is_write: bool,
            racy: bool,
        }

        let mut accesses: Vec<Access> = Vec::new();
        for t in g.threads.iter() {
            for lab in &t.labels {
                match lab {
                    LabelEnum::Read(r) => accesses.push(Access {
                        pos: r.pos(),
                        addr: r.addr(),
                        is_write: false,
                        racy: r.ordering() == MemOrd::NotAtomic,
                    }),
                    LabelEnum::Write(w) => accesses.push(Access {
                        pos: w.pos(),
                        addr: w.addr(),
                        is_write: true,
                        racy: w.ordering() == MemOrd::NotAtomic,
                    }),
                    LabelEnum::Free(fr) => accesses.push(Access {
                        pos: fr.pos(),
                        addr: fr.addr(),
                        is_write: true,
                        racy: true,
                    }),
                    _ => {}
                }
            }
        }

        let mut races = Vec::new();
        for (i, a) in accesses.iter().enumerate() {
            for b in &accesses[i + 1..] {
                if a.addr != b.addr || a.pos.thread() == b.pos.thread() {
                    continue;
                }
                if !(a.is_write || b.is_write) || !(a.racy || b.racy) {
                    continue;
                }
                if !hbs[&a.pos].contains(b.pos) && !hbs[&b.pos].contains(a.pos) {
                    races.push((a.pos, b.pos));
                }
            }
        }
        races
    }
}

#[derive(Clone, Copy)]
enum EdgeSet {
    Sc,
    Tso,
}
