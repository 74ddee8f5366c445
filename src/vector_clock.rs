use crate::event::{construct_thread_id, ThreadId};
use crate::{event::Event, indexed_map::IndexedMap};
use std::cmp;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A prefix-closed view: if index `i` of a thread is in the clock, then so
/// are all indices `0..i` of that thread.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct VectorClock {
    clock: IndexedMap<u32>,
}

impl VectorClock {
    pub(crate) fn new() -> Self {
        Self {
            clock: IndexedMap::new(),
        }
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = (ThreadId, u32)> + '_ {
        self.clock
            .enumerate()
            .map(|(tid, &idx)| (construct_thread_id(tid as u32), idx))
    }

    pub(crate) fn get(&self, i: ThreadId) -> Option<u32> {
        self.clock.get(usize::from(i)).copied()
    }

    // Populate tid and set index to 0
    pub(crate) fn set_tid(&mut self, tid: ThreadId) {
        self.clock.set(usize::from(tid), 0);
    }

    pub(crate) fn set(&mut self, e: Event) {
        self.clock.set(usize::from(e.thread), e.index);
    }

    // returns true iff self represents a view that contains the event e
    pub(crate) fn contains(&self, e: Event) -> bool {
        self.get(e.thread).is_some_and(|i| e.index <= i)
    }

    // Unchecked update (assumes that e.thread is present)
    pub(crate) fn update_idx(&mut self, e: Event) {
        self.clock[usize::from(e.thread)] = e.index;
    }

    // Update, populating the thread with 0, if it's missing
    pub(crate) fn update_or_set(&mut self, e: Event) {
        self.advance(usize::from(e.thread), e.index);
    }

    // Update with another vector
    pub(crate) fn update(&mut self, other: &Self) {
        for (tid, &other_val) in other.clock.enumerate() {
            self.advance(tid, other_val);
        }
    }

    // Advance tid to be at least ind, populating the tid entry if missing
    fn advance(&mut self, tid: usize, ind: u32) {
        let new_val: u32 = cmp::max(*self.clock.get(tid).unwrap_or(&0), ind);
        self.clock.set(tid, new_val);
    }
}

/// A view without the prefix-closure assumption.
///
/// Memory models that track syntactic dependencies (IMM) can observe an event
/// without observing all of its program-order predecessors. A `DepView` is a
/// [`VectorClock`] plus, per thread, the set of "holes": indices below the
/// max that the view does *not* contain.
///
/// Merging a `DepView` into a plain `VectorClock` (or the converse) would
/// silently lose the hole information, so the two types are deliberately
/// kept distinct and only merge with their own kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[allow(dead_code)] // consumed once a dependency-tracking oracle lands
pub(crate) struct DepView {
    clock: VectorClock,
    holes: IndexedMap<BTreeSet<u32>>,
}

#[allow(dead_code)]
impl DepView {
    pub(crate) fn new() -> Self {
        Self {
            clock: VectorClock::new(),
            holes: IndexedMap::new(),
        }
    }

    pub(crate) fn get_max(&self, tid: ThreadId) -> Option<u32> {
        self.clock.get(tid)
    }

    pub(crate) fn contains(&self, e: Event) -> bool {
        self.clock.contains(e) && !self.has_hole(e)
    }

    pub(crate) fn has_hole(&self, e: Event) -> bool {
        self.holes
            .get(usize::from(e.thread))
            .is_some_and(|hs| hs.contains(&e.index))
    }

    pub(crate) fn add_hole(&mut self, e: Event) {
        if !self.clock.contains(e) {
            panic!("hole {} outside the view's range", e);
        }
        match self.holes.get_mut(usize::from(e.thread)) {
            Some(hs) => {
                hs.insert(e.index);
            }
            None => {
                self.holes
                    .set(usize::from(e.thread), BTreeSet::from([e.index]));
            }
        }
    }

    pub(crate) fn remove_hole(&mut self, e: Event) {
        if let Some(hs) = self.holes.get_mut(usize::from(e.thread)) {
            hs.remove(&e.index);
        }
    }

    /// Include e, turning indices between the old max and e into holes.
    pub(crate) fn update_idx(&mut self, e: Event) {
        let old = self.clock.get(e.thread);
        self.clock.update_or_set(e);
        let start = match old {
            // The thread was not in the view at all, so 0..e.index are new.
            None => 0,
            Some(m) if m < e.index => m + 1,
            // e was already within range, just un-hole it.
            _ => {
                self.remove_hole(e);
                return;
            }
        };
        for i in start..e.index {
            self.add_hole(Event::new(e.thread, i));
        }
        self.remove_hole(e);
    }

    /// Force the max of e's thread to e.index.
    ///
    /// Raising the max turns the new intermediate indices into holes;
    /// lowering it drops holes beyond the new max.
    pub(crate) fn set_max(&mut self, e: Event) {
        let old = self.clock.get(e.thread).unwrap_or(0);
        self.clock.set(e);
        if e.index > old {
            for i in (old + 1)..e.index {
                self.add_hole(Event::new(e.thread, i));
            }
            self.remove_hole(e);
        } else if let Some(hs) = self.holes.get_mut(usize::from(e.thread)) {
            hs.retain(|&i| i < e.index);
        }
    }

    /// Pointwise merge: an index is contained in the result iff it is
    /// contained in either operand.
    pub(crate) fn update(&mut self, other: &Self) {
        for (tid, other_max) in other.clock.entries() {
            let old_max = self.clock.get(tid);
            self.clock.update_or_set(Event::new(tid, other_max));
            let new_max = self.clock.get(tid).unwrap();
            for i in 0..=new_max {
                let e = Event::new(tid, i);
                let in_self = old_max.is_some_and(|m| i <= m) && !self.has_hole(e);
                let in_other = other.contains(e);
                if in_self || in_other {
                    self.remove_hole(e);
                } else {
                    self.add_hole(e);
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::event::construct_thread_id;

    impl From<u32> for ThreadId {
        fn from(tid: u32) -> Self {
            construct_thread_id(tid)
        }
    }

    /// This helper function accepts -1 as a value to show that a thread isn't
    /// present in the clock even though the index is unsigned everywhere else.
    fn clock(value: &[i32]) -> VectorClock {
        let mut c = VectorClock::new();
        for (tid, &idx) in value.iter().enumerate() {
            if idx >= 0 {
                c.update_or_set(Event::new(ThreadId::from(tid as u32), idx as u32));
            }
        }
        c
    }

    #[test]
    fn vector_clock() {
        let mut v1: VectorClock = clock(&[1, 0, 2, 0]);
        v1.update_or_set(Event::new(ThreadId::from(1), 3));
        v1.update_or_set(Event::new(ThreadId::from(5), 5));
        assert_eq!(v1, clock(&[1, 3, 2, 0, -1, 5]));

        let mut v1 = clock(&[1]);
        v1.update_or_set(Event::new(ThreadId::from(3), 1));
        assert!(v1.contains(Event::new(ThreadId::from(3), 1)));
        assert!(!v1.contains(Event::new(ThreadId::from(2), 1)));

        let mut v1 = clock(&[1, -1, 2]);
        let v2 = clock(&[2, -1, 1, 5]);
        v1.update(&v2);
        assert_eq!(v1, clock(&[2, -1, 2, 5]));
    }

    #[test]
    fn vector_clock_prefix_closed() {
        let v = clock(&[-1, 3]);
        for i in 0..=3 {
            assert!(v.contains(Event::new(ThreadId::from(1), i)));
        }
        assert!(!v.contains(Event::new(ThreadId::from(1), 4)));
    }

    #[test]
    fn vector_clock_update_is_idempotent() {
        let mut v = clock(&[1, 3, 2]);
        let orig = v.clone();
        v.update(&orig);
        assert_eq!(v, orig);

        let e = Event::new(ThreadId::from(1), 3);
        v.update_or_set(e);
        v.update_or_set(e);
        assert_eq!(v, orig);
    }

    #[test]
    fn vector_clock_is_sparse() {
        let mut c = clock(&[100]);
        c.update_or_set(Event::new(ThreadId::from(2), 1));
        assert_eq!(None, c.get(ThreadId::from(1)));
        assert_eq!(c, clock(&[100, -1, 1]));
    }

    #[test]
    fn vector_clock_is_serializable() {
        let c = clock(&[1, 2, 3]);
        let str = serde_json::to_string_pretty(&c).unwrap();
        let c2: VectorClock = serde_json::from_str(&str).unwrap();
        assert_eq!(c, c2);
    }

    #[test]
    fn dep_view_records_holes() {
        let t1 = ThreadId::from(1);
        let mut v = DepView::new();
        v.update_idx(Event::new(t1, 3));
        // 0, 1, 2 are holes, 3 is contained
        assert!(v.contains(Event::new(t1, 3)));
        assert!(!v.contains(Event::new(t1, 1)));
        assert!(v.has_hole(Event::new(t1, 1)));

        v.update_idx(Event::new(t1, 1));
        assert!(v.contains(Event::new(t1, 1)));
        assert!(v.has_hole(Event::new(t1, 2)));
    }

    #[test]
    fn dep_view_set_max_adjusts_holes() {
        let t1 = ThreadId::from(1);
        let mut v = DepView::new();
        v.update_idx(Event::new(t1, 2));
        v.set_max(Event::new(t1, 5));
        // Raising the max creates holes at 3, 4
        assert!(v.has_hole(Event::new(t1, 3)));
        assert!(v.has_hole(Event::new(t1, 4)));
        assert!(v.contains(Event::new(t1, 5)));

        v.set_max(Event::new(t1, 3));
        // Lowering it clears holes beyond the new max
        assert!(!v.has_hole(Event::new(t1, 4)));
        assert!(v.has_hole(Event::new(t1, 0)));
    }

    #[test]
    fn dep_view_merge_is_pointwise() {
        let t1 = ThreadId::from(1);
        let mut a = DepView::new();
        a.update_idx(Event::new(t1, 0));
        a.update_idx(Event::new(t1, 2));
        let mut b = DepView::new();
        b.update_idx(Event::new(t1, 1));
        a.update(&b);
        for i in 0..=2 {
            assert!(a.contains(Event::new(t1, i)), "missing index {}", i);
        }
        let copy = a.clone();
        a.update(&copy);
        assert_eq!(a, copy);
    }
}
