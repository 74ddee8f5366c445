//! The modeled-program surface: thread bodies, the memory operations they
//! can issue, and the scheduler that re-executes bodies against the graph.
//!
//! Thread bodies are closures that run from the top in every execution.
//! Operations whose events are already in the graph replay the recorded
//! outcome; the first fresh event switches the thread to handle mode. This
//! is why bodies must be deterministic apart from the modeled accesses.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use log::info;

use crate::driver::Driver;
use crate::event::{main_thread_id, Event, ThreadId};
use crate::event_label::{AsEventLabel, Block, BlockType, Fence, Free, Read, ReadKind, Write};
use crate::value::{MemOrd, SAddr, SVal};
use crate::{Config, Stats};

/// The thread cannot make further progress in this execution.
///
/// Bodies propagate this with `?`; the scheduler picks another thread, or
/// ends the execution when every thread is blocked or finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Blocked;

pub(crate) type ThreadBody = dyn Fn(&mut Thread<'_>) -> Result<(), Blocked>;

/// Handle returned by [`Thread::spawn`], consumed by [`Thread::join`].
#[derive(Clone, Copy, Debug)]
pub struct ThreadHandle {
    tid: ThreadId,
}

impl ThreadHandle {
    pub fn id(&self) -> ThreadId {
        self.tid
    }
}

/// The per-thread context handed to a body. All modeled operations go
/// through it; the next event index advances with each one.
pub struct Thread<'ex> {
    tid: ThreadId,
    next: u32,
    ex: &'ex Explorer,
}

impl<'ex> Thread<'ex> {
    fn new(tid: ThreadId, ex: &'ex Explorer) -> Self {
        // Index 0 is the Begin label.
        Self { tid, next: 1, ex }
    }

    /// Claim the next event position. Fails when the driver has stopped the
    /// execution (an estimation jump or a reported error).
    fn advance(&mut self) -> Result<Event, Blocked> {
        if self.ex.driver.borrow().is_stopped() {
            return Err(Blocked);
        }
        let pos = Event::new(self.tid, self.next);
        self.next += 1;
        Ok(pos)
    }

    fn end_pos(&self) -> Event {
        Event::new(self.tid, self.next)
    }

    pub fn id(&self) -> ThreadId {
        self.tid
    }

    pub fn load(&mut self, addr: SAddr, ord: MemOrd) -> Result<SVal, Blocked> {
        let pos = self.advance()?;
        let rlab = Read::new(pos, addr, ord, ReadKind::Plain, None);
        self.ex.driver.borrow_mut().handle_load(rlab).ok_or(Blocked)
    }

    pub fn store(
        &mut self,
        addr: SAddr,
        ord: MemOrd,
        val: impl Into<SVal>,
    ) -> Result<(), Blocked> {
        let pos = self.advance()?;
        let wlab = Write::new(pos, addr, ord, val.into(), false);
        self.ex.driver.borrow_mut().handle_store(wlab);
        Ok(())
    }

    /// Atomically add `operand` to the location, returning the old value.
    pub fn fetch_add(
        &mut self,
        addr: SAddr,
        ord: MemOrd,
        operand: impl Into<SVal>,
    ) -> Result<SVal, Blocked> {
        let operand = operand.into();
        let rpos = self.advance()?;
        let rlab = Read::new(rpos, addr, ord, ReadKind::FetchAdd(operand), None);
        let old = self.ex.driver.borrow_mut().handle_load(rlab).ok_or(Blocked)?;
        let (_, new_val) = self.ex.rmw_outcome(rpos, old);
        let wpos = self.advance()?;
        let wlab = Write::new(wpos, addr, ord, new_val, true);
        self.ex.driver.borrow_mut().handle_store(wlab);
        Ok(old)
    }

    /// Compare-and-swap, returning the old value and whether it succeeded.
    /// A failed CAS leaves only its read in the graph.
    pub fn cas(
        &mut self,
        addr: SAddr,
        ord: MemOrd,
        expected: impl Into<SVal>,
        desired: impl Into<SVal>,
    ) -> Result<(SVal, bool), Blocked> {
        let (expected, desired) = (expected.into(), desired.into());
        let rpos = self.advance()?;
        let rlab = Read::new(rpos, addr, ord, ReadKind::Cas { expected, desired }, None);
        let old = self.ex.driver.borrow_mut().handle_load(rlab).ok_or(Blocked)?;
        let (succeeded, new_val) = self.ex.rmw_outcome(rpos, old);
        if !succeeded {
            return Ok((old, false));
        }
        let wpos = self.advance()?;
        let wlab = Write::new(wpos, addr, ord, new_val, true);
        self.ex.driver.borrow_mut().handle_store(wlab);
        Ok((old, true))
    }

    pub fn fence(&mut self, ord: MemOrd) -> Result<(), Blocked> {
        let pos = self.advance()?;
        self.ex.driver.borrow_mut().handle_fence(Fence::new(pos, ord));
        Ok(())
    }

    /// Allocate a fresh modeled location.
    pub fn alloc(&mut self, size: usize) -> Result<SAddr, Blocked> {
        let pos = self.advance()?;
        Ok(self.ex.driver.borrow_mut().handle_malloc(pos, size))
    }

    pub fn free(&mut self, addr: SAddr) -> Result<(), Blocked> {
        let pos = self.advance()?;
        self.ex.driver.borrow_mut().handle_free(Free::new(pos, addr));
        Ok(())
    }

    /// Spawn a child thread. The body runs once per execution, like the
    /// main body, starting in the pass after the spawn.
    pub fn spawn<F>(&mut self, body: F) -> Result<ThreadHandle, Blocked>
    where
        F: Fn(&mut Thread<'_>) -> Result<(), Blocked> + 'static,
    {
        let pos = self.advance()?;
        let cid = self.ex.driver.borrow_mut().handle_tcreate(pos);
        self.ex.register_spawn(pos, cid, Rc::new(body));
        Ok(ThreadHandle { tid: cid })
    }

    /// Join a child. Blocks this thread until the child's End is in the
    /// graph; the scheduler retries the join on a later pass.
    pub fn join(&mut self, handle: ThreadHandle) -> Result<(), Blocked> {
        let pos = self.advance()?;
        if self.ex.driver.borrow_mut().handle_tjoin(pos, handle.tid) {
            Ok(())
        } else {
            Err(Blocked)
        }
    }

    /// Discard executions where `cond` does not hold.
    pub fn assume(&mut self, cond: bool) -> Result<(), Blocked> {
        if cond {
            return Ok(());
        }
        let pos = self.advance()?;
        self.ex
            .driver
            .borrow_mut()
            .handle_block(Block::new(pos, BlockType::Assume));
        Err(Blocked)
    }

    /// Model-level assertion. A failure does not panic: the execution is
    /// recorded as erroneous, and exploration keeps going when
    /// `keep_going_after_error` is set.
    pub fn assert_true(&mut self, cond: bool, msg: &str) -> Result<(), Blocked> {
        if cond {
            return Ok(());
        }
        let pos = self.advance()?;
        let mut driver = self.ex.driver.borrow_mut();
        driver.report_assert_failure(msg);
        driver.handle_block(Block::new(pos, BlockType::Assert(msg.to_string())));
        Err(Blocked)
    }

    /// Ends a spinloop iteration that observed no progress. The execution
    /// blocks instead of unrolling the loop forever; a revisit that changes
    /// what the loop reads will re-run it.
    pub fn spin_end(&mut self, progressed: bool) -> Result<(), Blocked> {
        if progressed {
            return Ok(());
        }
        let pos = self.advance()?;
        self.ex
            .driver
            .borrow_mut()
            .handle_block(Block::new(pos, BlockType::Spinloop));
        Err(Blocked)
    }

    /// Acquire a spinlock at `l` (0 = free, 1 = held). Blocks when the lock
    /// is held; the blocked execution is discarded, and the acquisition is
    /// re-run when a revisit lets the CAS observe an unlock.
    pub fn lock(&mut self, l: SAddr) -> Result<(), Blocked> {
        let (_, acquired) = self.cas(l, MemOrd::AcqRel, 0u64, 1u64)?;
        if acquired {
            return Ok(());
        }
        let pos = self.advance()?;
        self.ex
            .driver
            .borrow_mut()
            .handle_block(Block::new(pos, BlockType::LockNotAcq(l)));
        Err(Blocked)
    }

    pub fn unlock(&mut self, l: SAddr) -> Result<(), Blocked> {
        self.store(l, MemOrd::Release, 0u64)
    }

    /// A speculative (non-exclusive) read whose value a later [`Thread::confirm`]
    /// on the same location validates.
    pub fn speculative_load(&mut self, addr: SAddr, ord: MemOrd) -> Result<SVal, Blocked> {
        let pos = self.advance()?;
        let rlab = Read::new(pos, addr, ord, ReadKind::Speculative, None);
        self.ex.driver.borrow_mut().handle_load(rlab).ok_or(Blocked)
    }

    /// The confirming CAS of a speculative load. When a new write revisits
    /// the confirmation, the speculative read is re-pointed and the
    /// confirmation re-runs against the newly observed value.
    pub fn confirm(
        &mut self,
        addr: SAddr,
        ord: MemOrd,
        expected: impl Into<SVal>,
        desired: impl Into<SVal>,
    ) -> Result<bool, Blocked> {
        let (expected, desired) = (expected.into(), desired.into());
        let rpos = self.advance()?;
        let rlab = Read::new(rpos, addr, ord, ReadKind::Confirming { expected, desired }, None);
        let old = self.ex.driver.borrow_mut().handle_load(rlab).ok_or(Blocked)?;
        let (succeeded, new_val) = self.ex.rmw_outcome(rpos, old);
        if !succeeded {
            return Ok(false);
        }
        let wpos = self.advance()?;
        let wlab = Write::new(wpos, addr, ord, new_val, true);
        self.ex.driver.borrow_mut().handle_store(wlab);
        Ok(true)
    }
}

/// Runs thread bodies against the driver until exploration is exhausted.
pub(crate) struct Explorer {
    driver: RefCell<Driver>,
    bodies: RefCell<BTreeMap<ThreadId, Rc<ThreadBody>>>,
    order: RefCell<Vec<ThreadId>>,
    /// Bodies keyed by their spawn position, kept across executions. A cut
    /// can leave a child's TCreate in the graph while its parent stays
    /// blocked, so the spawn never re-runs; the child's body is recovered
    /// from here instead.
    spawned: RefCell<BTreeMap<Event, Rc<ThreadBody>>>,
    main_body: Rc<ThreadBody>,
}

impl Explorer {
    pub(crate) fn new(config: Config, main_body: Rc<ThreadBody>) -> Self {
        Self {
            driver: RefCell::new(Driver::new(config)),
            bodies: RefCell::new(BTreeMap::new()),
            order: RefCell::new(Vec::new()),
            spawned: RefCell::new(BTreeMap::new()),
            main_body,
        }
    }

    pub(crate) fn explore(&self) -> Stats {
        loop {
            self.run_one_execution();
            if self.driver.borrow_mut().complete_execution() {
                break;
            }
        }
        self.driver.borrow().stats()
    }

    pub(crate) fn exec_estimate(&self) -> f64 {
        self.driver.borrow().exec_estimate()
    }

    fn register_body(&self, tid: ThreadId, body: Rc<ThreadBody>) {
        let mut bodies = self.bodies.borrow_mut();
        if bodies.insert(tid, body).is_none() {
            self.order.borrow_mut().push(tid);
        }
    }

    fn register_spawn(&self, pos: Event, cid: ThreadId, body: Rc<ThreadBody>) {
        self.spawned.borrow_mut().insert(pos, body.clone());
        self.register_body(cid, body);
    }

    /// Re-register the bodies of threads whose TCreate survived into this
    /// execution. Every TCreate in the graph was once issued by an actual
    /// spawn, so its position is in the spawn map; determinism guarantees
    /// the recorded body is the one a replay of the parent would pass.
    fn register_kept_bodies(&self) {
        let driver = self.driver.borrow();
        for tclab in driver.graph().thread_creates() {
            let body = self.spawned.borrow().get(&tclab.pos()).unwrap().clone();
            self.register_body(tclab.cid(), body);
        }
    }

    fn rmw_outcome(&self, rpos: Event, val: SVal) -> (bool, SVal) {
        let driver = self.driver.borrow();
        let rlab = driver.graph().read_label(rpos).unwrap();
        (rlab.rmw_succeeds(val), rlab.rmw_value(val))
    }

    /// Run every runnable thread to completion or blockage, in passes, until
    /// no thread makes progress. Bodies spawned in a pass run in the next.
    fn run_one_execution(&self) {
        self.driver.borrow_mut().begin_execution();
        self.bodies.borrow_mut().clear();
        self.order.borrow_mut().clear();
        self.register_body(main_thread_id(), self.main_body.clone());
        self.register_kept_bodies();

        loop {
            let mut scheduled = self.order.borrow().clone();
            self.driver.borrow_mut().schedule(&mut scheduled);
            let mut progress = false;
            for tid in scheduled {
                if self.driver.borrow().is_stopped() {
                    return;
                }
                if !self.driver.borrow_mut().thread_runnable(tid) {
                    continue;
                }
                let body = self.bodies.borrow().get(&tid).cloned();
                let Some(body) = body else { continue };
                info!("| Scheduling thread {}", tid);
                let mut thread = Thread::new(tid, self);
                let res = body(&mut thread);
                let mut driver = self.driver.borrow_mut();
                if res.is_ok() && !driver.graph().is_thread_blocked(tid) {
                    driver.handle_tend(thread.end_pos());
                }
                progress = true;
            }
            if !progress || self.driver.borrow().is_stopped() {
                return;
            }
        }
    }
}
