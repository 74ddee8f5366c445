//! Label of an execution graph event

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::event::{main_thread_id, Event};
use crate::value::{MemOrd, SAddr, SVal};
use crate::vector_clock::VectorClock;
use crate::ThreadId;

#[derive(Clone, Serialize, Deserialize)]
pub(crate) enum LabelEnum {
    Begin(Begin),
    End(End),
    TCreate(TCreate),
    TJoin(TJoin),
    Read(Read),
    Write(Write),
    Fence(Fence),
    Malloc(Malloc),
    Free(Free),
    Block(Block),
}

macro_rules! match_and_run {
    ( $lab:expr, $name:ident $( , $arg:ident )* ) => {
        match $lab {
            LabelEnum::Begin(l) => l.as_event_label().$name($($arg),*),
            LabelEnum::End(l) => l.as_event_label().$name($($arg),*),
            LabelEnum::TCreate(l) => l.as_event_label().$name($($arg),*),
            LabelEnum::TJoin(l) => l.as_event_label().$name($($arg),*),
            LabelEnum::Read(l) => l.as_event_label().$name($($arg),*),
            LabelEnum::Write(l) => l.as_event_label().$name($($arg),*),
            LabelEnum::Fence(l) => l.as_event_label().$name($($arg),*),
            LabelEnum::Malloc(l) => l.as_event_label().$name($($arg),*),
            LabelEnum::Free(l) => l.as_event_label().$name($($arg),*),
            LabelEnum::Block(l) => l.as_event_label().$name($($arg),*),
        }
    };
}

macro_rules! match_and_run_mut {
    ( $lab:expr, $name:ident $( , $arg:ident )* ) => {
        match $lab {
            LabelEnum::Begin(l) => l.as_event_label_mut().$name($($arg),*),
            LabelEnum::End(l) => l.as_event_label_mut().$name($($arg),*),
            LabelEnum::TCreate(l) => l.as_event_label_mut().$name($($arg),*),
            LabelEnum::TJoin(l) => l.as_event_label_mut().$name($($arg),*),
            LabelEnum::Read(l) => l.as_event_label_mut().$name($($arg),*),
            LabelEnum::Write(l) => l.as_event_label_mut().$name($($arg),*),
            LabelEnum::Fence(l) => l.as_event_label_mut().$name($($arg),*),
            LabelEnum::Malloc(l) => l.as_event_label_mut().$name($($arg),*),
            LabelEnum::Free(l) => l.as_event_label_mut().$name($($arg),*),
            LabelEnum::Block(l) => l.as_event_label_mut().$name($($arg),*),
        }
    };
}

impl LabelEnum {
    pub(crate) fn pos(&self) -> Event {
        match_and_run!(self, pos)
    }

    pub(crate) fn index(&self) -> u32 {
        match_and_run!(self, index)
    }

    pub(crate) fn thread(&self) -> ThreadId {
        match_and_run!(self, thread)
    }

    pub(crate) fn stamped(&self) -> bool {
        match_and_run!(self, stamped)
    }

    pub(crate) fn stamp(&self) -> usize {
        match_and_run!(self, stamp)
    }

    pub(crate) fn set_stamp(&mut self, s: usize) {
        match_and_run_mut!(self, set_stamp, s)
    }

    /// This includes the event, but not its rf/TCreate/TEnd dependencies.
    /// Therefore, direct access should be avoided, unless,
    /// e.g. the event is a Write (there are no such dependencies).
    pub(crate) fn cached_porf(&self) -> &VectorClock {
        match_and_run!(self, cached_porf)
    }

    pub(crate) fn set_porf_cache(&mut self, v: VectorClock) {
        match_and_run_mut!(self, set_porf_cache, v)
    }

    /// Similar to cached_porf, but for hb = (po U sw)^+.
    pub(crate) fn cached_hb(&self) -> &VectorClock {
        match_and_run!(self, cached_hb)
    }

    pub(crate) fn set_hb_cache(&mut self, v: VectorClock) {
        match_and_run_mut!(self, set_hb_cache, v)
    }

    /// The location this label accesses, if any.
    pub(crate) fn addr(&self) -> Option<SAddr> {
        match self {
            LabelEnum::Read(r) => Some(r.addr()),
            LabelEnum::Write(w) => Some(w.addr()),
            LabelEnum::Malloc(m) => Some(m.addr()),
            LabelEnum::Free(fr) => Some(fr.addr()),
            _ => None,
        }
    }

    pub(crate) fn compare_for_replay(&self, other: &Self) -> Result<(), String> {
        match self {
            LabelEnum::Begin(_) => {
                if let LabelEnum::Begin(_) = other {
                    return Ok(()); // Generated from TCreate, which is checked.
                }
            }
            LabelEnum::End(_) => {
                if let LabelEnum::End(_) = other {
                    return Ok(());
                }
            }
            LabelEnum::TCreate(s) => {
                if let LabelEnum::TCreate(o) = other {
                    if s.cid() != o.cid() {
                        return Err(format!(
                            "Expected to spawn thread {} but spawned {}",
                            s.cid(),
                            o.cid()
                        ));
                    }
                    return Ok(());
                }
            }
            LabelEnum::TJoin(s) => {
                if let LabelEnum::TJoin(o) = other {
                    if s.cid() != o.cid() {
                        return Err(format!(
                            "Expected to join thread {} but got thread {}",
                            s.cid(),
                            o.cid()
                        ));
                    }
                    return Ok(());
                }
            }
            LabelEnum::Read(s) => {
                if let LabelEnum::Read(o) = other {
                    if s.addr() != o.addr() {
                        return Err(format!(
                            "Expected to read {} but read {}",
                            s.addr(),
                            o.addr()
                        ));
                    }
                    if s.ordering() != o.ordering() || s.kind() != o.kind() {
                        return Err(format!(
                            "Expected a {} {:?} read of {} but got a {} {:?} read",
                            s.ordering(),
                            s.kind(),
                            s.addr(),
                            o.ordering(),
                            o.kind()
                        ));
                    }
                    return Ok(());
                }
            }
            LabelEnum::Write(s) => {
                if let LabelEnum::Write(o) = other {
                    if s.addr() != o.addr() || s.value() != o.value() {
                        return Err(format!(
                            "Expected to write {} to {} but wrote {} to {}",
                            s.value(),
                            s.addr(),
                            o.value(),
                            o.addr()
                        ));
                    }
                    return Ok(());
                }
            }
            LabelEnum::Fence(s) => {
                if let LabelEnum::Fence(o) = other {
                    if s.ordering() != o.ordering() {
                        return Err(format!(
                            "Expected a {} fence but got a {} fence",
                            s.ordering(),
                            o.ordering()
                        ));
                    }
                    return Ok(());
                }
            }
            LabelEnum::Malloc(s) => {
                if let LabelEnum::Malloc(o) = other {
                    if s.size() != o.size() {
                        return Err(format!(
                            "Expected to allocate {} bytes but allocated {}",
                            s.size(),
                            o.size()
                        ));
                    }
                    return Ok(());
                }
            }
            LabelEnum::Free(s) => {
                if let LabelEnum::Free(o) = other {
                    if s.addr() != o.addr() {
                        return Err(format!(
                            "Expected to free {} but freed {}",
                            s.addr(),
                            o.addr()
                        ));
                    }
                    return Ok(());
                }
            }
            LabelEnum::Block(s) => {
                if let LabelEnum::Block(o) = other {
                    if !Self::blocks_are_compatible(s.btype(), o.btype()) {
                        return Err(format!(
                            "Expected to block on {:?} but got {:?}",
                            s.btype(),
                            o.btype()
                        ));
                    }
                    return Ok(());
                }
            }
        }

        if let (LabelEnum::Block(_), LabelEnum::End(_)) = (self, other) {
            return Ok(()); // This happens during estimation mode.
        }

        let expected = self.get_action_descr();
        let actual = other.get_action_descr();

        Err(format!(
            "At this point in the thread, it should have {} but it {} instead.",
            expected, actual
        ))
    }

    fn blocks_are_compatible(block1: &BlockType, block2: &BlockType) -> bool {
        matches!(
            (block1, block2),
            (BlockType::Assume, BlockType::Assume)
                | (BlockType::Assert(_), BlockType::Assert(_))
                | (BlockType::Join(_), BlockType::Join(_))
                | (BlockType::Spinloop, BlockType::Spinloop)
                | (BlockType::LockNotAcq(_), BlockType::LockNotAcq(_))
        )
    }

    pub(crate) fn get_action_descr(&self) -> String {
        match self {
            LabelEnum::Begin(_) => "started".to_string(),
            LabelEnum::End(_) => "exited".to_string(),
            LabelEnum::TCreate(_) => "spawned another thread".to_string(),
            LabelEnum::TJoin(_) => "joined a thread".to_string(),
            LabelEnum::Read(r) => format!("read {}", r.addr()),
            LabelEnum::Write(w) => format!("written {}", w.addr()),
            LabelEnum::Fence(s) => format!("issued a {} fence", s.ordering()),
            LabelEnum::Malloc(_) => "allocated memory".to_string(),
            LabelEnum::Free(_) => "freed memory".to_string(),
            LabelEnum::Block(_) => "became blocked".to_string(),
        }
    }
}

impl fmt::Display for LabelEnum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelEnum::Begin(lab) => write!(f, "{}", lab),
            LabelEnum::End(lab) => write!(f, "{}", lab),
            LabelEnum::TCreate(lab) => write!(f, "{}", lab),
            LabelEnum::TJoin(lab) => write!(f, "{}", lab),
            LabelEnum::Read(lab) => write!(f, "{}", lab),
            LabelEnum::Write(lab) => write!(f, "{}", lab),
            LabelEnum::Fence(lab) => write!(f, "{}", lab),
            LabelEnum::Malloc(lab) => write!(f, "{}", lab),
            LabelEnum::Free(lab) => write!(f, "{}", lab),
            LabelEnum::Block(lab) => write!(f, "{}", lab),
        }
    }
}

impl fmt::Debug for LabelEnum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct EventLabel {
    pos: Event,
    stamp: Option<usize>,

    /// Cached porf view up to and including the current event,
    /// without the direct rf/Create/End dependencies
    /// for Read/Begin/Join, respectively.
    ///
    /// This corresponds to a core concept of the algorithm
    /// and is relevant outside consistency checking as well.
    cached_porf: VectorClock,

    // Similar to cached porf, but hb = (po U sw)^+, where sw covers the
    // synchronizing rf edges of the model (release/acquire and stronger).
    // This is what coherence checks under RA and RC11 consume.
    cached_hb: VectorClock,
}

impl EventLabel {
    fn new(p: Event) -> Self {
        Self {
            pos: p,
            stamp: None,
            cached_porf: VectorClock::new(),
            cached_hb: VectorClock::new(),
        }
    }

    fn main() -> Self {
        let mut vec = VectorClock::new();
        let pos = Event::new(main_thread_id(), 0);
        vec.set_tid(pos.thread);
        Self {
            pos,
            stamp: Some(0),
            cached_porf: vec.clone(),
            cached_hb: vec,
        }
    }

    pub(crate) fn pos(&self) -> Event {
        self.pos
    }

    pub(crate) fn index(&self) -> u32 {
        self.pos.index
    }

    pub(crate) fn thread(&self) -> ThreadId {
        self.pos.thread
    }

    pub(crate) fn stamped(&self) -> bool {
        self.stamp.is_some()
    }

    pub(crate) fn stamp(&self) -> usize {
        self.stamp.unwrap()
    }

    pub(crate) fn set_stamp(&mut self, s: usize) {
        self.stamp = Some(s)
    }

    pub(self) fn cached_porf(&self) -> &VectorClock {
        &self.cached_porf
    }

    pub(crate) fn set_porf_cache(&mut self, v: VectorClock) {
        self.cached_porf = v
    }

    pub(crate) fn cached_hb(&self) -> &VectorClock {
        &self.cached_hb
    }

    pub(crate) fn set_hb_cache(&mut self, v: VectorClock) {
        self.cached_hb = v
    }
}

impl fmt::Display for EventLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if cfg!(feature = "print_stamps") {
            write!(f, "{} @ {}", self.stamp(), self.pos(),)
        } else {
            write!(f, "{}", self.pos(),)
        }
    }
}

pub(crate) trait AsEventLabel {
    fn as_event_label(&self) -> &EventLabel;
    fn as_event_label_mut(&mut self) -> &mut EventLabel;
    fn pos(&self) -> Event;
    fn stamp(&self) -> usize;
}

macro_rules! as_label {
    ($t:ty) => {
        impl AsEventLabel for $t {
            fn as_event_label(&self) -> &EventLabel {
                &self.label
            }
            fn as_event_label_mut(&mut self) -> &mut EventLabel {
                &mut self.label
            }
            fn pos(&self) -> Event {
                self.as_event_label().pos()
            }
            fn stamp(&self) -> usize {
                self.as_event_label().stamp()
            }
        }
    };
}

#[derive(Clone, Serialize, Deserialize)]
pub(crate) struct Begin {
    label: EventLabel,
    parent: Option<Event>,
}

impl Begin {
    pub(crate) fn new(pos: Event, parent: Option<Event>) -> Self {
        Self {
            label: EventLabel::new(pos),
            parent,
        }
    }

    pub(crate) fn main() -> Self {
        Self {
            label: EventLabel::main(),
            parent: None,
        }
    }

    pub(crate) fn parent(&self) -> Option<Event> {
        self.parent
    }
}

as_label!(Begin);

impl fmt::Display for Begin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: BEGIN", self.as_event_label(),)
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub(crate) struct End {
    label: EventLabel,
}

impl End {
    pub(crate) fn new(pos: Event) -> Self {
        Self {
            label: EventLabel::new(pos),
        }
    }
}

as_label!(End);

impl fmt::Display for End {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: END", self.as_event_label())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct TCreate {
    label: EventLabel,
    cid: ThreadId,
}

impl TCreate {
    pub(crate) fn new(pos: Event, cid: ThreadId) -> Self {
        Self {
            label: EventLabel::new(pos),
            cid,
        }
    }

    pub(crate) fn cid(&self) -> ThreadId {
        self.cid
    }
}

as_label!(TCreate);

impl fmt::Display for TCreate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: TCREATE({})", self.as_event_label(), self.cid())
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub(crate) struct TJoin {
    label: EventLabel,
    cid: ThreadId,
}

impl TJoin {
    pub(crate) fn new(pos: Event, cid: ThreadId) -> Self {
        Self {
            label: EventLabel::new(pos),
            cid,
        }
    }

    pub(crate) fn cid(&self) -> ThreadId {
        self.cid
    }
}

as_label!(TJoin);

impl fmt::Display for TJoin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: TJOIN({})", self.as_event_label(), self.cid)
    }
}

/// What kind of read this is, beyond a plain load.
///
/// The exclusive kinds (fetch-add and compare-and-swap) make the read the
/// first half of a read-modify-write. Speculative and confirming reads come
/// out of the confirmation-based spinloop transformation: the speculative
/// read guesses a value and a later confirming CAS validates the guess.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum ReadKind {
    Plain,
    FetchAdd(SVal),
    Cas { expected: SVal, desired: SVal },
    Speculative,
    Confirming { expected: SVal, desired: SVal },
}

impl ReadKind {
    /// Exclusive reads forbid two of them reading from the same write.
    pub(crate) fn is_exclusive(&self) -> bool {
        matches!(
            self,
            ReadKind::FetchAdd(_) | ReadKind::Cas { .. } | ReadKind::Confirming { .. }
        )
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub(crate) struct Read {
    label: EventLabel,
    addr: SAddr,
    ordering: MemOrd,
    kind: ReadKind,
    /// The write this read observes. `None` is the implicit initializing
    /// write of value 0.
    rf: Option<Event>,
    revisitable: bool,
}

impl Read {
    pub(crate) fn new(
        pos: Event,
        addr: SAddr,
        ordering: MemOrd,
        kind: ReadKind,
        rf: Option<Event>,
    ) -> Self {
        Self {
            label: EventLabel::new(pos),
            addr,
            ordering,
            kind,
            rf,
            revisitable: true,
        }
    }

    pub(crate) fn addr(&self) -> SAddr {
        self.addr
    }

    pub(crate) fn ordering(&self) -> MemOrd {
        self.ordering
    }

    pub(crate) fn kind(&self) -> &ReadKind {
        &self.kind
    }

    pub(crate) fn is_exclusive(&self) -> bool {
        self.kind.is_exclusive()
    }

    pub(crate) fn rf(&self) -> Option<Event> {
        self.rf
    }

    pub(crate) fn set_rf(&mut self, rf: Option<Event>) {
        self.rf = rf
    }

    pub(crate) fn is_revisitable(&self) -> bool {
        self.revisitable
    }

    pub(crate) fn set_revisitable(&mut self, status: bool) {
        self.revisitable = status
    }

    /// Whether an exclusive read succeeds when it observes `val`.
    /// Fetch-adds always do; a CAS succeeds iff the value matches.
    pub(crate) fn rmw_succeeds(&self, val: SVal) -> bool {
        match &self.kind {
            ReadKind::FetchAdd(_) => true,
            ReadKind::Cas { expected, .. } | ReadKind::Confirming { expected, .. } => {
                *expected == val
            }
            ReadKind::Plain | ReadKind::Speculative => false,
        }
    }

    /// The value the write half of the RMW would store after reading `val`.
    pub(crate) fn rmw_value(&self, val: SVal) -> SVal {
        match &self.kind {
            ReadKind::FetchAdd(operand) => val.wrapping_add(*operand),
            ReadKind::Cas { desired, .. } | ReadKind::Confirming { desired, .. } => *desired,
            ReadKind::Plain | ReadKind::Speculative => val,
        }
    }

    // N.B. This doesn't include the rf dependency
    pub(crate) fn cached_porf(&self) -> &VectorClock {
        &self.as_event_label().cached_porf
    }
}

as_label!(Read);

impl fmt::Display for Read {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            ReadKind::Plain => "R",
            ReadKind::FetchAdd(_) => "RMW-R",
            ReadKind::Cas { .. } => "CAS-R",
            ReadKind::Speculative => "SPEC-R",
            ReadKind::Confirming { .. } => "CONF-R",
        };
        write!(
            f,
            "{}: {}{}({}) [{}]",
            self.label,
            kind,
            self.ordering(),
            self.addr(),
            match self.rf() {
                None => "INIT".to_string(),
                Some(w) => format!("{}", w),
            },
        )
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub(crate) struct Write {
    label: EventLabel,
    addr: SAddr,
    ordering: MemOrd,
    value: SVal,
    /// Whether this is the write half of an RMW. Such writes are pinned in
    /// mo immediately after the write their read half observes.
    rmw: bool,
    /// The message view other threads acquire by reading this write:
    /// the hb view of the last po-earlier release, or of the write itself
    /// when it is a release. Maintained by the consistency oracle.
    msg_view: VectorClock,
    // Reader fields cache the reads that observe this write.
    // This is an optimization and needs to be maintained when updating the graph.
    readers: Vec<Event>,
}

impl Write {
    pub(crate) fn new(pos: Event, addr: SAddr, ordering: MemOrd, value: SVal, rmw: bool) -> Self {
        Self {
            label: EventLabel::new(pos),
            addr,
            ordering,
            value,
            rmw,
            msg_view: VectorClock::new(),
            readers: Vec::new(),
        }
    }

    pub(crate) fn porf(&self) -> &VectorClock {
        // A write event has no direct non-po dependencies, so cached porf suffices
        &self.as_event_label().cached_porf
    }

    pub(crate) fn addr(&self) -> SAddr {
        self.addr
    }

    pub(crate) fn ordering(&self) -> MemOrd {
        self.ordering
    }

    pub(crate) fn value(&self) -> SVal {
        self.value
    }

    pub(crate) fn is_rmw(&self) -> bool {
        self.rmw
    }

    pub(crate) fn msg_view(&self) -> &VectorClock {
        &self.msg_view
    }

    pub(crate) fn set_msg_view(&mut self, v: VectorClock) {
        self.msg_view = v;
    }

    pub(crate) fn readers(&self) -> &Vec<Event> {
        &self.readers
    }

    pub(crate) fn add_reader(&mut self, new_reader: Event) {
        debug_assert!(!self.readers.contains(&new_reader));
        self.readers.push(new_reader);
    }

    pub(crate) fn remove_reader(&mut self, old_reader: Event) {
        self.readers.retain(|&x| x != old_reader);
    }

    pub(crate) fn is_unread(&self) -> bool {
        self.readers.is_empty()
    }
}

as_label!(Write);

impl fmt::Display for Write {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: W{}({}, {}){}",
            self.label,
            self.ordering(),
            self.addr(),
            self.value(),
            if self.rmw { " [rmw]" } else { "" },
        )
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub(crate) struct Fence {
    label: EventLabel,
    ordering: MemOrd,
}

impl Fence {
    pub(crate) fn new(pos: Event, ordering: MemOrd) -> Self {
        Self {
            label: EventLabel::new(pos),
            ordering,
        }
    }

    pub(crate) fn ordering(&self) -> MemOrd {
        self.ordering
    }
}

as_label!(Fence);

impl fmt::Display for Fence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: F{}", self.as_event_label(), self.ordering())
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub(crate) struct Malloc {
    label: EventLabel,
    addr: SAddr,
    size: usize,
}

impl Malloc {
    pub(crate) fn new(pos: Event, addr: SAddr, size: usize) -> Self {
        Self {
            label: EventLabel::new(pos),
            addr,
            size,
        }
    }

    pub(crate) fn addr(&self) -> SAddr {
        self.addr
    }

    pub(crate) fn size(&self) -> usize {
        self.size
    }
}

as_label!(Malloc);

impl fmt::Display for Malloc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: MALLOC({}, {})",
            self.as_event_label(),
            self.addr(),
            self.size()
        )
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub(crate) struct Free {
    label: EventLabel,
    addr: SAddr,
}

impl Free {
    pub(crate) fn new(pos: Event, addr: SAddr) -> Self {
        Self {
            label: EventLabel::new(pos),
            addr,
        }
    }

    pub(crate) fn addr(&self) -> SAddr {
        self.addr
    }
}

as_label!(Free);

impl fmt::Display for Free {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: FREE({})", self.as_event_label(), self.addr())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) enum BlockType {
    // User-level blocking
    Assume,
    Assert(String),
    Spinloop,
    /// A lock acquisition that observed the lock held. Removed and re-run
    /// when a revisit lets the acquiring CAS observe an unlock.
    LockNotAcq(SAddr),
    // Internal blocking: the joined thread has not finished in this
    // execution. The Block event is removed when the End shows up.
    Join(ThreadId),
}

#[derive(Clone, Serialize, Deserialize)]
pub(crate) struct Block {
    label: EventLabel,
    btype: BlockType,
}

impl Block {
    pub(crate) fn new(pos: Event, t: BlockType) -> Self {
        Self {
            label: EventLabel::new(pos),
            btype: t,
        }
    }

    pub(crate) fn btype(&self) -> &BlockType {
        &self.btype
    }
}

as_label!(Block);

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: BLK {:?}", self.as_event_label(), self.btype())
    }
}
