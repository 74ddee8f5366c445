//! Values, addresses, and access orderings of the modeled memory.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::event::ThreadId;

/// A value stored to or loaded from the modeled memory.
///
/// All modeled accesses are 64 bits wide; narrower program types are
/// zero-extended by the caller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SVal(u64);

impl SVal {
    pub fn new(v: u64) -> Self {
        SVal(v)
    }

    pub fn get(&self) -> u64 {
        self.0
    }

    pub(crate) fn wrapping_add(&self, other: SVal) -> SVal {
        SVal(self.0.wrapping_add(other.0))
    }
}

impl From<u64> for SVal {
    fn from(v: u64) -> Self {
        SVal(v)
    }
}

impl Display for SVal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Address of a modeled memory location.
///
/// Global locations are numbered by the test program; dynamic locations come
/// out of `malloc` and encode the allocating event, which keeps allocation
/// deterministic across replays of the same graph prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SAddr(u64);

const DYNAMIC_BIT: u64 = 1 << 63;

impl SAddr {
    pub fn global(n: u32) -> Self {
        SAddr(n as u64)
    }

    pub(crate) fn dynamic(tid: ThreadId, serial: u32) -> Self {
        SAddr(DYNAMIC_BIT | ((tid.to_number() as u64) << 32) | serial as u64)
    }

    pub fn is_dynamic(&self) -> bool {
        self.0 & DYNAMIC_BIT != 0
    }
}

impl Display for SAddr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_dynamic() {
            write!(
                f,
                "m{}.{}",
                (self.0 >> 32) & 0x7fff_ffff,
                self.0 & 0xffff_ffff
            )
        } else {
            write!(f, "g{}", self.0)
        }
    }
}

/// Ordering attached to a memory access or fence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemOrd {
    NotAtomic,
    Relaxed,
    Acquire,
    Release,
    AcqRel,
    SeqCst,
}

impl MemOrd {
    pub(crate) fn is_at_least_acquire(&self) -> bool {
        matches!(self, MemOrd::Acquire | MemOrd::AcqRel | MemOrd::SeqCst)
    }

    pub(crate) fn is_at_least_release(&self) -> bool {
        matches!(self, MemOrd::Release | MemOrd::AcqRel | MemOrd::SeqCst)
    }

    pub(crate) fn is_sc(&self) -> bool {
        matches!(self, MemOrd::SeqCst)
    }
}

impl Display for MemOrd {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MemOrd::NotAtomic => "na",
            MemOrd::Relaxed => "rlx",
            MemOrd::Acquire => "acq",
            MemOrd::Release => "rel",
            MemOrd::AcqRel => "acqrel",
            MemOrd::SeqCst => "sc",
        };
        f.write_str(s)
    }
}

/// The memory model the consistency oracle checks against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoryModel {
    /// Sequential consistency.
    Sc,
    /// Total store order.
    Tso,
    /// Release/acquire only.
    Ra,
    /// The repaired C11 model.
    Rc11,
    /// Intermediate memory model (dependency-tracking). Recognized but the
    /// oracle paths that need a ppo construction are not implemented.
    Imm,
    /// The Linux kernel memory model. Recognized, not implemented.
    Lkmm,
}

impl MemoryModel {
    /// Models that track syntactic dependencies use [`crate::vector_clock::DepView`]
    /// rather than prefix-closed clocks for their porf-like relations.
    pub(crate) fn tracks_dependencies(&self) -> bool {
        matches!(self, MemoryModel::Imm | MemoryModel::Lkmm)
    }
}

impl Display for MemoryModel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MemoryModel::Sc => "SC",
            MemoryModel::Tso => "TSO",
            MemoryModel::Ra => "RA",
            MemoryModel::Rc11 => "RC11",
            MemoryModel::Imm => "IMM",
            MemoryModel::Lkmm => "LKMM",
        };
        f.write_str(s)
    }
}
