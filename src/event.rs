//! Events and thread identifiers of an execution graph

use serde::{Deserialize, Serialize, Serializer};
use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

/// A unique identifier for a modeled thread.
///
/// Thread ids are opaque: a modeled program may compare them for equality,
/// but the numbering scheme is an implementation detail of the exploration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub struct ThreadId {
    opaque_id: u32,
}

impl Serialize for ThreadId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("t{}", self.opaque_id))
    }
}

impl Display for ThreadId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "t{}", self.opaque_id)
    }
}

impl From<ThreadId> for usize {
    fn from(tid: ThreadId) -> usize {
        tid.opaque_id as usize
    }
}

pub struct ThreadIdFromStrError {
    msg: String,
}

impl Display for ThreadIdFromStrError {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        f.write_str(&self.msg)
    }
}

impl TryFrom<String> for ThreadId {
    type Error = ThreadIdFromStrError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.strip_prefix('t').and_then(|num| num.parse::<u32>().ok()) {
            Some(id) => Ok(ThreadId { opaque_id: id }),
            None => Err(ThreadIdFromStrError {
                msg: format!("Can't parse {} as a thread id", s),
            }),
        }
    }
}

pub(crate) fn construct_thread_id(opaque_id: u32) -> ThreadId {
    ThreadId { opaque_id }
}

pub(crate) fn main_thread_id() -> ThreadId {
    construct_thread_id(0)
}

impl ThreadId {
    pub(crate) fn to_number(self) -> u32 {
        self.opaque_id
    }
}

/// Models a single event in an execution graph: the `index`-th instruction
/// occurrence of thread `thread`.
///
/// Events are never reused or renumbered; the graph only grows, or truncates
/// back to a previously-seen prefix.
#[derive(PartialEq, Copy, Clone, Debug, Hash, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Event {
    pub(crate) thread: ThreadId,
    pub(crate) index: u32,
}

impl Event {
    pub(crate) fn new(t: ThreadId, i: u32) -> Self {
        Self {
            thread: t,
            index: i,
        }
    }

    pub(crate) fn next(&self) -> Self {
        Self {
            thread: self.thread,
            index: self.index + 1,
        }
    }

    #[allow(dead_code)]
    pub(crate) fn prev(&self) -> Self {
        Self {
            thread: self.thread,
            index: self.index - 1,
        }
    }

    /// The thread this event belongs to.
    pub fn thread(&self) -> ThreadId {
        self.thread
    }

    /// Program-order index of this event within its thread.
    pub fn index(&self) -> u32 {
        self.index
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.thread, self.index)
    }
}
