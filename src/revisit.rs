//! Revisiting utilities

use serde::{Deserialize, Serialize};

use crate::event::Event;
use crate::vector_clock::VectorClock;

/// Models the different possible revisit types. The driver needs to
/// distinguish among them when it pops the worklist.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) enum RevisitEnum {
    /// Re-point the rf of an existing read to another already-added write.
    /// `rf == None` reads from the implicit initializing write.
    ReadForward { pos: Event, rf: Option<Event> },
    /// Re-place an existing write after another write in mo.
    /// `pred == None` places it at the head of the chain.
    WriteForward { pos: Event, pred: Option<Event> },
    /// Revisit the read `pos` by the later write `rev`: the graph is cut to
    /// `view` and the read is re-pointed to the write. When `pos` is a
    /// confirming read, `spec` carries the po-earlier speculative read that
    /// must observe `rev` alongside it.
    Backward {
        pos: Event,
        rev: Event,
        view: VectorClock,
        spec: Option<Event>,
    },
}

impl RevisitEnum {
    pub(crate) fn new_read_forward(pos: Event, rf: Option<Event>) -> Self {
        RevisitEnum::ReadForward { pos, rf }
    }

    pub(crate) fn new_write_forward(pos: Event, pred: Option<Event>) -> Self {
        RevisitEnum::WriteForward { pos, pred }
    }

    pub(crate) fn new_backward(
        read: Event,
        write: Event,
        view: VectorClock,
        spec: Option<Event>,
    ) -> Self {
        RevisitEnum::Backward {
            pos: read,
            rev: write,
            view,
            spec,
        }
    }

    #[allow(dead_code)]
    pub(crate) fn pos(&self) -> Event {
        match self {
            RevisitEnum::ReadForward { pos, .. }
            | RevisitEnum::WriteForward { pos, .. }
            | RevisitEnum::Backward { pos, .. } => *pos,
        }
    }
}
