//! Messages and their addressing (spec §3, §6).
//!
//! Grounded on `ft4fttsim/networking.py`'s `Message` class: every message
//! carries a process-wide monotonically increasing id used only for
//! logging/equality-by-identity, while `is_equivalent` compares source,
//! destination, size and type and deliberately ignores id (see
//! `ft4fttsim/tests/test_1player_1switch_1recorder.py`, which asserts
//! recorded messages are equivalent to, but not identical to, the played
//! ones).

use std::cell::Cell;
use std::collections::BTreeSet;

use crate::error::{Result, SimulationError};
use crate::ethernet::{MAX_FRAME_SIZE_BYTES, MIN_FRAME_SIZE_BYTES};
use crate::kernel::DeviceId;

thread_local! {
    static NEXT_MESSAGE_ID: Cell<u64> = const { Cell::new(0) };
}

fn next_message_id() -> u64 {
    NEXT_MESSAGE_ID.with(|next| {
        let id = next.get();
        next.set(id + 1);
        id
    })
}

/// The set of recipients a [`Message`] is addressed to.
///
/// `Multicast` uses a [`BTreeSet`] rather than a `HashSet` so that any code
/// iterating the destination set (e.g. a `Switch` flooding to each member's
/// ports) does so in a deterministic order, per spec §5's determinism
/// requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Unicast(DeviceId),
    Multicast(BTreeSet<DeviceId>),
}

impl Destination {
    /// Every device id this message is addressed to, in ascending order for
    /// `Multicast`.
    pub fn recipients(&self) -> Vec<DeviceId> {
        match self {
            Destination::Unicast(id) => vec![*id],
            Destination::Multicast(ids) => ids.iter().copied().collect(),
        }
    }

    pub fn contains(&self, id: DeviceId) -> bool {
        match self {
            Destination::Unicast(target) => *target == id,
            Destination::Multicast(ids) => ids.contains(&id),
        }
    }
}

/// The protocol role a message plays, needed by `FttMaster`/`FttSlave` to
/// tell trigger messages apart from ordinary synchronous payloads (spec
/// §4.I–J).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    /// An FTT Elementary Cycle trigger message, broadcast by the master.
    Trigger,
    /// A synchronous payload sent by a slave in response to a trigger.
    Synchronous,
    /// Any other application payload (played back, echoed, etc).
    Data,
}

/// An Ethernet frame passed between devices.
///
/// `id` is assigned from a process-wide counter on construction and is
/// never reused; it exists purely to distinguish otherwise-identical
/// messages (e.g. two recordings of the same played-back frame) and plays
/// no role in [`Message::is_equivalent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    id: u64,
    source: DeviceId,
    destination: Destination,
    size_bytes: u32,
    message_type: MessageType,
}

impl Message {
    /// Builds a new message, validating that `size_bytes` is a legal
    /// Ethernet frame size (spec §6).
    pub fn new(
        source: DeviceId,
        destination: Destination,
        size_bytes: u32,
        message_type: MessageType,
    ) -> Result<Self> {
        if !(MIN_FRAME_SIZE_BYTES..=MAX_FRAME_SIZE_BYTES).contains(&size_bytes) {
            return Err(SimulationError::InvalidMessage(format!(
                "frame size {size_bytes} bytes is outside the legal range {}..={}",
                MIN_FRAME_SIZE_BYTES, MAX_FRAME_SIZE_BYTES
            )));
        }
        Ok(Self {
            id: next_message_id(),
            source,
            destination,
            size_bytes,
            message_type,
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn source(&self) -> DeviceId {
        self.source
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    pub fn size_bytes(&self) -> u32 {
        self.size_bytes
    }

    pub fn message_type(&self) -> MessageType {
        self.message_type
    }

    pub fn is_trigger_message(&self) -> bool {
        self.message_type == MessageType::Trigger
    }

    /// True if `self` and `other` carry the same source, destination, size
    /// and type — i.e. one is a faithful copy of the other, regardless of
    /// `id`. Mirrors `ft4fttsim`'s `Message.is_equivalent`.
    pub fn is_equivalent(&self, other: &Message) -> bool {
        self.source == other.source
            && self.destination == other.destination
            && self.size_bytes == other.size_bytes
            && self.message_type == other.message_type
    }
}
