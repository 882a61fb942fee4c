//! Device-facing network ports (spec §3, §4.D).
//!
//! Grounded on `ft4fttsim/networking.py`'s `Port` class: every port owns an
//! output queue of capacity 1 (so a device can never have more than one
//! frame "in flight" through a given port at once) and an unbounded input
//! queue, plus an `is_free` flag that a `Link` flips to `false` forever once
//! it claims the port.

use std::cell::Cell;
use std::rc::Rc;

use crate::kernel::DeviceId;
use crate::message::Message;
use crate::store::{Get, Put, Store};

struct PortInner {
    owner: DeviceId,
    out_queue: Rc<Store<Message>>,
    in_queue: Rc<Store<Message>>,
    is_free: Cell<bool>,
}

/// A full-duplex attachment point on a [`NetworkDevice`](crate::device::NetworkDevice).
///
/// Cloning a `Port` is cheap (an `Rc` bump) and yields another handle to the
/// same underlying queues — this is how a [`Link`](crate::link::Link)'s two
/// `Sublink`s and the owning device's processes all reach the same port
/// state without unsafe aliasing.
#[derive(Clone)]
pub struct Port {
    inner: Rc<PortInner>,
}

impl Port {
    /// Creates a new, unclaimed port owned by `owner`.
    pub(crate) fn new(owner: DeviceId) -> Self {
        Self {
            inner: Rc::new(PortInner {
                owner,
                out_queue: Store::bounded(1),
                in_queue: Store::unbounded(),
                is_free: Cell::new(true),
            }),
        }
    }

    pub fn owner(&self) -> DeviceId {
        self.inner.owner
    }

    pub fn is_free(&self) -> bool {
        self.inner.is_free.get()
    }

    /// Marks the port claimed. Idempotent is not offered deliberately: a
    /// double-claim is a topology bug and should be caught by the `Link`
    /// constructor before this is ever called twice (spec §4.D, §7).
    pub(crate) fn claim(&self) {
        debug_assert!(self.inner.is_free.get(), "port claimed twice");
        self.inner.is_free.set(false);
    }

    /// Enqueues `message` on this port's outbound queue, suspending while
    /// the single out-queue slot is occupied (spec §4.D: a device may not
    /// begin a second transmission on a port until the `Sublink` has pulled
    /// the first off the queue).
    pub fn send(&self, message: Message) -> Put<Message> {
        self.inner.out_queue.put(message)
    }

    /// Receives the next message delivered to this port, suspending until
    /// one arrives (spec §4.D).
    pub fn receive(&self) -> Get<Message> {
        self.inner.in_queue.get()
    }

    pub(crate) fn out_queue(&self) -> Rc<Store<Message>> {
        self.inner.out_queue.clone()
    }

    pub(crate) fn in_queue(&self) -> Rc<Store<Message>> {
        self.inner.in_queue.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::Executor;
    use crate::kernel::Environment;
    use crate::message::{Destination, MessageType};

    #[test]
    fn claim_flips_is_free_once() {
        let env = Environment::new();
        let port = Port::new(env.allocate_device_id());
        assert!(port.is_free());
        port.claim();
        assert!(!port.is_free());
    }

    #[test]
    #[should_panic(expected = "port claimed twice")]
    fn double_claim_panics_in_debug() {
        let env = Environment::new();
        let port = Port::new(env.allocate_device_id());
        port.claim();
        port.claim();
    }

    #[test]
    fn send_then_receive_round_trips_via_in_queue() {
        let env = Environment::new();
        let sender = env.allocate_device_id();
        let receiver = env.allocate_device_id();
        let port = Port::new(receiver);

        let msg = Message::new(sender, Destination::Unicast(receiver), 64, MessageType::Data)
            .unwrap();

        let executor = Executor::new();
        // Simulate a `Sublink` delivering straight into the in-queue.
        let in_queue = port.in_queue();
        let to_deliver = msg.clone();
        executor.spawn(async move {
            in_queue.put(to_deliver).await;
        });

        let p = port.clone();
        let seen = Rc::new(Cell::new(false));
        let seen2 = seen.clone();
        executor.spawn(async move {
            let got = p.receive().await;
            assert!(got.is_equivalent(&msg));
            seen2.set(true);
        });
        executor.run_ready();
        assert!(seen.get());
    }
}
