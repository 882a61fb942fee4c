//! FTT slave: synchronous-message response to trigger reception (spec §4.J).
//!
//! Grounded on `ft4fttsim/masterslave.py::Slave.transmit_synchronous_messages`
//! (the legacy SimPy-Classic variant retrieved into this pack, consulted in
//! the normative file's absence — see DESIGN.md), which also resolves spec
//! §4.J's "destination addressing TBD" open point: synchronous messages
//! self-address (`Message(self, [self], "sync")`), preserved here as
//! `Destination::Unicast(self_id)`.

use std::rc::Rc;

use crate::device::{listen_for_messages, NetworkDevice};
use crate::ethernet::MAX_FRAME_SIZE_BYTES;
use crate::kernel::{DeviceId, Environment};
use crate::message::{Destination, Message, MessageType};
use crate::port::Port;

/// Synchronous messages emitted per outbound port on every trigger
/// reception (spec §4.J: "transmit 2 synchronous messages").
const SYNC_MESSAGES_PER_TRIGGER: u32 = 2;

/// An FTT slave that answers every received trigger message with
/// synchronous traffic.
pub struct FttSlave {
    base: NetworkDevice,
}

impl FttSlave {
    /// Builds a slave and spawns its trigger-response loop.
    pub fn new(env: &Rc<Environment>, name: impl Into<String>, port_count: usize) -> Rc<Self> {
        let base = NetworkDevice::new(env, name, port_count);
        let device = Rc::new(Self { base });
        env.spawn(Self::run(env.clone(), device.clone()));
        device
    }

    pub fn id(&self) -> DeviceId {
        self.base.id()
    }

    pub fn name(&self) -> &str {
        self.base.name()
    }

    pub fn ports(&self) -> &[Port] {
        self.base.ports()
    }

    async fn run(env: Rc<Environment>, device: Rc<Self>) {
        loop {
            let arrivals = listen_for_messages(device.base.ports()).await;
            let saw_trigger = arrivals.iter().any(|(_, message)| message.is_trigger_message());

            if saw_trigger {
                let destination = Destination::Unicast(device.id());
                for port_index in 0..device.base.ports().len() {
                    for _ in 0..SYNC_MESSAGES_PER_TRIGGER {
                        let sync = Message::new(
                            device.id(),
                            destination.clone(),
                            MAX_FRAME_SIZE_BYTES,
                            MessageType::Synchronous,
                        )
                        .expect("MAX_FRAME_SIZE_BYTES is always a legal frame size");
                        device
                            .base
                            .instruct_transmission(port_index, sync)
                            .await
                            .expect("port_index is in range by construction");
                    }
                }
            }

            // Let the current virtual instant fully drain before the next
            // any-of wait is re-armed (spec §4.J: "yield once (delay 0)").
            env.wait(0.0).await;
        }
    }
}
