//! The common shape every network device shares (spec §3, §4.B–D).
//!
//! Grounded on `ft4fttsim/networking.py`'s `NetworkDevice` base class:
//! owns a name and a fixed set of [`Port`]s, and can instruct a
//! transmission on any port it owns. `listen_for_messages` generalizes the
//! `while True: yield env.any_of([p.receive() for p in ports])` loop that
//! recurs across `EchoDevice`, `MessageRecordingDevice`, `Switch` and the
//! FTT master/slave in the original source.

use std::rc::Rc;

use crate::error::{Result, SimulationError};
use crate::kernel::{DeviceId, Environment};
use crate::message::Message;
use crate::port::Port;
use crate::store::AnyOfGet;

/// State shared by every concrete device type (spec §3: "a device is a
/// name plus a fixed set of ports").
///
/// Cheap to clone: `id` is `Copy` and each [`Port`] is itself an `Rc`
/// handle, so cloning a `NetworkDevice` yields another handle to the same
/// underlying ports rather than a second device. This is what lets
/// composite devices (spec §9, [`crate::devices::playback_recording`])
/// hand the same port set to two independently spawned processes.
#[derive(Clone)]
pub struct NetworkDevice {
    id: DeviceId,
    name: String,
    ports: Vec<Port>,
}

impl NetworkDevice {
    pub fn new(env: &Rc<Environment>, name: impl Into<String>, port_count: usize) -> Self {
        let id = env.allocate_device_id();
        let ports = (0..port_count).map(|_| Port::new(id)).collect();
        Self {
            id,
            name: name.into(),
            ports,
        }
    }

    pub fn id(&self) -> DeviceId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    pub fn port(&self, index: usize) -> Result<&Port> {
        self.ports.get(index).ok_or_else(|| {
            SimulationError::InvalidPort(format!(
                "device {} has no port {index} (it has {})",
                self.name,
                self.ports.len()
            ))
        })
    }

    /// Queues `message` for transmission on `port_index`, the device-facing
    /// half of spec §4.D's "instruct transmission" operation. Fails with
    /// [`SimulationError::InvalidPort`] if `port_index` does not name one of
    /// this device's ports, rather than silently dropping the frame.
    pub async fn instruct_transmission(&self, port_index: usize, message: Message) -> Result<()> {
        let port = self.port(port_index)?;
        port.send(message).await;
        Ok(())
    }
}

/// Suspends until at least one of `ports` has a frame waiting, then returns
/// every `(port_index, message)` pair that arrived at that same instant
/// (spec §4.A(d), §4.E).
///
/// Callers are expected to loop on this, handing each batch to their own
/// per-device logic; exactly one `listen_for_messages` call is ever pending
/// per device; at a time, satisfying the "one outstanding get per in-queue"
/// invariant spec §4.E and §7 call out.
pub async fn listen_for_messages(ports: &[Port]) -> Vec<(usize, Message)> {
    let stores = ports.iter().map(|p| p.in_queue()).collect();
    AnyOfGet::new(stores).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{Destination, MessageType};

    #[test]
    fn instruct_transmission_rejects_unknown_port() {
        let env = Environment::new();
        let device = NetworkDevice::new(&env, "host-a", 1);
        let other = env.allocate_device_id();
        let msg = Message::new(device.id(), Destination::Unicast(other), 64, MessageType::Data)
            .unwrap();

        env.spawn(async move {
            let result = device.instruct_transmission(5, msg).await;
            assert!(matches!(result, Err(SimulationError::InvalidPort(_))));
        });
        env.run(crate::time::Horizon::Infinite);
    }
}
