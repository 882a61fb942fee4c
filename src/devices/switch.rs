//! Learning-free forwarding switch (spec §4.H).
//!
//! Grounded on `ft4fttsim/networking.py::Switch.forward_messages`: a static
//! forwarding table loaded at construction, flooding on unknown
//! destinations (including reflection back out the arrival port, per
//! spec §9's explicit "preserve" decision), and frame duplication on every
//! forward since the original `Message` must never sit in two out-queues
//! at once.

use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use crate::device::{listen_for_messages, NetworkDevice};
use crate::error::{Result, SimulationError};
use crate::kernel::{DeviceId, Environment};
use crate::message::{Destination, Message};
use crate::port::Port;

/// `destination device -> the switch's own ports that reach it`.
pub type ForwardingTable = BTreeMap<DeviceId, BTreeSet<usize>>;

/// A static, learning-free Ethernet switch.
pub struct Switch {
    base: NetworkDevice,
    table: ForwardingTable,
}

impl Switch {
    /// Builds a switch with the given forwarding table and spawns its
    /// forwarding loop. The table is never mutated after construction.
    ///
    /// Rejects a table that names a port this switch does not own (spec.md
    /// §7: all topology errors are construction-time, not call-time panics).
    pub fn new(
        env: &Rc<Environment>,
        name: impl Into<String>,
        port_count: usize,
        table: ForwardingTable,
    ) -> Result<Rc<Self>> {
        let base = NetworkDevice::new(env, name, port_count);
        for (device_id, ports) in &table {
            for &port_index in ports {
                base.port(port_index).map_err(|_| {
                    SimulationError::InvalidTopology(format!(
                        "forwarding table entry for device {device_id:?} names port {port_index}, \
                         which this switch does not own (it has {port_count})"
                    ))
                })?;
            }
        }

        let device = Rc::new(Self { base, table });
        env.spawn(Self::run(device.clone()));
        Ok(device)
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

    fn all_ports(&self) -> BTreeSet<usize> {
        (0..self.base.ports().len()).collect()
    }

    /// The set of this switch's own ports that reach `destination`,
    /// flooding to every port (including the arrival port) for any
    /// recipient with no table entry.
    fn output_ports(&self, destination: &Destination) -> BTreeSet<usize> {
        let mut ports = BTreeSet::new();
        for device_id in destination.recipients() {
            match self.table.get(&device_id) {
                Some(known) => ports.extend(known.iter().copied()),
                None => return self.all_ports(),
            }
        }
        ports
    }

    async fn run(device: Rc<Self>) {
        loop {
            let arrivals = listen_for_messages(device.base.ports()).await;
            for (_, message) in arrivals {
                let output_ports = device.output_ports(message.destination());
                for port_index in output_ports {
                    let forwarded = Message::new(
                        message.source(),
                        message.destination().clone(),
                        message.size_bytes(),
                        message.message_type(),
                    )
                    .expect("forwarded message has the same already-valid size");
                    device
                        .base
                        .instruct_transmission(port_index, forwarded)
                        .await
                        .expect("Switch::new validates every table entry against port_count");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageType;
    use crate::time::Horizon;

    #[test]
    fn unknown_destination_floods_including_arrival_port() {
        let env = Environment::new();
        let switch = Switch::new(&env, "switch", 2, ForwardingTable::new()).unwrap();
        let unknown = env.allocate_device_id();
        let msg = Message::new(unknown, Destination::Unicast(unknown), 64, MessageType::Data)
            .unwrap();

        let arrival = switch.base.ports()[0].in_queue();
        env.spawn(async move {
            arrival.put(msg).await;
        });

        let out0 = switch.base.ports()[0].out_queue();
        let out1 = switch.base.ports()[1].out_queue();
        env.run(Horizon::Finite(0.0));

        assert_eq!(out0.len(), 1, "flooding must reflect onto the arrival port");
        assert_eq!(out1.len(), 1);
    }

    #[test]
    fn known_destination_forwards_only_to_table_ports() {
        let env = Environment::new();
        let dest = env.allocate_device_id();
        let mut table = ForwardingTable::new();
        table.insert(dest, BTreeSet::from([1]));
        let switch = Switch::new(&env, "switch", 2, table).unwrap();

        let msg = Message::new(dest, Destination::Unicast(dest), 64, MessageType::Data).unwrap();
        let arrival = switch.base.ports()[0].in_queue();
        env.spawn(async move {
            arrival.put(msg).await;
        });

        let out0 = switch.base.ports()[0].out_queue();
        let out1 = switch.base.ports()[1].out_queue();
        env.run(Horizon::Finite(0.0));

        assert_eq!(out0.len(), 0);
        assert_eq!(out1.len(), 1);
    }

    #[test]
    fn rejects_table_entry_naming_an_unowned_port() {
        let env = Environment::new();
        let dest = env.allocate_device_id();
        let mut table = ForwardingTable::new();
        table.insert(dest, BTreeSet::from([5]));

        let result = Switch::new(&env, "switch", 2, table);
        assert!(matches!(result, Err(SimulationError::InvalidTopology(_))));
    }
}
