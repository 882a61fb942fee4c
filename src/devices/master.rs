//! FTT master: periodic Elementary Cycle trigger broadcast (spec §4.I).
//!
//! Grounded on `ft4fttsim/masterslave.py::Master`. The file retrieved into
//! this pack is the legacy SimPy-Classic variant spec §9 says must not drive
//! design decisions; the normative `simpy`-based file was never retrieved
//! (see DESIGN.md). Each Elementary Cycle broadcasts `tms_per_ec` trigger
//! messages per port, then
//! busy-waits for the cycle boundary — recomputing the remaining time from
//! the live clock, so back-pressure on a send can only lengthen an EC,
//! never shorten it (spec §8 scenario 6).

use std::collections::BTreeSet;
use std::rc::Rc;

use crate::device::NetworkDevice;
use crate::error::{Result, SimulationError};
use crate::ethernet::MAX_FRAME_SIZE_BYTES;
use crate::kernel::{DeviceId, Environment};
use crate::message::{Destination, Message, MessageType};
use crate::port::Port;

/// An FTT master broadcasting Elementary Cycle trigger messages.
pub struct FttMaster {
    base: NetworkDevice,
}

impl FttMaster {
    /// Builds a master and spawns its Elementary Cycle loop.
    ///
    /// `ec_duration_us` must be strictly positive and `tms_per_ec` at
    /// least 1 (spec §4.I parameters).
    pub fn new(
        env: &Rc<Environment>,
        name: impl Into<String>,
        port_count: usize,
        responsible_slaves: BTreeSet<DeviceId>,
        ec_duration_us: f64,
        tms_per_ec: u32,
    ) -> Result<Rc<Self>> {
        if ec_duration_us <= 0.0 {
            return Err(SimulationError::InvalidTopology(format!(
                "ec_duration_us must be positive, got {ec_duration_us}"
            )));
        }
        if tms_per_ec < 1 {
            return Err(SimulationError::InvalidTopology(
                "tms_per_ec must be at least 1".to_string(),
            ));
        }

        let base = NetworkDevice::new(env, name, port_count);
        let device = Rc::new(Self { base });
        env.spawn(Self::run(
            env.clone(),
            device.clone(),
            responsible_slaves,
            ec_duration_us,
            tms_per_ec,
        ));
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

    async fn run(
        env: Rc<Environment>,
        device: Rc<Self>,
        responsible_slaves: BTreeSet<DeviceId>,
        ec_duration_us: f64,
        tms_per_ec: u32,
    ) {
        let destination = Destination::Multicast(responsible_slaves);
        let port_count = device.base.ports().len();

        loop {
            let t_start = env.now();

            for _ in 0..tms_per_ec {
                for port_index in 0..port_count {
                    let tm = Message::new(
                        device.id(),
                        destination.clone(),
                        MAX_FRAME_SIZE_BYTES,
                        MessageType::Trigger,
                    )
                    .expect("MAX_FRAME_SIZE_BYTES is always a legal frame size");
                    device
                        .base
                        .instruct_transmission(port_index, tm)
                        .await
                        .expect("port_index is in range by construction");
                }
            }

            loop {
                let remaining = ec_duration_us - (env.now() - t_start);
                if remaining > 0.0 {
                    env.wait(remaining).await;
                } else {
                    break;
                }
            }
        }
    }
}
