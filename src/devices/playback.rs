//! Scheduled message playback (spec §4.F).
//!
//! Grounded on `ft4fttsim/networking.py::MessagePlaybackDevice`: a device
//! that owns no receive behavior at all, only a schedule of
//! `time -> port -> [messages]` it replays in ascending time order.

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::device::NetworkDevice;
use crate::error::{Result, SimulationError};
use crate::kernel::{DeviceId, Environment};
use crate::message::Message;
use crate::port::Port;
use crate::time::VirtualTime;

/// `time_us -> port_index -> messages to send, in list order`.
pub type Schedule = BTreeMap<VirtualTime, BTreeMap<usize, Vec<Message>>>;

/// A device that does nothing but replay a fixed schedule of transmissions.
pub struct PlaybackDevice {
    base: NetworkDevice,
}

impl PlaybackDevice {
    /// Builds a playback device and spawns its replay process.
    ///
    /// Rejects schedules that reference a port the device does not own or
    /// a negative time (spec §6: "times must be non-negative; port must
    /// belong to the playback device").
    pub fn new(
        env: &Rc<Environment>,
        name: impl Into<String>,
        port_count: usize,
        schedule: Schedule,
    ) -> Result<Rc<Self>> {
        let base = NetworkDevice::new(env, name, port_count);
        validate_schedule(&base, &schedule)?;

        let device = Rc::new(Self { base: base.clone() });
        env.spawn(replay(env.clone(), base, schedule));
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
}

/// Checks that every scheduled time is non-negative and every scheduled
/// port belongs to `device` (spec §6).
pub(crate) fn validate_schedule(device: &NetworkDevice, schedule: &Schedule) -> Result<()> {
    for (time, by_port) in schedule {
        if time.as_micros() < 0.0 {
            return Err(SimulationError::InvalidTopology(format!(
                "playback schedule time {time} is negative"
            )));
        }
        for port_index in by_port.keys() {
            device.port(*port_index)?;
        }
    }
    Ok(())
}

/// Replays `schedule` on `device`'s ports in ascending time order. Assumes
/// `schedule` has already been validated by [`validate_schedule`].
pub(crate) async fn replay(env: Rc<Environment>, device: NetworkDevice, schedule: Schedule) {
    let mut previous_time = VirtualTime::START;
    for (time, by_port) in schedule {
        let delta = time.as_micros() - previous_time.as_micros();
        if delta > 0.0 {
            env.wait(delta).await;
        }
        previous_time = time;

        for (port_index, messages) in by_port {
            for message in messages {
                device
                    .instruct_transmission(port_index, message)
                    .await
                    .expect("schedule port validated by validate_schedule");
            }
        }
    }
}
