//! A device that both replays a schedule and records arrivals (spec §9).
//!
//! `ft4fttsim/networking.py::MessagePlaybackAndRecordingDevice` gets both
//! behaviors via multiple inheritance from `MessagePlaybackDevice` and
//! `MessageRecordingDevice`. Spec §9 explicitly calls for composition
//! instead: this type owns one [`NetworkDevice`] and spawns the replay
//! process ([`super::playback::replay`]) and the record process
//! ([`super::recording::record`]) as two independent tasks sharing that
//! same port list, rather than chaining base classes.

use std::rc::Rc;

use crate::device::NetworkDevice;
use crate::error::Result;
use crate::kernel::{DeviceId, Environment};
use crate::message::Message;
use crate::port::Port;
use crate::time::VirtualTime;

use super::playback::{self, Schedule};
use super::recording::{self, RecordLog};

/// Replays `schedule` on its ports while also recording every arrival.
pub struct PlaybackAndRecordingDevice {
    base: NetworkDevice,
    log: Rc<RecordLog>,
}

impl PlaybackAndRecordingDevice {
    pub fn new(
        env: &Rc<Environment>,
        name: impl Into<String>,
        port_count: usize,
        schedule: Schedule,
    ) -> Result<Rc<Self>> {
        let base = NetworkDevice::new(env, name, port_count);
        playback::validate_schedule(&base, &schedule)?;

        let log = RecordLog::new();
        env.spawn(playback::replay(env.clone(), base.clone(), schedule));
        env.spawn(recording::record(env.clone(), base.clone(), log.clone()));

        Ok(Rc::new(Self { base, log }))
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

    pub fn recorded_timestamps(&self) -> Vec<VirtualTime> {
        self.log.timestamps()
    }

    pub fn recorded_messages(&self) -> Vec<Message> {
        self.log.messages()
    }
}
