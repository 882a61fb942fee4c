//! Timestamped receive logging (spec §4.G).
//!
//! Grounded on `ft4fttsim/networking.py::MessageRecordingDevice`, with the
//! append-not-overwrite fix spec §9's "same-instant receive batching" open
//! question mandates: two wakes at the same `now` both survive, instead of
//! the later one clobbering the earlier one in a `time -> messages` map.

use std::cell::RefCell;
use std::rc::Rc;

use crate::device::{listen_for_messages, NetworkDevice};
use crate::kernel::{DeviceId, Environment};
use crate::message::Message;
use crate::port::Port;
use crate::time::VirtualTime;

/// The append-only receive log shared by [`RecordingDevice`] and the
/// recording half of [`super::playback_recording::PlaybackAndRecordingDevice`].
pub(crate) struct RecordLog {
    entries: RefCell<Vec<(VirtualTime, Vec<Message>)>>,
}

impl RecordLog {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            entries: RefCell::new(Vec::new()),
        })
    }

    fn push(&self, time: VirtualTime, messages: Vec<Message>) {
        self.entries.borrow_mut().push((time, messages));
    }

    pub fn timestamps(&self) -> Vec<VirtualTime> {
        self.entries.borrow().iter().map(|(time, _)| *time).collect()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.entries
            .borrow()
            .iter()
            .flat_map(|(_, messages)| messages.clone())
            .collect()
    }
}

/// A device with no transmit behavior that logs every frame it receives,
/// timestamped by the instant it arrived.
pub struct RecordingDevice {
    base: NetworkDevice,
    log: Rc<RecordLog>,
}

impl RecordingDevice {
    /// Builds a recording device and spawns its listen loop.
    pub fn new(env: &Rc<Environment>, name: impl Into<String>, port_count: usize) -> Rc<Self> {
        let base = NetworkDevice::new(env, name, port_count);
        let log = RecordLog::new();
        env.spawn(record(env.clone(), base.clone(), log.clone()));
        Rc::new(Self { base, log })
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

    /// Every instant at which at least one message was recorded, in
    /// ascending order.
    pub fn recorded_timestamps(&self) -> Vec<VirtualTime> {
        self.log.timestamps()
    }

    /// Every recorded message, concatenated in ascending-time order.
    pub fn recorded_messages(&self) -> Vec<Message> {
        self.log.messages()
    }
}

/// Listens on `device`'s ports forever, appending every arrival batch to
/// `log` under the instant it arrived.
pub(crate) async fn record(env: Rc<Environment>, device: NetworkDevice, log: Rc<RecordLog>) {
    loop {
        let arrivals = listen_for_messages(device.ports()).await;
        let messages: Vec<Message> = arrivals.into_iter().map(|(_, message)| message).collect();
        log.push(env.now(), messages);
    }
}
