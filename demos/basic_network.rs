//! Example: one playback device feeding two recording devices through a
//! switch, plus an FTT master driving a slave across a second link.
//!
//! ```text
//!  player ──Link──► switch ──Link──► recorder-a
//!                      └────Link──► recorder-b
//!
//!  master ──Link──► slave
//! ```

use std::collections::BTreeMap;
use std::rc::Rc;

use ftt_netsim::devices::playback::Schedule;
use ftt_netsim::devices::switch::ForwardingTable;
use ftt_netsim::devices::{FttMaster, FttSlave, PlaybackDevice, RecordingDevice, Switch};
use ftt_netsim::error::Result;
use ftt_netsim::kernel::Environment;
use ftt_netsim::link::Link;
use ftt_netsim::message::{Destination, Message, MessageType};
use ftt_netsim::time::Horizon;

fn build_playback_and_recording(env: &Rc<Environment>) -> Result<()> {
    let recorder_a = RecordingDevice::new(env, "recorder-a", 1);
    let recorder_b = RecordingDevice::new(env, "recorder-b", 1);
    let switch = Switch::new(env, "switch", 3, ForwardingTable::new())?;

    let payload = Message::new(
        recorder_a.id(),
        Destination::Unicast(recorder_a.id()),
        512,
        MessageType::Data,
    )?;
    let mut by_port = BTreeMap::new();
    by_port.insert(0, vec![payload]);
    let mut schedule = Schedule::new();
    schedule.insert(0.0.into(), by_port);
    let player = PlaybackDevice::new(env, "player", 1, schedule)?;

    Link::connect(env, &player.ports()[0], &switch.ports()[0], 100.0, 2.0)?;
    Link::connect(env, &switch.ports()[1], &recorder_a.ports()[0], 100.0, 2.0)?;
    Link::connect(env, &switch.ports()[2], &recorder_b.ports()[0], 100.0, 2.0)?;

    env.run(Horizon::Finite(1000.0));

    println!(
        "recorder-a saw {} message(s), recorder-b saw {} message(s) (flooded, since the switch has no table entries)",
        recorder_a.recorded_messages().len(),
        recorder_b.recorded_messages().len(),
    );

    Ok(())
}

fn build_ftt_pair(env: &Rc<Environment>) -> Result<()> {
    let slave = FttSlave::new(env, "slave", 1);
    let master = FttMaster::new(
        env,
        "master",
        1,
        std::iter::once(slave.id()).collect(),
        1000.0,
        1,
    )?;

    Link::connect(env, &master.ports()[0], &slave.ports()[0], 100.0, 2.0)?;

    env.run(Horizon::Finite(5000.0));

    println!("ran for 5 Elementary Cycles at t = {}", env.now());

    Ok(())
}

fn main() -> Result<()> {
    let env = Environment::new();
    build_playback_and_recording(&env)?;

    let env = Environment::new();
    build_ftt_pair(&env)?;

    Ok(())
}
