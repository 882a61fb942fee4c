//! A microsecond-accurate discrete-event simulator for switched Ethernet
//! networks running the FTT (Flexible Time-Triggered) master/slave
//! protocol.
//!
//! The simulator models frame-level transmissions across point-to-point
//! full-duplex links and learning-free forwarding switches, with timing
//! accurate to the Ethernet preamble, start-of-frame delimiter, frame
//! payload, interframe gap, and wire propagation delay. Experimenters
//! build a topology of devices and links against an [`Environment`],
//! drive traffic with [`devices::PlaybackDevice`] or the FTT
//! [`devices::FttMaster`]/[`devices::FttSlave`] pair, run the virtual
//! clock to a horizon, and inspect timestamped receptions at
//! [`devices::RecordingDevice`]s.
//!
//! # A practical overview
//!
//! Building and running a simulation involves three activities:
//!
//! 1. creating an [`Environment`], the one-per-run virtual clock and task
//!    scheduler,
//! 2. constructing devices against it and wiring them together with
//!    [`Link::connect`],
//! 3. calling [`Environment::run`] with a [`time::Horizon`] and then
//!    reading back whatever a [`devices::RecordingDevice`] observed.
//!
//! ```
//! use ftt_netsim::devices::playback::Schedule;
//! use ftt_netsim::devices::{PlaybackDevice, RecordingDevice};
//! use ftt_netsim::kernel::Environment;
//! use ftt_netsim::link::Link;
//! use ftt_netsim::message::{Destination, Message, MessageType};
//! use ftt_netsim::time::Horizon;
//! use std::collections::BTreeMap;
//!
//! # fn main() -> ftt_netsim::error::Result<()> {
//! let env = Environment::new();
//! let recorder = RecordingDevice::new(&env, "recorder", 1);
//!
//! let payload = Message::new(
//!     recorder.id(),
//!     Destination::Unicast(recorder.id()),
//!     1518,
//!     MessageType::Data,
//! )?;
//! let mut by_port = BTreeMap::new();
//! by_port.insert(0, vec![payload]);
//! let mut schedule = Schedule::new();
//! schedule.insert(0.0.into(), by_port);
//! let player = PlaybackDevice::new(&env, "player", 1, schedule)?;
//!
//! Link::connect(&env, &player.ports()[0], &recorder.ports()[0], 100.0, 3.0)?;
//! env.run(Horizon::Finite(1000.0));
//!
//! assert_eq!(recorder.recorded_messages().len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! See `demos/basic_network.rs` for a larger worked example, including a
//! switch between the player and the recorder.
//!
//! # Cargo feature flags
//!
//! ## `tracing`
//!
//! The `tracing` feature instruments the kernel's clock advances and
//! device transmissions with [`tracing::debug!`] calls. It is off by
//! default: nothing in this crate requires a subscriber to be installed,
//! and enabling it never changes simulation behavior, only what a host
//! application can observe of it.

pub mod device;
pub mod devices;
pub mod error;
pub mod ethernet;
pub mod kernel;
pub mod link;
pub mod message;
pub mod port;
pub mod time;

mod executor;
mod macros;
mod store;

pub use kernel::Environment;
pub use link::Link;
pub use port::Port;
