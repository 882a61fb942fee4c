//! Point-to-point links between two device ports (spec §3, §4.D).
//!
//! Grounded on `ft4fttsim/networking.py`'s `Link` and `_Sublink` classes: a
//! `Link` is two independent, unidirectional `_Sublink`s sharing one
//! `propagation_delay_us` and `bandwidth_mbps`. Each `_Sublink` cycles
//! through two states — idle (waiting for its source port's out-queue to
//! have a frame) and busy (serializing, propagating and delivering that
//! frame) — exactly as spec §9's design note calls for, rather than being
//! folded into one opaque loop.

use std::rc::Rc;

use crate::error::{Result, SimulationError};
use crate::ethernet::{IFG_SIZE_BYTES, PREAMBLE_SIZE_BYTES, SFD_SIZE_BYTES};
use crate::kernel::Environment;
use crate::message::Message;
use crate::port::Port;

/// The two states a [`Sublink`] alternates between for as long as the
/// simulation runs.
enum SublinkState {
    /// Waiting for the source port's out-queue to have a frame queued.
    Idle,
    /// A frame has been pulled off the source queue and is being
    /// serialized, propagated and delivered.
    Busy(Message),
}

/// One direction of a [`Link`]: pulls frames from `from`'s out-queue,
/// accounts for serialization and propagation delay, and delivers them into
/// `to`'s in-queue.
struct Sublink {
    env: Rc<Environment>,
    from: Port,
    to: Port,
    mbps: f64,
    propagation_delay_us: f64,
}

impl Sublink {
    async fn run(self) {
        let mut state = SublinkState::Idle;
        loop {
            state = match state {
                SublinkState::Idle => {
                    let message = self.from.out_queue().get().await;
                    SublinkState::Busy(message)
                }
                SublinkState::Busy(message) => {
                    let on_wire_bytes =
                        PREAMBLE_SIZE_BYTES + SFD_SIZE_BYTES + message.size_bytes();
                    let tx_time_us =
                        crate::ethernet::transmission_time_us(on_wire_bytes, self.mbps);
                    self.env.wait(tx_time_us).await;
                    self.env.wait(self.propagation_delay_us).await;
                    self.to.in_queue().put(message).await;

                    let ifg_time_us =
                        crate::ethernet::transmission_time_us(IFG_SIZE_BYTES, self.mbps);
                    self.env.wait(ifg_time_us).await;
                    SublinkState::Idle
                }
            };
        }
    }
}

/// A full-duplex, point-to-point connection between two previously-unused
/// ports.
///
/// Constructing a `Link` claims both ports (spec §4.D: a port may belong to
/// at most one link) and spawns the two [`Sublink`] processes that carry
/// traffic in each direction for the lifetime of the simulation.
pub struct Link;

impl Link {
    /// Connects `port_a` and `port_b` with the given link characteristics.
    ///
    /// Returns [`SimulationError::InvalidTopology`] if either port already
    /// belongs to a link, if both ports are owned by the same device, or if
    /// `mbps` / `propagation_delay_us` are out of range.
    pub fn connect(
        env: &Rc<Environment>,
        port_a: &Port,
        port_b: &Port,
        mbps: f64,
        propagation_delay_us: f64,
    ) -> Result<Self> {
        if mbps <= 0.0 {
            return Err(SimulationError::InvalidTopology(format!(
                "link bandwidth must be positive, got {mbps} Mbps"
            )));
        }
        if propagation_delay_us < 0.0 {
            return Err(SimulationError::InvalidTopology(format!(
                "propagation delay must be non-negative, got {propagation_delay_us} us"
            )));
        }
        if !port_a.is_free() || !port_b.is_free() {
            return Err(SimulationError::InvalidTopology(
                "cannot connect a port that is already part of a link".to_string(),
            ));
        }
        if port_a.owner() == port_b.owner() {
            return Err(SimulationError::InvalidTopology(
                "cannot link a device's port to itself".to_string(),
            ));
        }

        port_a.claim();
        port_b.claim();

        env.spawn(
            Sublink {
                env: env.clone(),
                from: port_a.clone(),
                to: port_b.clone(),
                mbps,
                propagation_delay_us,
            }
            .run(),
        );
        env.spawn(
            Sublink {
                env: env.clone(),
                from: port_b.clone(),
                to: port_a.clone(),
                mbps,
                propagation_delay_us,
            }
            .run(),
        );

        Ok(Link)
    }
}
