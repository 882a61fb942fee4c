//! Ethernet framing constants and timing helpers (spec §6).
//!
//! Values are bit-exact with the normative `ft4fttsim` source
//! (`ft4fttsim/ethernet.py`'s `Ethernet` class, consumed by
//! `networking.py`'s `Link.transmission_time_us`).

/// Size in bytes of the Ethernet preamble.
pub const PREAMBLE_SIZE_BYTES: u32 = 7;

/// Size in bytes of the start-of-frame delimiter.
pub const SFD_SIZE_BYTES: u32 = 1;

/// Size in bytes of the mandatory interframe gap.
pub const IFG_SIZE_BYTES: u32 = 12;

/// Smallest legal Ethernet frame payload, in bytes.
pub const MIN_FRAME_SIZE_BYTES: u32 = 64;

/// Largest legal Ethernet frame payload, in bytes.
pub const MAX_FRAME_SIZE_BYTES: u32 = 1518;

/// Returns the number of microseconds needed to put `n_bytes` on the wire
/// at `mbps` megabits per second.
///
/// This is the time from the first bit to the last bit leaving the
/// transmitter; it does not include propagation delay.
///
/// # Example
///
/// 1526 bytes at 100 Mbps takes exactly 122.08 microseconds:
///
/// ```
/// use ftt_netsim::ethernet::transmission_time_us;
/// assert_eq!(transmission_time_us(1526, 100.0), 122.08);
/// ```
pub fn transmission_time_us(n_bytes: u32, mbps: f64) -> f64 {
    const BITS_PER_BYTE: f64 = 8.0;
    (n_bytes as f64 * BITS_PER_BYTE) / mbps
}
