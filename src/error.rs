//! Error taxonomy for topology construction and simulation calls.

use thiserror::Error;

/// The single error kind surfaced by this crate.
///
/// Every variant is a construction-time or call-time failure; the
/// simulation loop itself does not fail once the topology has been
/// validated (spec §7). Violations of kernel-internal invariants (for
/// instance "each in-queue has exactly one outstanding get") indicate a
/// bug in the kernel, not a usage error, and are reported via
/// `debug_assert!` rather than through this enum.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// A link or device could not be constructed as requested: a
    /// non-positive link speed, a negative propagation delay, or an
    /// attempt to attach a link to a port that is already attached.
    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    /// A device was instructed to transmit on a port it does not own.
    #[error("invalid port: {0}")]
    InvalidPort(String),

    /// A message was constructed with a size outside
    /// `[MIN_FRAME_SIZE_BYTES, MAX_FRAME_SIZE_BYTES]`.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

/// Convenience alias for this crate's fallible operations.
pub type Result<T> = std::result::Result<T, SimulationError>;
