//! Internal logging helper.
//!
//! Mirrors `nexosim`'s pattern of gating its `tracing` dependency behind a
//! `tracing` Cargo feature: when the feature is off, `trace_debug!` expands
//! to nothing, so the crate has zero logging overhead and zero logging
//! dependency by default (spec §6: logging is never required for
//! correctness).

#[cfg(feature = "tracing")]
macro_rules! trace_debug {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug {
    ($($arg:tt)*) => {
        let _ = ();
    };
}

pub(crate) use trace_debug;
