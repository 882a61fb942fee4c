//! The simulation environment: virtual clock, event queue, and the single
//! [`Executor`] that drives every spawned process (spec §4.A).
//!
//! Grounded on the `env` object threaded through every constructor in
//! `ft4fttsim/networking.py` (`simpy.Environment`), generalized into the
//! `Environment`/`SimInit`-style build-then-run handle `nexosim`'s
//! crate-root docs describe (`SimInit::new()...init(t0)` producing a
//! `Simulation` that is later `step`ped or `step_unbounded`ed).

use std::cell::{Cell, RefCell};
use std::collections::BinaryHeap;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context as TaskContext, Poll, Waker};

use crate::executor::Executor;
use crate::macros::trace_debug;
use crate::time::{Horizon, VirtualTime};

/// A single entry in the event queue: a waker due to fire at `time`,
/// ordered by `(time, sequence)` as spec §4.A requires for deterministic
/// tie-breaking on same-time events.
struct TimerEntry {
    time: f64,
    sequence: u64,
    waker: Waker,
}

impl PartialEq for TimerEntry {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.sequence == other.sequence
    }
}
impl Eq for TimerEntry {}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Reversed: `BinaryHeap` is a max-heap, but we want the earliest
        // (time, sequence) pair out first.
        other
            .time
            .partial_cmp(&self.time)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Opaque, stable reference to a constructed [`NetworkDevice`](crate::device::NetworkDevice).
///
/// Spec §3 requires that "a device's identity (stable reference) is the
/// forwarding-table key"; `DeviceId` is a small `Copy` handle suitable for
/// use as a `HashMap`/`BTreeMap` key without needing to carry the device's
/// full state around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeviceId(u64);

/// The discrete-event kernel: virtual clock, event heap, and task executor.
///
/// One `Environment` is created per simulation run (spec §3: "one per
/// simulation run"). All topology construction happens against a shared
/// `Rc<Environment>`; `Environment::run` then drives virtual time forward.
pub struct Environment {
    now: Cell<f64>,
    sequence: Cell<u64>,
    next_device_id: Cell<u64>,
    timers: RefCell<BinaryHeap<TimerEntry>>,
    executor: Executor,
}

impl Environment {
    /// Creates a fresh simulation environment at `t = 0`.
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            now: Cell::new(0.0),
            sequence: Cell::new(0),
            next_device_id: Cell::new(0),
            timers: RefCell::new(BinaryHeap::new()),
            executor: Executor::new(),
        })
    }

    /// The current virtual time.
    pub fn now(&self) -> VirtualTime {
        VirtualTime::from(self.now.get())
    }

    pub(crate) fn allocate_device_id(&self) -> DeviceId {
        let id = self.next_device_id.get();
        self.next_device_id.set(id + 1);
        DeviceId(id)
    }

    fn next_sequence(&self) -> u64 {
        let seq = self.sequence.get();
        self.sequence.set(seq + 1);
        seq
    }

    /// Spawns a long-running process (spec §4.A "Process").
    pub(crate) fn spawn(&self, future: impl Future<Output = ()> + 'static) {
        self.executor.spawn(future);
    }

    pub(crate) fn schedule_wake(&self, deadline: f64, waker: Waker) {
        let sequence = self.next_sequence();
        self.timers.borrow_mut().push(TimerEntry {
            time: deadline,
            sequence,
            waker,
        });
    }

    /// Suspends the calling process for `delta_us` virtual microseconds
    /// (spec §4.A(a) `wait(Δ)`). `delta_us` must be non-negative; a delta of
    /// zero still yields once to the scheduler, draining whatever else is
    /// ready at the current instant first (used by the FTT slave's
    /// post-burst yield, spec §4.J).
    pub(crate) fn wait<'a>(self: &'a Rc<Self>, delta_us: f64) -> Wait<'a> {
        debug_assert!(delta_us >= 0.0, "wait() delta must be non-negative");
        Wait {
            env: self,
            deadline: self.now.get() + delta_us,
            scheduled: false,
        }
    }

    /// Advances virtual time to the next event and runs every process
    /// scheduled for that instant, then repeats until the event queue is
    /// exhausted or `horizon` is reached (spec §4.A "Run").
    pub fn run(self: &Rc<Self>, horizon: Horizon) {
        // Drain whatever was spawned/scheduled synchronously at t=0 before
        // looking at the timer heap.
        self.executor.run_ready();

        loop {
            let next_time = match self.timers.borrow().peek() {
                Some(entry) => entry.time,
                None => break,
            };
            if !horizon.permits(next_time) {
                break;
            }

            self.now.set(next_time);
            trace_debug!(time = next_time, "advancing virtual clock");

            // Wake every timer due at exactly `next_time`, preserving
            // insertion order among ties (spec §4.A, §5).
            loop {
                let due = matches!(self.timers.borrow().peek(), Some(e) if e.time == next_time);
                if !due {
                    break;
                }
                let entry = self.timers.borrow_mut().pop().unwrap();
                entry.waker.wake();
            }

            self.executor.run_ready();
        }

        if let Horizon::Finite(until) = horizon {
            if self.now.get() < until {
                self.now.set(until);
            }
        }
    }
}

/// Future returned by [`Environment::wait`].
pub(crate) struct Wait<'a> {
    env: &'a Rc<Environment>,
    deadline: f64,
    scheduled: bool,
}

impl Future for Wait<'_> {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<()> {
        // Always register a timer, even for a zero-length wait: `wait(Δ)` is
        // an unconditional suspension point (spec §5), so the first poll must
        // always return `Pending` and hand control back to the executor, not
        // resolve inline just because `deadline` already equals `now`.
        if self.scheduled {
            debug_assert!(self.env.now.get() >= self.deadline);
            return Poll::Ready(());
        }
        self.env.schedule_wake(self.deadline, cx.waker().clone());
        self.scheduled = true;
        Poll::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell as StdRefCell;

    #[test]
    fn run_advances_time_and_preserves_tie_order() {
        let env = Environment::new();
        let order = Rc::new(StdRefCell::new(Vec::new()));

        for label in ["first", "second"] {
            let env2 = env.clone();
            let order2 = order.clone();
            env.spawn(async move {
                env2.wait(10.0).await;
                order2.borrow_mut().push(label);
            });
        }

        env.run(Horizon::Infinite);
        assert_eq!(*order.borrow(), vec!["first", "second"]);
        assert_eq!(env.now().as_micros(), 10.0);
    }

    #[test]
    fn horizon_stops_run_early() {
        let env = Environment::new();
        let reached = Rc::new(Cell::new(false));
        let env2 = env.clone();
        let reached2 = reached.clone();
        env.spawn(async move {
            env2.wait(1000.0).await;
            reached2.set(true);
        });
        env.run(Horizon::Finite(10.0));
        assert!(!reached.get());
        assert_eq!(env.now().as_micros(), 10.0);
    }

    #[test]
    fn device_ids_are_unique() {
        let env = Environment::new();
        let a = env.allocate_device_id();
        let b = env.allocate_device_id();
        assert_ne!(a, b);
    }
}
