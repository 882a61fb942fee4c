//! A minimal single-threaded task executor.
//!
//! `nexosim` runs models on a multi-threaded, work-stealing executor built
//! from `crossbeam-utils`, `st3`, `diatomic-waker` and friends (see
//! `nexosim/src/lib.rs`'s `pub(crate) mod executor;`). Spec §5 calls for the
//! opposite: single-threaded cooperative scheduling with no OS-thread
//! parallelism at all. This module is a from-scratch replacement sized to
//! that requirement — every `Process` (spec §4.A) is an ordinary
//! non-`Send` `async fn` run to its next suspension point by this executor,
//! with no cross-thread wakeups to support.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

type BoxedFuture = Pin<Box<dyn Future<Output = ()>>>;

/// State shared between a task and the wakers that can re-schedule it.
struct TaskSlot {
    future: RefCell<Option<BoxedFuture>>,
}

/// The executor's ready queue, shared with every waker so that waking a
/// task (from a store mutation or an expired timer) can push it back onto
/// the queue without needing a handle to the executor itself.
type ReadyQueue = Rc<RefCell<VecDeque<Rc<TaskSlot>>>>;

/// Data behind a [`Waker`] for a single task.
struct WakerData {
    queue: ReadyQueue,
    task: Rc<TaskSlot>,
}

/// Runs spawned `Process`es to quiescence within a single virtual instant.
///
/// Does not own the event heap that advances virtual time between instants
/// — see [`crate::kernel::Environment`], which owns one `Executor` and
/// drains it every time it wakes a batch of timers.
#[derive(Default)]
pub(crate) struct Executor {
    ready: ReadyQueue,
    // Kept alive so that long-running processes (Sublinks, device listen
    // loops) are not dropped merely because nothing currently references
    // them; they are driven purely by the ready queue.
    parked: RefCell<Vec<Rc<TaskSlot>>>,
}

impl Executor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns a process that runs until it completes (processes modeling
    /// spec §4.A loops never do) or the executor is dropped.
    pub fn spawn(&self, future: impl Future<Output = ()> + 'static) {
        let slot = Rc::new(TaskSlot {
            future: RefCell::new(Some(Box::pin(future))),
        });
        self.parked.borrow_mut().push(slot.clone());
        self.ready.borrow_mut().push_back(slot);
    }

    /// Returns true if at least one task is ready to be polled.
    pub fn has_ready_work(&self) -> bool {
        !self.ready.borrow().is_empty()
    }

    /// Drains the ready queue, polling every runnable task until none
    /// remain ready. Per spec §5, this whole drain happens "atomically"
    /// with respect to virtual time: no timer may fire partway through it.
    pub fn run_ready(&self) {
        loop {
            let next = self.ready.borrow_mut().pop_front();
            let Some(task) = next else {
                break;
            };
            let waker = make_waker(task.clone(), self.ready.clone());
            let mut cx = Context::from_waker(&waker);

            let mut slot = task.future.borrow_mut();
            if let Some(mut fut) = slot.take() {
                match fut.as_mut().poll(&mut cx) {
                    Poll::Pending => *slot = Some(fut),
                    Poll::Ready(()) => {}
                }
            }
        }
    }
}

fn make_waker(task: Rc<TaskSlot>, queue: ReadyQueue) -> Waker {
    let data = Rc::new(WakerData { queue, task });
    let raw = RawWaker::new(Rc::into_raw(data) as *const (), &VTABLE);
    // SAFETY: `raw` was built from a live `Rc<WakerData>` via
    // `Rc::into_raw`, and `VTABLE`'s functions only ever reconstruct that
    // `Rc` from pointers produced the same way, matching the contract of
    // `RawWaker`/`RawWakerVTable`.
    unsafe { Waker::from_raw(raw) }
}

static VTABLE: RawWakerVTable = RawWakerVTable::new(clone_waker, wake, wake_by_ref, drop_waker);

unsafe fn clone_waker(ptr: *const ()) -> RawWaker {
    let data = Rc::from_raw(ptr as *const WakerData);
    let cloned = data.clone();
    std::mem::forget(data);
    RawWaker::new(Rc::into_raw(cloned) as *const (), &VTABLE)
}

unsafe fn wake(ptr: *const ()) {
    let data = Rc::from_raw(ptr as *const WakerData);
    data.queue.borrow_mut().push_back(data.task.clone());
}

unsafe fn wake_by_ref(ptr: *const ()) {
    let data = &*(ptr as *const WakerData);
    data.queue.borrow_mut().push_back(data.task.clone());
}

unsafe fn drop_waker(ptr: *const ()) {
    drop(Rc::from_raw(ptr as *const WakerData));
}
