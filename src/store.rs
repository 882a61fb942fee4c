//! FIFO stores with bounded or unbounded capacity (spec §3, §4.A).
//!
//! Grounded on `ft4fttsim/networking.py`'s `Port.InputQueue`/`Port.OutputQueue`,
//! which subclass `simpy.Store`: the in-queue is unbounded, the out-queue has
//! capacity 1 so that at most one message is ever in flight per `Sublink`
//! (spec §3 Sublink invariant). `get`/`put` suspend the calling process
//! exactly as `simpy.Store.get`/`put` do; `any_of` (spec §4.A(d)) is the
//! dedicated [`AnyOfGet`] combinator used by
//! [`crate::device::listen_for_messages`].

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

/// A FIFO queue with an optional capacity bound.
///
/// `Store<T>` is the kernel primitive behind both halves of a [`Port`](crate::port::Port):
/// `Store::bounded(1)` for the out-queue, `Store::unbounded()` for the in-queue.
pub(crate) struct Store<T> {
    queue: RefCell<VecDeque<T>>,
    capacity: Option<usize>,
    get_waiters: RefCell<VecDeque<(u64, Waker)>>,
    put_waiters: RefCell<VecDeque<(u64, Waker)>>,
    next_waiter_id: Cell<u64>,
}

impl<T> Store<T> {
    pub fn unbounded() -> Rc<Self> {
        Rc::new(Self::new(None))
    }

    pub fn bounded(capacity: usize) -> Rc<Self> {
        Rc::new(Self::new(Some(capacity)))
    }

    fn new(capacity: Option<usize>) -> Self {
        Self {
            queue: RefCell::new(VecDeque::new()),
            capacity,
            get_waiters: RefCell::new(VecDeque::new()),
            put_waiters: RefCell::new(VecDeque::new()),
            next_waiter_id: Cell::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    fn next_id(&self) -> u64 {
        let id = self.next_waiter_id.get();
        self.next_waiter_id.set(id + 1);
        id
    }

    fn register_get(&self, waker: &Waker) -> u64 {
        let id = self.next_id();
        self.get_waiters.borrow_mut().push_back((id, waker.clone()));
        id
    }

    fn unregister_get(&self, id: u64) {
        self.get_waiters.borrow_mut().retain(|(i, _)| *i != id);
    }

    fn register_put(&self, waker: &Waker) -> u64 {
        let id = self.next_id();
        self.put_waiters.borrow_mut().push_back((id, waker.clone()));
        id
    }

    fn unregister_put(&self, id: u64) {
        self.put_waiters.borrow_mut().retain(|(i, _)| *i != id);
    }

    fn try_pop(&self) -> Option<T> {
        let item = self.queue.borrow_mut().pop_front();
        if item.is_some() {
            if let Some((_, waker)) = self.put_waiters.borrow_mut().pop_front() {
                waker.wake();
            }
        }
        item
    }

    fn try_push(&self, item: T) -> Result<(), T> {
        let has_room = match self.capacity {
            Some(capacity) => self.queue.borrow().len() < capacity,
            None => true,
        };
        if !has_room {
            return Err(item);
        }
        self.queue.borrow_mut().push_back(item);
        if let Some((_, waker)) = self.get_waiters.borrow_mut().pop_front() {
            waker.wake();
        }
        Ok(())
    }

    /// A single `get`: suspends until an item is available.
    pub fn get(self: &Rc<Self>) -> Get<T> {
        Get {
            store: self.clone(),
            waiter_id: None,
        }
    }

    /// A single `put`: suspends while the store is at capacity.
    pub fn put(self: &Rc<Self>, item: T) -> Put<T> {
        Put {
            store: self.clone(),
            item: Some(item),
            waiter_id: None,
        }
    }
}

/// Future returned by [`Store::get`].
pub(crate) struct Get<T> {
    store: Rc<Store<T>>,
    waiter_id: Option<u64>,
}

impl<T> Future for Get<T> {
    type Output = T;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<T> {
        if let Some(item) = self.store.try_pop() {
            if let Some(id) = self.waiter_id.take() {
                self.store.unregister_get(id);
            }
            return Poll::Ready(item);
        }
        if self.waiter_id.is_none() {
            self.waiter_id = Some(self.store.register_get(cx.waker()));
        }
        Poll::Pending
    }
}

impl<T> Drop for Get<T> {
    fn drop(&mut self) {
        if let Some(id) = self.waiter_id.take() {
            self.store.unregister_get(id);
        }
    }
}

/// Future returned by [`Store::put`].
pub(crate) struct Put<T> {
    store: Rc<Store<T>>,
    item: Option<T>,
    waiter_id: Option<u64>,
}

// `Put` never relies on pinning guarantees (no self-referential data), so it
// is always safe to treat as movable, matching `Get`'s and `AnyOfGet`'s
// implicit `Unpin` (their fields don't hold `T` directly).
impl<T> Unpin for Put<T> {}

impl<T> Future for Put<T> {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let item = self.item.take().expect("Put polled after completion");
        match self.store.try_push(item) {
            Ok(()) => {
                if let Some(id) = self.waiter_id.take() {
                    self.store.unregister_put(id);
                }
                Poll::Ready(())
            }
            Err(item) => {
                self.item = Some(item);
                if self.waiter_id.is_none() {
                    self.waiter_id = Some(self.store.register_put(cx.waker()));
                }
                Poll::Pending
            }
        }
    }
}

impl<T> Drop for Put<T> {
    fn drop(&mut self) {
        if let Some(id) = self.waiter_id.take() {
            self.store.unregister_put(id);
        }
    }
}

/// Waits on several `get`-able stores at once, resuming with every item
/// that is available at the same wake-up (spec §4.A(d): "resumes with the
/// subset that completed simultaneously at the earliest scheduled time").
///
/// Used by [`crate::device::listen_for_messages`] to implement spec §4.E's
/// "maintain one outstanding `get` request per in-queue" contract: exactly
/// one [`AnyOfGet`] is alive per device at a time, and it keeps at most one
/// waiter registered per store for as long as it is pending.
pub(crate) struct AnyOfGet<T> {
    stores: Vec<Rc<Store<T>>>,
    waiter_ids: Vec<Option<u64>>,
}

impl<T> AnyOfGet<T> {
    pub fn new(stores: Vec<Rc<Store<T>>>) -> Self {
        let waiter_ids = vec![None; stores.len()];
        Self { stores, waiter_ids }
    }
}

impl<T> Future for AnyOfGet<T> {
    /// `(store_index, item)` pairs, in store order, for every store that had
    /// an item available at this wake-up.
    type Output = Vec<(usize, T)>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Vec<(usize, T)>> {
        let this = self.as_mut().get_mut();
        let mut ready = Vec::new();
        for (index, store) in this.stores.iter().enumerate() {
            if let Some(item) = store.try_pop() {
                ready.push((index, item));
            }
        }

        if !ready.is_empty() {
            for (index, store) in this.stores.iter().enumerate() {
                if let Some(id) = this.waiter_ids[index].take() {
                    store.unregister_get(id);
                }
            }
            return Poll::Ready(ready);
        }

        for (index, store) in this.stores.iter().enumerate() {
            if this.waiter_ids[index].is_none() {
                this.waiter_ids[index] = Some(store.register_get(cx.waker()));
            }
        }
        Poll::Pending
    }
}

impl<T> Drop for AnyOfGet<T> {
    fn drop(&mut self) {
        for (index, store) in self.stores.iter().enumerate() {
            if let Some(id) = self.waiter_ids[index].take() {
                store.unregister_get(id);
            }
        }
    }
}
