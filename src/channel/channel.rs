//! # Broadcast channel.
//!
//! [`Channel`] is a cheap `Rc`-backed handle that combines a
//! [`Dispatcher`] of long-lived callbacks with a set of one-shot waiters.
//!
//! ## Emission protocol
//! ```text
//! emit(args)
//!   1. dispatcher.invoke(&args)          callbacks, registration order
//!   2. last = Some(args.clone())         most recent arguments
//!   3. pending = take(waiters)           snapshot + clear the live set
//!      └─ drop stale entries             (computation dropped or finished)
//!   4. for slot in pending (attach order):
//!        slot.deliver(args.clone())
//!        slot.resume()                   inline for tasks, Waker for others
//! ```
//!
//! ## Rules
//! - **Callbacks first**: every callback runs before any waiter resumes.
//! - **One shot**: a waiter is removed from the live set before it is resumed,
//!   so a computation that re-attaches while resuming waits for the next emission.
//! - **Attach never dispatches**: `next()` only records the waiter.
//! - **No history**: only the most recent arguments are kept.
//! - **Fire-and-forget**: [`emit`](Channel::emit) reports nothing back to the producer.
//!
//! ## Re-entrancy
//! - `subscribe` from inside a callback is deferred; the handler joins after the
//!   current callback pass and runs from the next emission.
//! - `emit` from inside a callback of the same channel is rejected
//!   ([`ChannelError::Reentrant`]); `emit` from a resumed waiter is allowed.
//!
//! Single-threaded: `Channel` is neither `Send` nor `Sync`.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::future::IntoFuture;
use std::mem;
use std::rc::{Rc, Weak};

use crate::config::ChannelConfig;
use crate::dispatch::{Dispatcher, Handler};
use crate::error::ChannelError;

use super::waiter::{Recv, WaiterSlot};

/// Summary of one successful emission.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Emission {
    /// Callbacks invoked.
    pub notified: usize,
    /// Waiters resumed.
    pub resumed: usize,
    /// Stale waiters skipped (their computation was dropped or had finished).
    pub stale: usize,
}

/// Shared channel state.
pub(crate) struct Inner<A> {
    config: ChannelConfig,
    dispatcher: RefCell<Dispatcher<A>>,
    deferred: RefCell<Vec<Box<dyn Handler<A>>>>,
    handlers: Cell<usize>,
    last: RefCell<Option<A>>,
    waiters: RefCell<Vec<Weak<WaiterSlot<A>>>>,
}

impl<A> Inner<A> {
    /// Records a new waiter; never dispatches or resumes anything.
    pub(crate) fn attach(&self, slot: Weak<WaiterSlot<A>>) {
        self.waiters.borrow_mut().push(slot);
    }

    fn register(&self, handler: Box<dyn Handler<A>>) {
        match self.dispatcher.try_borrow_mut() {
            Ok(mut dispatcher) => dispatcher.push(handler),
            Err(_) => self.deferred.borrow_mut().push(handler),
        }
        self.handlers.set(self.handlers.get() + 1);
    }

    fn live_waiters(&self) -> usize {
        self.waiters
            .borrow()
            .iter()
            .filter(|w| w.upgrade().is_some_and(|slot| !slot.is_stale()))
            .count()
    }
}

impl<A> Drop for Inner<A> {
    fn drop(&mut self) {
        let pending = self.live_waiters();
        if pending > 0 {
            tracing::debug!(
                channel = %self.config.name,
                pending,
                "channel dropped with pending waiters; they will never resume"
            );
        }
    }
}

/// Broadcast channel carrying argument tuples of type `A`.
///
/// Use `()` for a channel without arguments and a tuple such as `(i32, String)`
/// for several. Cloning yields another handle to the same channel.
///
/// ### Properties
/// - **Multicast**: every [`subscribe`](Self::subscribe)d callback runs on every emission.
/// - **Awaitable**: [`next`](Self::next) (or `(&channel).await`) suspends until the next emission.
/// - **Synchronous**: waiters hosted by a [`Task`](crate::Task) resume inside `emit`.
///
/// # Example
/// ```rust
/// use std::{cell::Cell, rc::Rc};
/// use eventcast::Channel;
///
/// let ch = Channel::<(i32,)>::new();
/// let counter = Rc::new(Cell::new(0));
///
/// let c = Rc::clone(&counter);
/// ch.subscribe(move |_| c.set(c.get() + 1));
///
/// ch.emit((42,));
/// assert_eq!(counter.get(), 1);
/// assert_eq!(ch.last(), Some((42,)));
/// ```
pub struct Channel<A> {
    inner: Rc<Inner<A>>,
}

impl<A> Channel<A> {
    /// Creates a channel with the default [`ChannelConfig`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ChannelConfig::default())
    }

    /// Creates a channel with an explicit configuration.
    #[must_use]
    pub fn with_config(config: ChannelConfig) -> Self {
        let waiters = Vec::with_capacity(config.waiter_capacity_clamped());
        Self {
            inner: Rc::new(Inner {
                config,
                dispatcher: RefCell::new(Dispatcher::new()),
                deferred: RefCell::new(Vec::new()),
                handlers: Cell::new(0),
                last: RefCell::new(None),
                waiters: RefCell::new(waiters),
            }),
        }
    }

    /// Registers a callback invoked on every emission, after the ones already registered.
    pub fn subscribe<F>(&self, f: F)
    where
        F: FnMut(&A) + 'static,
    {
        self.inner.register(Box::new(f));
    }

    /// Registers a named [`Handler`] implementation.
    pub fn subscribe_handler<H>(&self, handler: H)
    where
        H: Handler<A> + 'static,
    {
        self.inner.register(Box::new(handler));
    }

    /// Returns a future that resolves to the arguments of the next emission.
    ///
    /// Nothing is recorded until the future is first polled.
    pub fn next(&self) -> Recv<A> {
        Recv::new(Rc::downgrade(&self.inner))
    }

    /// Number of registered callbacks (including ones deferred by a running dispatch).
    pub fn subscribers(&self) -> usize {
        self.inner.handlers.get()
    }

    /// Number of live waiters that the next emission would resume.
    pub fn pending(&self) -> usize {
        self.inner.live_waiters()
    }

    /// Channel name from its configuration.
    pub fn name(&self) -> &str {
        &self.inner.config.name
    }
}

impl<A: Clone> Channel<A> {
    /// Broadcasts `args`: callbacks first, then every waiter attached so far.
    ///
    /// A nested emission from inside one of this channel's callbacks is
    /// dropped with a warning; use [`try_emit`](Self::try_emit) to observe it.
    pub fn emit(&self, args: A) {
        if let Err(err) = self.try_emit(args) {
            tracing::warn!(
                channel = %self.name(),
                error = %err,
                label = err.as_label(),
                "emission dropped"
            );
        }
    }

    /// Broadcasts `args` and reports what happened.
    ///
    /// # Errors
    /// [`ChannelError::Reentrant`] when called from inside one of this
    /// channel's callbacks; nothing is dispatched, stored or resumed then.
    pub fn try_emit(&self, args: A) -> Result<Emission, ChannelError> {
        let notified = {
            let Ok(mut dispatcher) = self.inner.dispatcher.try_borrow_mut() else {
                return Err(ChannelError::Reentrant {
                    channel: self.inner.config.name.clone(),
                });
            };
            dispatcher.invoke(&args);
            let notified = dispatcher.len();

            let mut deferred = mem::take(&mut *self.inner.deferred.borrow_mut());
            dispatcher.append(&mut deferred);
            notified
        };

        *self.inner.last.borrow_mut() = Some(args.clone());

        let pending = {
            let mut waiters = self.inner.waiters.borrow_mut();
            let capacity = waiters.capacity();
            mem::replace(&mut *waiters, Vec::with_capacity(capacity))
        };

        let mut stale = 0;
        let ready: Vec<Rc<WaiterSlot<A>>> = pending
            .into_iter()
            .filter_map(|waiter| match waiter.upgrade() {
                Some(slot) if !slot.is_stale() => Some(slot),
                _ => {
                    stale += 1;
                    None
                }
            })
            .collect();
        if stale > 0 {
            tracing::trace!(channel = %self.name(), stale, "skipped stale waiters");
        }

        let resumed = ready.len();
        for slot in ready {
            slot.deliver(args.clone());
            slot.resume();
        }

        tracing::debug!(channel = %self.name(), notified, resumed, stale, "emitted");
        Ok(Emission {
            notified,
            resumed,
            stale,
        })
    }

    /// Returns a copy of the most recently emitted arguments.
    pub fn last(&self) -> Option<A> {
        self.inner.last.borrow().clone()
    }
}

impl<A> Clone for Channel<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<A> Default for Channel<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> fmt::Debug for Channel<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("name", &self.name())
            .field("subscribers", &self.subscribers())
            .field("pending", &self.pending())
            .finish()
    }
}

impl<A> IntoFuture for &Channel<A> {
    type Output = A;
    type IntoFuture = Recv<A>;

    fn into_future(self) -> Recv<A> {
        self.next()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use futures::executor::LocalPool;
    use futures::task::LocalSpawnExt;
    use proptest::prelude::*;

    use super::*;
    use crate::{Progress, Task};

    fn counter(ch: &Channel<(i32,)>) -> Rc<Cell<u32>> {
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        ch.subscribe(move |_| c.set(c.get() + 1));
        count
    }

    fn recorder(ch: &Channel<(i32,)>, name: &'static str) -> (Task, Rc<RefCell<Vec<i32>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let task = Task::new(name, {
            let ch = ch.clone();
            let seen = Rc::clone(&seen);
            async move {
                let (v,) = ch.next().await;
                seen.borrow_mut().push(v);
            }
        });
        (task, seen)
    }

    #[test]
    fn test_emit_without_consumers_only_updates_last() {
        let ch = Channel::<(i32,)>::new();
        assert_eq!(ch.last(), None);

        let emission = ch.try_emit((7,)).expect("not re-entrant");
        assert_eq!(emission, Emission::default());
        assert_eq!(ch.last(), Some((7,)));

        ch.emit((8,));
        assert_eq!(ch.last(), Some((8,)));
    }

    #[test]
    fn test_handlers_run_once_per_emission() {
        let ch = Channel::<(i32,)>::new();
        let a = counter(&ch);
        let b = counter(&ch);

        ch.emit((42,));
        assert_eq!((a.get(), b.get()), (1, 1));
        ch.emit((84,));
        assert_eq!((a.get(), b.get()), (2, 2));
        assert_eq!(ch.subscribers(), 2);
    }

    #[test]
    fn test_counter_and_waiter_scenario() {
        let ch = Channel::<(i32,)>::new();
        let count = counter(&ch);

        ch.emit((42,));
        assert_eq!(count.get(), 1);

        let (task, seen) = recorder(&ch, "w");
        assert_eq!(task.advance(), Progress::Suspended);
        assert_eq!(ch.pending(), 1);

        let emission = ch.try_emit((84,)).expect("not re-entrant");
        assert_eq!(emission.notified, 1);
        assert_eq!(emission.resumed, 1);
        assert_eq!(*seen.borrow(), vec![84]);
        assert_eq!(count.get(), 2);
        assert!(task.is_done());
    }

    #[test]
    fn test_waiter_resumes_exactly_once() {
        let ch = Channel::<(i32,)>::new();
        let (task, seen) = recorder(&ch, "once");
        task.advance();

        ch.emit((1,));
        ch.emit((2,));
        assert_eq!(*seen.borrow(), vec![1]);
        assert_eq!(ch.pending(), 0);
    }

    #[test]
    fn test_not_advanced_task_is_not_attached() {
        let ch = Channel::<(i32,)>::new();
        let (task, seen) = recorder(&ch, "lazy");

        ch.emit((1,));
        assert!(seen.borrow().is_empty());
        assert_eq!(task.advance(), Progress::Suspended);
        ch.emit((2,));
        assert_eq!(*seen.borrow(), vec![2]);
    }

    #[test]
    fn test_two_waiters_resume_in_attach_order() {
        let ch = Channel::<(i32,)>::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let tasks: Vec<Task> = ["first", "second"]
            .into_iter()
            .map(|name| {
                let ch = ch.clone();
                let order = Rc::clone(&order);
                Task::new(name, async move {
                    let (v,) = (&ch).await;
                    order.borrow_mut().push((name, v));
                })
            })
            .collect();
        for task in &tasks {
            assert_eq!(task.advance(), Progress::Suspended);
        }

        let emission = ch.try_emit((84,)).expect("not re-entrant");
        assert_eq!(emission.resumed, 2);
        assert_eq!(*order.borrow(), vec![("first", 84), ("second", 84)]);
        assert!(tasks.iter().all(Task::is_done));
    }

    #[test]
    fn test_callbacks_run_before_waiters() {
        let ch = Channel::<(i32,)>::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let task = Task::new("waiter", {
            let ch = ch.clone();
            let log = Rc::clone(&log);
            async move {
                ch.next().await;
                log.borrow_mut().push("waiter");
            }
        });
        task.advance();

        let l = Rc::clone(&log);
        ch.subscribe(move |_| l.borrow_mut().push("callback"));

        ch.emit((0,));
        assert_eq!(*log.borrow(), vec!["callback", "waiter"]);
    }

    #[test]
    fn test_reattach_waits_for_next_emission() {
        let ch = Channel::<(i32,)>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let task = Task::new("loop", {
            let ch = ch.clone();
            let seen = Rc::clone(&seen);
            async move {
                loop {
                    let (v,) = ch.next().await;
                    seen.borrow_mut().push(v);
                }
            }
        });
        task.advance();

        let first = ch.try_emit((1,)).expect("not re-entrant");
        assert_eq!(first.resumed, 1);
        assert_eq!(*seen.borrow(), vec![1]);
        assert_eq!(ch.pending(), 1);

        ch.emit((2,));
        ch.emit((3,));
        assert_eq!(*seen.borrow(), vec![1, 2, 3]);
        assert!(!task.is_done());
    }

    #[test]
    fn test_dropped_task_leaves_stale_waiter() {
        let ch = Channel::<(i32,)>::new();
        let (task, seen) = recorder(&ch, "dropped");
        task.advance();
        drop(task);

        assert_eq!(ch.pending(), 0);
        let emission = ch.try_emit((5,)).expect("not re-entrant");
        assert_eq!(emission.resumed, 0);
        assert_eq!(emission.stale, 1);
        assert!(seen.borrow().is_empty());

        let again = ch.try_emit((6,)).expect("not re-entrant");
        assert_eq!(again.stale, 0);
    }

    #[test]
    fn test_unit_channel() {
        let ch = Channel::<()>::new();
        let fired = Rc::new(Cell::new(false));
        let task = Task::new("unit", {
            let ch = ch.clone();
            let fired = Rc::clone(&fired);
            async move {
                (&ch).await;
                fired.set(true);
            }
        });
        task.advance();

        ch.emit(());
        assert!(fired.get());
    }

    #[test]
    fn test_subscribe_inside_callback_is_deferred() {
        let ch = Channel::<(i32,)>::new();
        let late = Rc::new(Cell::new(0));

        let handle = ch.clone();
        let l = Rc::clone(&late);
        let mut armed = true;
        ch.subscribe(move |_| {
            if mem::take(&mut armed) {
                let l = Rc::clone(&l);
                handle.subscribe(move |_| l.set(l.get() + 1));
            }
        });

        let first = ch.try_emit((1,)).expect("not re-entrant");
        assert_eq!(first.notified, 1);
        assert_eq!(late.get(), 0);
        assert_eq!(ch.subscribers(), 2);

        let second = ch.try_emit((2,)).expect("not re-entrant");
        assert_eq!(second.notified, 2);
        assert_eq!(late.get(), 1);
    }

    #[test]
    fn test_emit_inside_callback_is_rejected() {
        let ch = Channel::<(i32,)>::new();
        let nested = Rc::new(RefCell::new(None));

        let handle = ch.clone();
        let n = Rc::clone(&nested);
        ch.subscribe(move |&(v,)| {
            if v == 1 {
                *n.borrow_mut() = Some(handle.try_emit((99,)));
            }
        });

        ch.emit((1,));
        assert_eq!(
            *nested.borrow(),
            Some(Err(ChannelError::Reentrant {
                channel: "channel".into()
            }))
        );
        assert_eq!(ch.last(), Some((1,)));
    }

    #[test]
    fn test_resumed_waiter_may_emit() {
        let requests = Channel::<(u32,)>::new();
        let replies = Channel::<(u32,)>::new();
        let got = Rc::new(Cell::new(0));

        let server = Task::new("server", {
            let requests = requests.clone();
            let replies = replies.clone();
            async move {
                loop {
                    let (n,) = requests.next().await;
                    replies.emit((n * 2,));
                }
            }
        });
        let client = Task::new("client", {
            let replies = replies.clone();
            let got = Rc::clone(&got);
            async move {
                let (n,) = replies.next().await;
                got.set(n);
            }
        });
        server.advance();
        client.advance();

        requests.emit((21,));
        assert_eq!(got.get(), 42);
        assert!(client.is_done());
        assert_eq!(requests.pending(), 1);
    }

    #[test]
    fn test_task_emitting_on_channel_it_awaits() {
        let ch = Channel::<(i32,)>::new();
        let got = Rc::new(Cell::new(0));

        let task = Task::new("self-wake", {
            let ch = ch.clone();
            let got = Rc::clone(&got);
            async move {
                let ((v,), ()) = futures::join!(ch.next(), async { ch.emit((7,)) });
                got.set(v);
            }
        });

        assert_eq!(task.advance(), Progress::Completed);
        assert_eq!(got.get(), 7);
    }

    #[test]
    fn test_dropped_channel_never_resumes_waiter() {
        let ch = Channel::<(i32,)>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let task = Task::new("orphan", {
            // Only the future is moved in; it holds the channel weakly.
            let recv = ch.next();
            let seen = Rc::clone(&seen);
            async move {
                let (v,) = recv.await;
                seen.borrow_mut().push(v);
            }
        });
        assert_eq!(task.advance(), Progress::Suspended);
        assert_eq!(ch.pending(), 1);

        drop(ch);
        assert_eq!(task.advance(), Progress::Suspended);
        assert!(seen.borrow().is_empty());
        assert!(!task.is_done());
    }

    #[test]
    fn test_foreign_executor_waiter() {
        let ch = Channel::<(i32,)>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut pool = LocalPool::new();

        let fut = {
            let ch = ch.clone();
            let seen = Rc::clone(&seen);
            async move {
                let (v,) = ch.next().await;
                seen.borrow_mut().push(v);
            }
        };
        pool.spawner().spawn_local(fut).expect("spawn");
        pool.run_until_stalled();
        assert_eq!(ch.pending(), 1);

        // Both emissions happen before the pool polls again; the waiter keeps
        // the value of the emission that woke it.
        let emission = ch.try_emit((1,)).expect("not re-entrant");
        assert_eq!(emission.resumed, 1);
        ch.emit((2,));
        assert!(seen.borrow().is_empty());

        pool.run_until_stalled();
        assert_eq!(*seen.borrow(), vec![1]);
        assert_eq!(ch.last(), Some((2,)));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_tokio_local_set_waiter() {
        let ch = Channel::<(String,)>::new();
        let local = tokio::task::LocalSet::new();

        let waiter = local.spawn_local({
            let ch = ch.clone();
            async move { ch.next().await.0 }
        });

        local
            .run_until(async {
                for _ in 0..8 {
                    if ch.pending() == 1 {
                        break;
                    }
                    tokio::task::yield_now().await;
                }
                assert_eq!(ch.pending(), 1);
                ch.emit(("hello".to_string(),));
            })
            .await;

        let value = local.run_until(waiter).await.expect("join");
        assert_eq!(value, "hello");
    }

    proptest! {
        #[test]
        fn prop_subscribers_see_every_emission_in_order(n in 0usize..16, values in prop::collection::vec(any::<i32>(), 1..8)) {
            let ch = Channel::<(i32,)>::new();
            let log = Rc::new(RefCell::new(Vec::new()));
            for idx in 0..n {
                let log = Rc::clone(&log);
                ch.subscribe(move |&(v,)| log.borrow_mut().push((idx, v)));
            }

            for &v in &values {
                ch.emit((v,));
            }

            let expected: Vec<_> = values
                .iter()
                .flat_map(|&v| (0..n).map(move |idx| (idx, v)))
                .collect();
            prop_assert_eq!(&*log.borrow(), &expected);
        }

        #[test]
        fn prop_each_waiter_resumes_once(waiters in 1usize..8, emissions in 1usize..4) {
            let ch = Channel::<(usize,)>::new();
            let hits = Rc::new(RefCell::new(vec![0usize; waiters]));
            let tasks: Vec<Task> = (0..waiters)
                .map(|idx| {
                    let ch = ch.clone();
                    let hits = Rc::clone(&hits);
                    Task::new("w", async move {
                        ch.next().await;
                        hits.borrow_mut()[idx] += 1;
                    })
                })
                .collect();
            for task in &tasks {
                task.advance();
            }

            for e in 0..emissions {
                ch.emit((e,));
            }

            prop_assert!(hits.borrow().iter().all(|&h| h == 1));
            prop_assert!(tasks.iter().all(Task::is_done));
        }
    }
}
