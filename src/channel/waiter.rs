//! # Waiters and the `Recv` suspension point.
//!
//! A [`Recv`] is the future returned by [`Channel::next`](crate::Channel::next).
//! On its first poll it creates a [`WaiterSlot`], hands the channel a weak
//! reference to it and suspends unconditionally. The emission that resumes it
//! writes the arguments into the slot, then continues the computation:
//!
//! ```text
//! Recv::poll #1 ──► WaiterSlot { task | waker } ──attach(Weak)──► Channel.waiters
//!                                                                      │
//! emit(args) ──► deliver(args) into slot ──► resume():                 │
//!                  - task attached   → TaskCore::resume (inline poll)  ◄┘
//!                  - foreign executor→ Waker::wake
//! Recv::poll #2 ──► Ready(args)
//! ```
//!
//! ## Rules
//! - The slot is owned by the `Recv`; the channel only holds a `Weak`, so a
//!   dropped computation leaves a stale entry that the next emission skips.
//! - Each slot receives the arguments of the emission that woke it, even if
//!   another emission happens before a foreign executor polls it again.

use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::{Rc, Weak};
use std::task::{Context, Poll, Waker};

use crate::task::{self, TaskCore};

use super::channel::Inner;

/// Continuation of one suspended computation plus its delivery slot.
pub(crate) struct WaiterSlot<A> {
    value: RefCell<Option<A>>,
    task: Option<Weak<TaskCore>>,
    waker: RefCell<Option<Waker>>,
}

impl<A> WaiterSlot<A> {
    fn new(task: Option<Weak<TaskCore>>, waker: Waker) -> Self {
        Self {
            value: RefCell::new(None),
            task,
            waker: RefCell::new(Some(waker)),
        }
    }

    /// Returns `true` when the hosting task was dropped or already finished.
    pub(crate) fn is_stale(&self) -> bool {
        match &self.task {
            Some(task) => task.upgrade().map_or(true, |core| core.is_done()),
            None => false,
        }
    }

    /// Stores the emitted arguments for the next poll of the owning `Recv`.
    pub(crate) fn deliver(&self, args: A) {
        *self.value.borrow_mut() = Some(args);
    }

    /// Continues the suspended computation.
    pub(crate) fn resume(&self) {
        let waker = self.waker.borrow_mut().take();
        if let Some(waker) = waker {
            waker.wake();
        }
        let core = self.task.as_ref().and_then(Weak::upgrade);
        if let Some(core) = core {
            core.resume();
        }
    }

    fn take(&self) -> Option<A> {
        self.value.borrow_mut().take()
    }

    fn set_waker(&self, waker: &Waker) {
        let mut slot = self.waker.borrow_mut();
        match slot.as_ref() {
            Some(current) if current.will_wake(waker) => {}
            _ => *slot = Some(waker.clone()),
        }
    }
}

/// Future resolving to the arguments of the next emission of a channel.
///
/// Created by [`Channel::next`](crate::Channel::next) or by awaiting
/// `&channel` directly. Never ready on its first poll.
///
/// When polled from inside a [`Task`](crate::Task), the emission resumes the
/// task inline; under any other executor the emission wakes the poller's
/// `Waker` and the value is picked up on the next poll.
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct Recv<A> {
    channel: Weak<Inner<A>>,
    slot: Option<Rc<WaiterSlot<A>>>,
}

impl<A> Recv<A> {
    pub(crate) fn new(channel: Weak<Inner<A>>) -> Self {
        Self {
            channel,
            slot: None,
        }
    }

    /// Returns `true` once this future has attached itself to the channel.
    pub fn is_attached(&self) -> bool {
        self.slot.is_some()
    }
}

impl<A> Future for Recv<A> {
    type Output = A;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<A> {
        if let Some(slot) = &self.slot {
            return match slot.take() {
                Some(args) => Poll::Ready(args),
                None => {
                    slot.set_waker(cx.waker());
                    Poll::Pending
                }
            };
        }

        let slot = Rc::new(WaiterSlot::new(task::current(), cx.waker().clone()));
        match self.channel.upgrade() {
            Some(channel) => channel.attach(Rc::downgrade(&slot)),
            None => tracing::trace!("recv attached to a dropped channel; it will never resume"),
        }
        self.slot = Some(slot);
        Poll::Pending
    }
}

impl<A> fmt::Debug for Recv<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recv")
            .field("attached", &self.is_attached())
            .finish()
    }
}
