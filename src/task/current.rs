//! Current-task marker.
//!
//! While a [`Task`](crate::Task) polls its computation, the task's core is
//! recorded in a thread-local slot so that a [`Recv`](crate::Recv) polled
//! inside it can register the task itself as its continuation and be resumed
//! inline by `emit`. Outside a task the slot is empty and `Recv` falls back to
//! the `Waker` of whatever executor polls it.
//!
//! The slot is a stack: entering a nested task (a task resumed from inside
//! another task's `emit`) saves the outer marker and restores it on exit.

use std::cell::RefCell;
use std::rc::Weak;

use super::task::TaskCore;

thread_local! {
    static CURRENT: RefCell<Option<Weak<TaskCore>>> = const { RefCell::new(None) };
}

/// Guard restoring the previous marker on drop.
pub(crate) struct Enter {
    prev: Option<Weak<TaskCore>>,
}

/// Marks `core` as the task being polled on this thread.
pub(crate) fn enter(core: Weak<TaskCore>) -> Enter {
    let prev = CURRENT.with(|slot| slot.replace(Some(core)));
    Enter { prev }
}

/// Returns the task being polled on this thread, if any.
pub(crate) fn current() -> Option<Weak<TaskCore>> {
    CURRENT.with(|slot| slot.borrow().clone())
}

impl Drop for Enter {
    fn drop(&mut self) {
        let prev = self.prev.take();
        CURRENT.with(|slot| *slot.borrow_mut() = prev);
    }
}
