//! # Owning handle for one suspendable computation.
//!
//! [`Task`] wraps a `Future<Output = ()>` and drives it by hand: nothing runs
//! until [`Task::advance`] is called, and every later step happens either in
//! another `advance` or inline inside a [`Channel::emit`](crate::Channel::emit)
//! that resumes the computation.
//!
//! ## Lifecycle
//! ```text
//! Task::new ──► [not started] ──advance()──► run until next .await on a channel
//!                                                 │
//!                      emit() resumes inline ◄────┘ (or advance() again)
//!                                                 │
//!                                                 ▼
//!                        [completed: flag set, frame dropped by the poll loop]
//!
//! drop(Task) before completion ──► frame dropped (abandoned), waiters go stale
//! ```
//!
//! ## Faults
//! A panic inside the computation aborts the process by default
//! ([`FaultPolicy::Abort`]). With [`FaultPolicy::Capture`] the task is marked
//! done, its frame is dropped and the error is kept for [`Task::take_fault`].

use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use std::task::{Context, Poll};

use futures::future::LocalBoxFuture;
use futures::task::noop_waker_ref;

use crate::config::{FaultPolicy, TaskConfig};
use crate::error::TaskError;

use super::current;

/// Outcome of one [`Task::advance`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Progress {
    /// The computation stopped at a suspension point and waits to be resumed.
    Suspended,
    /// The computation ran to its end during this call.
    Completed,
    /// The computation panicked during this call (only with [`FaultPolicy::Capture`]).
    Faulted,
    /// Nothing was polled: the task had already finished, or it is being polled
    /// further up the stack.
    Idle,
}

/// Shared state of a task; channels hold it weakly as a continuation.
pub(crate) struct TaskCore {
    name: Cow<'static, str>,
    config: TaskConfig,
    frame: RefCell<Option<LocalBoxFuture<'static, ()>>>,
    done: Cell<bool>,
    abandoned: Cell<bool>,
    notified: Cell<bool>,
    fault: RefCell<Option<TaskError>>,
}

impl TaskCore {
    /// Returns `true` once the computation has finished (normally or by fault).
    pub(crate) fn is_done(&self) -> bool {
        self.done.get()
    }

    /// Continues the computation from its current suspension point.
    ///
    /// A resume that arrives while the task is already being polled is
    /// recorded; the running poll loop polls once more before returning.
    pub(crate) fn resume(self: &Rc<Self>) {
        if self.done.get() || self.abandoned.get() {
            return;
        }
        if let Err(TaskError::Reentrant { .. }) = self.poll_frame() {
            self.notified.set(true);
        }
    }

    fn poll_frame(self: &Rc<Self>) -> Result<Progress, TaskError> {
        let Ok(mut frame) = self.frame.try_borrow_mut() else {
            return Err(TaskError::Reentrant {
                task: self.name.clone(),
            });
        };

        let _enter = current::enter(Rc::downgrade(self));
        let mut cx = Context::from_waker(noop_waker_ref());

        let outcome = loop {
            self.notified.set(false);
            let Some(fut) = frame.as_mut() else {
                return Ok(Progress::Idle);
            };
            match panic::catch_unwind(AssertUnwindSafe(|| fut.as_mut().poll(&mut cx))) {
                Ok(Poll::Pending) if self.notified.get() && !self.abandoned.get() => continue,
                other => break other,
            }
        };

        match outcome {
            Ok(Poll::Pending) => {
                if self.abandoned.get() {
                    // The owning handle was dropped while we were polling.
                    *frame = None;
                    return Ok(Progress::Idle);
                }
                Ok(Progress::Suspended)
            }
            Ok(Poll::Ready(())) => {
                *frame = None;
                self.done.set(true);
                tracing::trace!(task = %self.name, "task completed");
                Ok(Progress::Completed)
            }
            Err(payload) => {
                let message = panic_message(&*payload);
                tracing::error!(task = %self.name, panic = %message, "task panicked");
                if self.config.fault == FaultPolicy::Abort {
                    std::process::abort();
                }
                *frame = None;
                self.done.set(true);
                *self.fault.borrow_mut() = Some(TaskError::Panicked {
                    task: self.name.clone(),
                    message,
                });
                Ok(Progress::Faulted)
            }
        }
    }
}

/// Owning handle for one suspendable computation.
///
/// ### Properties
/// - **Lazy**: constructing a task runs none of its body.
/// - **Move-only**: exactly one owner; not `Clone`, not `Send`.
/// - **Abandon on drop**: dropping an unfinished task drops its frame.
///
/// # Example
/// ```rust
/// use std::{cell::Cell, rc::Rc};
/// use eventcast::{Channel, Progress, Task};
///
/// let clicks = Channel::<(i32,)>::new();
/// let seen = Rc::new(Cell::new(0));
///
/// let task = Task::new("first-click", {
///     let clicks = clicks.clone();
///     let seen = Rc::clone(&seen);
///     async move {
///         let (x,) = clicks.next().await;
///         seen.set(x);
///     }
/// });
///
/// assert_eq!(task.advance(), Progress::Suspended);
/// clicks.emit((42,));
/// assert_eq!(seen.get(), 42);
/// assert!(task.is_done());
/// ```
pub struct Task {
    core: Rc<TaskCore>,
}

impl Task {
    /// Wraps `fut` in a task with the default [`TaskConfig`].
    pub fn new<F>(name: impl Into<Cow<'static, str>>, fut: F) -> Self
    where
        F: Future<Output = ()> + 'static,
    {
        Self::with_config(name, TaskConfig::default(), fut)
    }

    /// Wraps `fut` in a task with an explicit configuration.
    pub fn with_config<F>(name: impl Into<Cow<'static, str>>, config: TaskConfig, fut: F) -> Self
    where
        F: Future<Output = ()> + 'static,
    {
        let frame: LocalBoxFuture<'static, ()> = Box::pin(fut);
        Self {
            core: Rc::new(TaskCore {
                name: name.into(),
                config,
                frame: RefCell::new(Some(frame)),
                done: Cell::new(false),
                abandoned: Cell::new(false),
                notified: Cell::new(false),
                fault: RefCell::new(None),
            }),
        }
    }

    /// Runs the computation until it completes or suspends again.
    ///
    /// Safe no-op (`Progress::Idle`) on a finished task.
    pub fn advance(&self) -> Progress {
        match self.try_advance() {
            Ok(progress) => progress,
            Err(err) => {
                tracing::warn!(task = %self.name(), error = %err, "advance ignored");
                Progress::Idle
            }
        }
    }

    /// Like [`advance`](Self::advance), but reports a call made from inside
    /// the task's own body as [`TaskError::Reentrant`].
    pub fn try_advance(&self) -> Result<Progress, TaskError> {
        if self.core.done.get() {
            return Ok(Progress::Idle);
        }
        self.core.poll_frame()
    }

    /// Returns `true` once the computation has finished.
    #[inline]
    pub fn is_done(&self) -> bool {
        self.core.is_done()
    }

    /// Task name used in log records and errors.
    pub fn name(&self) -> &str {
        &self.core.name
    }

    /// Takes the captured panic, if the computation faulted under
    /// [`FaultPolicy::Capture`].
    pub fn take_fault(&self) -> Option<TaskError> {
        self.core.fault.borrow_mut().take()
    }
}

impl Drop for Task {
    fn drop(&mut self) {
        if self.core.done.get() {
            return;
        }
        self.core.abandoned.set(true);
        tracing::trace!(task = %self.core.name, "abandoning unfinished task");
        // While the task is being polled further up the stack the poll loop
        // drops the frame itself once it observes `abandoned`.
        if let Ok(mut frame) = self.core.frame.try_borrow_mut() {
            *frame = None;
        }
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.core.name)
            .field("done", &self.core.done.get())
            .finish()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
