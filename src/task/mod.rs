//! # Task handle.
//!
//! This module provides:
//! - [`Task`] - owning, move-only handle that drives one suspendable computation
//! - [`Progress`] - outcome of a single [`Task::advance`]
//!
//! Tasks are the inline continuation used by [`Channel`](crate::Channel):
//! a computation hosted by a task and suspended on `channel.next().await` is
//! resumed synchronously inside the `emit` call that wakes it.

mod current;
#[allow(clippy::module_inception)]
mod task;

pub(crate) use current::current;
pub(crate) use task::TaskCore;
pub use task::{Progress, Task};
