//! # eventcast
//!
//! **eventcast** is a single-threaded broadcast primitive that serves two
//! kinds of consumers from one producer:
//!
//! - **callbacks** registered ahead of time and invoked on every emission, and
//! - **waiters**: suspended computations that resume exactly once, with the
//!   emitted values, the next time the channel fires.
//!
//! ## Architecture
//! ```text
//!     subscribe(f1)   subscribe(f2)          Task ── .await ch.next()
//!          │               │                  │
//!          ▼               ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Channel<A>                                                       │
//! │  - Dispatcher<A>      (ordered callbacks)                         │
//! │  - last: Option<A>    (most recent emission)                      │
//! │  - waiters            (one-shot, attach order)                    │
//! └──────┬────────────────────────────────────────────────────────────┘
//!        │ emit(args)
//!        ├─► 1. f1(&args), f2(&args)
//!        ├─► 2. last = args
//!        ├─► 3. snapshot + clear waiters (drop stale ones)
//!        └─► 4. resume each waiter with args
//!                 ├─ hosted by a Task  → polled inline, inside emit
//!                 └─ other executor    → Waker::wake, value kept in its slot
//! ```
//!
//! ## Features
//! | Area              | Description                                          | Key types                        |
//! |-------------------|------------------------------------------------------|----------------------------------|
//! | **Dispatch**      | Ordered, append-only multicast callbacks.            | [`Dispatcher`], [`Handler`]      |
//! | **Channel**       | Callbacks + awaitable one-shot waiters.              | [`Channel`], [`Recv`], [`Emission`] |
//! | **Tasks**         | Lazily started, explicitly advanced computations.    | [`Task`], [`Progress`]           |
//! | **Errors**        | Typed errors for re-entrancy and captured panics.    | [`ChannelError`], [`TaskError`]  |
//! | **Configuration** | Channel naming/capacity, task fault policy.          | [`ChannelConfig`], [`TaskConfig`] |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in `LogWriter` handler _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::{cell::RefCell, rc::Rc};
//! use eventcast::{Channel, Progress, Task};
//!
//! let clicks = Channel::<(i32, i32)>::new();
//! let log = Rc::new(RefCell::new(Vec::new()));
//!
//! // Long-lived callback.
//! let l = Rc::clone(&log);
//! clicks.subscribe(move |&(x, y)| l.borrow_mut().push(format!("click at {x},{y}")));
//!
//! // One-shot computation waiting for two clicks.
//! let task = Task::new("double-click", {
//!     let clicks = clicks.clone();
//!     let log = Rc::clone(&log);
//!     async move {
//!         let first = clicks.next().await;
//!         let second = clicks.next().await;
//!         log.borrow_mut().push(format!("pair {first:?} {second:?}"));
//!     }
//! });
//! assert_eq!(task.advance(), Progress::Suspended);
//!
//! clicks.emit((1, 2));
//! clicks.emit((3, 4));
//!
//! assert!(task.is_done());
//! assert_eq!(log.borrow().last().map(String::as_str), Some("pair (1, 2) (3, 4)"));
//! ```

mod channel;
mod config;
mod dispatch;
mod error;
mod task;

// ---- Public re-exports ----

pub use channel::{Channel, Emission, Recv};
pub use config::{ChannelConfig, FaultPolicy, TaskConfig};
pub use dispatch::{Dispatcher, Handler};
pub use error::{ChannelError, TaskError};
pub use task::{Progress, Task};

// Optional: expose a simple built-in logging handler (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use dispatch::LogWriter;
