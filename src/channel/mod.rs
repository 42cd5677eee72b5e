//! Broadcast channel: callbacks plus awaitable one-shot waiters.
//!
//! ## Contents
//! - [`Channel`] cloneable handle: `subscribe`, `emit`, `next`
//! - [`Recv`] future returned by `next` (the suspension point)
//! - [`Emission`] per-emission summary returned by `try_emit`
//!
//! ## Quick reference
//! - **Producers**: anything holding a `Channel` handle calls `emit`.
//! - **Callbacks**: registered with `subscribe`, run on every emission.
//! - **Waiters**: computations awaiting `next()`, resumed once by the next emission.

#[allow(clippy::module_inception)]
mod channel;
mod waiter;

pub use channel::{Channel, Emission};
pub use waiter::Recv;
