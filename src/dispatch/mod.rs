//! # Multicast dispatch.
//!
//! The leaf of the crate: an ordered list of callbacks invoked together.
//! [`Channel`](crate::Channel) owns one [`Dispatcher`] and forwards
//! `subscribe` to it.
//!
//! ## Contents
//! - [`Handler`] callable stored by the dispatcher (blanket impl for closures)
//! - [`Dispatcher`] append-only, registration-ordered handler list
//! - `LogWriter` tracing-backed handler (feature `logging`)
//!
//! ```text
//! register(h1) register(h2) register(h3)
//!        │            │            │
//!        ▼            ▼            ▼
//!     [ h1 ]  ──►  [ h2 ]  ──►  [ h3 ]      invoke(&args): h1, h2, h3
//! ```

mod dispatcher;
mod handler;
#[cfg(feature = "logging")]
mod log;

pub use dispatcher::Dispatcher;
pub use handler::Handler;
#[cfg(feature = "logging")]
pub use log::LogWriter;
