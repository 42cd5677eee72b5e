//! # Handler trait.
//!
//! Provides [`Handler`], the callable stored by a [`Dispatcher`](crate::Dispatcher).
//!
//! Any `FnMut(&A) -> R + 'static` closure is a handler through the blanket
//! impl, so most callers never name the trait. Implement it by hand when the
//! handler carries state worth naming in logs:
//!
//! ```rust
//! use eventcast::{Dispatcher, Handler};
//!
//! #[derive(Default)]
//! struct Counter { hits: u32 }
//!
//! impl Handler<(i32,)> for Counter {
//!     fn handle(&mut self, _args: &(i32,)) { self.hits += 1; }
//!     fn name(&self) -> &'static str { "counter" }
//! }
//!
//! let mut d = Dispatcher::<(i32,)>::new();
//! d.register_handler(Counter::default());
//! assert_eq!(d.names(), vec!["counter"]);
//! ```

/// Callable invoked with a borrowed argument tuple.
///
/// ### Rules
/// - Called synchronously, in registration order, once per invocation.
/// - Panics are not caught; they unwind through the caller of `invoke`/`emit`.
pub trait Handler<A, R = ()> {
    /// Handles one invocation.
    fn handle(&mut self, args: &A) -> R;

    /// Returns the handler name used in log records.
    ///
    /// The default uses `type_name::<Self>()`, which is verbose for closures.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl<A, R, F> Handler<A, R> for F
where
    F: FnMut(&A) -> R,
{
    fn handle(&mut self, args: &A) -> R {
        self(args)
    }
}
