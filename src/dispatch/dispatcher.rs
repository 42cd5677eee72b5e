//! # Ordered multicast dispatch.
//!
//! Provides [`Dispatcher`], an append-only, ordered list of [`Handler`]s
//! sharing one call signature.
//!
//! ## Rules
//! - **Registration order**: `invoke` calls handlers in the order they were registered.
//! - **Exactly once**: each handler runs once per `invoke`.
//! - **Append-only**: no deduplication and no removal; a handler lives as long as the dispatcher.
//! - **Empty is fine**: invoking an empty dispatcher is a no-op.
//!
//! ## Example
//! ```rust
//! use std::{cell::Cell, rc::Rc};
//! use eventcast::Dispatcher;
//!
//! let total = Rc::new(Cell::new(0));
//! let mut d = Dispatcher::<(i32,)>::new();
//!
//! let t = Rc::clone(&total);
//! d.register(move |&(x,): &(i32,)| t.set(t.get() + x));
//! d += |_: &(i32,)| {};
//!
//! d.invoke(&(42,));
//! assert_eq!(total.get(), 42);
//! assert_eq!(d.len(), 2);
//! ```

use std::fmt;
use std::ops::AddAssign;

use super::handler::Handler;

/// Ordered collection of handlers invoked together.
///
/// `R` is the handlers' return type. With the default `R = ()` the dispatcher
/// is side-effect only; otherwise [`invoke_last`](Self::invoke_last) returns
/// the value produced by the last handler.
pub struct Dispatcher<A, R = ()> {
    handlers: Vec<Box<dyn Handler<A, R>>>,
}

impl<A, R> Dispatcher<A, R> {
    /// Creates an empty dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Appends a closure to the handler sequence.
    pub fn register<F>(&mut self, f: F)
    where
        F: FnMut(&A) -> R + 'static,
    {
        self.handlers.push(Box::new(f));
    }

    /// Appends a named [`Handler`] implementation to the handler sequence.
    pub fn register_handler<H>(&mut self, handler: H)
    where
        H: Handler<A, R> + 'static,
    {
        self.handlers.push(Box::new(handler));
    }

    /// Calls every handler with `args`, in registration order.
    ///
    /// Return values are discarded.
    pub fn invoke(&mut self, args: &A) {
        for handler in &mut self.handlers {
            handler.handle(args);
        }
    }

    /// Calls every handler with `args` and returns the last handler's result.
    ///
    /// Returns `None` when no handler is registered.
    pub fn invoke_last(&mut self, args: &A) -> Option<R> {
        let mut last = None;
        for handler in &mut self.handlers {
            last = Some(handler.handle(args));
        }
        last
    }

    /// Number of registered handlers.
    #[inline]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns `true` when no handler is registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Handler names in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    /// Appends an already boxed handler.
    pub(crate) fn push(&mut self, handler: Box<dyn Handler<A, R>>) {
        self.handlers.push(handler);
    }

    /// Moves every handler of `other` to the end of this dispatcher.
    pub(crate) fn append(&mut self, other: &mut Vec<Box<dyn Handler<A, R>>>) {
        self.handlers.append(other);
    }
}

impl<A, R> Default for Dispatcher<A, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, R> fmt::Debug for Dispatcher<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("handlers", &self.names())
            .finish()
    }
}

impl<A, R, F> AddAssign<F> for Dispatcher<A, R>
where
    F: FnMut(&A) -> R + 'static,
{
    fn add_assign(&mut self, f: F) {
        self.register(f);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_empty_invoke_is_noop() {
        let mut d = Dispatcher::<(i32,)>::new();
        d.invoke(&(1,));
        assert!(d.is_empty());
        assert_eq!(d.invoke_last(&(1,)), None::<()>);
    }

    #[test]
    fn test_invoke_last_returns_last_result() {
        let mut d = Dispatcher::<(i32, i32), i32>::new();
        d.register(|&(a, b): &(i32, i32)| a + b);
        d.register(|&(a, b): &(i32, i32)| a * b);

        assert_eq!(d.invoke_last(&(3, 4)), Some(12));
    }

    #[test]
    fn test_handlers_see_different_types() {
        let seen = Rc::new(RefCell::new(String::new()));
        let mut d = Dispatcher::<(String,)>::new();

        let s = Rc::clone(&seen);
        d.register(move |(text,): &(String,)| s.borrow_mut().push_str(text));
        d.invoke(&("Hello, World!".to_string(),));

        assert_eq!(seen.borrow().as_str(), "Hello, World!");
    }

    #[test]
    fn test_repeated_invocations_call_each_handler_once_per_call() {
        let calls = Rc::new(RefCell::new(0u32));
        let mut d = Dispatcher::<()>::new();
        for _ in 0..3 {
            let c = Rc::clone(&calls);
            d += move |_: &()| *c.borrow_mut() += 1;
        }

        d.invoke(&());
        assert_eq!(*calls.borrow(), 3);
        d.invoke(&());
        assert_eq!(*calls.borrow(), 6);
    }

    #[test]
    fn test_named_handler() {
        struct Audit;
        impl Handler<(u8,)> for Audit {
            fn handle(&mut self, _args: &(u8,)) {}
            fn name(&self) -> &'static str {
                "audit"
            }
        }

        let mut d = Dispatcher::<(u8,)>::new();
        d.register_handler(Audit);
        assert_eq!(d.names(), vec!["audit"]);
        assert!(format!("{d:?}").contains("audit"));
    }

    proptest! {
        #[test]
        fn prop_every_handler_runs_once_in_order(n in 0usize..32, value in any::<i64>()) {
            let log = Rc::new(RefCell::new(Vec::new()));
            let mut d = Dispatcher::<(i64,)>::new();
            for idx in 0..n {
                let log = Rc::clone(&log);
                d.register(move |&(v,): &(i64,)| log.borrow_mut().push((idx, v)));
            }

            d.invoke(&(value,));

            let expected: Vec<_> = (0..n).map(|idx| (idx, value)).collect();
            prop_assert_eq!(&*log.borrow(), &expected);
        }
    }
}
