//! # LogWriter: simple emission logger
//!
//! A minimal handler that records every emission it receives through
//! `tracing::info!`. Use it for tests or demos.
//!
//! ## Example output (with `tracing_subscriber::fmt`)
//! ```text
//! INFO eventcast::dispatch::log: emission label="clicks" args=(3, 4)
//! INFO eventcast::dispatch::log: emission label="clicks" args=(10, 2)
//! ```

use std::borrow::Cow;
use std::fmt::Debug;

use crate::dispatch::Handler;

/// Emission logging handler.
#[derive(Clone, Debug)]
pub struct LogWriter {
    label: Cow<'static, str>,
}

impl LogWriter {
    /// Construct a new [`LogWriter`] labelled `"emission"`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a [`LogWriter`] with a custom label (usually the channel name).
    #[must_use]
    pub fn with_label(label: impl Into<Cow<'static, str>>) -> Self {
        Self {
            label: label.into(),
        }
    }

    /// Label attached to every record.
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl Default for LogWriter {
    fn default() -> Self {
        Self {
            label: Cow::Borrowed("emission"),
        }
    }
}

impl<A: Debug> Handler<A> for LogWriter {
    fn handle(&mut self, args: &A) {
        tracing::info!(label = %self.label, args = ?args, "emission");
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Dispatcher;

    #[test]
    fn test_log_writer_is_a_named_handler() {
        let mut d = Dispatcher::<(i32, &'static str)>::new();
        d.register_handler(LogWriter::with_label("clicks"));
        d.invoke(&(1, "left"));

        assert_eq!(d.names(), vec!["LogWriter"]);
        assert_eq!(LogWriter::new().label(), "emission");
    }
}
