//! # Channel and task configuration.
//!
//! Provides [`ChannelConfig`] and [`TaskConfig`], the only knobs of the crate.
//!
//! Config is used in two ways:
//! 1. **Channel creation**: `Channel::with_config(config)`
//! 2. **Task creation**: `Task::with_config(name, config, future)`
//!
//! ## Sentinel values
//! - `waiter_capacity = 0` → clamped to 1 by [`ChannelConfig::waiter_capacity_clamped`]

use std::borrow::Cow;

/// Configuration for a [`Channel`](crate::Channel).
///
/// ## Field semantics
/// - `name`: label used in log records and errors (`"channel"` by default)
/// - `waiter_capacity`: initial capacity of the pending-waiter set (min 1)
///
/// ## Notes
/// All fields are public. The waiter set grows on demand; the capacity only
/// avoids early reallocations for channels with many concurrent waiters.
#[derive(Clone, Debug)]
pub struct ChannelConfig {
    /// Label used in log records and errors.
    pub name: Cow<'static, str>,

    /// Initial capacity of the pending-waiter set.
    pub waiter_capacity: usize,
}

impl ChannelConfig {
    /// Creates a default configuration with the given name.
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns the waiter capacity clamped to a minimum of 1.
    #[inline]
    pub fn waiter_capacity_clamped(&self) -> usize {
        self.waiter_capacity.max(1)
    }
}

impl Default for ChannelConfig {
    /// Default configuration:
    ///
    /// - `name = "channel"`
    /// - `waiter_capacity = 4`
    fn default() -> Self {
        Self {
            name: Cow::Borrowed("channel"),
            waiter_capacity: 4,
        }
    }
}

/// What happens when a computation hosted by a [`Task`](crate::Task) panics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FaultPolicy {
    /// Log the panic and abort the process (default).
    ///
    /// A broadcast cannot unwind a suspended computation's stack on behalf of
    /// unrelated subscribers, so containment belongs to the computation body.
    #[default]
    Abort,
    /// Mark the task finished, drop its frame and keep the error for
    /// [`Task::take_fault`](crate::Task::take_fault).
    Capture,
}

/// Configuration for a [`Task`](crate::Task).
#[derive(Clone, Copy, Debug, Default)]
pub struct TaskConfig {
    /// Reaction to a panic inside the computation.
    pub fault: FaultPolicy,
}

impl TaskConfig {
    /// Shorthand for a configuration that captures faults instead of aborting.
    pub fn capture_faults() -> Self {
        Self {
            fault: FaultPolicy::Capture,
        }
    }
}
