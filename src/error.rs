//! Error types used by channels and tasks.
//!
//! This module defines two error enums:
//!
//! - [`ChannelError`]: rejections reported by [`Channel::try_emit`](crate::Channel::try_emit).
//! - [`TaskError`]: failures observed while driving a [`Task`](crate::Task).
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging.
//! Neither ever travels back through [`Channel::emit`](crate::Channel::emit):
//! emission is fire-and-forget from the producer's point of view.

use std::borrow::Cow;

use thiserror::Error;

/// # Errors reported by a channel.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// An emission was requested from inside one of the same channel's callbacks.
    ///
    /// The nested emission is rejected as a whole: no callback runs, the
    /// most-recent slot is untouched and no waiter is resumed.
    #[error("channel {channel:?} emitted from inside its own callback")]
    Reentrant {
        /// Name of the channel (see [`ChannelConfig::name`](crate::ChannelConfig::name)).
        channel: Cow<'static, str>,
    },
}

impl ChannelError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use eventcast::ChannelError;
    ///
    /// let err = ChannelError::Reentrant { channel: "clicks".into() };
    /// assert_eq!(err.as_label(), "channel_reentrant");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ChannelError::Reentrant { .. } => "channel_reentrant",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ChannelError::Reentrant { channel } => {
                format!("re-entrant emit rejected; channel={channel}")
            }
        }
    }
}

/// # Errors produced while driving a task.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// The task was advanced from inside its own body.
    #[error("task {task:?} advanced while already running")]
    Reentrant {
        /// Name of the task.
        task: Cow<'static, str>,
    },

    /// The computation panicked and the task was configured with
    /// [`FaultPolicy::Capture`](crate::FaultPolicy::Capture).
    #[error("task {task:?} panicked: {message}")]
    Panicked {
        /// Name of the task.
        task: Cow<'static, str>,
        /// Panic payload rendered as text.
        message: String,
    },
}

impl TaskError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use eventcast::TaskError;
    ///
    /// let err = TaskError::Panicked { task: "worker".into(), message: "boom".into() };
    /// assert_eq!(err.as_label(), "task_panicked");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Reentrant { .. } => "task_reentrant",
            TaskError::Panicked { .. } => "task_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Reentrant { task } => format!("re-entrant advance; task={task}"),
            TaskError::Panicked { task, message } => format!("panic: {message}; task={task}"),
        }
    }

    /// Name of the task the error belongs to.
    pub fn task(&self) -> &str {
        match self {
            TaskError::Reentrant { task } | TaskError::Panicked { task, .. } => task,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_stable() {
        let reentrant = TaskError::Reentrant { task: "t".into() };
        let panicked = TaskError::Panicked {
            task: "t".into(),
            message: "boom".into(),
        };
        assert_eq!(reentrant.as_label(), "task_reentrant");
        assert_eq!(panicked.as_label(), "task_panicked");
        assert_eq!(
            ChannelError::Reentrant { channel: "c".into() }.as_label(),
            "channel_reentrant"
        );
    }

    #[test]
    fn test_display_carries_context() {
        let err = TaskError::Panicked {
            task: "worker".into(),
            message: "index out of bounds".into(),
        };
        assert_eq!(err.to_string(), "task \"worker\" panicked: index out of bounds");
        assert_eq!(err.as_message(), "panic: index out of bounds; task=worker");
        assert_eq!(err.task(), "worker");
    }
}
