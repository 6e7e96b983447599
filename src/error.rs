//! Error types used by the eventmux subscription layer.
//!
//! This module defines two main error enums:
//!
//! - [`SubscribeError`] — synchronous failures returned to the caller from
//!   `subscribe` / `add_handler`, before or independent of any open stream.
//! - [`StreamError`] — terminal failures of an open event stream, delivered to
//!   every listener of the affected scope through [`Listener::wait`].
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.
//!
//! [`Listener::wait`]: crate::Listener::wait

use thiserror::Error;

/// # Synchronous subscription errors.
///
/// These are returned directly from [`Monitor::subscribe`](crate::Monitor::subscribe)
/// or [`Listener::add_handler`](crate::Listener::add_handler); no stream teardown
/// is involved and no listener observes them through `wait()`.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SubscribeError {
    /// The client's connection info reports no default project, so a
    /// single-project subscription has no scope to attach to.
    ///
    /// Subscribe to all projects instead, or fix the client configuration.
    #[error("connection info has no default project")]
    EmptyProject,

    /// Opening the event stream failed (URL construction, handshake, transport).
    ///
    /// No listener is created when this is returned.
    #[error("failed to open event stream: {message}")]
    ConnectionSetup {
        /// The underlying transport error message.
        message: String,
    },

    /// The listener was already cancelled when the operation was attempted.
    #[error("listener is cancelled")]
    ListenerCancelled,
}

impl SubscribeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use eventmux::SubscribeError;
    ///
    /// let err = SubscribeError::EmptyProject;
    /// assert_eq!(err.as_label(), "subscribe_empty_project");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SubscribeError::EmptyProject => "subscribe_empty_project",
            SubscribeError::ConnectionSetup { .. } => "subscribe_connection_setup",
            SubscribeError::ListenerCancelled => "subscribe_listener_cancelled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            SubscribeError::EmptyProject => "empty default project".to_string(),
            SubscribeError::ConnectionSetup { message } => format!("connection setup: {message}"),
            SubscribeError::ListenerCancelled => "listener cancelled".to_string(),
        }
    }
}

/// # Terminal failures of an open event stream.
///
/// When the reader observes one of these, every listener of the affected scope
/// is cancelled exactly once with the error stored as its terminal error, the
/// stream is closed and the scope is removed from the registry. The layer does
/// not retry; recovery is a fresh `subscribe` by the caller.
///
/// `Clone` so that any number of `wait()` callers can observe the same stored
/// error by value.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// A read on the open stream failed at the network level.
    #[error("network failure on event stream: {message}")]
    Network {
        /// The underlying transport error message.
        message: String,
    },

    /// The remote end closed the stream.
    #[error("event stream closed by remote")]
    Closed,
}

impl StreamError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use eventmux::StreamError;
    ///
    /// let err = StreamError::Closed;
    /// assert_eq!(err.as_label(), "stream_closed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            StreamError::Network { .. } => "stream_network",
            StreamError::Closed => "stream_closed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            StreamError::Network { message } => format!("network: {message}"),
            StreamError::Closed => "closed by remote".to_string(),
        }
    }
}
