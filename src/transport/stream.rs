//! # Transport traits and the subscription scope key.
//!
//! [`Transport`] is the extension point the surrounding client library plugs
//! into: it knows how to open the daemon's event endpoint for a given
//! [`Scope`] and what the client's configured defaults are. [`EventStream`]
//! is one open stream: a blocking frame reader plus an idempotent close.
//!
//! ## Contract
//! - `open_stream` performs the full URL/handshake dance and fails with
//!   [`SubscribeError::ConnectionSetup`]; it must not return a half-open
//!   stream.
//! - `read_frame` blocks until the next complete frame or a terminal
//!   [`StreamError`]. After an error the stream is dead; the layer never
//!   retries a read.
//! - `close` is safe to call more than once and after a read error.

use async_trait::async_trait;

use crate::error::{StreamError, SubscribeError};

/// Subscription filter key: one project, or every project on the daemon.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Events from all projects.
    AllProjects,
    /// Events from a single named project.
    Project(String),
}

impl Scope {
    /// Returns the project name, or `None` for the all-projects scope.
    pub fn project(&self) -> Option<&str> {
        match self {
            Scope::AllProjects => None,
            Scope::Project(name) => Some(name),
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::AllProjects => f.write_str("all-projects"),
            Scope::Project(name) => write!(f, "project:{name}"),
        }
    }
}

/// Connection defaults configured on the client.
#[derive(Clone, Debug, Default)]
pub struct ConnectionInfo {
    /// Default project for single-project subscriptions.
    ///
    /// An empty value means the client has no project configured; subscribing
    /// to the default scope must then fail before any stream is opened.
    pub project: String,

    /// Daemon address, for diagnostics only.
    pub addr: String,
}

/// Connection factory implemented by the surrounding client library.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Returns the client's configured connection defaults.
    fn connection_info(&self) -> ConnectionInfo;

    /// Opens the daemon's event endpoint for the given scope.
    ///
    /// Called at most once per scope while that scope has listeners; the
    /// subscription layer shares the returned stream across them.
    async fn open_stream(&self, scope: &Scope) -> Result<Box<dyn EventStream>, SubscribeError>;
}

/// One open duplex event stream.
///
/// Owned exclusively by the reader loop once handed over; nothing else reads
/// from it.
#[async_trait]
pub trait EventStream: Send {
    /// Reads the next complete frame.
    ///
    /// Blocks until a frame arrives or the stream fails terminally.
    async fn read_frame(&mut self) -> Result<Vec<u8>, StreamError>;

    /// Closes the stream. Idempotent.
    async fn close(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_project_accessor() {
        assert_eq!(Scope::AllProjects.project(), None);
        assert_eq!(Scope::Project("p1".into()).project(), Some("p1"));
    }

    #[test]
    fn scope_display() {
        assert_eq!(Scope::AllProjects.to_string(), "all-projects");
        assert_eq!(Scope::Project("default".into()).to_string(), "project:default");
    }

    #[test]
    fn scopes_key_a_map() {
        use std::collections::HashMap;

        let mut m = HashMap::new();
        m.insert(Scope::Project("a".into()), 1);
        m.insert(Scope::AllProjects, 2);

        assert_eq!(m[&Scope::Project("a".into())], 1);
        assert_eq!(m[&Scope::AllProjects], 2);
        assert!(!m.contains_key(&Scope::Project("b".into())));
    }
}
