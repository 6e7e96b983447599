//! Transport seam: how this layer talks to the daemon.
//!
//! Everything below the subscription layer — URL construction, handshake,
//! authentication, framing, encryption — lives behind the [`Transport`] and
//! [`EventStream`] traits. The client library implements them over its real
//! connection; tests implement them in memory.
//!
//! ## Contents
//! - [`Scope`] — the subscription filter key (one project, or all).
//! - [`ConnectionInfo`] — the client's configured defaults.
//! - [`Transport`] — opens one event stream per scope.
//! - [`EventStream`] — one open duplex stream; frames in, idempotent close.

mod stream;

#[cfg(test)]
pub(crate) mod mock;

pub use stream::{ConnectionInfo, EventStream, Scope, Transport};
