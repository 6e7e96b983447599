//! # Monitor: the caller-facing subscription API.
//!
//! One [`Monitor`] per client session owns the scope registry and the
//! transport handle. [`Monitor::subscribe`] validates the scope before any
//! stream is opened, then attaches a [`Listener`] to the scope's shared
//! connection (opening it on first use).
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use eventmux::{Event, HandlerFn, Monitor, MonitorConfig, Transport};
//!
//! async fn watch(transport: Arc<dyn Transport>) -> Result<(), Box<dyn std::error::Error>> {
//!     let monitor = Monitor::new(transport, MonitorConfig::default());
//!
//!     let listener = monitor.subscribe(false).await?;
//!     listener.add_handler(
//!         Some(&["instance-started"]),
//!         HandlerFn::arc("boot-log", |ev: Event| async move {
//!             println!("started: {}", ev.metadata);
//!         }),
//!     )?;
//!
//!     // Resolves on disconnect or stream failure; the layer never reconnects
//!     // on its own - issue a fresh subscribe to recover.
//!     if let Some(err) = listener.wait().await {
//!         eprintln!("stream lost: {err}");
//!     }
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use crate::core::config::MonitorConfig;
use crate::core::listener::Listener;
use crate::core::registry::Registry;
use crate::error::SubscribeError;
use crate::transport::{Scope, Transport};

/// Entry point of the event-distribution layer for one client session.
///
/// Dropping the monitor does not close open streams; listeners keep their
/// connections alive until they disconnect, fail, or are reaped.
pub struct Monitor {
    transport: Arc<dyn Transport>,
    registry: Arc<Registry>,
}

impl Monitor {
    /// Creates the monitor over the given transport.
    pub fn new(transport: Arc<dyn Transport>, cfg: MonitorConfig) -> Self {
        let registry = Registry::new(transport.clone(), cfg);
        Self {
            transport,
            registry,
        }
    }

    /// Subscribes to the daemon's event stream.
    ///
    /// With `all_projects` the subscription spans every project; otherwise it
    /// is scoped to the client's configured default project and fails with
    /// [`SubscribeError::EmptyProject`] — before any stream is opened — when
    /// none is configured.
    ///
    /// Subscriptions to the same scope share one stream connection; the first
    /// one opens it.
    pub async fn subscribe(&self, all_projects: bool) -> Result<Arc<Listener>, SubscribeError> {
        let scope = if all_projects {
            Scope::AllProjects
        } else {
            let info = self.transport.connection_info();
            if info.project.is_empty() {
                return Err(SubscribeError::EmptyProject);
            }
            Scope::Project(info.project)
        };

        self.registry.clone().acquire(scope).await
    }

    #[cfg(test)]
    pub(crate) fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }
}
