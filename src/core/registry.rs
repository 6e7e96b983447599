//! # Registry: scope → listeners mapping and connection lifecycle.
//!
//! One registry per client session (no ambient global state). It maps each
//! subscription scope to the listeners sharing that scope's stream and owns
//! the connection lifecycle:
//!
//! - `acquire` attaches a listener to an existing connection, or opens a new
//!   stream and spawns its reader loop and idle reaper;
//! - `release` detaches a listener and wakes only that scope's reaper;
//! - `fail_scope` (reader-on-error) and `close_scope_if_idle` (reaper) tear a
//!   connection down — exactly once, guarded by entry removal under the
//!   registry lock.
//!
//! ## Rules
//! - Invariant: an entry exists for a scope iff a stream for it is open.
//! - The registry lock is held only to snapshot or mutate the mapping and
//!   collection membership (and across the transport open inside `acquire`);
//!   listener locks may be taken while holding it, never the reverse.
//! - Teardown never joins a task from within that same task: the reader joins
//!   the reaper on failure, the reaper joins the reader on idle close.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::core::config::MonitorConfig;
use crate::core::connection::StreamConnection;
use crate::core::listener::Listener;
use crate::core::{reader, reaper};
use crate::error::{StreamError, SubscribeError};
use crate::events::Event;
use crate::transport::{Scope, Transport};

/// One open scope: its connection handle and the listeners sharing it.
struct ScopeEntry {
    conn: Arc<StreamConnection>,
    listeners: Vec<Arc<Listener>>,
}

/// Scope-keyed listener registry, one per client session.
pub(crate) struct Registry {
    scopes: RwLock<HashMap<Scope, ScopeEntry>>,
    transport: Arc<dyn Transport>,
    cfg: MonitorConfig,
}

impl Registry {
    pub(crate) fn new(transport: Arc<dyn Transport>, cfg: MonitorConfig) -> Arc<Self> {
        Arc::new(Self {
            scopes: RwLock::new(HashMap::new()),
            transport,
            cfg,
        })
    }

    /// Attaches a new listener to the scope, opening the stream on first use.
    ///
    /// Holding the write lock across the transport open keeps a concurrent
    /// `acquire` for the same scope from opening a second stream.
    pub(crate) async fn acquire(
        self: Arc<Self>,
        scope: Scope,
    ) -> Result<Arc<Listener>, SubscribeError> {
        let mut scopes = self.scopes.write().await;

        if let Some(entry) = scopes.get_mut(&scope) {
            let listener = Listener::new(scope, Arc::downgrade(&self));
            entry.listeners.push(listener.clone());
            return Ok(listener);
        }

        let stream = self.transport.open_stream(&scope).await?;
        let conn = StreamConnection::new(scope.clone());
        let listener = Listener::new(scope.clone(), Arc::downgrade(&self));

        let reader = tokio::spawn(reader::run(self.clone(), conn.clone(), stream));
        let reaper = tokio::spawn(reaper::run(self.clone(), conn.clone(), self.cfg.reap_tick()));
        conn.set_tasks(reader, reaper);

        scopes.insert(
            scope,
            ScopeEntry {
                conn,
                listeners: vec![listener.clone()],
            },
        );
        Ok(listener)
    }

    /// Detaches the listener from its scope and cancels it (graceful, no
    /// terminal error). The connection is left to the scope's reaper.
    pub(crate) async fn release(&self, listener: &Listener) {
        {
            let mut scopes = self.scopes.write().await;
            if let Some(entry) = scopes.get_mut(listener.scope()) {
                entry.listeners.retain(|l| l.id() != listener.id());
                entry.conn.wake_reaper();
            }
        }
        listener.cancel(None);
    }

    /// Fans one decoded event out to every listener of the scope.
    ///
    /// The listener list is snapshotted under the read lock and the lock is
    /// released before any listener lock is taken.
    pub(crate) async fn dispatch(&self, scope: &Scope, event: Event) {
        let listeners = {
            let scopes = self.scopes.read().await;
            match scopes.get(scope) {
                Some(entry) => entry.listeners.clone(),
                None => return,
            }
        };

        let event = Arc::new(event);
        for listener in &listeners {
            listener.dispatch(&event);
        }
    }

    /// Tears the scope down after a stream failure: every listener is
    /// cancelled with the error exactly once, the entry is removed, and the
    /// scope's reaper is stopped and joined. Called by the reader loop.
    pub(crate) async fn fail_scope(&self, scope: &Scope, err: StreamError) {
        let entry = {
            let mut scopes = self.scopes.write().await;
            scopes.remove(scope)
        };
        // Losing the removal race means the scope was already torn down.
        let Some(entry) = entry else { return };

        for listener in &entry.listeners {
            listener.cancel(Some(err.clone()));
        }
        entry.conn.close();
        entry.conn.join_reaper().await;
    }

    /// Closes the scope's connection iff its listener list has emptied,
    /// joining the reader loop. Called by the scope's reaper; returns whether
    /// the scope was reaped.
    ///
    /// The emptiness check runs under the write lock, so a subscriber
    /// attaching between the wake signal and this check keeps the connection.
    pub(crate) async fn close_scope_if_idle(&self, scope: &Scope) -> bool {
        let entry = {
            let mut scopes = self.scopes.write().await;
            match scopes.get(scope) {
                Some(entry) if entry.listeners.is_empty() => scopes.remove(scope),
                _ => None,
            }
        };
        let Some(entry) = entry else { return false };

        entry.conn.close();
        entry.conn.join_reader().await;
        true
    }

    #[cfg(test)]
    pub(crate) async fn has_scope(&self, scope: &Scope) -> bool {
        self.scopes.read().await.contains_key(scope)
    }

    #[cfg(test)]
    pub(crate) async fn listener_count(&self, scope: &Scope) -> usize {
        self.scopes
            .read()
            .await
            .get(scope)
            .map(|entry| entry.listeners.len())
            .unwrap_or(0)
    }
}
