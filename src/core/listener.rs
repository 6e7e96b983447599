//! # Listener: one subscriber session on a scope's shared stream.
//!
//! A [`Listener`] is what a `subscribe` call returns: a cancellation token, a
//! set-once terminal error slot, and an ordered collection of handler targets
//! guarded by its own lock. Many listeners share one stream; each has an
//! independent lifecycle.
//!
//! ## Rules
//! - Target mutations and dispatch take only the listener's own lock, never
//!   the registry lock (registry → listener is the one allowed lock order).
//! - Once cancelled, a listener accepts no handler registrations and receives
//!   no further dispatch, even if still physically present in a collection
//!   during teardown.
//! - The terminal error is set at most once; later failures do not overwrite it.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::core::registry::Registry;
use crate::error::{StreamError, SubscribeError};
use crate::events::Event;
use crate::handlers::{HandlerRef, Target, TargetId};
use crate::transport::Scope;

/// Global sequence for listener identities.
static LISTENER_SEQ: AtomicU64 = AtomicU64::new(0);

/// One subscriber session attached to a scope's shared event stream.
///
/// Created by [`Monitor::subscribe`](crate::Monitor::subscribe); destroyed by
/// [`Listener::disconnect`], by a stream failure (cascading cancellation), or
/// together with its scope when the idle reaper sweeps it.
#[derive(Debug)]
pub struct Listener {
    id: u64,
    scope: Scope,
    token: CancellationToken,
    terminal: Mutex<Option<StreamError>>,
    targets: Mutex<Vec<Target>>,
    registry: Weak<Registry>,
}

impl Listener {
    pub(crate) fn new(scope: Scope, registry: Weak<Registry>) -> Arc<Self> {
        Arc::new(Self {
            id: LISTENER_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            scope,
            token: CancellationToken::new(),
            terminal: Mutex::new(None),
            targets: Mutex::new(Vec::new()),
            registry,
        })
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    /// The scope this listener is attached to.
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// True until the listener is cancelled (disconnected or stream failure).
    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Registers a handler, returning its target identity.
    ///
    /// `kinds` is the set of accepted event types; `None` accepts every type.
    /// Fails with [`SubscribeError::ListenerCancelled`] once the listener is
    /// cancelled.
    pub fn add_handler(
        &self,
        kinds: Option<&[&str]>,
        handler: HandlerRef,
    ) -> Result<TargetId, SubscribeError> {
        if self.token.is_cancelled() {
            return Err(SubscribeError::ListenerCancelled);
        }

        let filter: Option<HashSet<String>> =
            kinds.map(|ks| ks.iter().map(|k| k.to_string()).collect());
        let target = Target::spawn(filter, handler);
        let id = target.id();

        let mut targets = self.targets.lock();
        // Re-check under the lock: a concurrent cancel must not gain a target.
        if self.token.is_cancelled() {
            return Err(SubscribeError::ListenerCancelled);
        }
        targets.push(target);
        Ok(id)
    }

    /// Removes a previously registered handler.
    ///
    /// Returns `false` when the target is unknown (already removed, or swept
    /// by cancellation). The target's worker drains events it already accepted
    /// and then exits.
    pub fn remove_handler(&self, id: TargetId) -> bool {
        let mut targets = self.targets.lock();
        match targets.iter().position(|t| t.id() == id) {
            Some(idx) => {
                targets.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Blocks until the listener is cancelled, then returns its terminal error.
    ///
    /// `None` means a graceful close (explicit disconnect or idle reap); a
    /// stream failure yields the same stored error to every caller. There is
    /// no built-in timeout; impose one with `tokio::time::timeout` if needed.
    pub async fn wait(&self) -> Option<StreamError> {
        self.token.cancelled().await;
        self.terminal.lock().clone()
    }

    /// Detaches this listener from its scope's shared stream.
    ///
    /// The connection stays open for other listeners; when this was the last
    /// one, the scope's idle reaper closes it. Idempotent.
    pub async fn disconnect(&self) {
        match self.registry.upgrade() {
            Some(registry) => registry.release(self).await,
            // Registry already gone; just mark this session dead.
            None => self.cancel(None),
        }
    }

    /// Cancels the listener, storing `err` as the terminal error if one was
    /// not already set. Clears the target list; each worker drains its queue
    /// and exits (in-flight deliveries are not aborted).
    pub(crate) fn cancel(&self, err: Option<StreamError>) {
        if let Some(err) = err {
            let mut slot = self.terminal.lock();
            if slot.is_none() {
                *slot = Some(err);
            }
        }
        self.token.cancel();
        self.targets.lock().clear();
    }

    /// Fans one event out to every target whose filter accepts it.
    ///
    /// No-op on a cancelled listener.
    pub(crate) fn dispatch(&self, event: &Arc<Event>) {
        if self.token.is_cancelled() {
            return;
        }
        let targets = self.targets.lock();
        for target in targets.iter() {
            if target.accepts(&event.kind) {
                target.deliver(event);
            }
        }
    }
}
