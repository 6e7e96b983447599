//! # Per-scope stream connection handle.
//!
//! [`StreamConnection`] is the registry's handle to one open transport stream:
//! the scope it serves, the close token shared by its reader loop and idle
//! reaper, the reaper's wake signal, and the two task join handles so teardown
//! can await their termination deterministically.
//!
//! The stream object itself is *not* held here — the reader loop owns it
//! exclusively and closes it on exit. `close()` only fires the token; it is
//! idempotent and safe under concurrent invocation from the reader-on-error
//! path and the idle reaper.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::transport::Scope;

/// Handle to one open stream and its two background tasks.
pub(crate) struct StreamConnection {
    scope: Scope,
    token: CancellationToken,
    wake: Notify,
    reader: Mutex<Option<JoinHandle<()>>>,
    reaper: Mutex<Option<JoinHandle<()>>>,
}

impl StreamConnection {
    pub(crate) fn new(scope: Scope) -> Arc<Self> {
        Arc::new(Self {
            scope,
            token: CancellationToken::new(),
            wake: Notify::new(),
            reader: Mutex::new(None),
            reaper: Mutex::new(None),
        })
    }

    pub(crate) fn scope(&self) -> &Scope {
        &self.scope
    }

    pub(crate) fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Records the spawned reader and reaper handles. Called once by the
    /// registry right after spawning them.
    pub(crate) fn set_tasks(&self, reader: JoinHandle<()>, reaper: JoinHandle<()>) {
        *self.reader.lock() = Some(reader);
        *self.reaper.lock() = Some(reaper);
    }

    /// Fires the close token. Idempotent.
    ///
    /// The reader loop observes this, closes the underlying stream and exits;
    /// the reaper observes it and stops.
    pub(crate) fn close(&self) {
        self.token.cancel();
    }

    /// Wakes this scope's idle reaper (after a listener release).
    ///
    /// A permit is stored if the reaper is not currently parked, so the wake
    /// is never lost.
    pub(crate) fn wake_reaper(&self) {
        self.wake.notify_one();
    }

    /// Resolves on the next reaper wake signal.
    pub(crate) async fn reap_signalled(&self) {
        self.wake.notified().await;
    }

    /// Awaits reader-loop termination. Must not be called from the reader itself.
    pub(crate) async fn join_reader(&self) {
        let handle = self.reader.lock().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }

    /// Awaits reaper termination. Must not be called from the reaper itself.
    pub(crate) async fn join_reaper(&self) {
        let handle = self.reaper.lock().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}
