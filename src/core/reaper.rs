//! # Idle reaper: closes a scope's connection once its listeners are gone.
//!
//! One reaper per open stream connection. It wakes on the scope's release
//! signal (stored-permit semantics, so a wake is never lost), on a periodic
//! tick when configured, or on the connection's close token; on each wake it
//! re-checks **its own scope only** and closes the connection when the
//! listener list has emptied. Emptying one scope can never tear down another
//! scope's connection.
//!
//! Releases never close the connection synchronously — handing cleanup to the
//! reaper avoids a race between a release and an in-flight dispatch.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::core::connection::StreamConnection;
use crate::core::registry::Registry;

/// Runs until the scope is reaped or the connection is closed by its reader.
pub(crate) async fn run(
    registry: Arc<Registry>,
    conn: Arc<StreamConnection>,
    tick: Option<Duration>,
) {
    loop {
        tokio::select! {
            _ = conn.token().cancelled() => return,
            _ = conn.reap_signalled() => {}
            _ = tick_or_pending(tick) => {}
        }

        if registry.close_scope_if_idle(conn.scope()).await {
            debug!(scope = %conn.scope(), "reaped idle connection");
            return;
        }
    }
}

async fn tick_or_pending(tick: Option<Duration>) {
    match tick {
        Some(interval) => tokio::time::sleep(interval).await,
        None => std::future::pending::<()>().await,
    }
}
