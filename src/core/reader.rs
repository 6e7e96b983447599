//! # Reader loop: one per open stream connection.
//!
//! Reads frames until the connection's close token fires or the transport
//! fails. Each frame is decoded into an [`Event`](crate::Event) and fanned out
//! to the scope's listeners; malformed frames and events with an empty type
//! tag are dropped without disturbing the loop or any listener.
//!
//! On a read failure the loop closes the stream and hands teardown to
//! [`Registry::fail_scope`], which cancels every listener of the scope exactly
//! once and clears the registry entry. The loop owns the stream object
//! exclusively; nobody else reads from or closes it.

use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::core::connection::StreamConnection;
use crate::core::registry::Registry;
use crate::events::Event;
use crate::transport::EventStream;

/// Runs until transport failure or explicit close.
pub(crate) async fn run(
    registry: Arc<Registry>,
    conn: Arc<StreamConnection>,
    mut stream: Box<dyn EventStream>,
) {
    loop {
        tokio::select! {
            _ = conn.token().cancelled() => {
                // Graceful close won the race (idle reap or explicit teardown).
                stream.close().await;
                debug!(scope = %conn.scope(), "event stream closed");
                return;
            }
            frame = stream.read_frame() => match frame {
                Ok(bytes) => match Event::decode(&bytes) {
                    Ok(event) if event.kind.is_empty() => {
                        trace!(scope = %conn.scope(), "dropping event with empty type tag");
                    }
                    Ok(event) => registry.dispatch(conn.scope(), event).await,
                    Err(err) => {
                        debug!(scope = %conn.scope(), "dropping malformed frame: {err}");
                    }
                },
                Err(err) => {
                    stream.close().await;
                    warn!(scope = %conn.scope(), error = %err, "event stream failed");
                    registry.fail_scope(conn.scope(), err).await;
                    return;
                }
            }
        }
    }
}
