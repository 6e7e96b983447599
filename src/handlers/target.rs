//! # Target: one handler, one filter, one delivery worker.
//!
//! A [`Target`] couples a registered [`EventHandler`] with its optional set of
//! accepted event types and a bounded delivery queue. A dedicated worker task
//! drains the queue, so:
//!
//! - delivery to one target is serialized (FIFO),
//! - a slow or panicking handler affects only its own queue,
//! - the reader loop never awaits a handler.
//!
//! ## Overflow behavior
//! `deliver` uses `try_send`: when the queue is full the event is dropped for
//! this target only and a warning is logged. There is no backpressure toward
//! the reader loop.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::mpsc;
use tracing::warn;

use crate::events::Event;
use crate::handlers::HandlerRef;

/// Global sequence for target identities.
static TARGET_SEQ: AtomicU64 = AtomicU64::new(0);

/// Opaque identity of a registered handler, returned by
/// [`Listener::add_handler`](crate::Listener::add_handler) and consumed by
/// [`Listener::remove_handler`](crate::Listener::remove_handler).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TargetId(u64);

/// One registered handler within a listener.
///
/// Owned exclusively by its listener; dropping it closes the queue, after
/// which the worker drains whatever was already accepted and exits.
#[derive(Debug)]
pub(crate) struct Target {
    id: TargetId,
    name: &'static str,
    filter: Option<HashSet<String>>,
    queue: mpsc::Sender<Arc<Event>>,
}

impl Target {
    /// Creates the target and spawns its delivery worker.
    pub(crate) fn spawn(filter: Option<HashSet<String>>, handler: HandlerRef) -> Self {
        let id = TargetId(TARGET_SEQ.fetch_add(1, AtomicOrdering::Relaxed));
        let name = handler.name();
        let capacity = handler.queue_capacity().max(1);
        let (queue, mut rx) = mpsc::channel::<Arc<Event>>(capacity);

        tokio::spawn(async move {
            while let Some(ev) = rx.recv().await {
                let fut = handler.on_event(ev.as_ref());
                if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                    warn!(
                        handler = handler.name(),
                        "event handler panicked: {panic_err:?}"
                    );
                }
            }
        });

        Self {
            id,
            name,
            filter,
            queue,
        }
    }

    pub(crate) fn id(&self) -> TargetId {
        self.id
    }

    /// True when this target's filter accepts the event type.
    ///
    /// No filter means accept everything.
    pub(crate) fn accepts(&self, kind: &str) -> bool {
        match &self.filter {
            None => true,
            Some(kinds) => kinds.contains(kind),
        }
    }

    /// Queues one event for this target (non-blocking).
    ///
    /// A full or closed queue drops the event for this target only.
    pub(crate) fn deliver(&self, event: &Arc<Event>) {
        match self.queue.try_send(Arc::clone(event)) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(target_handler = self.name, "dropped event: queue full");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!(target_handler = self.name, "dropped event: worker closed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::sync::mpsc::unbounded_channel;
    use tokio::time::timeout;

    use super::*;
    use crate::handlers::HandlerFn;

    fn event(kind: &str) -> Arc<Event> {
        Arc::new(Event::decode(format!(r#"{{"type":"{kind}"}}"#).as_bytes()).unwrap())
    }

    fn filter(kinds: &[&str]) -> Option<HashSet<String>> {
        Some(kinds.iter().map(|k| k.to_string()).collect())
    }

    #[test]
    fn no_filter_accepts_everything() {
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let _guard = rt.enter();

        let t = Target::spawn(None, HandlerFn::arc("any", |_ev: Event| async {}));
        assert!(t.accepts("instance-started"));
        assert!(t.accepts("operation"));
    }

    #[test]
    fn filter_matches_exact_types() {
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let _guard = rt.enter();

        let t = Target::spawn(
            filter(&["A", "C"]),
            HandlerFn::arc("picky", |_ev: Event| async {}),
        );
        assert!(t.accepts("A"));
        assert!(!t.accepts("B"));
        assert!(t.accepts("C"));
    }

    #[tokio::test]
    async fn delivery_is_fifo_per_target() {
        let (tx, mut rx) = unbounded_channel();
        let t = Target::spawn(
            None,
            HandlerFn::arc("order", move |ev: Event| {
                let tx = tx.clone();
                async move {
                    let _ = tx.send(ev.kind);
                }
            }),
        );

        for kind in ["one", "two", "three"] {
            t.deliver(&event(kind));
        }

        for expected in ["one", "two", "three"] {
            let got = timeout(Duration::from_secs(1), rx.recv()).await.unwrap();
            assert_eq!(got.as_deref(), Some(expected));
        }
    }

    #[tokio::test]
    async fn panicking_handler_does_not_kill_the_worker() {
        let (tx, mut rx) = unbounded_channel();
        let t = Target::spawn(
            None,
            HandlerFn::arc("flaky", move |ev: Event| {
                let tx = tx.clone();
                async move {
                    if ev.kind == "boom" {
                        panic!("handler exploded");
                    }
                    let _ = tx.send(ev.kind);
                }
            }),
        );

        t.deliver(&event("boom"));
        t.deliver(&event("fine"));

        let got = timeout(Duration::from_secs(1), rx.recv()).await.unwrap();
        assert_eq!(got.as_deref(), Some("fine"));
    }

    #[tokio::test]
    async fn full_queue_drops_newest() {
        // Queue capacity 1 and a handler parked on a gate: the first event sits
        // in the handler, the second fills the queue, the third is dropped.
        struct Gated {
            gate: Arc<tokio::sync::Notify>,
            seen: tokio::sync::mpsc::UnboundedSender<String>,
        }

        #[async_trait::async_trait]
        impl crate::handlers::EventHandler for Gated {
            async fn on_event(&self, event: &Event) {
                self.gate.notified().await;
                let _ = self.seen.send(event.kind.clone());
            }

            fn name(&self) -> &'static str {
                "gated"
            }

            fn queue_capacity(&self) -> usize {
                1
            }
        }

        let gate = Arc::new(tokio::sync::Notify::new());
        let (tx, mut rx) = unbounded_channel();
        let t = Target::spawn(
            None,
            Arc::new(Gated {
                gate: gate.clone(),
                seen: tx,
            }),
        );

        t.deliver(&event("first"));
        // Let the worker pick up "first" and park before overfilling.
        tokio::time::sleep(Duration::from_millis(20)).await;
        t.deliver(&event("second"));
        t.deliver(&event("lost"));

        gate.notify_one();
        gate.notify_one();
        gate.notify_one();

        let first = timeout(Duration::from_secs(1), rx.recv()).await.unwrap();
        assert_eq!(first.as_deref(), Some("first"));
        let second = timeout(Duration::from_secs(1), rx.recv()).await.unwrap();
        assert_eq!(second.as_deref(), Some("second"));

        // "lost" was dropped on the floor; nothing further arrives.
        assert!(timeout(Duration::from_millis(100), rx.recv()).await.is_err());
    }
}
