//! # Event handler trait and closure adapter.
//!
//! [`EventHandler`] is the extension point for reacting to daemon events. Each
//! registered handler is driven by a dedicated worker task fed from a bounded
//! queue owned by its target (see [`Listener::add_handler`]).
//!
//! ## Contract
//! - Implementations may be slow (I/O, batching) — they do **not** block the
//!   reader loop nor other handlers.
//! - Each handler **declares** its preferred queue capacity via
//!   [`EventHandler::queue_capacity`]. If the queue overflows, events for that
//!   handler are **dropped** (warn).
//! - Panics are caught by the worker; prefer handling errors internally.
//!
//! [`Listener::add_handler`]: crate::Listener::add_handler

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::events::Event;

/// Shared handle to an event handler.
pub type HandlerRef = Arc<dyn EventHandler>;

/// Callback invoked for every event accepted by its target's filter.
///
/// Each handler runs in isolation:
/// - **Bounded queue** buffers events (capacity via [`Self::queue_capacity`]).
/// - **Dedicated worker task** processes events sequentially (FIFO).
/// - **Panic isolation**: panics are caught and logged; the worker continues.
#[async_trait]
pub trait EventHandler: Send + Sync + 'static {
    /// Processes a single event.
    ///
    /// Called from the target's worker task, never from the reader loop.
    /// Events are delivered in FIFO order per target.
    async fn on_event(&self, event: &Event);

    /// Returns the handler name used in drop/panic log lines.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose — override
    /// it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Returns the preferred queue capacity for this handler.
    ///
    /// When the queue is full the newest event is dropped for this handler
    /// only; other handlers are unaffected. Clamped to a minimum of 1.
    ///
    /// Default: 64.
    fn queue_capacity(&self) -> usize {
        64
    }
}

/// Function-backed event handler.
///
/// Wraps a closure that *creates* a new future per event; the event is passed
/// by value so the future owns its data.
///
/// ## Example
/// ```rust
/// use eventmux::{Event, HandlerFn, HandlerRef};
///
/// let h: HandlerRef = HandlerFn::arc("printer", |ev: Event| async move {
///     println!("{}: {}", ev.kind, ev.metadata);
/// });
/// ```
pub struct HandlerFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> HandlerFn<F> {
    /// Creates a new function-backed handler.
    ///
    /// Prefer [`HandlerFn::arc`] when you immediately need a [`HandlerRef`].
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self { name: name.into(), f }
    }

    /// Creates the handler and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> EventHandler for HandlerFn<F>
where
    F: Fn(Event) -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: Future<Output = ()> + Send + 'static,
{
    async fn on_event(&self, event: &Event) {
        (self.f)(event.clone()).await;
    }

    fn name(&self) -> &'static str {
        // Cow<'static> backed by a borrowed str keeps the static lifetime;
        // owned names fall back to a stable placeholder.
        match &self.name {
            Cow::Borrowed(name) => name,
            Cow::Owned(_) => "handler_fn",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn handler_fn_invokes_closure() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let h: HandlerRef = HandlerFn::arc("probe", move |ev: Event| {
            let tx = tx.clone();
            async move {
                let _ = tx.send(ev.kind);
            }
        });

        let ev = Event::decode(br#"{"type":"boot"}"#).unwrap();
        h.on_event(&ev).await;

        assert_eq!(rx.recv().await.as_deref(), Some("boot"));
    }

    #[test]
    fn static_names_are_kept() {
        let h = HandlerFn::new("metrics", |_ev: Event| async {});
        assert_eq!(EventHandler::name(&h), "metrics");
    }
}
