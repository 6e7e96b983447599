//! # Event handlers attached to a listener.
//!
//! A listener fans events out to its **targets**: one registered handler plus
//! an optional set of accepted event types. Each target gets a dedicated
//! worker task fed by a bounded queue, so delivery to one target is FIFO and a
//! slow handler never stalls the reader loop or its neighbours.
//!
//! ```text
//! reader loop ── dispatch(Arc<Event>) ──► listener
//!                                            │ (targets lock)
//!                      ┌─────────────────────┼─────────────────────┐
//!                      ▼                     ▼                     ▼
//!                 [queue T1] ─► worker  [queue T2] ─► worker  [queue TN] ─► worker
//!                      │                     │                     │
//!                 on_event()            on_event()            on_event()
//! ```
//!
//! ## Rules
//! - Per-target FIFO (queue order); no ordering across targets.
//! - Queue overflow drops the event **for that target only** (warn).
//! - Handler panics are caught; the worker keeps running.

mod handler;
mod target;

pub use handler::{EventHandler, HandlerFn, HandlerRef};
pub use target::TargetId;

pub(crate) use target::Target;
