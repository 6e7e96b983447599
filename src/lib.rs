//! # eventmux
//!
//! **Eventmux** is the client-side event-distribution layer of an RPC client
//! for a remote management daemon.
//!
//! It maintains one shared streaming connection per subscription scope and
//! fans decoded events out to any number of independently registered local
//! listeners, each with its own optional type filter and independent
//! lifecycle. The crate is designed as a building block for higher-level
//! client libraries; the transport (handshake, framing, encryption) stays
//! behind the [`Transport`] trait.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  subscriber  │   │  subscriber  │   │  subscriber  │
//!     │ (caller #1)  │   │ (caller #2)  │   │ (caller #3)  │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼ subscribe        ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Monitor (one per client session)                                 │
//! │  - Registry (scope → listeners, owns connection lifecycle)       │
//! │  - Transport (supplied by the surrounding client library)        │
//! └──────┬────────────────────────────────────┬──────────────────────┘
//!        ▼                                    ▼
//! ┌─────────────────────────┐      ┌─────────────────────────┐
//! │ StreamConnection        │      │ StreamConnection        │
//! │  scope: project:default │      │  scope: all-projects    │
//! │  ├─ reader loop (task)  │      │  ├─ reader loop (task)  │
//! │  └─ idle reaper (task)  │      │  └─ idle reaper (task)  │
//! └──────────┬──────────────┘      └──────────┬──────────────┘
//!            │ decoded Event (Arc)            │
//!            ▼                                ▼
//!     Listener ── Listener            Listener
//!        │            │                  │   (targets lock each)
//!   [queue T1]   [queue T2]         [queue T3]
//!        ▼            ▼                  ▼
//!    worker T1    worker T2          worker T3
//!        ▼            ▼                  ▼
//!    on_event()   on_event()         on_event()
//! ```
//!
//! ### Lifecycle
//! ```text
//! subscribe(all_projects) ──► Registry
//!
//!   ├─ scope already open ──► attach new Listener, share the stream
//!   └─ first subscription ──► validate scope (EmptyProject before any open)
//!                             open_stream(scope)
//!                             spawn reader loop + idle reaper
//!
//! reader loop {
//!   ├─► read one frame
//!   ├─► decode: malformed / empty type ─► skip, continue
//!   └─► dispatch: snapshot scope's listeners, try_send to matching targets
//! }
//!
//! teardown, exactly once per connection:
//!   - read failure  ─► every listener cancelled with the error,
//!                      scope entry removed, stream closed, reaper stopped
//!   - last listener released ─► reaper wakes (per-scope signal), closes the
//!                      stream, removes the scope entry
//!
//! recovery: none here - callers observe the error via Listener::wait()
//! and issue a fresh subscribe.
//! ```
//!
//! ## Features
//! | Area            | Description                                                       | Key types / traits                 |
//! |-----------------|-------------------------------------------------------------------|------------------------------------|
//! | **Subscribing** | One shared stream per scope, validated before any open.           | [`Monitor`], [`Listener`]          |
//! | **Handlers**    | Per-target FIFO delivery, panic isolation, optional type filters. | [`EventHandler`], [`HandlerFn`]    |
//! | **Transport**   | Seam to the real connection; mock-friendly.                       | [`Transport`], [`EventStream`]     |
//! | **Errors**      | Synchronous setup errors vs terminal stream failures.             | [`SubscribeError`], [`StreamError`]|
//! | **Events**      | Decoded wire records shared across targets.                       | [`Event`]                          |
//! | **Configuration**| Idle-reap cadence.                                               | [`MonitorConfig`]                  |
//!
//! ## Delivery contract
//! - At-most-once, best-effort: a full target queue drops the event for that
//!   target only.
//! - FIFO per target; no ordering guarantee across targets.
//! - No automatic retry or reconnect at this layer.
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use eventmux::{Event, HandlerFn, Monitor, MonitorConfig, Transport};
//!
//! async fn run(transport: Arc<dyn Transport>) -> Result<(), Box<dyn std::error::Error>> {
//!     let monitor = Monitor::new(transport, MonitorConfig::default());
//!
//!     // Scoped to the client's default project.
//!     let listener = monitor.subscribe(false).await?;
//!
//!     // All lifecycle events, any type:
//!     listener.add_handler(None, HandlerFn::arc("audit", |ev: Event| async move {
//!         println!("[{}] {}", ev.kind, ev.metadata);
//!     }))?;
//!
//!     // Blocks until disconnect or stream failure.
//!     match listener.wait().await {
//!         None => println!("disconnected"),
//!         Some(err) => eprintln!("stream lost: {err}"),
//!     }
//!     Ok(())
//! }
//! ```

mod core;
mod error;
mod events;
mod handlers;
mod transport;

// ---- Public re-exports ----

pub use crate::core::{Listener, Monitor, MonitorConfig};
pub use crate::error::{StreamError, SubscribeError};
pub use crate::events::Event;
pub use crate::handlers::{EventHandler, HandlerFn, HandlerRef, TargetId};
pub use crate::transport::{ConnectionInfo, EventStream, Scope, Transport};
