//! Domain events: data model, bus, and dispatcher.
//!
//! This module groups the event **data model**, the **bus** used to
//! publish/subscribe by event kind, and the **dispatcher** that fans a
//! published event out to its subscribers with per-handler isolation.
//!
//! ## Contents
//! - [`EventKind`], [`Payload`], [`Event`], [`CancelFlag`] — the typed,
//!   immutable event values and the one-way cancellation capability
//! - [`EventHandler`], [`HandlerRef`], [`FnHandler`] — the subscriber contract
//! - [`Bus`] — per-kind registry with copy-on-read snapshots
//! - [`ErrorSink`], [`LogSink`] — pluggable handler-failure policy
//! - [`LogHandler`] — built-in subscriber that renders every event
//!
//! ## Quick reference
//! - **Publishers**: polling modules and the [`Application`](crate::Application).
//! - **Consumers**: anything registered through [`Bus::subscribe`]:
//!   host handlers, other modules, the built-in [`LogHandler`].

mod bus;
mod dispatch;
mod event;
mod handler;
mod log;

pub use bus::Bus;
pub use dispatch::{ErrorSink, LogSink};
pub use event::{CancelFlag, Event, EventKind, Payload};
pub use handler::{EventHandler, FnHandler, HandlerRef};
pub use log::LogHandler;
