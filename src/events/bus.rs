//! # Event bus: per-kind subscriber registry with isolated fan-out.
//!
//! [`Bus`] maps each [`EventKind`] to a set of handlers and hands published
//! events to the dispatcher for concurrent, failure-isolated delivery.
//!
//! ## Architecture
//! ```text
//! Publishers (modules, app):          Subscribers (handlers):
//!   raise module ──┐
//!   chat module  ──┼─► publish(ev) ─► snapshot(registry[kind]) ─► dispatch
//!   application  ──┘        │                                       ├─► H1
//!                           └─ cancelled? ─► return (no handlers)   ├─► H2
//!                                                                   └─► HN
//! ```
//!
//! ## Rules
//! - **Set semantics**: duplicate registration of the identical handler
//!   reference is a no-op; unsubscribe of an absent handler is a no-op.
//! - **Copy-on-read snapshot**: publish clones the current handler list, so
//!   a handler that (un)subscribes during dispatch never corrupts the
//!   in-flight iteration; the change applies from the next publish on.
//! - **Cancel short-circuit**: an already-cancelled event invokes nothing.
//! - **Shutdown**: clears every registration; later publishes are silent
//!   no-ops and never throw into code paths that are themselves stopping.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::{Arc, RwLock};

use crate::events::dispatch::{self, ErrorSink, LogSink};
use crate::events::event::{Event, EventKind};
use crate::events::handler::HandlerRef;

struct BusInner {
    registry: RwLock<HashMap<EventKind, Vec<HandlerRef>>>,
    sink: Arc<dyn ErrorSink>,
    closed: AtomicBool,
}

/// Registry-backed publish/subscribe bus.
///
/// Cheap to clone (internally holds an `Arc`); clones share the registry,
/// so modules and the application can each keep their own handle.
#[derive(Clone)]
pub struct Bus {
    inner: Arc<BusInner>,
}

impl Bus {
    /// Creates a bus with the default logging error sink.
    pub fn new() -> Self {
        Self::with_sink(Arc::new(LogSink))
    }

    /// Creates a bus with a custom handler-failure sink.
    pub fn with_sink(sink: Arc<dyn ErrorSink>) -> Self {
        Self {
            inner: Arc::new(BusInner {
                registry: RwLock::new(HashMap::new()),
                sink,
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Registers `handler` for events of `kind`.
    ///
    /// Idempotent for the identical handler reference (pointer equality).
    pub fn subscribe(&self, kind: EventKind, handler: HandlerRef) {
        let mut registry = self.inner.registry.write().unwrap_or_else(|e| e.into_inner());
        let handlers = registry.entry(kind).or_default();
        if !handlers.iter().any(|h| Arc::ptr_eq(h, &handler)) {
            handlers.push(handler);
        }
    }

    /// Registers `handler` for every event kind.
    pub fn subscribe_all(&self, handler: HandlerRef) {
        for kind in EventKind::ALL {
            self.subscribe(kind, Arc::clone(&handler));
        }
    }

    /// Removes a previously registered handler; no-op if absent.
    ///
    /// After this call returns, the handler receives no events of `kind`
    /// published afterwards. A dispatch already in flight may still be
    /// holding a snapshot that contains it.
    pub fn unsubscribe(&self, kind: EventKind, handler: &HandlerRef) {
        let mut registry = self.inner.registry.write().unwrap_or_else(|e| e.into_inner());
        if let Some(handlers) = registry.get_mut(&kind) {
            handlers.retain(|h| !Arc::ptr_eq(h, handler));
        }
    }

    /// Publishes an event and awaits the isolated concurrent fan-out.
    ///
    /// Returns without invoking anything when the bus is shut down or the
    /// event is already cancelled. Awaiting the fan-out makes the flag of a
    /// cancellable pre-event well-defined once `publish` returns, which is
    /// what lets a publisher honor a veto; handler failures are still
    /// isolated and never surface here.
    ///
    /// Use [`Bus::emit`] when the publisher does not care about completion.
    pub async fn publish(&self, event: &Event) {
        if self.inner.closed.load(AtomicOrdering::SeqCst) {
            return;
        }
        if event.is_cancelled() {
            return;
        }

        let snapshot: Vec<HandlerRef> = {
            let registry = self.inner.registry.read().unwrap_or_else(|e| e.into_inner());
            registry.get(&event.kind()).cloned().unwrap_or_default()
        };
        if snapshot.is_empty() {
            return;
        }

        dispatch::dispatch(event, snapshot, Arc::clone(&self.inner.sink)).await;
    }

    /// Publishes an event without awaiting handler completion.
    ///
    /// Fire-and-forget form of [`Bus::publish`]: the fan-out is spawned onto
    /// the runtime and the call returns immediately. For cancellable events
    /// the publisher cannot observe a veto through this path.
    pub fn emit(&self, event: Event) {
        if self.inner.closed.load(AtomicOrdering::SeqCst) {
            return;
        }
        let bus = self.clone();
        tokio::spawn(async move {
            bus.publish(&event).await;
        });
    }

    /// Shuts the bus down: clears all registrations and turns every later
    /// `publish`/`emit` into a silent no-op. In-flight dispatch is not
    /// aborted.
    pub fn shutdown(&self) {
        self.inner.closed.store(true, AtomicOrdering::SeqCst);
        let mut registry = self.inner.registry.write().unwrap_or_else(|e| e.into_inner());
        registry.clear();
    }

    /// True once [`Bus::shutdown`] has run.
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(AtomicOrdering::SeqCst)
    }

    /// Number of handlers currently registered for `kind`.
    pub fn handler_count(&self, kind: EventKind) -> usize {
        let registry = self.inner.registry.read().unwrap_or_else(|e| e.into_inner());
        registry.get(&kind).map_or(0, Vec::len)
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}
