//! # Event handler trait and the closure adapter.
//!
//! [`EventHandler`] is the extension point for reacting to bus events. The
//! common handle type is [`HandlerRef`], an `Arc<dyn EventHandler>` suitable
//! for registration under multiple event kinds.
//!
//! Handler identity is the `Arc` allocation: the bus deduplicates and removes
//! registrations by pointer equality, so keep the same `HandlerRef` around to
//! unsubscribe later.
//!
//! ## Contract
//! - Handlers run on the dispatch pool, concurrently with sibling handlers
//!   for the same event; never assume ordering.
//! - An `Err` or a panic is isolated and routed to the bus's error sink; it
//!   never reaches the publisher and is not retried.
//!
//! ## Example
//! ```rust
//! use lotkeeper::{Event, EventHandler, FnHandler, HandlerRef, ModuleError, Payload};
//!
//! let greeter: HandlerRef = FnHandler::arc("greeter", |event: Event| async move {
//!     if let Payload::NewMessage { username, text, .. } = &event.payload {
//!         println!("{username}: {text}");
//!     }
//!     Ok::<_, ModuleError>(())
//! });
//!
//! assert_eq!(greeter.name(), "greeter");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ModuleError;
use crate::events::event::Event;

/// Contract for event handlers.
///
/// Called from a dispatch task per published event. Implementations may be
/// slow (I/O, batching); they do not block the publisher or sibling handlers.
#[async_trait]
pub trait EventHandler: Send + Sync + 'static {
    /// Handles a single event.
    ///
    /// The event reference borrows a clone owned by the dispatch task; for a
    /// cancellable event, calling [`Event::cancel`] on it vetoes the action
    /// because clones share the flag.
    async fn handle(&self, event: &Event) -> Result<(), ModuleError>;

    /// Human-readable name (for logs/metrics).
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Shared handle to an event handler.
pub type HandlerRef = Arc<dyn EventHandler>;

/// Function-backed event handler.
///
/// Wraps a closure that receives an owned clone of the event, producing a
/// fresh future per invocation.
pub struct FnHandler<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> FnHandler<F> {
    /// Creates a new function-backed handler.
    ///
    /// Prefer [`FnHandler::arc`] when you immediately need a [`HandlerRef`].
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the handler and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> EventHandler for FnHandler<F>
where
    F: Fn(Event) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ModuleError>> + Send + 'static,
{
    async fn handle(&self, event: &Event) -> Result<(), ModuleError> {
        (self.f)(event.clone()).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}
