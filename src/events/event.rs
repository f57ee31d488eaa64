//! # Domain events published on the bus.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **System events**: application lifecycle (ready, stopping)
//! - **Chat events**: new chats and new messages observed by polling
//! - **Lot events**: the pre-raise veto point and the raise confirmation
//! - **Order/review events**: trade and feedback state changes
//!
//! The [`Event`] struct carries a wall-clock creation timestamp, a typed
//! [`Payload`] and, for cancellable kinds, a shared one-way [`CancelFlag`].
//!
//! ## Cancellation
//! `ApplicationStopping` and `PreLotsRaise` are *pre*-action events: a
//! subscriber may veto the action they announce by calling [`Event::cancel`]
//! before the publisher proceeds. Clones of an event share the same flag, so
//! the publisher observes a veto performed on the clone a handler received.
//! The flag is one-way: once set it is never cleared.
//!
//! Cancelling *during* a concurrent fan-out is best-effort: sibling handlers
//! already in flight are not stopped. Only "cancelled before publish" and
//! "cancelled when publish returns" are well-defined; do not build
//! correctness-critical logic on mid-dispatch cancellation.
//!
//! ## Example
//! ```rust
//! use lotkeeper::{Category, Event, EventKind};
//!
//! let category = Category::new("41", "149", "Brawl Stars");
//! let ev = Event::pre_lots_raise(category);
//!
//! assert_eq!(ev.kind(), EventKind::PreLotsRaise);
//! assert!(!ev.is_cancelled());
//!
//! ev.cancel();
//! assert!(ev.is_cancelled());
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::domain::{Account, Category, Order, Review};

/// Classification of domain events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
    // === System events ===
    /// Application finished startup; modules are running.
    ApplicationReady,

    /// Application is about to stop.
    ///
    /// Cancellable: a subscriber may veto a user-requested stop. The fatal
    /// invalid-session path publishes this event but proceeds regardless.
    ApplicationStopping,

    // === Chat events ===
    /// A chat appeared that was not in the previous observation.
    NewChat,

    /// A chat's newest message changed since the previous observation.
    NewMessage,

    // === Lot events ===
    /// A category is about to be raised.
    ///
    /// Cancellable: a subscriber vetoes the raise by setting the flag; the
    /// raising module then skips the remote action for this round.
    PreLotsRaise,

    /// The marketplace confirmed a completed raise.
    LotsRaised,

    // === Order events ===
    /// An unseen order in the open state appeared.
    NewOrder,

    /// A known order transitioned to the closed state.
    OrderClosed,

    /// A known order transitioned to the refund state.
    OrderRefunded,

    // === Review events ===
    /// The newest review on the profile changed.
    NewReview,
}

impl EventKind {
    /// Every event kind, for subscribe-to-everything helpers.
    pub const ALL: [EventKind; 10] = [
        EventKind::ApplicationReady,
        EventKind::ApplicationStopping,
        EventKind::NewChat,
        EventKind::NewMessage,
        EventKind::PreLotsRaise,
        EventKind::LotsRaised,
        EventKind::NewOrder,
        EventKind::OrderClosed,
        EventKind::OrderRefunded,
        EventKind::NewReview,
    ];
}

/// Typed event payload.
///
/// A closed union: routing is keyed by the [`EventKind`] discriminant this
/// payload maps to, so lookup stays O(1) without any runtime type inspection.
#[derive(Debug, Clone)]
pub enum Payload {
    /// See [`EventKind::ApplicationReady`].
    ApplicationReady {
        /// The resolved session account.
        account: Account,
    },
    /// See [`EventKind::ApplicationStopping`].
    ApplicationStopping {
        /// Why the application is stopping.
        reason: Option<Arc<str>>,
    },
    /// See [`EventKind::NewChat`].
    NewChat {
        /// Counterparty display name.
        username: String,
        /// Chat node identifier.
        chat_node: String,
    },
    /// See [`EventKind::NewMessage`].
    NewMessage {
        /// Counterparty display name.
        username: String,
        /// Chat node identifier.
        chat_node: String,
        /// The newest message text.
        text: String,
    },
    /// See [`EventKind::PreLotsRaise`].
    PreLotsRaise {
        /// The category about to be raised.
        category: Category,
    },
    /// See [`EventKind::LotsRaised`].
    LotsRaised {
        /// The category that was raised.
        category: Category,
        /// The confirmation message from the marketplace.
        message: String,
    },
    /// See [`EventKind::NewOrder`].
    NewOrder {
        /// The newly observed order.
        order: Order,
    },
    /// See [`EventKind::OrderClosed`].
    OrderClosed {
        /// The order that closed.
        order: Order,
    },
    /// See [`EventKind::OrderRefunded`].
    OrderRefunded {
        /// The order that was refunded.
        order: Order,
    },
    /// See [`EventKind::NewReview`].
    NewReview {
        /// The newest review.
        review: Review,
    },
}

impl Payload {
    /// Returns the discriminant this payload routes under.
    pub fn kind(&self) -> EventKind {
        match self {
            Payload::ApplicationReady { .. } => EventKind::ApplicationReady,
            Payload::ApplicationStopping { .. } => EventKind::ApplicationStopping,
            Payload::NewChat { .. } => EventKind::NewChat,
            Payload::NewMessage { .. } => EventKind::NewMessage,
            Payload::PreLotsRaise { .. } => EventKind::PreLotsRaise,
            Payload::LotsRaised { .. } => EventKind::LotsRaised,
            Payload::NewOrder { .. } => EventKind::NewOrder,
            Payload::OrderClosed { .. } => EventKind::OrderClosed,
            Payload::OrderRefunded { .. } => EventKind::OrderRefunded,
            Payload::NewReview { .. } => EventKind::NewReview,
        }
    }
}

/// One-way cancellation flag shared between an event and its clones.
///
/// `cancel()` sets the flag; no API exists to clear it.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Sets the flag. Irreversible for this event instance.
    #[inline]
    pub fn cancel(&self) {
        self.0.store(true, AtomicOrdering::SeqCst);
    }

    /// Reads the flag.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(AtomicOrdering::SeqCst)
    }
}

/// A domain event: creation timestamp, typed payload, optional cancel flag.
///
/// Events are immutable values apart from the one-way cancellation flag,
/// which only cancellable kinds carry. Cloning is cheap and clones share
/// the flag.
#[derive(Debug, Clone)]
pub struct Event {
    /// Wall-clock creation timestamp, assigned at construction.
    pub at: SystemTime,
    /// Typed payload.
    pub payload: Payload,
    /// Cancellation capability; `None` for non-cancellable kinds.
    cancel: Option<CancelFlag>,
}

impl Event {
    /// Creates a new event, stamping the current time and attaching a
    /// cancellation flag when the payload's kind is cancellable.
    pub fn new(payload: Payload) -> Self {
        let cancel = match payload.kind() {
            EventKind::ApplicationStopping | EventKind::PreLotsRaise => {
                Some(CancelFlag::default())
            }
            _ => None,
        };
        Self {
            at: SystemTime::now(),
            payload,
            cancel,
        }
    }

    /// Creates an `ApplicationReady` event.
    pub fn application_ready(account: Account) -> Self {
        Event::new(Payload::ApplicationReady { account })
    }

    /// Creates a cancellable `ApplicationStopping` event.
    pub fn application_stopping(reason: impl Into<Arc<str>>) -> Self {
        Event::new(Payload::ApplicationStopping {
            reason: Some(reason.into()),
        })
    }

    /// Creates a `NewChat` event.
    pub fn new_chat(username: impl Into<String>, chat_node: impl Into<String>) -> Self {
        Event::new(Payload::NewChat {
            username: username.into(),
            chat_node: chat_node.into(),
        })
    }

    /// Creates a `NewMessage` event.
    pub fn new_message(
        username: impl Into<String>,
        chat_node: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Event::new(Payload::NewMessage {
            username: username.into(),
            chat_node: chat_node.into(),
            text: text.into(),
        })
    }

    /// Creates a cancellable `PreLotsRaise` event.
    pub fn pre_lots_raise(category: Category) -> Self {
        Event::new(Payload::PreLotsRaise { category })
    }

    /// Creates a `LotsRaised` event.
    pub fn lots_raised(category: Category, message: impl Into<String>) -> Self {
        Event::new(Payload::LotsRaised {
            category,
            message: message.into(),
        })
    }

    /// Creates a `NewOrder` event.
    pub fn new_order(order: Order) -> Self {
        Event::new(Payload::NewOrder { order })
    }

    /// Creates an `OrderClosed` event.
    pub fn order_closed(order: Order) -> Self {
        Event::new(Payload::OrderClosed { order })
    }

    /// Creates an `OrderRefunded` event.
    pub fn order_refunded(order: Order) -> Self {
        Event::new(Payload::OrderRefunded { order })
    }

    /// Creates a `NewReview` event.
    pub fn new_review(review: Review) -> Self {
        Event::new(Payload::NewReview { review })
    }

    /// Returns the event's discriminant.
    #[inline]
    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }

    /// Returns the cancellation flag, or `None` for non-cancellable kinds.
    #[inline]
    pub fn cancellation(&self) -> Option<&CancelFlag> {
        self.cancel.as_ref()
    }

    /// Sets the cancellation flag. No-op for non-cancellable kinds.
    #[inline]
    pub fn cancel(&self) {
        if let Some(flag) = &self.cancel {
            flag.cancel();
        }
    }

    /// Reads the cancellation flag; always `false` for non-cancellable kinds.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelFlag::is_cancelled)
    }
}
