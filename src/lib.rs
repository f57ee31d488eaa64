//! # lotkeeper
//!
//! **lotkeeper** is an event-driven automation client for the FunPay
//! marketplace: it authenticates with a session token, polls HTML/JSON
//! endpoints for state changes (orders, chat messages, lot listings), and
//! republishes those changes as typed events that pluggable modules and
//! host handlers consume.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐
//!     │  LotsRaise   │  │  ChatWatch   │  │  OrderWatch  │  │ ReviewWatch  │
//!     │   (module)   │  │   (module)   │  │   (module)   │  │   (module)   │
//!     └──────┬───────┘  └──────┬───────┘  └──────┬───────┘  └──────┬───────┘
//!            ▲ on_tick         ▲ on_tick         ▲ on_tick         ▲ on_tick
//! ┌──────────┴─────────────────┴─────────────────┴─────────────────┴────────┐
//! │  Scheduler (fixed-interval tick loop, per-module failure isolation)     │
//! └──────────────────────────────────┬──────────────────────────────────────┘
//!                                    │ modules publish observations
//!                                    ▼
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Bus (per-EventKind registry, copy-on-read snapshots,                   │
//! │       cancel short-circuit for vetoed pre-events)                       │
//! └──────────────────────────────────┬──────────────────────────────────────┘
//!                                    │ dispatch (one task per handler,
//!                                    │ errors/panics → ErrorSink)
//!                      ┌─────────────┼─────────────┐
//!                      ▼             ▼             ▼
//!                  handler 1     handler 2     handler N
//! ```
//!
//! ### Event flow
//! The scheduler starts each module once; every tick round it invokes
//! `on_tick` on every running module concurrently. Modules fetch remote
//! state through [`MarketApi`], diff it against their private caches, and
//! publish typed [`Event`]s. The bus snapshots the subscribers for the
//! event's kind and fans out concurrently, isolating every failure.
//! Pre-action events (`PreLotsRaise`, `ApplicationStopping`) are
//! cancellable: a subscriber vetoes the announced action before the
//! publisher proceeds.
//!
//! ## Features
//! | Area           | Description                                             | Key types / traits                       |
//! |----------------|---------------------------------------------------------|------------------------------------------|
//! | **Events**     | Typed, immutable events; some cancellable.              | [`Event`], [`EventKind`], [`Payload`]    |
//! | **Bus**        | Per-kind subscription, isolated concurrent dispatch.    | [`Bus`], [`EventHandler`], [`ErrorSink`] |
//! | **Modules**    | Periodic stateful pollers with lifecycle supervision.   | [`Module`], [`Scheduler`]                |
//! | **Client**     | Session-cookie HTTP boundary and typed endpoints.       | [`Transport`], [`MarketApi`]             |
//! | **Domain**     | Plain values scraped off the marketplace.               | [`Account`], [`Order`], [`Review`]       |
//! | **Errors**     | Typed errors for orchestration and module failures.     | [`RuntimeError`], [`ModuleError`]        |
//!
//! ## Example
//! ```no_run
//! use lotkeeper::{Application, Category, Config, Event, EventKind, FnHandler, Payload};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let app = Application::connect("your-golden-key", Config::default()).await?;
//!
//!     // react to incoming messages
//!     app.bus().subscribe(
//!         EventKind::NewMessage,
//!         FnHandler::arc("greeter", |event: Event| async move {
//!             if let Payload::NewMessage { username, text, .. } = &event.payload {
//!                 println!("{username}: {text}");
//!             }
//!             Ok(())
//!         }),
//!     );
//!
//!     // keep these categories raised
//!     let raise = app.install_default_modules().await?;
//!     raise
//!         .lock()
//!         .await
//!         .add_category(Category::new("41", "149", "Brawl Stars"));
//!
//!     // run until SIGINT/SIGTERM
//!     app.run().await?;
//!     Ok(())
//! }
//! ```

mod app;
mod client;
mod config;
mod domain;
mod error;
mod events;
mod modules;
mod parse;
mod shutdown;

// ---- Public re-exports ----

pub use app::Application;
pub use client::{HttpTransport, MarketApi, RaiseResponse, Response, Transport};
pub use config::{Config, HttpConfig};
pub use domain::{
    Account, AccountInfo, Balance, Category, ChatInfo, ChatMessage, Currency, Order, OrderStatus,
    Review,
};
pub use error::{ModuleError, RuntimeError};
pub use events::{
    Bus, CancelFlag, ErrorSink, Event, EventHandler, EventKind, FnHandler, HandlerRef, LogHandler,
    LogSink, Payload,
};
pub use modules::{
    ChatWatchModule, LotsRaiseModule, Module, ModuleRef, OrderWatchModule, ReviewWatchModule,
    Scheduler,
};
pub use shutdown::wait_for_shutdown_signal;
