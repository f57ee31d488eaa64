//! Module lifecycle contract, the scheduler, and the built-in pollers.
//!
//! ## Contents
//! - [`Module`], [`ModuleRef`] — start/tick/stop lifecycle contract
//! - [`Scheduler`] — supervised fixed-interval tick loop with dynamic
//!   membership
//! - [`LotsRaiseModule`] — re-raises configured lot categories
//! - [`ChatWatchModule`] — republishes chat list changes
//! - [`OrderWatchModule`] — republishes trade table transitions
//! - [`ReviewWatchModule`] — republishes new profile reviews
//!
//! All built-in pollers are constructor-injected with their
//! [`MarketApi`](crate::MarketApi) and a [`Bus`](crate::Bus) clone; there
//! is no ambient lookup.

mod chat;
mod module;
mod orders;
mod raise;
mod reviews;
mod scheduler;

pub use chat::ChatWatchModule;
pub use module::{Module, ModuleRef};
pub use orders::OrderWatchModule;
pub use raise::LotsRaiseModule;
pub use reviews::ReviewWatchModule;
pub use scheduler::Scheduler;
