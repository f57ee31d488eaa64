//! # Module lifecycle contract.
//!
//! A [`Module`] is a self-contained unit of periodic, stateful behavior
//! (typically a poller) with start/tick/stop hooks, driven by the
//! [`Scheduler`](crate::Scheduler).
//!
//! ## Lifecycle
//! ```text
//! Created ──on_start──► Running ──on_stop──► Stopped
//!                          │
//!                       on_tick (zero or more, only while Running)
//! ```
//!
//! ## Rules
//! - `on_start` and `on_stop` run at most once per instance; a stopped
//!   module never restarts.
//! - `on_tick` never runs before `on_start` completed nor after `on_stop`
//!   completed. The scheduler enforces this; implementations do not need
//!   their own guards.
//! - Per-module state is owned exclusively by the module; nothing outside
//!   touches it except through these hooks.
//! - Errors returned from any hook are isolated and logged by the
//!   scheduler; they never affect other modules.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use lotkeeper::{Module, ModuleError};
//!
//! struct Heartbeat { beats: u64 }
//!
//! #[async_trait]
//! impl Module for Heartbeat {
//!     fn name(&self) -> &str { "heartbeat" }
//!
//!     async fn on_tick(&mut self) -> Result<(), ModuleError> {
//!         self.beats += 1;
//!         Ok(())
//!     }
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::ModuleError;

/// Contract for periodic stateful units.
#[async_trait]
pub trait Module: Send + Sync + 'static {
    /// Returns a stable, human-readable module name.
    ///
    /// Names are the registration key: the scheduler rejects duplicates.
    fn name(&self) -> &str;

    /// Called once before the module joins tick rounds.
    ///
    /// An error keeps the module out of every round.
    async fn on_start(&mut self) -> Result<(), ModuleError> {
        Ok(())
    }

    /// Called on every tick round while the module is running.
    async fn on_tick(&mut self) -> Result<(), ModuleError>;

    /// Called once when the module leaves the active set.
    async fn on_stop(&mut self) -> Result<(), ModuleError> {
        Ok(())
    }
}

/// Shared handle to a module.
///
/// The mutex serializes a module's tick with its own lifecycle
/// transitions; the scheduler locks it around every hook invocation.
/// Coerce a concrete module with `Arc::new(Mutex::new(module))`; keeping
/// a typed clone of the same `Arc` lets the host reach module-specific
/// methods while the scheduler drives the lifecycle.
pub type ModuleRef = Arc<Mutex<dyn Module>>;
