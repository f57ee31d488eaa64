//! # Lot raising module.
//!
//! Keeps a per-category "next eligible check" schedule and, on each tick,
//! raises every category whose time has come:
//!
//! ```text
//! for each due category:
//!   publish PreLotsRaise (awaited)
//!   ├─ vetoed ─────────► reschedule by default delay, skip the raise
//!   └─ not vetoed ─────► POST /lots/raise
//!        ├─ usable msg ─► next check from the message (rule table)
//!        │                 └─ "raised" confirmation ─► publish LotsRaised
//!        └─ failure ────► reschedule by default delay
//! ```
//!
//! Every failure path lands on [`DEFAULT_RETRY_DELAY`], so one error can
//! never cause a tight retry loop.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::client::MarketApi;
use crate::domain::Category;
use crate::error::ModuleError;
use crate::events::{Bus, Event};
use crate::modules::module::Module;
use crate::parse::timing::{DEFAULT_RETRY_DELAY, is_raise_confirmation, raise_delay};

/// Periodically re-raises configured lot categories.
pub struct LotsRaiseModule {
    api: Arc<MarketApi>,
    bus: Bus,
    categories: Vec<Category>,
    next_check: HashMap<String, Instant>,
}

impl LotsRaiseModule {
    /// Creates the module with its collaborators.
    pub fn new(api: Arc<MarketApi>, bus: Bus) -> Self {
        Self {
            api,
            bus,
            categories: Vec::new(),
            next_check: HashMap::new(),
        }
    }

    /// Adds a category to raise. Returns `false` when a category with the
    /// same node id is already configured.
    pub fn add_category(&mut self, category: Category) -> bool {
        if self
            .categories
            .iter()
            .any(|c| c.node_id == category.node_id)
        {
            return false;
        }
        self.categories.push(category);
        true
    }

    /// Removes a category by node id. Returns `false` when absent.
    pub fn remove_category(&mut self, node_id: &str) -> bool {
        let before = self.categories.len();
        self.categories.retain(|c| c.node_id != node_id);
        self.next_check.remove(node_id);
        self.categories.len() != before
    }

    /// The configured categories.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    async fn handle_raise(&mut self, category: Category) {
        let event = Event::pre_lots_raise(category.clone());
        self.bus.publish(&event).await;
        if event.is_cancelled() {
            debug!(category = %category.name, "raise vetoed by a subscriber");
            self.reschedule(&category.node_id, DEFAULT_RETRY_DELAY);
            return;
        }

        match self
            .api
            .raise_lots(&category.game_id, &category.node_id)
            .await
        {
            Ok(response) if response.success => {
                self.reschedule(&category.node_id, raise_delay(&response.message));
                if is_raise_confirmation(&response.message) {
                    self.bus
                        .publish(&Event::lots_raised(category, response.message))
                        .await;
                }
            }
            Ok(response) => {
                warn!(
                    category = %category.name,
                    message = %response.message,
                    "raise was not accepted"
                );
                self.reschedule(&category.node_id, DEFAULT_RETRY_DELAY);
            }
            Err(err) => {
                warn!(category = %category.name, label = err.as_label(), "raise failed: {err}");
                self.reschedule(&category.node_id, DEFAULT_RETRY_DELAY);
            }
        }
    }

    fn reschedule(&mut self, node_id: &str, delay: std::time::Duration) {
        self.next_check
            .insert(node_id.to_string(), Instant::now() + delay);
    }

    fn due_categories(&self) -> Vec<Category> {
        let now = Instant::now();
        self.categories
            .iter()
            .filter(|c| self.next_check.get(&c.node_id).map_or(true, |&at| at <= now))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Module for LotsRaiseModule {
    fn name(&self) -> &str {
        "lots-raise"
    }

    async fn on_start(&mut self) -> Result<(), ModuleError> {
        self.next_check.clear();
        Ok(())
    }

    async fn on_tick(&mut self) -> Result<(), ModuleError> {
        for category in self.due_categories() {
            self.handle_raise(category).await;
        }
        Ok(())
    }
}
