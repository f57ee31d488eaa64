//! # Simple logging handler for debugging and demos.
//!
//! [`LogHandler`] renders every bus event as a one-line tracing record.
//!
//! ## Output format
//! ```text
//! [ready] user=seller42 id=1184111
//! [new-message] chat=1289 from=buyer text="hi"
//! [pre-raise] category="Brawl Stars" node=149
//! [raised] category="Brawl Stars" msg="Предложения подняты"
//! [new-order] order=ABC123F buyer=buyer amount=120.5
//! [stopping] reason="stop requested"
//! ```
//!
//! Subscribe it to everything:
//! ```rust
//! use std::sync::Arc;
//! use lotkeeper::{Bus, LogHandler};
//!
//! let bus = Bus::new();
//! bus.subscribe_all(Arc::new(LogHandler));
//! ```

use async_trait::async_trait;
use tracing::info;

use crate::error::ModuleError;
use crate::events::event::{Event, Payload};
use crate::events::handler::EventHandler;

/// Renders every event it receives via `tracing`.
///
/// Intended for development and demos; implement a custom
/// [`EventHandler`] for structured telemetry.
pub struct LogHandler;

#[async_trait]
impl EventHandler for LogHandler {
    async fn handle(&self, event: &Event) -> Result<(), ModuleError> {
        match &event.payload {
            Payload::ApplicationReady { account } => {
                info!("[ready] user={} id={}", account.username, account.user_id);
            }
            Payload::ApplicationStopping { reason } => {
                info!("[stopping] reason={:?}", reason.as_deref().unwrap_or("none"));
            }
            Payload::NewChat { username, chat_node } => {
                info!("[new-chat] chat={chat_node} from={username}");
            }
            Payload::NewMessage {
                username,
                chat_node,
                text,
            } => {
                info!("[new-message] chat={chat_node} from={username} text={text:?}");
            }
            Payload::PreLotsRaise { category } => {
                info!(
                    "[pre-raise] category={:?} node={}",
                    category.name, category.node_id
                );
            }
            Payload::LotsRaised { category, message } => {
                info!("[raised] category={:?} msg={message:?}", category.name);
            }
            Payload::NewOrder { order } => {
                info!(
                    "[new-order] order={} buyer={} amount={}",
                    order.order_id, order.buyer, order.amount
                );
            }
            Payload::OrderClosed { order } => {
                info!("[order-closed] order={}", order.order_id);
            }
            Payload::OrderRefunded { order } => {
                info!("[order-refunded] order={}", order.order_id);
            }
            Payload::NewReview { review } => {
                info!(
                    "[new-review] rating={} order={:?}",
                    review.rating, review.order_link
                );
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}
