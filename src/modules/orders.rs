//! # Order watcher.
//!
//! Polls the seller's trade table and republishes status transitions:
//!
//! - first round establishes a baseline without events;
//! - afterwards, an unseen open order publishes `NewOrder`, a known order
//!   turning refund publishes `OrderRefunded`, and a known order leaving
//!   the open/refund states for closed publishes `OrderClosed`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::client::MarketApi;
use crate::domain::{Order, OrderStatus};
use crate::error::ModuleError;
use crate::events::{Bus, Event};
use crate::modules::module::Module;

/// Publishes order lifecycle events off the trade table.
pub struct OrderWatchModule {
    api: Arc<MarketApi>,
    bus: Bus,
    orders: HashMap<String, Order>,
    primed: bool,
}

impl OrderWatchModule {
    /// Creates the module with its collaborators.
    pub fn new(api: Arc<MarketApi>, bus: Bus) -> Self {
        Self {
            api,
            bus,
            orders: HashMap::new(),
            primed: false,
        }
    }
}

#[async_trait]
impl Module for OrderWatchModule {
    fn name(&self) -> &str {
        "order-watch"
    }

    async fn on_tick(&mut self) -> Result<(), ModuleError> {
        let fresh: HashMap<String, Order> = self
            .api
            .trade_orders()
            .await?
            .into_iter()
            .map(|order| (order.order_id.clone(), order))
            .collect();

        if !self.primed {
            self.orders = fresh;
            self.primed = true;
            return Ok(());
        }

        for order in fresh.values() {
            match (self.orders.get(&order.order_id), order.status) {
                (None, OrderStatus::Open) => {
                    self.bus.publish(&Event::new_order(order.clone())).await;
                }
                (Some(known), OrderStatus::Refund) if known.status != OrderStatus::Refund => {
                    self.bus
                        .publish(&Event::order_refunded(order.clone()))
                        .await;
                }
                (Some(known), OrderStatus::Closed) if known.status != OrderStatus::Closed => {
                    self.bus.publish(&Event::order_closed(order.clone())).await;
                }
                _ => {}
            }
        }

        self.orders = fresh;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::FakeTransport;
    use crate::domain::Account;
    use crate::events::{EventKind, FnHandler};
    use std::sync::Mutex as StdMutex;

    fn api(transport: Arc<FakeTransport>) -> Arc<MarketApi> {
        let account = Account {
            user_id: 7,
            golden_key: "key".into(),
            session_id: "sess".into(),
            csrf_token: "tok".into(),
            username: "seller".into(),
        };
        Arc::new(MarketApi::new(transport, account))
    }

    fn trade_page(rows: &[(&str, &str)]) -> String {
        rows.iter()
            .map(|(id, status)| {
                format!(
                    r#"<a class="tc-item">
                         <div class="tc-date-time">сегодня, 12:34</div>
                         <div class="tc-order">#{id}</div>
                         <div class="order-desc"><div>Гемы</div><div class="text-muted">Brawl Stars</div></div>
                         <div class="media-user-name"><span class="pseudo-a" data-href="https://funpay.com/users/123/">buyer</span></div>
                         <div class="tc-status">{status}</div>
                         <div class="tc-price">120,50 ₽</div>
                       </a>"#
                )
            })
            .collect()
    }

    fn record_events(bus: &Bus) -> Arc<StdMutex<Vec<(EventKind, String)>>> {
        let log = Arc::new(StdMutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        bus.subscribe_all(FnHandler::arc("record", move |ev: crate::events::Event| {
            let sink = Arc::clone(&sink);
            async move {
                use crate::events::Payload;
                let id = match &ev.payload {
                    Payload::NewOrder { order }
                    | Payload::OrderClosed { order }
                    | Payload::OrderRefunded { order } => order.order_id.clone(),
                    _ => String::new(),
                };
                sink.lock().unwrap().push((ev.kind(), id));
                Ok(())
            }
        }));
        log
    }

    #[tokio::test]
    async fn test_baseline_round_emits_nothing() {
        let transport = FakeTransport::new();
        transport.on_get("/orders/trade", &trade_page(&[("ABC1", "Оплачен")]));

        let bus = Bus::new();
        let log = record_events(&bus);
        let mut module = OrderWatchModule::new(api(transport), bus);
        module.on_tick().await.unwrap();

        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_transitions_are_reported_once() {
        let transport = FakeTransport::new();
        transport.on_get(
            "/orders/trade",
            &trade_page(&[("ABC1", "Оплачен"), ("DEF2", "Оплачен")]),
        );
        // ABC1 closes, DEF2 turns refund, GHI3 appears open
        let second = trade_page(&[
            ("ABC1", "Закрыт"),
            ("DEF2", "Возврат"),
            ("GHI3", "Оплачен"),
        ]);
        transport.on_get("/orders/trade", &second);
        transport.on_get("/orders/trade", &second);

        let bus = Bus::new();
        let log = record_events(&bus);
        let mut module = OrderWatchModule::new(api(transport), bus);
        module.on_tick().await.unwrap();

        module.on_tick().await.unwrap();
        let mut events = log.lock().unwrap().clone();
        events.sort();
        assert_eq!(
            events,
            vec![
                (EventKind::NewOrder, "GHI3".to_string()),
                (EventKind::OrderClosed, "ABC1".to_string()),
                (EventKind::OrderRefunded, "DEF2".to_string()),
            ]
        );

        // same page again: transitions already absorbed, nothing repeats
        log.lock().unwrap().clear();
        module.on_tick().await.unwrap();
        assert!(log.lock().unwrap().is_empty());
    }
}
