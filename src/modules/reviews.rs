//! # Review watcher.
//!
//! Polls the seller's profile page and publishes `NewReview` when the
//! newest review's identity changes. The first round only baselines the
//! newest review.

use std::sync::Arc;

use async_trait::async_trait;

use crate::client::MarketApi;
use crate::error::ModuleError;
use crate::events::{Bus, Event};
use crate::modules::module::Module;

/// Publishes `NewReview` events off the profile page.
pub struct ReviewWatchModule {
    api: Arc<MarketApi>,
    bus: Bus,
    last_review: Option<String>,
    primed: bool,
}

impl ReviewWatchModule {
    /// Creates the module with its collaborators.
    pub fn new(api: Arc<MarketApi>, bus: Bus) -> Self {
        Self {
            api,
            bus,
            last_review: None,
            primed: false,
        }
    }
}

#[async_trait]
impl Module for ReviewWatchModule {
    fn name(&self) -> &str {
        "review-watch"
    }

    async fn on_tick(&mut self) -> Result<(), ModuleError> {
        let reviews = self.api.reviews().await?;
        let Some(latest) = reviews.into_iter().next() else {
            return Ok(());
        };

        if !self.primed {
            self.last_review = Some(latest.id);
            self.primed = true;
            return Ok(());
        }

        if self.last_review.as_deref() != Some(latest.id.as_str()) {
            self.last_review = Some(latest.id.clone());
            self.bus.publish(&Event::new_review(latest)).await;
        }
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

    fn profile_page(order_ids: &[&str]) -> String {
        order_ids
            .iter()
            .map(|order| {
                format!(
                    r#"<div class="review-item">
                         <div class="review-item-rating"><div class="rating"><div class="rating5"></div></div></div>
                         <div class="review-item-user"><a href="https://funpay.com/users/123/">buyer</a></div>
                         <div class="review-item-order"><a href="https://funpay.com/orders/{order}/">заказ</a></div>
                         <div class="review-item-text">отлично</div>
                       </div>"#,
                    order = order
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn test_new_review_fires_after_baseline() {
        let transport = FakeTransport::new();
        transport.on_get("/users/7/", &profile_page(&["OLD1"]));
        let second = profile_page(&["NEW2", "OLD1"]);
        transport.on_get("/users/7/", &second);
        transport.on_get("/users/7/", &second);

        let bus = Bus::new();
        let log = Arc::new(StdMutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        bus.subscribe(
            EventKind::NewReview,
            FnHandler::arc("record", move |ev: crate::events::Event| {
                let sink = Arc::clone(&sink);
                async move {
                    if let crate::events::Payload::NewReview { review } = &ev.payload {
                        sink.lock().unwrap().push(review.id.clone());
                    }
                    Ok(())
                }
            }),
        );

        let mut module = ReviewWatchModule::new(api(transport), bus);
        module.on_tick().await.unwrap();
        assert!(log.lock().unwrap().is_empty(), "baseline emits nothing");

        module.on_tick().await.unwrap();
        assert_eq!(
            log.lock().unwrap().clone(),
            vec!["https://funpay.com/orders/NEW2/".to_string()]
        );

        // unchanged newest review stays silent
        module.on_tick().await.unwrap();
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_profile_is_tolerated() {
        let transport = FakeTransport::new();
        transport.on_get("/users/7/", "<div>no reviews yet</div>");

        let mut module = ReviewWatchModule::new(api(transport), Bus::new());
        module.on_tick().await.unwrap();
        assert!(module.last_review.is_none());
    }
}
