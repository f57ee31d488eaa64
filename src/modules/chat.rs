//! # Chat watcher.
//!
//! Polls the chat list and republishes changes as events:
//!
//! - first observation seeds the cache and publishes `NewMessage` for
//!   chats that already carry text;
//! - afterwards, an unseen chat publishes `NewChat` (suppressed when its
//!   newest message is only an automated order notice) plus `NewMessage`
//!   for its text, and a known chat whose newest message changed publishes
//!   `NewMessage`.
//!
//! The round is skipped entirely while a chat send is in flight, so the
//! watcher never observes the runner request half-applied.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::client::MarketApi;
use crate::domain::ChatInfo;
use crate::error::ModuleError;
use crate::events::{Bus, Event};
use crate::modules::module::Module;
use crate::parse::patterns::is_system_message;

/// Publishes `NewChat`/`NewMessage` events off the chat list page.
pub struct ChatWatchModule {
    api: Arc<MarketApi>,
    bus: Bus,
    chats: HashMap<String, ChatInfo>,
    primed: bool,
}

impl ChatWatchModule {
    /// Creates the module with its collaborators.
    pub fn new(api: Arc<MarketApi>, bus: Bus) -> Self {
        Self {
            api,
            bus,
            chats: HashMap::new(),
            primed: false,
        }
    }
}

#[async_trait]
impl Module for ChatWatchModule {
    fn name(&self) -> &str {
        "chat-watch"
    }

    async fn on_tick(&mut self) -> Result<(), ModuleError> {
        if self.api.send_in_progress() {
            return Ok(());
        }

        let fresh: HashMap<String, ChatInfo> = self
            .api
            .chats()
            .await?
            .into_iter()
            .map(|chat| (chat.node_id.clone(), chat))
            .collect();

        if !self.primed {
            for chat in fresh.values() {
                if !chat.last_message.is_empty() {
                    self.bus
                        .publish(&Event::new_message(
                            chat.username.clone(),
                            chat.node_id.clone(),
                            chat.last_message.clone(),
                        ))
                        .await;
                }
            }
            self.chats = fresh;
            self.primed = true;
            return Ok(());
        }

        for (node_id, chat) in &fresh {
            match self.chats.get(node_id) {
                None => {
                    if !is_system_message(&chat.last_message) {
                        self.bus
                            .publish(&Event::new_chat(chat.username.clone(), node_id.clone()))
                            .await;
                    }
                    if !chat.last_message.is_empty() {
                        self.bus
                            .publish(&Event::new_message(
                                chat.username.clone(),
                                node_id.clone(),
                                chat.last_message.clone(),
                            ))
                            .await;
                    }
                }
                Some(known) if known.last_message != chat.last_message => {
                    self.bus
                        .publish(&Event::new_message(
                            chat.username.clone(),
                            node_id.clone(),
                            chat.last_message.clone(),
                        ))
                        .await;
                }
                Some(_) => {}
            }
        }

        self.chats = fresh;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::FakeTransport;
    use crate::domain::Account;
    use crate::events::{EventKind, FnHandler, Payload};
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

    fn chat_page(entries: &[(&str, &str, &str)]) -> String {
        entries
            .iter()
            .map(|(node, name, msg)| {
                format!(
                    r#"<a class="contact-item" data-id="{node}">
                         <div class="media-user-name">{name}</div>
                         <div class="contact-item-message">{msg}</div>
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
                let detail = match &ev.payload {
                    Payload::NewChat { username, .. } => username.clone(),
                    Payload::NewMessage { text, .. } => text.clone(),
                    _ => String::new(),
                };
                sink.lock().unwrap().push((ev.kind(), detail));
                Ok(())
            }
        }));
        log
    }

    #[tokio::test]
    async fn test_first_round_seeds_and_reports_existing_text() {
        let transport = FakeTransport::new();
        transport.on_get(
            "/chat/",
            &chat_page(&[("1289", "buyer42", "привет"), ("555", "quiet_user", "")]),
        );

        let bus = Bus::new();
        let log = record_events(&bus);
        let mut module = ChatWatchModule::new(api(transport), bus);
        module.on_tick().await.unwrap();

        let events = log.lock().unwrap().clone();
        assert_eq!(events, vec![(EventKind::NewMessage, "привет".to_string())]);
    }

    #[tokio::test]
    async fn test_changed_message_and_new_chat_are_reported() {
        let transport = FakeTransport::new();
        transport.on_get("/chat/", &chat_page(&[("1289", "buyer42", "привет")]));
        transport.on_get(
            "/chat/",
            &chat_page(&[
                ("1289", "buyer42", "ещё вопрос"),
                ("777", "newcomer", "hello"),
            ]),
        );

        let bus = Bus::new();
        let log = record_events(&bus);
        let mut module = ChatWatchModule::new(api(transport), bus);
        module.on_tick().await.unwrap();
        log.lock().unwrap().clear();

        module.on_tick().await.unwrap();
        let mut events = log.lock().unwrap().clone();
        events.sort();
        assert_eq!(
            events,
            vec![
                (EventKind::NewChat, "newcomer".to_string()),
                (EventKind::NewMessage, "hello".to_string()),
                (EventKind::NewMessage, "ещё вопрос".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_system_notice_suppresses_new_chat_but_not_message() {
        let notice = "Покупатель buyer42 оплатил заказ #ABC123F.";
        let transport = FakeTransport::new();
        transport.on_get("/chat/", &chat_page(&[("1289", "old", "hi")]));
        transport.on_get(
            "/chat/",
            &chat_page(&[("1289", "old", "hi"), ("900", "buyer42", notice)]),
        );

        let bus = Bus::new();
        let log = record_events(&bus);
        let mut module = ChatWatchModule::new(api(transport), bus);
        module.on_tick().await.unwrap();
        log.lock().unwrap().clear();

        module.on_tick().await.unwrap();
        let events = log.lock().unwrap().clone();
        assert_eq!(events, vec![(EventKind::NewMessage, notice.to_string())]);
    }
}
