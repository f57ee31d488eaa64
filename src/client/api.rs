//! # Typed marketplace API.
//!
//! [`MarketApi`] wraps the [`Transport`] with the session cookies and the
//! page parsers, exposing each endpoint the polling modules consume as a
//! typed accessor. It owns the send gate: while a chat message POST is in
//! flight, [`MarketApi::send_in_progress`] is true and the chat watcher
//! skips its round, so a poll never races the runner request it would
//! observe half-applied.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

use serde_json::json;
use tokio::sync::Mutex;
use tracing::debug;

use crate::client::transport::Transport;
use crate::domain::{Account, AccountInfo, Balance, ChatInfo, ChatMessage, Order, Review};
use crate::error::ModuleError;
use crate::parse;

const XHR_HEADERS: [(&str, &str); 3] = [
    ("Accept", "*/*"),
    (
        "Content-Type",
        "application/x-www-form-urlencoded; charset=UTF-8",
    ),
    ("X-Requested-With", "XMLHttpRequest"),
];

/// Outcome of a raise attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RaiseResponse {
    /// Whether the server produced a usable answer.
    pub success: bool,
    /// The human-readable message; feeds the next-check delay.
    pub message: String,
}

/// Session-scoped accessors over the marketplace endpoints.
pub struct MarketApi {
    transport: Arc<dyn Transport>,
    account: Account,
    send_gate: Mutex<()>,
    sending: AtomicBool,
}

impl MarketApi {
    /// Creates the API for one resolved session.
    pub fn new(transport: Arc<dyn Transport>, account: Account) -> Self {
        Self {
            transport,
            account,
            send_gate: Mutex::new(()),
            sending: AtomicBool::new(false),
        }
    }

    /// The session this API operates as.
    pub fn account(&self) -> &Account {
        &self.account
    }

    /// True while [`MarketApi::send_message`] holds the send gate.
    pub fn send_in_progress(&self) -> bool {
        self.sending.load(AtomicOrdering::SeqCst)
    }

    fn session_cookies(&self) -> [(&str, &str); 2] {
        [
            ("golden_key", self.account.golden_key.as_str()),
            ("PHPSESSID", self.account.session_id.as_str()),
        ]
    }

    /// Fetches the landing page and reads the profile snapshot off it.
    pub async fn account_info(&self) -> Result<AccountInfo, ModuleError> {
        let response = self
            .transport
            .get("/", &[], &[("golden_key", self.account.golden_key.as_str())])
            .await?;

        let user_id = parse::pages::parse_app_data(&response.body)
            .and_then(|data| data.get("userId").and_then(|v| v.as_i64()))
            .unwrap_or(0);
        let username = parse::pages::parse_username(&response.body).unwrap_or_default();
        let balance = parse::pages::parse_balances(&response.body)
            .into_iter()
            .next()
            .unwrap_or_else(Balance::zero);

        Ok(AccountInfo {
            user_id,
            username,
            balance,
        })
    }

    /// Scrapes the chat list page.
    pub async fn chats(&self) -> Result<Vec<ChatInfo>, ModuleError> {
        let response = self
            .transport
            .get("/chat/", &[], &self.session_cookies())
            .await?;
        Ok(parse::pages::parse_chat_list(&response.body))
    }

    /// Resolves a chat node id by counterparty name (case-insensitive).
    pub async fn chat_node_by_username(
        &self,
        username: &str,
    ) -> Result<Option<String>, ModuleError> {
        let chats = self.chats().await?;
        Ok(chats
            .into_iter()
            .find(|chat| chat.username.eq_ignore_ascii_case(username))
            .map(|chat| chat.node_id))
    }

    /// Fetches one chat and returns its newest message.
    pub async fn last_message(&self, chat_node: &str) -> Result<Option<ChatMessage>, ModuleError> {
        let path = format!("/chat/?node={chat_node}");
        let response = self
            .transport
            .get(&path, &[], &self.session_cookies())
            .await?;
        Ok(parse::pages::parse_last_message(&response.body))
    }

    /// Sends a chat message through the runner endpoint.
    ///
    /// Holds the send gate for the duration of the POST; the chat watcher
    /// checks [`MarketApi::send_in_progress`] and pauses its polling.
    pub async fn send_message(&self, chat_node: i64, content: &str) -> Result<(), ModuleError> {
        let request = json!({
            "action": "chat_message",
            "data": { "node": chat_node, "last_message": "-1", "content": content },
        });
        let objects = json!([{
            "type": "chat_node",
            "id": chat_node,
            "tag": "00000000",
            "data": { "node": chat_node, "last_message": "-1", "content": "" },
        }]);
        let objects = objects.to_string();
        let request = request.to_string();
        let form = [
            ("objects", objects.as_str()),
            ("request", request.as_str()),
            ("csrf_token", self.account.csrf_token.as_str()),
        ];

        let _gate = self.send_gate.lock().await;
        self.sending.store(true, AtomicOrdering::SeqCst);
        let result = self
            .transport
            .post_form("/runner/", &XHR_HEADERS, &self.session_cookies(), &form)
            .await;
        self.sending.store(false, AtomicOrdering::SeqCst);

        let response = result?;
        if !response.is_success() {
            return Err(ModuleError::Response {
                status: response.status,
                message: "runner rejected the message".to_string(),
            });
        }
        Ok(())
    }

    /// Scrapes the seller's trade table.
    pub async fn trade_orders(&self) -> Result<Vec<Order>, ModuleError> {
        let response = self
            .transport
            .get(
                "/orders/trade",
                &[],
                &[("golden_key", self.account.golden_key.as_str())],
            )
            .await?;
        Ok(parse::pages::parse_trade_orders(&response.body))
    }

    /// Scrapes the seller's profile reviews, newest first.
    pub async fn reviews(&self) -> Result<Vec<Review>, ModuleError> {
        let path = format!("/users/{}/", self.account.user_id);
        let response = self
            .transport
            .get(&path, &[], &self.session_cookies())
            .await?;
        Ok(parse::pages::parse_reviews(&response.body))
    }

    /// Raises every lot in a category.
    ///
    /// The endpoint answers JSON; a body with a `msg` field is a usable
    /// answer (the message still distinguishes "raised" from "wait"),
    /// anything else is reported as `success = false`.
    pub async fn raise_lots(
        &self,
        game_id: &str,
        node_id: &str,
    ) -> Result<RaiseResponse, ModuleError> {
        let referer = format!("https://funpay.com/lots/{node_id}/trade");
        let headers = [
            ("Accept", "application/json, text/javascript, */*; q=0.01"),
            (
                "Content-Type",
                "application/x-www-form-urlencoded; charset=UTF-8",
            ),
            ("X-Requested-With", "XMLHttpRequest"),
            ("Referer", referer.as_str()),
        ];
        let form = [("game_id", game_id), ("node_id", node_id)];

        let response = self
            .transport
            .post_form(
                "/lots/raise",
                &headers,
                &[("golden_key", self.account.golden_key.as_str())],
                &form,
            )
            .await?;

        let message = serde_json::from_str::<serde_json::Value>(&response.body)
            .ok()
            .and_then(|body| body.get("msg").and_then(|m| m.as_str()).map(str::to_string));

        match message {
            Some(message) => Ok(RaiseResponse {
                success: true,
                message,
            }),
            None => {
                debug!(node_id, status = response.status, "raise answer carried no msg");
                Ok(RaiseResponse {
                    success: false,
                    message: String::new(),
                })
            }
        }
    }

    /// Refunds an order to its buyer.
    pub async fn refund_order(&self, order_id: &str) -> Result<(), ModuleError> {
        let form = [
            ("id", order_id),
            ("csrf_token", self.account.csrf_token.as_str()),
        ];
        let response = self
            .transport
            .post_form(
                "/orders/refund",
                &XHR_HEADERS,
                &self.session_cookies(),
                &form,
            )
            .await?;
        if !response.is_success() {
            return Err(ModuleError::Response {
                status: response.status,
                message: format!("refund of order {order_id} was rejected"),
            });
        }
        Ok(())
    }
}
