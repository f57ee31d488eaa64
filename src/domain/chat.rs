//! Chat list entries and messages.

use serde::{Deserialize, Serialize};

/// One entry of the chat list page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatInfo {
    /// Chat node identifier.
    pub node_id: String,
    /// Counterparty display name.
    pub username: String,
    /// Preview of the newest message; empty for a silent chat.
    pub last_message: String,
}

/// One message inside a chat.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author display name.
    pub author: String,
    /// Message text.
    pub text: String,
}
