//! Trade order rows.

use serde::{Deserialize, Serialize};

/// One row of the seller's trade table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Order identifier without the leading `#`.
    pub order_id: String,
    /// Listing description.
    pub description: String,
    /// Category label under the description.
    pub category: String,
    /// Buyer display name.
    pub buyer: String,
    /// Buyer numeric id.
    pub buyer_id: String,
    /// Current status.
    pub status: OrderStatus,
    /// Order amount (currency symbol stripped, decimal comma normalized).
    pub amount: f64,
    /// Raw date label as rendered by the site (e.g. "сегодня, 12:34").
    pub placed_at: String,
}

/// Trade order status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Paid and awaiting fulfilment.
    Open,
    /// Completed.
    Closed,
    /// Money returned to the buyer.
    Refund,
}

impl OrderStatus {
    /// Maps the site's status label to a status.
    ///
    /// Unrecognized labels map to `Closed`, the terminal state.
    pub fn from_label(text: &str) -> Self {
        let text = text.trim();
        if text.eq_ignore_ascii_case("Оплачен") {
            OrderStatus::Open
        } else if text.eq_ignore_ascii_case("Возврат") {
            OrderStatus::Refund
        } else {
            OrderStatus::Closed
        }
    }
}
