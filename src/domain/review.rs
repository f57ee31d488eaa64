//! Profile reviews.

use serde::{Deserialize, Serialize};

/// One review from the seller's profile page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Stable identity: the order link when present, otherwise a
    /// position-derived key.
    pub id: String,
    /// Reviewer's numeric user id.
    pub user_id: i64,
    /// Link to the reviewed order; empty when the site hides it.
    pub order_link: String,
    /// Review text.
    pub text: String,
    /// Star rating 1-5; 0 when not rendered.
    pub rating: u8,
}
