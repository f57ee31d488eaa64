//! Lot category identity.

use serde::{Deserialize, Serialize};

/// A raisable lot category.
///
/// Identity is the `node_id`; the raise endpoint needs both ids. The
/// per-category recheck schedule lives in the raising module, not here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Game identifier the category belongs to.
    pub game_id: String,
    /// Category node identifier.
    pub node_id: String,
    /// Human-readable category name.
    pub name: String,
}

impl Category {
    /// Creates a category.
    pub fn new(
        game_id: impl Into<String>,
        node_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            game_id: game_id.into(),
            node_id: node_id.into(),
            name: name.into(),
        }
    }
}
