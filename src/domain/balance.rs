//! Balance badge values.

use serde::{Deserialize, Serialize};

/// One balance badge: amount plus currency.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    /// Amount as rendered on the badge (decimal comma normalized).
    pub amount: f64,
    /// Badge currency.
    pub currency: Currency,
}

impl Balance {
    /// A zero ruble balance, used when the page carries no badge.
    pub fn zero() -> Self {
        Self {
            amount: 0.0,
            currency: Currency::Rub,
        }
    }
}

/// Currencies the marketplace renders on balance badges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    Rub,
    Usd,
    Eur,
    /// A symbol this client does not recognize.
    Unknown,
}

impl Currency {
    /// Maps a badge symbol to a currency.
    pub fn from_symbol(symbol: &str) -> Self {
        match symbol.trim() {
            "₽" | "руб" => Currency::Rub,
            "$" => Currency::Usd,
            "€" => Currency::Eur,
            _ => Currency::Unknown,
        }
    }
}
