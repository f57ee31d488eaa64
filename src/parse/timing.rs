//! # Raise-delay rule table.
//!
//! After a raise attempt the marketplace answers with a human-readable
//! message ("Подождите 2 часа", "wait 5 minutes"). [`raise_delay`] maps that
//! message to the next-check delay through a small rule table instead of
//! cascading conditionals, so the mapping unit-tests in isolation.
//!
//! ## Rules
//! - hour keyword → fixed one hour (the site never says how many)
//! - minute keyword → n × 60 s, where n is the first number in the message
//! - second keyword → n × 1 s
//! - keyword without a parseable number, unknown message, or empty message
//!   → [`DEFAULT_RETRY_DELAY`], so a malformed response can never tighten
//!   the poll loop
//!
//! Needles carry both the marketplace's Russian keywords and English
//! equivalents; matching is case-insensitive.

use std::time::Duration;

use crate::parse::text::extract_number;

/// Fallback delay when a response is unrecognized or an action failed.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(60);

struct Rule {
    needles: &'static [&'static str],
    unit: Duration,
    /// Fixed delay: ignore any number in the message.
    fixed: bool,
}

const RULES: &[Rule] = &[
    Rule {
        needles: &["час", "hour"],
        unit: Duration::from_secs(3600),
        fixed: true,
    },
    Rule {
        needles: &["минут", "minute"],
        unit: Duration::from_secs(60),
        fixed: false,
    },
    Rule {
        needles: &["секунд", "second"],
        unit: Duration::from_secs(1),
        fixed: false,
    },
];

/// Maps a raise response message to the delay before the next check.
pub fn raise_delay(message: &str) -> Duration {
    let msg = message.to_lowercase();
    for rule in RULES {
        if rule.needles.iter().any(|needle| msg.contains(needle)) {
            if rule.fixed {
                return rule.unit;
            }
            return match extract_number(&msg) {
                0 => DEFAULT_RETRY_DELAY,
                n => Duration::from_secs(rule.unit.as_secs().saturating_mul(n)),
            };
        }
    }
    DEFAULT_RETRY_DELAY
}

/// True when the message confirms a completed raise (as opposed to a
/// cooldown notice).
pub fn is_raise_confirmation(message: &str) -> bool {
    let msg = message.to_lowercase();
    msg.contains("подняты") || msg.contains("raised")
}
