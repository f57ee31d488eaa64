//! # System chat notice recognition.
//!
//! The marketplace injects automated notices into chats (order paid, order
//! confirmed, review left, refund issued). The chat watcher uses
//! [`is_system_message`] to avoid announcing a brand-new chat for what is
//! only an automated notice.
//!
//! Patterns are anchored full-line matches over the site's Russian notice
//! templates.

use once_cell::sync::Lazy;
use regex::Regex;

macro_rules! notice {
    ($name:ident, $pattern:literal) => {
        static $name: Lazy<Regex> =
            Lazy::new(|| Regex::new($pattern).expect("valid regex"));
    };
}

notice!(
    ORDER_OPENED,
    r"^Покупатель\p{Zs}+\w+\p{Zs}+оплатил\p{Zs}+заказ\p{Zs}+#[A-Z0-9]+\.$"
);
notice!(
    ORDER_CONFIRMED,
    r"^Покупатель\p{Zs}+\w+\p{Zs}+подтвердил\p{Zs}+успешное\p{Zs}+выполнение\p{Zs}+заказа\p{Zs}+#[A-Z0-9]+\p{Zs}+и\p{Zs}+отправил\p{Zs}+деньги\p{Zs}+продавцу\p{Zs}+\w+\.$"
);
notice!(
    ORDER_REVIEW,
    r"^Покупатель\p{Zs}+\w+\p{Zs}+написал\p{Zs}+отзыв\p{Zs}+к\p{Zs}+заказу\p{Zs}+#[A-Z0-9]+\.$"
);
notice!(
    ORDER_REVIEW_EDITED,
    r"^Покупатель\p{Zs}+\w+\p{Zs}+изменил\p{Zs}+отзыв\p{Zs}+к\p{Zs}+заказу\p{Zs}+#[A-Z0-9]+\.$"
);
notice!(
    ORDER_REVIEW_DELETED,
    r"^Покупатель\p{Zs}+\w+\p{Zs}+удалил\p{Zs}+отзыв\p{Zs}+к\p{Zs}+заказу\p{Zs}+#[A-Z0-9]+\.$"
);
notice!(
    SELLER_REPLIED_TO_REVIEW,
    r"^Продавец\p{Zs}+\w+\p{Zs}+ответил\p{Zs}+на\p{Zs}+отзыв\p{Zs}+к\p{Zs}+заказу\p{Zs}+#[A-Z0-9]+\.$"
);
notice!(
    ORDER_REFUNDED,
    r"^Продавец\p{Zs}+\w+\p{Zs}+вернул\p{Zs}+деньги\p{Zs}+покупателю\p{Zs}+\w+\p{Zs}+по\p{Zs}+заказу\p{Zs}+#[A-Z0-9]+\.$"
);

static NOTICES: Lazy<[&'static Regex; 7]> = Lazy::new(|| {
    [
        &ORDER_OPENED,
        &ORDER_CONFIRMED,
        &ORDER_REVIEW,
        &ORDER_REVIEW_EDITED,
        &ORDER_REVIEW_DELETED,
        &SELLER_REPLIED_TO_REVIEW,
        &ORDER_REFUNDED,
    ]
});

/// True when `text` is one of the marketplace's automated chat notices.
pub fn is_system_message(text: &str) -> bool {
    let text = text.trim();
    NOTICES.iter().any(|pattern| pattern.is_match(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_opened_notice() {
        assert!(is_system_message("Покупатель buyer42 оплатил заказ #ABC123F."));
    }

    #[test]
    fn test_order_confirmed_notice() {
        assert!(is_system_message(
            "Покупатель buyer42 подтвердил успешное выполнение заказа #ABC123F и отправил деньги продавцу seller."
        ));
    }

    #[test]
    fn test_refund_notice() {
        assert!(is_system_message(
            "Продавец seller вернул деньги покупателю buyer42 по заказу #ABC123F."
        ));
    }

    #[test]
    fn test_human_text_is_not_a_notice() {
        assert!(!is_system_message("привет, лот ещё актуален?"));
        assert!(!is_system_message("hello there"));
        assert!(!is_system_message(""));
    }
}
