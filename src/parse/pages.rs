//! # Page parsers.
//!
//! Pure `&str -> value` functions over the marketplace's HTML pages, so each
//! one unit-tests without a transport. Pages are cut into per-item segments
//! on the item's marker class, then scoped field patterns run inside each
//! segment; a segment missing a required field is skipped, matching how the
//! site omits fields on degenerate rows.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::domain::{Balance, ChatInfo, ChatMessage, Currency, Order, OrderStatus, Review};
use crate::parse::text::{extract, strip_tags, unescape};

static APP_DATA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"data-app-data="([^"]*)""#).expect("valid regex"));
static USERNAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<div class="user-link-name">(.*?)</div>"#).expect("valid regex"));
static BALANCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<span class="badge badge-balance">([\d.,]+)\s*([^\d\s<]+)</span>"#)
        .expect("valid regex")
});

static CHAT_NODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"data-id="(\d+)""#).expect("valid regex"));
static CHAT_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)class="media-user-name"[^>]*>(.*?)</div>"#).expect("valid regex")
});
static CHAT_PREVIEW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)class="contact-item-message"[^>]*>(.*?)</div>"#).expect("valid regex")
});

static MSG_AUTHOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)class="chat-msg-author-link"[^>]*>(.*?)</a>"#).expect("valid regex")
});
static MSG_TEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)class="chat-msg-text"[^>]*>(.*?)</div>"#).expect("valid regex")
});

static ORDER_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)class="tc-date-time"[^>]*>(.*?)</div>"#).expect("valid regex")
});
static ORDER_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"class="tc-order"[^>]*>#?([A-Za-z0-9]+)"#).expect("valid regex"));
static ORDER_DESC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)class="order-desc"[^>]*>\s*<div>(.*?)</div>"#).expect("valid regex")
});
static ORDER_CATEGORY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)class="order-desc".*?class="text-muted"[^>]*>(.*?)</div>"#)
        .expect("valid regex")
});
static ORDER_BUYER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)class="pseudo-a"[^>]*data-href="[^"]*?(\d+)/?"[^>]*>(.*?)</span>"#)
        .expect("valid regex")
});
static ORDER_STATUS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)class="tc-status[^"]*"[^>]*>(.*?)</div>"#).expect("valid regex")
});
static ORDER_PRICE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)class="tc-price[^"]*"[^>]*>(.*?)</div>"#).expect("valid regex")
});

static REVIEW_USER_DIV: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)class="review-item-user"[^>]*>(.*?)</div>"#).expect("valid regex")
});
static REVIEW_ORDER_DIV: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)class="review-item-order"[^>]*>(.*?)</div>"#).expect("valid regex")
});
static USER_ID_HREF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/users/(\d+)/?").expect("valid regex"));
static HREF: Lazy<Regex> = Lazy::new(|| Regex::new(r#"href="([^"]*)""#).expect("valid regex"));
static REVIEW_TEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)class="review-item-text"[^>]*>(.*?)</div>"#).expect("valid regex")
});
static REVIEW_RATING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"rating(\d)").expect("valid regex"));

// Item markers close the class name with a quote or a space so that longer
// class names sharing the prefix (contact-item-message, review-item-user)
// do not open a segment of their own.
static CHAT_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"class="contact-item[\s"]"#).expect("valid regex"));
static MSG_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"class="chat-msg-item[\s"]"#).expect("valid regex"));
static ORDER_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"class="tc-item[\s"]"#).expect("valid regex"));
static REVIEW_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"class="review-item[\s"]"#).expect("valid regex"));

/// Cuts a page into per-item segments: each segment runs from one marker
/// match to the next (the page prefix before the first item is dropped).
fn segments<'a>(html: &'a str, marker: &Regex) -> Vec<&'a str> {
    let starts: Vec<usize> = marker.find_iter(html).map(|m| m.start()).collect();
    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(html.len());
            &html[start..end]
        })
        .collect()
}

fn capture(segment: &str, re: &Regex) -> Option<String> {
    let raw = extract(segment, re, "");
    if raw.is_empty() {
        None
    } else {
        Some(strip_tags(&raw))
    }
}

/// Reads the embedded `data-app-data` JSON object off a page.
pub fn parse_app_data(html: &str) -> Option<Value> {
    let encoded = extract(html, &APP_DATA, "");
    if encoded.is_empty() {
        return None;
    }
    let value: Value = serde_json::from_str(&unescape(&encoded)).ok()?;
    value.is_object().then_some(value)
}

/// Reads the logged-in display name off a page header.
pub fn parse_username(html: &str) -> Option<String> {
    capture(html, &USERNAME)
}

/// Reads every balance badge off a page header.
pub fn parse_balances(html: &str) -> Vec<Balance> {
    BALANCE
        .captures_iter(html)
        .filter_map(|caps| {
            let amount: f64 = caps[1].replace(',', ".").parse().ok()?;
            Some(Balance {
                amount,
                currency: Currency::from_symbol(&caps[2]),
            })
        })
        .collect()
}

/// Parses the chat list page into its entries.
pub fn parse_chat_list(html: &str) -> Vec<ChatInfo> {
    segments(html, &CHAT_ITEM)
        .into_iter()
        .filter_map(|segment| {
            let node_id = extract(segment, &CHAT_NODE, "");
            let username = capture(segment, &CHAT_NAME)?;
            if node_id.is_empty() || username.is_empty() {
                return None;
            }
            let last_message = capture(segment, &CHAT_PREVIEW).unwrap_or_default();
            Some(ChatInfo {
                node_id,
                username,
                last_message,
            })
        })
        .collect()
}

/// Parses one chat page and returns its newest message.
pub fn parse_last_message(html: &str) -> Option<ChatMessage> {
    let last = segments(html, &MSG_ITEM).into_iter().last()?;
    let author = capture(last, &MSG_AUTHOR)?;
    let text = capture(last, &MSG_TEXT)?;
    Some(ChatMessage { author, text })
}

/// Parses the seller's trade table into order rows.
pub fn parse_trade_orders(html: &str) -> Vec<Order> {
    segments(html, &ORDER_ITEM)
        .into_iter()
        .filter_map(|segment| {
            let placed_at = capture(segment, &ORDER_DATE)?;
            let order_id = extract(segment, &ORDER_ID, "");
            if order_id.is_empty() {
                return None;
            }
            let description = capture(segment, &ORDER_DESC)?;
            let category = capture(segment, &ORDER_CATEGORY).unwrap_or_default();
            let buyer_caps = ORDER_BUYER.captures(segment)?;
            let buyer_id = buyer_caps[1].to_string();
            let buyer = strip_tags(&buyer_caps[2]);
            let status = OrderStatus::from_label(&capture(segment, &ORDER_STATUS)?);
            let amount: f64 = capture(segment, &ORDER_PRICE)?
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
                .collect::<String>()
                .replace(',', ".")
                .parse()
                .ok()?;

            Some(Order {
                order_id,
                description,
                category,
                buyer,
                buyer_id,
                status,
                amount,
                placed_at,
            })
        })
        .collect()
}

/// Parses the profile page into reviews, newest first (page order).
///
/// Identity prefers the order link; rows without one fall back to a
/// position-derived key.
pub fn parse_reviews(html: &str) -> Vec<Review> {
    segments(html, &REVIEW_ITEM)
        .into_iter()
        .enumerate()
        .filter_map(|(index, segment)| {
            let user_div = extract(segment, &REVIEW_USER_DIV, "");
            let user_id: i64 = extract(&user_div, &USER_ID_HREF, "").parse().ok()?;
            let order_div = extract(segment, &REVIEW_ORDER_DIV, "");
            let order_link = extract(&order_div, &HREF, "");
            let text = capture(segment, &REVIEW_TEXT).unwrap_or_default();
            let rating: u8 = extract(segment, &REVIEW_RATING, "0").parse().unwrap_or(0);
            let id = if order_link.is_empty() {
                format!("review-{index}")
            } else {
                order_link.clone()
            };
            Some(Review {
                id,
                user_id,
                order_link,
                text,
                rating,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAT_PAGE: &str = r#"
        <div class="contact-list">
          <a href="https://funpay.com/chat/?node=1289" class="contact-item" data-id="1289">
            <div class="media-user-name">buyer42</div>
            <div class="contact-item-message">привет</div>
          </a>
          <a href="https://funpay.com/chat/?node=555" class="contact-item" data-id="555">
            <div class="media-user-name">quiet_user</div>
            <div class="contact-item-message"></div>
          </a>
        </div>"#;

    const TRADE_PAGE: &str = r#"
        <a href="https://funpay.com/orders/ABC123F/" class="tc-item">
          <div class="tc-date"><div class="tc-date-time">сегодня, 12:34</div></div>
          <div class="tc-order">#ABC123F</div>
          <div class="order-desc"><div>Гемы 100 шт</div><div class="text-muted">Brawl Stars, Гемы</div></div>
          <div class="media-user-name"><span class="pseudo-a" data-href="https://funpay.com/users/123456/">buyer42</span></div>
          <div class="tc-status text-primary">Оплачен</div>
          <div class="tc-price">120,50 ₽</div>
        </a>
        <a href="https://funpay.com/orders/XYZ789/" class="tc-item">
          <div class="tc-date"><div class="tc-date-time">вчера, 09:10</div></div>
          <div class="tc-order">#XYZ789</div>
          <div class="order-desc"><div>Аккаунт</div><div class="text-muted">CS2</div></div>
          <div class="media-user-name"><span class="pseudo-a" data-href="https://funpay.com/users/777/">other</span></div>
          <div class="tc-status">Закрыт</div>
          <div class="tc-price">999.99 ₽</div>
        </a>"#;

    const PROFILE_PAGE: &str = r#"
        <div class="review-item">
          <div class="review-item-rating"><div class="rating"><div class="rating5"></div></div></div>
          <div class="review-item-user"><a href="https://funpay.com/users/123456/">buyer42</a></div>
          <div class="review-item-order"><a href="https://funpay.com/orders/ABC123F/">заказ</a></div>
          <div class="review-item-text">всё отлично</div>
        </div>
        <div class="review-item">
          <div class="review-item-rating"><div class="rating"><div class="rating4"></div></div></div>
          <div class="review-item-user"><a href="https://funpay.com/users/777/">other</a></div>
          <div class="review-item-order"></div>
          <div class="review-item-text">норм</div>
        </div>"#;

    #[test]
    fn test_app_data_extraction() {
        let html = r#"<body data-app-data="{&quot;userId&quot;:1184111,&quot;csrf-token&quot;:&quot;tok123&quot;}">"#;
        let data = parse_app_data(html).unwrap();
        assert_eq!(data["userId"].as_i64(), Some(1184111));
        assert_eq!(data["csrf-token"].as_str(), Some("tok123"));
        assert!(parse_app_data("<body>").is_none());
        assert!(parse_app_data(r#"<body data-app-data="not json">"#).is_none());
    }

    #[test]
    fn test_username_and_balance() {
        let html = r#"<div class="user-link-name">seller42</div>
            <span class="badge badge-balance">120,50 ₽</span>"#;
        assert_eq!(parse_username(html).as_deref(), Some("seller42"));
        let balances = parse_balances(html);
        assert_eq!(balances.len(), 1);
        assert_eq!(balances[0].amount, 120.5);
        assert_eq!(balances[0].currency, Currency::Rub);
    }

    #[test]
    fn test_chat_list() {
        let chats = parse_chat_list(CHAT_PAGE);
        assert_eq!(chats.len(), 2);
        assert_eq!(chats[0].node_id, "1289");
        assert_eq!(chats[0].username, "buyer42");
        assert_eq!(chats[0].last_message, "привет");
        assert_eq!(chats[1].node_id, "555");
        assert!(chats[1].last_message.is_empty());
    }

    #[test]
    fn test_last_message_takes_newest() {
        let html = r##"
            <div class="chat-msg-item">
              <a class="chat-msg-author-link" href="#">buyer42</a>
              <div class="chat-msg-text">первое</div>
            </div>
            <div class="chat-msg-item">
              <a class="chat-msg-author-link" href="#">seller42</a>
              <div class="chat-msg-text">второе</div>
            </div>"##;
        let msg = parse_last_message(html).unwrap();
        assert_eq!(msg.author, "seller42");
        assert_eq!(msg.text, "второе");
        assert!(parse_last_message("<div>empty chat</div>").is_none());
    }

    #[test]
    fn test_trade_orders() {
        let orders = parse_trade_orders(TRADE_PAGE);
        assert_eq!(orders.len(), 2);

        assert_eq!(orders[0].order_id, "ABC123F");
        assert_eq!(orders[0].description, "Гемы 100 шт");
        assert_eq!(orders[0].category, "Brawl Stars, Гемы");
        assert_eq!(orders[0].buyer, "buyer42");
        assert_eq!(orders[0].buyer_id, "123456");
        assert_eq!(orders[0].status, OrderStatus::Open);
        assert_eq!(orders[0].amount, 120.5);
        assert_eq!(orders[0].placed_at, "сегодня, 12:34");

        assert_eq!(orders[1].status, OrderStatus::Closed);
        assert_eq!(orders[1].amount, 999.99);
    }

    #[test]
    fn test_reviews_identity_prefers_order_link() {
        let reviews = parse_reviews(PROFILE_PAGE);
        assert_eq!(reviews.len(), 2);

        assert_eq!(reviews[0].id, "https://funpay.com/orders/ABC123F/");
        assert_eq!(reviews[0].user_id, 123456);
        assert_eq!(reviews[0].rating, 5);
        assert_eq!(reviews[0].text, "всё отлично");

        // no order link on the second row: falls back to the position key
        assert_eq!(reviews[1].id, "review-1");
        assert_eq!(reviews[1].rating, 4);
    }
}
