//! # Text extraction helpers.
//!
//! Small pure functions shared by the page parsers: first-capture-group
//! extraction, first-number extraction, HTML entity unescaping, and tag
//! stripping for captured fragments.

use once_cell::sync::Lazy;
use regex::Regex;

static FIRST_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)").expect("valid regex"));
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

/// Returns the first capture group of `re` in `text`, or `default`.
pub fn extract(text: &str, re: &Regex, default: &str) -> String {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| default.to_string())
}

/// Returns the first unsigned number in `text`, or 0.
pub fn extract_number(text: &str) -> u64 {
    FIRST_NUMBER
        .find(text)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// Unescapes the handful of HTML entities the marketplace emits inside
/// attribute values (`data-app-data` in particular).
pub fn unescape(text: &str) -> String {
    text.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Drops tags from an HTML fragment and collapses whitespace, roughly what
/// a DOM `.text()` call would return for the fragment.
pub fn strip_tags(fragment: &str) -> String {
    let without_tags = TAG.replace_all(fragment, " ");
    without_tags.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_first_group() {
        let re = Regex::new(r"node=(\d+)").unwrap();
        assert_eq!(extract("href=/chat/?node=1289", &re, ""), "1289");
        assert_eq!(extract("no match here", &re, "fallback"), "fallback");
    }

    #[test]
    fn test_extract_number() {
        assert_eq!(extract_number("подождите 17 минут"), 17);
        assert_eq!(extract_number("no digits"), 0);
    }

    #[test]
    fn test_unescape_entities() {
        assert_eq!(
            unescape("{&quot;userId&quot;:7,&quot;a&quot;:&quot;x&amp;y&quot;}"),
            r#"{"userId":7,"a":"x&y"}"#
        );
    }

    #[test]
    fn test_strip_tags_collapses_whitespace() {
        assert_eq!(
            strip_tags("<div>  hello <b>world</b>\n</div>"),
            "hello world"
        );
    }
}
