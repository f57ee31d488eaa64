//! # Session account and profile snapshot.
//!
//! [`Account`] holds the session credentials resolved from a `golden_key`
//! token; [`AccountInfo`] is the profile snapshot (username, balance) read
//! off the landing page.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::Transport;
use crate::domain::balance::Balance;
use crate::error::ModuleError;
use crate::parse;

/// Session credentials for one marketplace account.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Numeric user id from the page's embedded app data.
    pub user_id: i64,
    /// The `golden_key` session token.
    pub golden_key: String,
    /// `PHPSESSID` cookie harvested at resolution time; `"0"` when absent.
    pub session_id: String,
    /// CSRF token from the embedded app data; required for form posts.
    pub csrf_token: String,
    /// Display name, when the landing page exposed one.
    pub username: String,
}

impl Account {
    /// True when the session carries a real identity and session markers.
    ///
    /// An invalid account must stop the application before any module runs.
    pub fn is_valid(&self) -> bool {
        self.user_id != 0 && !self.golden_key.is_empty() && self.session_id != "0"
    }

    /// Resolves an account from a `golden_key` token.
    ///
    /// Fetches the landing page with the token cookie, reads the embedded
    /// `data-app-data` JSON for `userId` and `csrf-token`, and harvests the
    /// `PHPSESSID` cookie from the response.
    ///
    /// Returns `Ok(None)` when the token is blank or the page carries no
    /// usable app data (a dead token renders a logged-out page); `Err` only
    /// for transport failures.
    pub async fn from_token(
        transport: &dyn Transport,
        golden_key: &str,
    ) -> Result<Option<Account>, ModuleError> {
        if golden_key.trim().is_empty() {
            return Ok(None);
        }

        let response = transport
            .get("/", &[], &[("golden_key", golden_key)])
            .await?;

        let Some(app_data) = parse::pages::parse_app_data(&response.body) else {
            debug!("landing page carried no app data");
            return Ok(None);
        };
        let Some(user_id) = app_data.get("userId").and_then(|v| v.as_i64()) else {
            debug!("app data carried no userId");
            return Ok(None);
        };
        let csrf_token = app_data
            .get("csrf-token")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        let session_id = response
            .set_cookies
            .iter()
            .find_map(|header| cookie_value(header, "PHPSESSID"))
            .unwrap_or_else(|| "0".to_string());

        let username = parse::pages::parse_username(&response.body).unwrap_or_default();

        Ok(Some(Account {
            user_id,
            golden_key: golden_key.to_string(),
            session_id,
            csrf_token,
            username,
        }))
    }
}

/// Pulls `name`'s value out of one `Set-Cookie` header line.
fn cookie_value(header: &str, name: &str) -> Option<String> {
    let pair = header.split(';').next()?;
    let (key, value) = pair.split_once('=')?;
    if key.trim() == name {
        Some(value.trim().to_string())
    } else {
        None
    }
}

/// Profile snapshot read off the landing page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccountInfo {
    /// Numeric user id.
    pub user_id: i64,
    /// Display name.
    pub username: String,
    /// Primary balance badge.
    pub balance: Balance,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(user_id: i64, key: &str, session: &str) -> Account {
        Account {
            user_id,
            golden_key: key.to_string(),
            session_id: session.to_string(),
            csrf_token: "tok".to_string(),
            username: String::new(),
        }
    }

    #[test]
    fn test_validity_rules() {
        assert!(account(7, "key", "sess").is_valid());
        assert!(!account(0, "key", "sess").is_valid());
        assert!(!account(7, "", "sess").is_valid());
        assert!(!account(7, "key", "0").is_valid());
    }

    #[test]
    fn test_cookie_value_picks_named_cookie() {
        assert_eq!(
            cookie_value("PHPSESSID=abc123; path=/; HttpOnly", "PHPSESSID"),
            Some("abc123".to_string())
        );
        assert_eq!(cookie_value("other=zzz; path=/", "PHPSESSID"), None);
        assert_eq!(cookie_value("garbage", "PHPSESSID"), None);
    }
}
