//! # Runtime configuration.
//!
//! Provides [`Config`] for the scheduler/application and [`HttpConfig`]
//! for the marketplace transport.
//!
//! Config is used in two ways:
//! 1. **Application creation**: `Application::connect(token, config)`
//! 2. **Standalone scheduler**: `Scheduler::new(config.tick_interval)`

use std::time::Duration;

/// Global configuration for the lotkeeper runtime.
///
/// ## Field semantics
/// - `tick_interval`: delay between scheduler tick rounds
/// - `http`: marketplace transport settings (base URL, UA, proxy, timeout)
#[derive(Clone, Debug)]
pub struct Config {
    /// Delay between scheduler tick rounds.
    ///
    /// Every round invokes `on_tick` on all running modules concurrently.
    /// Round pacing is independent of tick completion: round N+1 starts one
    /// interval after round N started, even if round N is still in flight.
    pub tick_interval: Duration,

    /// Marketplace transport settings.
    pub http: HttpConfig,
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `tick_interval = 10s` (the marketplace tolerates this cadence)
    /// - `http = HttpConfig::default()`
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(10),
            http: HttpConfig::default(),
        }
    }
}

/// Settings for the marketplace HTTP transport.
///
/// ## Field semantics
/// - `base_url`: origin all request paths are joined onto (no trailing slash)
/// - `user_agent`: sent with every request; the site rejects empty agents
/// - `proxy`: optional proxy URL (`http://`, `https://` or `socks5://`)
/// - `timeout`: per-request timeout
#[derive(Clone, Debug)]
pub struct HttpConfig {
    /// Origin all request paths are joined onto.
    pub base_url: String,

    /// User-Agent header sent with every request.
    pub user_agent: String,

    /// Optional proxy URL; `None` connects directly.
    pub proxy: Option<String>,

    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for HttpConfig {
    /// Default transport settings:
    ///
    /// - `base_url = "https://funpay.com"`
    /// - `user_agent = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)"`
    /// - `proxy = None`
    /// - `timeout = 30s`
    fn default() -> Self {
        Self {
            base_url: "https://funpay.com".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64)".to_string(),
            proxy: None,
            timeout: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.tick_interval, Duration::from_secs(10));
        assert_eq!(cfg.http.base_url, "https://funpay.com");
        assert!(cfg.http.proxy.is_none());
    }
}
