//! # HTTP transport boundary.
//!
//! [`Transport`] is the seam between the polling modules and the network:
//! plain GETs and form POSTs with explicit headers and cookies, returning
//! the body as text plus any `Set-Cookie` headers. [`HttpTransport`] is the
//! reqwest-backed production implementation; tests substitute a canned
//! transport behind the same trait.
//!
//! Implementations must not panic; every failure surfaces as a
//! [`ModuleError`].

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, COOKIE, SET_COOKIE, USER_AGENT};

use crate::config::HttpConfig;
use crate::error::{ModuleError, RuntimeError};

/// One HTTP response, reduced to what the scrapers consume.
#[derive(Clone, Debug)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Body decoded as text.
    pub body: String,
    /// Raw `Set-Cookie` header values, in response order.
    pub set_cookies: Vec<String>,
}

impl Response {
    /// True for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP capability consumed by the marketplace API and session resolution.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Performs a GET request against a path on the marketplace origin.
    async fn get(
        &self,
        path: &str,
        headers: &[(&str, &str)],
        cookies: &[(&str, &str)],
    ) -> Result<Response, ModuleError>;

    /// Performs a form-encoded POST request.
    async fn post_form(
        &self,
        path: &str,
        headers: &[(&str, &str)],
        cookies: &[(&str, &str)],
        form: &[(&str, &str)],
    ) -> Result<Response, ModuleError>;
}

/// reqwest-backed transport.
///
/// Cookies are rendered into a single `Cookie` header per request; the
/// configured User-Agent is always sent.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    user_agent: String,
}

impl HttpTransport {
    /// Builds the transport from [`HttpConfig`].
    ///
    /// Fails when the proxy URL is malformed or the TLS backend cannot
    /// initialize.
    pub fn new(config: &HttpConfig) -> Result<Self, RuntimeError> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .gzip(true);
        if let Some(proxy) = &config.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy.as_str())?);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
        })
    }

    fn header_map(
        &self,
        headers: &[(&str, &str)],
        cookies: &[(&str, &str)],
    ) -> Result<HeaderMap, ModuleError> {
        let mut map = HeaderMap::new();
        map.insert(
            USER_AGENT,
            HeaderValue::from_str(&self.user_agent)
                .map_err(|_| ModuleError::failed("user agent is not a valid header value"))?,
        );
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ModuleError::failed(format!("invalid header name {name:?}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| ModuleError::failed(format!("invalid header value for {name:?}")))?;
            map.insert(name, value);
        }
        if !cookies.is_empty() {
            let rendered = cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; ");
            map.insert(
                COOKIE,
                HeaderValue::from_str(&rendered)
                    .map_err(|_| ModuleError::failed("cookie is not a valid header value"))?,
            );
        }
        Ok(map)
    }

    async fn finish(response: reqwest::Response) -> Result<Response, ModuleError> {
        let status = response.status().as_u16();
        let set_cookies = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok().map(str::to_string))
            .collect();
        let body = response.text().await?;
        Ok(Response {
            status,
            body,
            set_cookies,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(
        &self,
        path: &str,
        headers: &[(&str, &str)],
        cookies: &[(&str, &str)],
    ) -> Result<Response, ModuleError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .headers(self.header_map(headers, cookies)?)
            .send()
            .await?;
        Self::finish(response).await
    }

    async fn post_form(
        &self,
        path: &str,
        headers: &[(&str, &str)],
        cookies: &[(&str, &str)],
        form: &[(&str, &str)],
    ) -> Result<Response, ModuleError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .headers(self.header_map(headers, cookies)?)
            .form(form)
            .send()
            .await?;
        Self::finish(response).await
    }
}
