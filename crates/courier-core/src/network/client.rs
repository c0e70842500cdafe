//! HTTP transport built on reqwest.
//!
//! Provides the default [`Transport`] with:
//! - Query-string encoding of request parameters
//! - Cache busting when `cache` is disabled
//! - XHR-style failure reporting (status 0 for connection errors,
//!   `parsererror` for undecodable bodies)
//! - Optional session cookies from a [`MemoryCookieStore`]
//!
//! No transport-level timeout is configured; deadlines belong to the
//! request pipeline.

use super::cookies::MemoryCookieStore;
use super::transport::{
    DataType, ErrorThrown, RawResponse, ResponseBody, TextStatus, Transport, TransportFailure,
    TransportOptions,
};
use crate::config::RequestDefaults;
use crate::error::Result;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, ACCEPT, COOKIE, SET_COOKIE};
use reqwest::{Client, StatusCode};
use roxmltree::{Document, ParsingOptions};
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

/// Default transport performing real HTTP requests.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    cookies: Option<Arc<MemoryCookieStore>>,
}

impl ReqwestTransport {
    /// Create a transport with the default user agent.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(RequestDefaults::USER_AGENT)
            .build()?;
        Ok(Self::with_client(client))
    }

    /// Wrap an existing reqwest client.
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            cookies: None,
        }
    }

    /// Send cookies from `store` and record cookies set by responses.
    pub fn with_cookie_store(mut self, store: Arc<MemoryCookieStore>) -> Self {
        self.cookies = Some(store);
        self
    }

    /// Get a reference to the underlying reqwest client.
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Final request URL: parameters appended to the query, plus the cache
    /// buster when caching is disabled.
    pub fn request_url(options: &TransportOptions) -> std::result::Result<Url, TransportFailure> {
        let mut url = Url::parse(&options.url).map_err(|e| {
            TransportFailure::connection(format!("Invalid URL {}: {}", options.url, e))
        })?;

        let has_params = options.data.as_ref().is_some_and(|data| !data.is_empty());
        if has_params || !options.cache {
            let mut query = url.query_pairs_mut();
            if let Some(data) = &options.data {
                for (key, value) in data.pairs() {
                    query.append_pair(key, value);
                }
            }
            if !options.cache {
                query.append_pair(
                    RequestDefaults::CACHE_BUSTER_KEY,
                    &chrono::Utc::now().timestamp_millis().to_string(),
                );
            }
        }

        Ok(url)
    }

    fn store_cookies(&self, url: &Url, headers: &HeaderMap) {
        let Some(store) = &self.cookies else {
            return;
        };

        for value in headers.get_all(SET_COOKIE) {
            let Ok(value) = value.to_str() else {
                continue;
            };
            if let Err(e) = store.apply_set_cookie(url.as_str(), value) {
                warn!("Ignoring cookie from {}: {}", url, e);
            }
        }
    }
}

/// Decode a successful body according to the expected data type.
pub fn decode_body(data_type: DataType, text: &str) -> std::result::Result<ResponseBody, String> {
    match data_type {
        DataType::Json => serde_json::from_str(text)
            .map(ResponseBody::Json)
            .map_err(|e| e.to_string()),
        DataType::Xml => {
            let mut options = ParsingOptions::default();
            options.allow_dtd = true;
            Document::parse_with_options(text, options)
                .map(|_| ResponseBody::Xml(text.to_string()))
                .map_err(|e| format!("Invalid XML: {}", e))
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        options: TransportOptions,
    ) -> std::result::Result<RawResponse, TransportFailure> {
        let url = Self::request_url(&options)?;

        let mut request = self
            .client
            .request(options.method.clone(), url.clone())
            .header(ACCEPT, options.data_type.accept_header());
        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(cookie) = self
            .cookies
            .as_ref()
            .and_then(|store| store.cookie_header(url.as_str()))
        {
            request = request.header(COOKIE, cookie);
        }

        let response = request.send().await.map_err(|e| {
            warn!("{} {} failed: {}", options.method, options.url, e);
            TransportFailure::connection(e.to_string())
        })?;

        let status = response.status();
        self.store_cookies(&url, response.headers());

        let text = response.text().await.map_err(|e| {
            warn!("Failed to read response body from {}: {}", options.url, e);
            TransportFailure::new(status.as_u16()).with_error_thrown(ErrorThrown::Text(e.to_string()))
        })?;

        if !status.is_success() {
            debug!("{} {} returned {}", options.method, options.url, status);
            return Err(TransportFailure::new(status.as_u16())
                .with_response_text(text)
                .with_error_thrown(ErrorThrown::Text(reason_phrase(status))));
        }

        match decode_body(options.data_type, &text) {
            Ok(body) => Ok(RawResponse::new(body)),
            Err(message) => {
                debug!("Body from {} is not valid {}: {}", options.url, options.data_type, message);
                Err(TransportFailure::new(status.as_u16())
                    .with_text_status(TextStatus::ParserError)
                    .with_response_text(text)
                    .with_error_thrown(ErrorThrown::Exception { message }))
            }
        }
    }
}

fn reason_phrase(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or("error").to_string()
}
