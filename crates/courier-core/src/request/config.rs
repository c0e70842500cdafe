//! Per-request configuration.

use super::params::Params;
use crate::config::RequestDefaults;
use crate::network::{RawResponse, ResponseBody, Scheduler};
use anyhow::bail;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Turns a successful raw response into the value emitted by a request.
///
/// Returning an error (or panicking) is reported as an unrecognized
/// response.
pub type Parser<T> = Arc<dyn Fn(RawResponse) -> anyhow::Result<T> + Send + Sync>;

/// Configuration for a single JSON or XML request.
///
/// The default parser is the identity, so a fresh config yields
/// [`RawResponse`] values. Use [`RequestConfig::with_parser`] or
/// [`RequestConfig::parse_json`] to change the output type.
///
/// # Example
///
/// ```rust,ignore
/// use courier::{Params, RequestConfig};
/// use std::time::Duration;
///
/// let config = RequestConfig::new("https://jira.example.com/rest/api/2/search")
///     .with_data(Params::new().with("jql", "assignee=currentUser()"))
///     .with_auth_cookie("JSESSIONID")
///     .with_timeout(Duration::from_secs(10));
/// ```
pub struct RequestConfig<T = RawResponse> {
    pub(crate) url: String,
    pub(crate) data: Option<Arc<Params>>,
    pub(crate) username: Option<String>,
    pub(crate) password: Option<String>,
    pub(crate) parser: Parser<T>,
    pub(crate) auth_cookie: Option<String>,
    pub(crate) timeout: Duration,
    pub(crate) scheduler: Option<Arc<dyn Scheduler>>,
}

impl RequestConfig<RawResponse> {
    /// Config for `url` with the identity parser and the default timeout.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            data: None,
            username: None,
            password: None,
            parser: Arc::new(|raw: RawResponse| -> anyhow::Result<RawResponse> { Ok(raw) }),
            auth_cookie: None,
            timeout: RequestDefaults::TIMEOUT,
            scheduler: None,
        }
    }
}

impl<T> RequestConfig<T> {
    /// Request parameters. The same `Arc` is handed to the transport.
    pub fn with_data(mut self, data: impl Into<Arc<Params>>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// HTTP Basic credentials.
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Basic username; the password defaults to empty.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Basic password; the username defaults to empty.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Session cookie cleared when the server answers 401.
    pub fn with_auth_cookie(mut self, name: impl Into<String>) -> Self {
        self.auth_cookie = Some(name.into());
        self
    }

    /// Client-side deadline for each attempt.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Scheduler used for the timeout instead of the client's.
    pub fn with_scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Replace the parser, changing the emitted value type.
    pub fn with_parser<U, F>(self, parser: F) -> RequestConfig<U>
    where
        F: Fn(RawResponse) -> anyhow::Result<U> + Send + Sync + 'static,
    {
        RequestConfig {
            url: self.url,
            data: self.data,
            username: self.username,
            password: self.password,
            parser: Arc::new(parser),
            auth_cookie: self.auth_cookie,
            timeout: self.timeout,
            scheduler: self.scheduler,
        }
    }

    /// Deserialize the JSON body into `U`.
    pub fn parse_json<U>(self) -> RequestConfig<U>
    where
        U: DeserializeOwned,
    {
        self.with_parser(|raw: RawResponse| match raw.body {
            ResponseBody::Json(value) => Ok(serde_json::from_value(value)?),
            ResponseBody::Xml(_) => bail!("expected a JSON body, got XML"),
        })
    }

    /// Target URL, without parameters.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Shared request parameters.
    pub fn data(&self) -> Option<&Arc<Params>> {
        self.data.as_ref()
    }

    /// Basic auth username.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Basic auth password.
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// Name of the session cookie cleared on 401.
    pub fn auth_cookie(&self) -> Option<&str> {
        self.auth_cookie.as_deref()
    }

    /// Deadline applied to each attempt.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Per-request scheduler override.
    pub fn scheduler(&self) -> Option<&Arc<dyn Scheduler>> {
        self.scheduler.as_ref()
    }

    pub(crate) fn parser(&self) -> &Parser<T> {
        &self.parser
    }
}

impl<T> Clone for RequestConfig<T> {
    fn clone(&self) -> Self {
        Self {
            url: self.url.clone(),
            data: self.data.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            parser: Arc::clone(&self.parser),
            auth_cookie: self.auth_cookie.clone(),
            timeout: self.timeout,
            scheduler: self.scheduler.clone(),
        }
    }
}

impl<T> fmt::Debug for RequestConfig<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestConfig")
            .field("url", &self.url)
            .field("data", &self.data)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("auth_cookie", &self.auth_cookie)
            .field("timeout", &self.timeout)
            .field("scheduler", &self.scheduler.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn test_defaults() {
        let config = RequestConfig::new("http://sample.com");
        assert_eq!(config.url(), "http://sample.com");
        assert_eq!(config.timeout(), Duration::from_millis(20_000));
        assert!(config.data().is_none());
        assert!(config.auth_cookie().is_none());
        assert!(config.scheduler().is_none());
    }

    #[test]
    fn test_identity_parser() {
        let config = RequestConfig::new("http://sample.com");
        let raw = RawResponse::json(serde_json::json!({"data": {}}));
        assert_eq!((config.parser())(raw.clone()).unwrap(), raw);
    }

    #[test]
    fn test_parse_json() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Issue {
            key: String,
        }

        let config = RequestConfig::new("http://sample.com").parse_json::<Issue>();
        let parsed = (config.parser())(RawResponse::json(serde_json::json!({"key": "ABC-1"})));
        assert_eq!(parsed.unwrap(), Issue { key: "ABC-1".into() });

        assert!((config.parser())(RawResponse::json(serde_json::json!([]))).is_err());
        assert!((config.parser())(RawResponse::xml("<a/>")).is_err());
    }

    #[test]
    fn test_with_parser_keeps_settings() {
        let data = Arc::new(Params::new().with("a", "b"));
        let config = RequestConfig::new("http://sample.com")
            .with_data(Arc::clone(&data))
            .with_auth_cookie("JSESSIONID")
            .with_timeout(Duration::from_secs(3))
            .with_parser(|_| Ok(42u32));

        assert!(Arc::ptr_eq(config.data().unwrap(), &data));
        assert_eq!(config.auth_cookie(), Some("JSESSIONID"));
        assert_eq!(config.timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_debug_masks_password() {
        let config = RequestConfig::new("http://sample.com").with_credentials("user", "secret");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("user"));
    }
}
