//! Cookie store contract and an in-memory implementation.
//!
//! The request pipeline only needs to remove a session cookie after an
//! authentication failure. [`CookieStore::remove`] starts the removal right
//! away and returns a future that resolves when the store has finished; the
//! pipeline never waits on it.

use cookie::time::{Duration as CookieDuration, OffsetDateTime};
use cookie::Cookie;
use futures::future::{self, BoxFuture};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;
use tracing::debug;

/// Identifies a cookie by the URL it applies to and its name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CookieDetails {
    pub url: String,
    pub name: String,
}

impl CookieDetails {
    /// Details for the cookie `name` applying to `url`.
    pub fn new(url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: name.into(),
        }
    }
}

/// Errors reported by a cookie store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CookieError {
    #[error("Invalid cookie URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Invalid Set-Cookie header: {0}")]
    InvalidHeader(String),

    #[error("Cookie store unavailable: {0}")]
    Unavailable(String),
}

/// Host cookie store.
pub trait CookieStore: Send + Sync {
    /// Begin removing a cookie. The returned future reports completion.
    fn remove(&self, details: CookieDetails) -> BoxFuture<'static, Result<(), CookieError>>;
}

/// Shared cookie store handle.
pub type DynCookieStore = Arc<dyn CookieStore>;

/// Extract the cookie domain (host) from a URL.
pub fn cookie_domain(url: &str) -> Result<String, CookieError> {
    let parsed = url::Url::parse(url).map_err(|e| CookieError::InvalidUrl {
        url: url.to_string(),
        message: e.to_string(),
    })?;
    parsed
        .host_str()
        .map(|host| host.to_ascii_lowercase())
        .ok_or_else(|| CookieError::InvalidUrl {
            url: url.to_string(),
            message: "URL has no host".to_string(),
        })
}

/// Process-local cookie jar keyed by host and cookie name.
///
/// Removal completes synchronously, so the cookie is gone by the time
/// [`CookieStore::remove`] returns.
#[derive(Debug, Default)]
pub struct MemoryCookieStore {
    cookies: RwLock<HashMap<String, HashMap<String, String>>>,
}

impl MemoryCookieStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a cookie for the host of `url`, replacing any previous value.
    pub fn insert(
        &self,
        url: &str,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), CookieError> {
        let domain = cookie_domain(url)?;
        let mut cookies = self.cookies.write().unwrap_or_else(PoisonError::into_inner);
        cookies
            .entry(domain)
            .or_default()
            .insert(name.into(), value.into());
        Ok(())
    }

    /// Apply a `Set-Cookie` header received from `url`.
    ///
    /// A cookie with `Max-Age` of zero or less, or an `Expires` date in the
    /// past, is removed instead of stored.
    pub fn apply_set_cookie(&self, url: &str, header: &str) -> Result<(), CookieError> {
        let domain = cookie_domain(url)?;
        let parsed = Cookie::parse(header).map_err(|e| CookieError::InvalidHeader(e.to_string()))?;
        let mut cookies = self.cookies.write().unwrap_or_else(PoisonError::into_inner);

        if is_expired(&parsed) {
            debug!("Cookie {} for {} expired by server", parsed.name(), domain);
            if let Some(jar) = cookies.get_mut(&domain) {
                jar.remove(parsed.name());
            }
        } else {
            debug!("Storing cookie {} for {}", parsed.name(), domain);
            cookies
                .entry(domain)
                .or_default()
                .insert(parsed.name().to_string(), parsed.value().to_string());
        }
        Ok(())
    }

    /// Value of the cookie `name` for the host of `url`.
    pub fn get(&self, url: &str, name: &str) -> Option<String> {
        let domain = cookie_domain(url).ok()?;
        let cookies = self.cookies.read().unwrap_or_else(PoisonError::into_inner);
        cookies.get(&domain).and_then(|jar| jar.get(name)).cloned()
    }

    /// `Cookie` header value for a URL, names sorted for stable output.
    pub fn cookie_header(&self, url: &str) -> Option<String> {
        let domain = cookie_domain(url).ok()?;
        let cookies = self.cookies.read().unwrap_or_else(PoisonError::into_inner);
        let jar = cookies.get(&domain).filter(|jar| !jar.is_empty())?;

        let mut pairs: Vec<_> = jar.iter().collect();
        pairs.sort();
        Some(
            pairs
                .into_iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// Number of cookies across all domains.
    pub fn len(&self) -> usize {
        let cookies = self.cookies.read().unwrap_or_else(PoisonError::into_inner);
        cookies.values().map(HashMap::len).sum()
    }

    /// Whether no cookie is stored for any domain.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn remove_now(&self, details: &CookieDetails) -> Result<bool, CookieError> {
        let domain = cookie_domain(&details.url)?;
        let mut cookies = self.cookies.write().unwrap_or_else(PoisonError::into_inner);
        let removed = cookies
            .get_mut(&domain)
            .map(|jar| jar.remove(&details.name).is_some())
            .unwrap_or(false);
        Ok(removed)
    }
}

/// `Max-Age` takes precedence over `Expires`.
fn is_expired(cookie: &Cookie<'_>) -> bool {
    if let Some(max_age) = cookie.max_age() {
        return max_age <= CookieDuration::ZERO;
    }
    cookie
        .expires_datetime()
        .is_some_and(|expires| expires <= OffsetDateTime::now_utc())
}

impl CookieStore for MemoryCookieStore {
    fn remove(&self, details: CookieDetails) -> BoxFuture<'static, Result<(), CookieError>> {
        let result = self.remove_now(&details).map(|removed| {
            debug!(
                "Cookie {} for {} {}",
                details.name,
                details.url,
                if removed { "removed" } else { "was not set" }
            );
        });
        Box::pin(future::ready(result))
    }
}
