//! Centralized configuration for courier.
//!
//! This module provides the constants used by the request pipeline: default
//! timings, transport identification, and the fixed diagnostic messages that
//! callers match on.

use std::time::Duration;

/// Request-level defaults.
pub struct RequestDefaults;

impl RequestDefaults {
    /// Client-side deadline applied to every attempt unless overridden.
    pub const TIMEOUT: Duration = Duration::from_millis(20_000);
    /// Attempts made for a request that keeps failing with 401 (first + retry).
    pub const AUTH_ATTEMPTS: u32 = 2;
    /// Status code that triggers the session-cookie retry.
    pub const AUTH_FAILURE_STATUS: u16 = 401;
    pub const USER_AGENT: &'static str = "courier/0.1";
    /// Query key used to defeat HTTP caches when `cache` is disabled.
    pub const CACHE_BUSTER_KEY: &'static str = "_";
}

/// Fixed message strings carried by [`crate::RequestError`].
pub struct ErrorMessages;

impl ErrorMessages {
    pub const AJAX: &'static str = "Ajax connection error";
    pub const TIMEOUT: &'static str = "Timeout";
    pub const UNRECOGNIZED_RESPONSE: &'static str = "Unrecognized response";
    pub const HTTP_FALLBACK: &'static str = "HTTP request failed";
    pub const PARSE_FALLBACK: &'static str = "Response could not be parsed";
}
