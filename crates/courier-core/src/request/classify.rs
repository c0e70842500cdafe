//! Response classification.
//!
//! Maps a failed transport outcome to a [`RequestError`]. First match wins:
//!
//! 1. status 0 → `AjaxError` (nothing reached the server)
//! 2. `parsererror` → `ParseError`
//! 3. anything else → `HttpError`
//!
//! Pipeline-level failures (client timeout, rejected by the caller's parser)
//! are built here too so every message string lives in one place.

use super::config::RequestConfig;
use super::params::Params;
use crate::config::ErrorMessages;
use crate::error::RequestError;
use crate::network::{TextStatus, TransportFailure, TransportOptions};
use reqwest::StatusCode;
use std::time::Duration;

/// Classify a failed transport call.
pub fn classify<T>(
    failure: &TransportFailure,
    config: &RequestConfig<T>,
    options: &TransportOptions,
) -> RequestError {
    if failure.status == 0 {
        return RequestError::Ajax {
            message: ErrorMessages::AJAX.to_string(),
            url: url_with_query(config.url(), config.data().map(|data| data.as_ref())),
            ajax_options: options.clone(),
        };
    }

    if failure.text_status == TextStatus::ParserError {
        return RequestError::Parse {
            message: failure
                .error_thrown
                .message()
                .unwrap_or(ErrorMessages::PARSE_FALLBACK)
                .to_string(),
            description: None,
            http_status: Some(failure.status),
            url: config.url().to_string(),
            ajax_options: options.clone(),
        };
    }

    let message = http_message(failure);
    RequestError::Http {
        description: format!("{} ({})", message, failure.status),
        message,
        http_status: failure.status,
        url: config.url().to_string(),
        ajax_options: options.clone(),
    }
}

/// Server-provided error text, falling back to the status reason phrase.
fn http_message(failure: &TransportFailure) -> String {
    if let Some(message) = failure.error_thrown.message() {
        return message.to_string();
    }
    StatusCode::from_u16(failure.status)
        .ok()
        .and_then(|status| status.canonical_reason())
        .unwrap_or(ErrorMessages::HTTP_FALLBACK)
        .to_string()
}

/// Error for a request whose client-side deadline elapsed.
pub fn timeout_error(url: &str, timeout: Duration) -> RequestError {
    RequestError::Timeout {
        message: ErrorMessages::TIMEOUT.to_string(),
        description: format!("Connection timed out after {} seconds", format_seconds(timeout)),
        url: url.to_string(),
    }
}

/// Error for a successful response that the caller's parser rejected.
pub fn unrecognized_response(url: &str, options: &TransportOptions) -> RequestError {
    RequestError::Parse {
        message: ErrorMessages::UNRECOGNIZED_RESPONSE.to_string(),
        description: Some(format!("Unrecognized response received from [{}]", url)),
        http_status: None,
        url: url.to_string(),
        ajax_options: options.clone(),
    }
}

/// Request URL with its parameters appended, for diagnostics.
///
/// Values are emitted as given; nothing is escaped.
pub fn url_with_query(url: &str, data: Option<&Params>) -> String {
    let query = data.map(Params::to_query_string).unwrap_or_default();
    if query.is_empty() {
        return url.to_string();
    }
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}{}", url, separator, query)
}

/// Whole seconds print without a fraction: 20000 ms → "20", 1500 ms → "1.5".
fn format_seconds(timeout: Duration) -> String {
    let seconds = timeout.as_millis() as f64 / 1000.0;
    format!("{}", seconds)
}
