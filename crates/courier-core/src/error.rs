//! Error types for courier.
//!
//! [`RequestError`] is the only error a request subscriber ever sees. Every
//! transport failure, client timeout and parser failure is classified into
//! one of its four kinds. The serialized form mirrors the shape the extension
//! UI expects (`name`, `message`, `description`, `httpStatus`, `url`,
//! `ajaxOptions`).
//!
//! [`CourierError`] covers setup failures that happen outside a request, such
//! as building the HTTP client.

use crate::network::TransportOptions;
use serde::Serialize;
use thiserror::Error;

/// Classified failure delivered on a request's error channel.
#[derive(Debug, Clone, Error, Serialize)]
#[serde(tag = "name")]
pub enum RequestError {
    /// No HTTP response was received (transport status 0).
    #[error("{message} [{url}]")]
    #[serde(rename = "AjaxError", rename_all = "camelCase")]
    Ajax {
        message: String,
        /// Request URL including the serialized query parameters.
        url: String,
        ajax_options: TransportOptions,
    },

    /// The client-side deadline elapsed before the transport settled.
    #[error("{description} [{url}]")]
    #[serde(rename = "TimeoutError", rename_all = "camelCase")]
    Timeout {
        message: String,
        description: String,
        url: String,
    },

    /// The server answered with a failure status.
    #[error("{description} [{url}]")]
    #[serde(rename = "HttpError", rename_all = "camelCase")]
    Http {
        message: String,
        description: String,
        http_status: u16,
        url: String,
        ajax_options: TransportOptions,
    },

    /// The body, or the caller's parser, could not interpret the response.
    #[error("{message} [{url}]")]
    #[serde(rename = "ParseError", rename_all = "camelCase")]
    Parse {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        http_status: Option<u16>,
        url: String,
        ajax_options: TransportOptions,
    },
}

impl RequestError {
    /// Kind name as exposed to the extension UI.
    pub fn name(&self) -> &'static str {
        match self {
            RequestError::Ajax { .. } => "AjaxError",
            RequestError::Timeout { .. } => "TimeoutError",
            RequestError::Http { .. } => "HttpError",
            RequestError::Parse { .. } => "ParseError",
        }
    }

    /// Short message, fixed for all kinds except HttpError and transport ParseError.
    pub fn message(&self) -> &str {
        match self {
            RequestError::Ajax { message, .. }
            | RequestError::Timeout { message, .. }
            | RequestError::Http { message, .. }
            | RequestError::Parse { message, .. } => message,
        }
    }

    /// Human-readable detail line, absent for connection errors and
    /// transport-level parse errors.
    pub fn description(&self) -> Option<&str> {
        match self {
            RequestError::Ajax { .. } => None,
            RequestError::Timeout { description, .. } | RequestError::Http { description, .. } => {
                Some(description)
            }
            RequestError::Parse { description, .. } => description.as_deref(),
        }
    }

    /// Request URL; AjaxError includes the query string.
    pub fn url(&self) -> &str {
        match self {
            RequestError::Ajax { url, .. }
            | RequestError::Timeout { url, .. }
            | RequestError::Http { url, .. }
            | RequestError::Parse { url, .. } => url,
        }
    }

    /// Status code the server answered with, when one was received.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            RequestError::Http { http_status, .. } => Some(*http_status),
            RequestError::Parse { http_status, .. } => *http_status,
            RequestError::Ajax { .. } | RequestError::Timeout { .. } => None,
        }
    }

    /// Transport options of the failed request. Timeouts carry none.
    pub fn ajax_options(&self) -> Option<&TransportOptions> {
        match self {
            RequestError::Ajax { ajax_options, .. }
            | RequestError::Http { ajax_options, .. }
            | RequestError::Parse { ajax_options, .. } => Some(ajax_options),
            RequestError::Timeout { .. } => None,
        }
    }

    /// Whether the server was reached at all.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, RequestError::Ajax { .. } | RequestError::Timeout { .. })
    }
}

/// Errors raised while setting up clients and collaborators.
#[derive(Debug, Error)]
pub enum CourierError {
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },
}

/// Result type alias for courier setup operations.
pub type Result<T> = std::result::Result<T, CourierError>;

impl From<reqwest::Error> for CourierError {
    fn from(err: reqwest::Error) -> Self {
        CourierError::Network {
            message: err.to_string(),
            source: Some(err),
        }
    }
}
