//! Transport contract.
//!
//! The request pipeline never talks to the network directly. It hands a
//! [`TransportOptions`] value to a [`Transport`] and receives either a
//! [`RawResponse`] or a [`TransportFailure`] shaped like an XHR failure
//! (status code, text status, thrown error).

use crate::request::Params;
use async_trait::async_trait;
use reqwest::Method;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Expected response format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Json,
    Xml,
}

impl DataType {
    /// Lowercase name, as used for `dataType`.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Json => "json",
            DataType::Xml => "xml",
        }
    }

    /// Value for the `Accept` request header.
    pub fn accept_header(&self) -> &'static str {
        match self {
            DataType::Json => "application/json, text/javascript, */*; q=0.01",
            DataType::Xml => "application/xml, text/xml, */*; q=0.01",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Concrete options for a single transport call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportOptions {
    pub url: String,
    #[serde(rename = "type", serialize_with = "serialize_method")]
    pub method: Method,
    pub data_type: DataType,
    /// When false the transport must defeat intermediate HTTP caches.
    pub cache: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Arc<Params>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

impl TransportOptions {
    /// Uncached GET request without parameters or headers.
    pub fn get(url: impl Into<String>, data_type: DataType) -> Self {
        Self {
            url: url.into(),
            method: Method::GET,
            data_type,
            cache: false,
            data: None,
            headers: BTreeMap::new(),
        }
    }

    /// Header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

fn serialize_method<S: Serializer>(method: &Method, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(method.as_str())
}

/// Body of a successful response, already decoded per [`DataType`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Json(serde_json::Value),
    /// XML document text.
    Xml(String),
}

impl ResponseBody {
    /// Decoded JSON, if this is a JSON body.
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Xml(_) => None,
        }
    }

    /// Document text, if this is an XML body.
    pub fn as_xml(&self) -> Option<&str> {
        match self {
            ResponseBody::Xml(text) => Some(text),
            ResponseBody::Json(_) => None,
        }
    }
}

/// Successful transport outcome handed to the request's parser.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawResponse {
    pub body: ResponseBody,
    /// Transport status marker, `"success"` for a normal 2xx response.
    pub text_status: String,
}

impl RawResponse {
    /// Successful response with the `"success"` marker.
    pub fn new(body: ResponseBody) -> Self {
        Self {
            body,
            text_status: "success".to_string(),
        }
    }

    /// Successful JSON response.
    pub fn json(value: serde_json::Value) -> Self {
        Self::new(ResponseBody::Json(value))
    }

    /// Successful XML response.
    pub fn xml(text: impl Into<String>) -> Self {
        Self::new(ResponseBody::Xml(text.into()))
    }
}

/// Category reported by the transport alongside a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextStatus {
    Error,
    ParserError,
    Timeout,
    Abort,
    Other(String),
}

impl fmt::Display for TextStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextStatus::Error => f.write_str("error"),
            TextStatus::ParserError => f.write_str("parsererror"),
            TextStatus::Timeout => f.write_str("timeout"),
            TextStatus::Abort => f.write_str("abort"),
            TextStatus::Other(other) => f.write_str(other),
        }
    }
}

/// Error value thrown by the transport: a plain status text or an exception.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ErrorThrown {
    #[default]
    None,
    Text(String),
    Exception { message: String },
}

impl ErrorThrown {
    /// Normalized message; empty strings count as absent.
    pub fn message(&self) -> Option<&str> {
        let message = match self {
            ErrorThrown::None => return None,
            ErrorThrown::Text(text) => text.as_str(),
            ErrorThrown::Exception { message } => message.as_str(),
        };
        if message.trim().is_empty() {
            None
        } else {
            Some(message)
        }
    }
}

/// Failed transport outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFailure {
    /// HTTP status, or 0 when no response was received.
    pub status: u16,
    pub response_text: Option<String>,
    pub text_status: TextStatus,
    pub error_thrown: ErrorThrown,
}

impl TransportFailure {
    /// Failure with `status`, a generic `error` text status and nothing thrown.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            response_text: None,
            text_status: TextStatus::Error,
            error_thrown: ErrorThrown::None,
        }
    }

    /// Failure where no HTTP response reached the client.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::new(0).with_error_thrown(ErrorThrown::Text(message.into()))
    }

    /// Set the transport's category for the failure.
    pub fn with_text_status(mut self, text_status: TextStatus) -> Self {
        self.text_status = text_status;
        self
    }

    /// Set the value thrown alongside the failure.
    pub fn with_error_thrown(mut self, error_thrown: ErrorThrown) -> Self {
        self.error_thrown = error_thrown;
        self
    }

    /// Attach the raw response body.
    pub fn with_response_text(mut self, text: impl Into<String>) -> Self {
        self.response_text = Some(text.into());
        self
    }
}

/// HTTP transport used by the request pipeline.
///
/// Dropping the returned future must abandon the call; implementations are
/// not required to abort the request on the wire.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, options: TransportOptions) -> Result<RawResponse, TransportFailure>;
}

/// Shared transport handle.
pub type DynTransport = Arc<dyn Transport>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_thrown_normalization() {
        assert_eq!(ErrorThrown::Text("Not found".into()).message(), Some("Not found"));
        assert_eq!(
            ErrorThrown::Exception {
                message: "Unexpected token <".into()
            }
            .message(),
            Some("Unexpected token <")
        );
        assert_eq!(ErrorThrown::Text("  ".into()).message(), None);
        assert_eq!(ErrorThrown::None.message(), None);
    }

    #[test]
    fn test_text_status_display() {
        assert_eq!(TextStatus::ParserError.to_string(), "parsererror");
        assert_eq!(TextStatus::Other("notmodified".into()).to_string(), "notmodified");
    }

    #[test]
    fn test_options_serialize_like_ajax_settings() {
        let mut options = TransportOptions::get("http://sample.com", DataType::Xml);
        options
            .headers
            .insert("Authorization".into(), "Basic abc".into());

        let json = serde_json::to_value(&options).unwrap();
        assert_eq!(json["type"], "GET");
        assert_eq!(json["dataType"], "xml");
        assert_eq!(json["cache"], false);
        assert_eq!(json["headers"]["Authorization"], "Basic abc");
        assert!(json.get("data").is_none());
        assert_eq!(options.header("authorization"), Some("Basic abc"));
    }
}
