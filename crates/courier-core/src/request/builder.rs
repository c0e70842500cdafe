//! Translates a [`RequestConfig`] into [`TransportOptions`].

use super::config::RequestConfig;
use crate::network::{DataType, TransportOptions};
use base64::{engine::general_purpose::STANDARD, Engine as _};

pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// Build the transport options for one request.
///
/// Always an uncached GET. The parameter map is shared, not copied. No
/// transport timeout is set; the pipeline enforces its own deadline.
pub fn build<T>(config: &RequestConfig<T>, data_type: DataType) -> TransportOptions {
    let mut options = TransportOptions::get(config.url(), data_type);
    options.data = config.data().cloned();

    if let Some(credentials) = basic_credentials(config.username(), config.password()) {
        options
            .headers
            .insert(AUTHORIZATION_HEADER.to_string(), credentials);
    }

    options
}

/// `Basic base64(username:password)`, or `None` when neither part is set.
pub fn basic_credentials(username: Option<&str>, password: Option<&str>) -> Option<String> {
    if username.is_none() && password.is_none() {
        return None;
    }
    let raw = format!("{}:{}", username.unwrap_or_default(), password.unwrap_or_default());
    Some(format!("Basic {}", STANDARD.encode(raw.as_bytes())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Params;
    use reqwest::Method;
    use std::sync::Arc;

    #[test]
    fn test_sets_ajax_options() {
        let data = Arc::new(Params::new().with("param", "value"));
        let config = RequestConfig::new("http://sample.com").with_data(Arc::clone(&data));

        let options = build(&config, DataType::Json);

        assert_eq!(options.data_type, DataType::Json);
        assert_eq!(options.url, "http://sample.com");
        assert_eq!(options.method, Method::GET);
        assert!(!options.cache);
        assert!(Arc::ptr_eq(options.data.as_ref().unwrap(), &data));
        assert!(options.headers.is_empty());
    }

    #[test]
    fn test_sets_basic_authentication() {
        let config =
            RequestConfig::new("http://example.com").with_credentials("username1", "password123");

        let options = build(&config, DataType::Xml);

        assert_eq!(
            options.header("Authorization"),
            Some("Basic dXNlcm5hbWUxOnBhc3N3b3JkMTIz")
        );
        assert_eq!(options.data_type, DataType::Xml);
    }

    #[test]
    fn test_partial_credentials() {
        assert_eq!(basic_credentials(None, None), None);
        // "user:" and ":pass"
        assert_eq!(basic_credentials(Some("user"), None).as_deref(), Some("Basic dXNlcjo="));
        assert_eq!(basic_credentials(None, Some("pass")).as_deref(), Some("Basic OnBhc3M="));
    }
}
