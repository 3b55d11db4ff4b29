//! Response types for the REST client core.
//!
//! This module provides the [`ApiResponse`] type returned by every
//! successful call, and [`ResponseBody`], which keeps the body as parsed
//! JSON when possible and as raw text otherwise.

use std::collections::HashMap;
use std::fmt;

use serde::de::DeserializeOwned;

/// A response body.
///
/// The platform's `Content-Type` is not trusted as the sole signal: every
/// body is first parsed as JSON and kept as text only if that fails.
///
/// # Example
///
/// ```rust
/// use tenant_rest::clients::ResponseBody;
///
/// assert!(ResponseBody::parse(r#"{"total":3}"#.to_string()).as_json().is_some());
/// assert_eq!(ResponseBody::parse("OK".to_string()).as_text(), Some("OK"));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum ResponseBody {
    /// A body that parsed as JSON.
    Json(serde_json::Value),
    /// A body that did not parse as JSON, verbatim.
    Text(String),
}

impl ResponseBody {
    /// Parses a raw body, falling back to text.
    #[must_use]
    pub fn parse(text: String) -> Self {
        serde_json::from_str(&text).map_or(Self::Text(text), Self::Json)
    }

    /// Returns the JSON value, if the body parsed as JSON.
    #[must_use]
    pub const fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    /// Returns the raw text, if the body did not parse as JSON.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Json(_) => None,
            Self::Text(text) => Some(text),
        }
    }

    /// Looks up a top-level field of a JSON object body.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.as_json().and_then(|value| value.get(key))
    }
}

impl fmt::Display for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// A successful response.
#[derive(Clone, Debug)]
pub struct ApiResponse {
    /// The HTTP status code.
    pub code: u16,
    /// Response headers, lowercased (headers may have multiple values).
    pub headers: HashMap<String, Vec<String>>,
    /// The parsed response body.
    pub body: ResponseBody,
}

impl ApiResponse {
    /// Creates a new response.
    #[must_use]
    pub fn new(code: u16, headers: HashMap<String, Vec<String>>, body: ResponseBody) -> Self {
        Self {
            code,
            headers,
            body,
        }
    }

    /// Returns the first value of a header, matched case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Deserializes the body into a typed value.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        match &self.body {
            ResponseBody::Json(value) => T::deserialize(value),
            ResponseBody::Text(text) => serde_json::from_str(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_json_body() {
        let body = ResponseBody::parse(r#"{"id":"c:cam:abc"}"#.to_string());
        assert_eq!(body.get("id"), Some(&json!("c:cam:abc")));
        assert!(body.as_text().is_none());
    }

    #[test]
    fn test_parse_falls_back_to_text() {
        let body = ResponseBody::parse("<html>not json</html>".to_string());
        assert_eq!(body.as_text(), Some("<html>not json</html>"));
        assert!(body.get("anything").is_none());
    }

    #[test]
    fn test_empty_body_is_text() {
        assert_eq!(ResponseBody::parse(String::new()), ResponseBody::Text(String::new()));
    }

    #[test]
    fn test_display_round_trips_text_verbatim() {
        assert_eq!(ResponseBody::Text("plain".to_string()).to_string(), "plain");
        assert_eq!(ResponseBody::Json(json!({"a":1})).to_string(), r#"{"a":1}"#);
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let mut headers = HashMap::new();
        headers.insert("x-request-id".to_string(), vec!["abc".to_string()]);
        let response = ApiResponse::new(200, headers, ResponseBody::Text(String::new()));

        assert_eq!(response.header("X-Request-Id"), Some("abc"));
        assert_eq!(response.header("missing"), None);
    }

    #[test]
    fn test_typed_json() {
        #[derive(serde::Deserialize)]
        struct Me {
            anon: bool,
        }
        let response = ApiResponse::new(
            200,
            HashMap::new(),
            ResponseBody::Json(json!({"anon": true, "locale": "en_GB"})),
        );
        let me: Me = response.json().unwrap();
        assert!(me.anon);
    }
}
