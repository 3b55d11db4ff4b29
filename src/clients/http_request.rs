//! Request types for the REST client core.
//!
//! This module provides the [`ApiRequest`] type and its builder for
//! describing a single call: method, path, parameters and per-call options.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use crate::clients::errors::ValidationError;
use crate::clients::params::{ParamValue, Params, Produced};

/// HTTP methods supported by the platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// HTTP GET method. Parameters are sent in the query string.
    Get,
    /// HTTP POST method. Parameters are sent in the body.
    Post,
    /// HTTP PUT method. Parameters are sent in the body.
    Put,
    /// HTTP DELETE method. Parameters are sent in the query string.
    Delete,
}

impl HttpMethod {
    /// Returns the method name as sent on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    /// Returns `true` if parameters travel in the query string.
    #[must_use]
    pub const fn uses_query(&self) -> bool {
        matches!(self, Self::Get | Self::Delete)
    }

    pub(crate) const fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single call to be dispatched against a context.
///
/// Use [`ApiRequest::builder`] to construct requests.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use tenant_rest::clients::{ApiRequest, HttpMethod};
///
/// let request = ApiRequest::builder(HttpMethod::Post, "/api/content/create")
///     .param("resourceSubType", "link")
///     .param("link", "https://example.com")
///     .param("visibility", "public")
///     .timeout(Duration::from_secs(5))
///     .build()
///     .unwrap();
///
/// assert_eq!(request.path, "/api/content/create");
/// assert_eq!(request.params.len(), 3);
/// ```
#[derive(Debug)]
pub struct ApiRequest {
    /// The HTTP method for this request.
    pub http_method: HttpMethod,
    /// The absolute path (starting with `/`) for this request.
    pub path: String,
    /// The caller's parameters, resolved at dispatch time.
    pub params: Params,
    /// Headers added to this request only.
    pub extra_headers: HashMap<String, String>,
    /// Deadline for this request. The client's default applies when `None`.
    pub timeout: Option<Duration>,
}

impl ApiRequest {
    /// Creates a new builder for constructing an `ApiRequest`.
    #[must_use]
    pub fn builder(method: HttpMethod, path: impl Into<String>) -> ApiRequestBuilder {
        ApiRequestBuilder::new(method, path)
    }

    /// Validates the request.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if the path is empty or does not start
    /// with `/`.
    pub fn verify(&self) -> Result<(), ValidationError> {
        if !self.path.starts_with('/') {
            return Err(ValidationError::new(format!(
                "Invalid request path '{}'. Paths must start with '/'.",
                self.path
            )));
        }
        Ok(())
    }
}

/// Builder for constructing [`ApiRequest`] instances.
#[derive(Debug)]
pub struct ApiRequestBuilder {
    http_method: HttpMethod,
    path: String,
    params: Params,
    extra_headers: HashMap<String, String>,
    timeout: Option<Duration>,
}

impl ApiRequestBuilder {
    fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            http_method: method,
            path: path.into(),
            params: Params::new(),
            extra_headers: HashMap::new(),
            timeout: None,
        }
    }

    /// Replaces all parameters at once.
    #[must_use]
    pub fn params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Sets a single parameter.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(name, value);
        self
    }

    /// Sets a parameter whose value is produced at dispatch time.
    #[must_use]
    pub fn deferred<F>(mut self, name: impl Into<String>, producer: F) -> Self
    where
        F: FnOnce() -> Produced + Send + 'static,
    {
        self.params = self.params.deferred(name, producer);
        self
    }

    /// Adds a header to this request only.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.insert(key.into(), value.into());
        self
    }

    /// Sets the deadline for this request.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the [`ApiRequest`], validating it in the process.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if the request fails validation.
    pub fn build(self) -> Result<ApiRequest, ValidationError> {
        let request = ApiRequest {
            http_method: self.http_method,
            path: self.path,
            params: self.params,
            extra_headers: self.extra_headers,
            timeout: self.timeout,
        };
        request.verify()?;
        Ok(request)
    }
}
