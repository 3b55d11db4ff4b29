//! Request dispatcher.
//!
//! This module provides the [`HttpClient`] type, which performs exactly one
//! HTTP call on behalf of a context and classifies its outcome.

use std::collections::HashMap;
use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::auth::{RestContext, SessionState};
use crate::clients::errors::{HttpStatusError, RestError, TransportError, ValidationError};
use crate::clients::http_request::ApiRequest;
use crate::clients::http_response::{ApiResponse, ResponseBody};
use crate::clients::observer::{Observers, RequestEvent};
use crate::clients::params::resolve;
use crate::config::ClientConfig;

/// SDK version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Performs single calls against a context's session.
///
/// The client handles:
/// - URL composition from the context's base URL
/// - `Referer` and `Host` headers for virtual-tenant routing
/// - Single-use transient headers
/// - Parameter resolution and encoding selection (query, form or multipart)
/// - Outcome classification and observer notifications
///
/// It never logs in and never retries; see
/// [`RestClient`](crate::RestClient) for the authenticated entry points.
///
/// # Thread Safety
///
/// `HttpClient` is `Clone`, `Send` and `Sync`; clones share configuration
/// and observers.
#[derive(Clone, Debug)]
pub struct HttpClient {
    config: Arc<ClientConfig>,
    observers: Observers,
    default_headers: HashMap<String, String>,
}

// Verify HttpClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient>();
};

impl HttpClient {
    pub(crate) fn new(config: ClientConfig, observers: Observers) -> Self {
        let user_agent_prefix = config
            .user_agent_prefix()
            .map_or(String::new(), |prefix| format!("{prefix} | "));
        let rust_version = env!("CARGO_PKG_RUST_VERSION");
        let user_agent = format!("{user_agent_prefix}tenant-rest v{SDK_VERSION} | Rust {rust_version}");

        let mut default_headers = HashMap::new();
        default_headers.insert("User-Agent".to_string(), user_agent);
        default_headers.insert(
            "Accept".to_string(),
            "application/json, text/plain, */*".to_string(),
        );

        Self {
            config: Arc::new(config),
            observers,
            default_headers,
        }
    }

    /// Returns the client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the headers sent with every request.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Performs one call using `session`'s cookie store.
    ///
    /// `transient` headers are merged last and apply to this call only.
    /// Deferred parameters are resolved here, immediately before the
    /// transport call.
    ///
    /// # Errors
    ///
    /// Returns [`RestError`] if:
    /// - The request or its headers fail validation (`Validation`)
    /// - No response could be obtained, including deadline expiry (`Transport`)
    /// - The response status is in the configured error set (`Http`)
    pub async fn dispatch(
        &self,
        ctx: &RestContext,
        session: &SessionState,
        request: ApiRequest,
        transient: &HashMap<String, String>,
    ) -> Result<ApiResponse, RestError> {
        if let Err(e) = request.verify() {
            return Err(self.fail(e.into(), None));
        }

        let url = ctx.base_url().join(&request.path);
        let method = request.http_method;
        let headers = match self.build_headers(ctx, &request.extra_headers, transient) {
            Ok(headers) => headers,
            Err(e) => return Err(self.fail(e.into(), None)),
        };

        let resolved = resolve(request.params);
        let data = resolved.describe();
        self.observers.request(&RequestEvent {
            context: ctx,
            url: &url,
            method,
            data: &data,
        });
        tracing::debug!(
            "{} {} ({} fields, streaming: {})",
            method,
            url,
            data.len(),
            resolved.has_stream()
        );

        let mut builder = session
            .client()
            .request(method.to_reqwest(), &url)
            .headers(headers)
            .timeout(request.timeout.unwrap_or_else(|| self.config.timeout()));

        builder = if method.uses_query() {
            builder.query(&resolved.into_pairs())
        } else if resolved.has_stream() {
            match resolved.into_multipart() {
                Ok(form) => builder.multipart(form),
                Err(e) => return Err(self.fail(e.into(), None)),
            }
        } else {
            builder.form(&resolved.into_pairs())
        };

        let res = match builder.send().await {
            Ok(res) => res,
            Err(e) => return Err(self.fail(TransportError::from_reqwest(&e).into(), None)),
        };

        let code = res.status().as_u16();
        let res_headers = Self::parse_response_headers(res.headers());
        let text = match res.text().await {
            Ok(text) => text,
            Err(e) => return Err(self.fail(TransportError::from_reqwest(&e).into(), None)),
        };

        if self.config.is_error_status(code) {
            let error = HttpStatusError {
                code,
                message: text.clone(),
            };
            let response = ApiResponse::new(code, res_headers, ResponseBody::parse(text));
            return Err(self.fail(error.into(), Some(&response)));
        }

        let response = ApiResponse::new(code, res_headers, ResponseBody::parse(text));
        tracing::debug!("{} {} -> {}", method, url, code);
        self.observers.response(&response);
        Ok(response)
    }

    /// Broadcasts a failure to observers and hands it back.
    pub(crate) fn fail(&self, error: RestError, response: Option<&ApiResponse>) -> RestError {
        self.report(&error, response);
        error
    }

    /// Logs a failure and broadcasts it to observers.
    pub(crate) fn report(&self, error: &RestError, response: Option<&ApiResponse>) {
        tracing::warn!("Request failed with {}: {}", error.code(), error);
        self.observers.error(error, response);
    }

    /// Builds the request headers. Later layers win: defaults, then
    /// `Referer`/`Host`, then per-request headers, then transient headers.
    fn build_headers(
        &self,
        ctx: &RestContext,
        extra: &HashMap<String, String>,
        transient: &HashMap<String, String>,
    ) -> Result<HeaderMap, ValidationError> {
        let mut headers = HeaderMap::new();
        for (key, value) in &self.default_headers {
            insert_header(&mut headers, key, value)?;
        }
        insert_header(&mut headers, "Referer", &ctx.referer())?;
        if let Some(host) = ctx.host_override() {
            insert_header(&mut headers, "Host", host)?;
        }
        for (key, value) in extra {
            insert_header(&mut headers, key, value)?;
        }
        for (key, value) in transient {
            insert_header(&mut headers, key, value)?;
        }
        Ok(headers)
    }

    /// Parses response headers into a `HashMap`.
    fn parse_response_headers(headers: &HeaderMap) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = value.to_str().unwrap_or_default().to_string();
            result.entry(key).or_default().push(value);
        }
        result
    }
}

fn insert_header(headers: &mut HeaderMap, key: &str, value: &str) -> Result<(), ValidationError> {
    let name = HeaderName::from_bytes(key.as_bytes())
        .map_err(|_| ValidationError::new(format!("Invalid header name '{key}'")))?;
    let value = HeaderValue::from_str(value)
        .map_err(|_| ValidationError::new(format!("Invalid value for header '{key}'")))?;
    headers.insert(name, value);
    Ok(())
}
