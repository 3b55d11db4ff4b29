//! Authenticated REST client.
//!
//! This module provides the [`RestClient`] type, the entry point used by
//! endpoint wrappers: every call first passes the context's auth gate, then
//! is handed to the [`HttpClient`] dispatcher.

use std::sync::Arc;

use crate::auth::RestContext;
use crate::clients::observer::{Observers, RequestObserver};
use crate::clients::{
    ApiRequest, ApiResponse, HttpClient, HttpMethod, Params, RestError, ValidationError,
};
use crate::config::ClientConfig;

/// REST client for a multi-tenant platform.
///
/// Provides convenient methods (`get`, `post`, `put`, `delete`) that take a
/// context, a path and a parameter set. The first call on a context
/// establishes its session (logging in if the context has credentials).
///
/// # Thread Safety
///
/// `RestClient` is `Clone + Send + Sync`. One client can serve any number of
/// contexts concurrently; it performs no throttling of its own.
///
/// # Example
///
/// ```rust,ignore
/// use tenant_rest::{BaseUrl, Credentials, Params, RestClient, RestContext};
///
/// let client = RestClient::new();
/// let ctx = RestContext::authenticated(
///     BaseUrl::new("http://cam.oae.example")?,
///     Credentials::new("alice", "password")?,
/// );
///
/// let me = client.get(&ctx, "/api/me", Params::new()).await?;
/// let group = client
///     .post(&ctx, "/api/group/create", Params::new().with("displayName", "Readers"))
///     .await?;
/// ```
#[derive(Clone, Debug)]
pub struct RestClient {
    http_client: HttpClient,
}

// Verify RestClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<RestClient>();
};

impl Default for RestClient {
    fn default() -> Self {
        Self::new()
    }
}

impl RestClient {
    /// Creates a client with the default configuration and no observers.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a client with the given configuration and no observers.
    #[must_use]
    pub fn with_config(config: ClientConfig) -> Self {
        Self::builder().config(config).build()
    }

    /// Creates a new builder for constructing a `RestClient`.
    #[must_use]
    pub fn builder() -> RestClientBuilder {
        RestClientBuilder::default()
    }

    /// Returns the client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        self.http_client.config()
    }

    /// Returns the underlying dispatcher.
    #[must_use]
    pub const fn http_client(&self) -> &HttpClient {
        &self.http_client
    }

    /// Sends a request on behalf of `ctx`.
    ///
    /// The context's transient headers are consumed by this call whatever its
    /// outcome, including a request rejected before it is sent.
    ///
    /// # Errors
    ///
    /// Returns [`RestError::Auth`] if the context's session could not be
    /// established, or any error produced by [`HttpClient::dispatch`].
    pub async fn request(
        &self,
        ctx: &RestContext,
        request: ApiRequest,
    ) -> Result<ApiResponse, RestError> {
        self.send(ctx, Ok(request)).await
    }

    /// Consumes the context's transient headers, then reports `request` if
    /// it failed to build, or authenticates and dispatches it.
    ///
    /// Login failures are reported to observers by the auth gate, once per
    /// attempt, so they are not reported again here.
    pub(crate) async fn send(
        &self,
        ctx: &RestContext,
        request: Result<ApiRequest, ValidationError>,
    ) -> Result<ApiResponse, RestError> {
        let transient = ctx.take_additional_headers();
        let request = request.map_err(|e| self.http_client.fail(e.into(), None))?;
        let session = self.ensure_authenticated(ctx).await?;
        self.http_client
            .dispatch(ctx, &session, request, &transient)
            .await
    }

    /// Sends a GET request. Parameters go in the query string.
    ///
    /// # Errors
    ///
    /// See [`RestClient::request`]. An invalid path yields
    /// [`RestError::Validation`].
    pub async fn get(
        &self,
        ctx: &RestContext,
        path: &str,
        params: Params,
    ) -> Result<ApiResponse, RestError> {
        self.make_request(ctx, HttpMethod::Get, path, params).await
    }

    /// Sends a POST request. Parameters go in a form or multipart body.
    ///
    /// # Errors
    ///
    /// See [`RestClient::get`].
    pub async fn post(
        &self,
        ctx: &RestContext,
        path: &str,
        params: Params,
    ) -> Result<ApiResponse, RestError> {
        self.make_request(ctx, HttpMethod::Post, path, params).await
    }

    /// Sends a PUT request. Parameters go in a form or multipart body.
    ///
    /// # Errors
    ///
    /// See [`RestClient::get`].
    pub async fn put(
        &self,
        ctx: &RestContext,
        path: &str,
        params: Params,
    ) -> Result<ApiResponse, RestError> {
        self.make_request(ctx, HttpMethod::Put, path, params).await
    }

    /// Sends a DELETE request. Parameters go in the query string.
    ///
    /// # Errors
    ///
    /// See [`RestClient::get`].
    pub async fn delete(
        &self,
        ctx: &RestContext,
        path: &str,
        params: Params,
    ) -> Result<ApiResponse, RestError> {
        self.make_request(ctx, HttpMethod::Delete, path, params).await
    }

    async fn make_request(
        &self,
        ctx: &RestContext,
        method: HttpMethod,
        path: &str,
        params: Params,
    ) -> Result<ApiResponse, RestError> {
        let request = ApiRequest::builder(method, path).params(params).build();
        self.send(ctx, request).await
    }
}

/// Builder for constructing [`RestClient`] instances.
#[derive(Debug, Default)]
pub struct RestClientBuilder {
    config: Option<ClientConfig>,
    observers: Observers,
}

impl RestClientBuilder {
    /// Sets the client configuration.
    #[must_use]
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Registers an observer for request lifecycle notifications.
    #[must_use]
    pub fn observer(mut self, observer: Arc<dyn RequestObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Builds the [`RestClient`].
    #[must_use]
    pub fn build(self) -> RestClient {
        RestClient {
            http_client: HttpClient::new(self.config.unwrap_or_default(), self.observers),
        }
    }
}
