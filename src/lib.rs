//! # Tenant REST Client Core
//!
//! The request core behind a REST SDK for a multi-tenant web platform: the
//! part every endpoint wrapper forwards to.
//!
//! ## Overview
//!
//! This crate provides:
//! - Per-context sessions: each [`RestContext`] owns its own cookie jar
//! - Implicit, coalesced login on a context's first request
//! - Parameter sanitization, deferred values and streamed file uploads
//! - Automatic choice between query string, form and multipart encodings
//! - Structured [`RestError`] classification and request observers
//! - Exhaustive search over an eventually consistent index via
//!   [`RestClient::search`]
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tenant_rest::{BaseUrl, Credentials, Params, RestClient, RestContext};
//!
//! let client = RestClient::new();
//! let ctx = RestContext::authenticated(
//!     BaseUrl::new("http://cam.oae.example")?,
//!     Credentials::new("alice", "password")?,
//! );
//!
//! // Logs in on first use, then sends the request with the session cookie
//! let me = client.get(&ctx, "/api/me", Params::new()).await?;
//! println!("Me: {}", me.body);
//! ```
//!
//! ## Virtual Tenants
//!
//! Tenants addressed by hostname can be reached through a shared address by
//! overriding the `Host` header:
//!
//! ```rust
//! use tenant_rest::{BaseUrl, RestContext};
//!
//! let ctx = RestContext::builder(BaseUrl::new("http://localhost:2001").unwrap())
//!     .host_override("cam.oae.example")
//!     .strict_tls(false)
//!     .build();
//!
//! assert_eq!(ctx.referer(), "http://cam.oae.example/");
//! ```
//!
//! ## Uploads
//!
//! ```rust,ignore
//! use tenant_rest::{Params, UploadStream};
//!
//! // The producer runs at dispatch time, after login
//! let params = Params::new()
//!     .with("resourceSubType", "file")
//!     .deferred("file", || UploadStream::from_bytes("notes.txt", "hello").into());
//!
//! client.post(&ctx, "/api/content/create", params).await?;
//! ```
//!
//! ## Exhaustive Search
//!
//! ```rust,ignore
//! use tenant_rest::search::{SearchQuery, SearchResults, ALL_RESULTS};
//!
//! let query = SearchQuery::builder("general").size(ALL_RESULTS).build()?;
//! let results: SearchResults = client.search(&ctx, &query).await?.json()?;
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: configuration and sessions belong to values
//! - **Fail-fast validation**: newtypes and builders validate on construction
//! - **Thread-safe**: all public types are `Send + Sync`
//! - **Async-first**: designed for use with the Tokio runtime
//! - **No hidden retries**: every failure reaches the caller

pub mod auth;
pub mod clients;
pub mod config;
pub mod error;
pub mod search;

// Re-export public types at crate root for convenience
pub use auth::{RestContext, RestContextBuilder, SessionState};
pub use config::{BaseUrl, ClientConfig, ClientConfigBuilder, Credentials};
pub use error::ConfigError;

// Re-export HTTP client types
pub use clients::{
    ApiRequest, ApiRequestBuilder, ApiResponse, AuthError, HttpClient, HttpMethod,
    HttpStatusError, ParamValue, Params, Produced, RecordingObserver, RequestObserver,
    ResponseBody, RestClient, RestClientBuilder, RestError, Scalar, TransportError,
    UploadStream, ValidationError,
};

// Re-export search types
pub use search::{SearchQuery, SearchResults, SortDirection, ALL_RESULTS};
