//! Authenticated REST client.
//!
//! This module provides the client used by endpoint wrappers, built on top of
//! the [`HttpClient`](crate::clients::HttpClient) dispatcher.
//!
//! # Overview
//!
//! - [`RestClient`]: `get()`, `post()`, `put()`, `delete()` and `request()` on a context
//! - [`RestClientBuilder`]: configuration and observer injection
//!
//! Every call on a context first passes its auth gate, so the session (and
//! login, for contexts with credentials) is established exactly once, before
//! the first real request.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tenant_rest::clients::RecordingObserver;
//! use tenant_rest::{BaseUrl, Params, RestClient, RestContext};
//!
//! let recorder = Arc::new(RecordingObserver::default());
//! let client = RestClient::builder().observer(recorder.clone()).build();
//! let ctx = RestContext::anonymous(BaseUrl::new("http://cam.oae.example")?);
//!
//! let response = client.get(&ctx, "/api/config", Params::new()).await?;
//! println!("Config: {}", response.body);
//! assert_eq!(recorder.request_urls(), vec!["http://cam.oae.example/api/config"]);
//! ```
//!
//! # Retry Behavior
//!
//! There is none. Every failure is returned to the caller as a
//! [`RestError`](crate::clients::RestError) and broadcast to observers.

mod client;

pub use client::{RestClient, RestClientBuilder};
