//! HTTP client types for the REST client core.
//!
//! This module provides the request/response layer: parameter resolution and
//! encoding, single-call dispatch, outcome classification and observer
//! notifications.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`HttpClient`]: performs one call against a context's session
//! - [`ApiRequest`]: a request to be dispatched
//! - [`ApiResponse`]: a classified, successful response
//! - [`HttpMethod`]: supported HTTP methods (GET, POST, PUT, DELETE)
//! - [`Params`]: caller parameters, including deferred values and uploads
//! - [`RestError`]: the failure type of every call
//! - [`RequestObserver`]: hooks for request lifecycle notifications
//! - [`rest::RestClient`]: the authenticated entry point
//!
//! # Encoding
//!
//! | Method          | Stream present | Encoding                       |
//! |-----------------|----------------|--------------------------------|
//! | `GET`, `DELETE` | any            | query string                   |
//! | `POST`, `PUT`   | no             | `application/x-www-form-urlencoded` |
//! | `POST`, `PUT`   | yes            | `multipart/form-data`          |
//!
//! Null parameters are omitted. Array parameters are sent as repeated keys
//! (or repeated parts).
//!
//! # Example
//!
//! ```rust,ignore
//! use tenant_rest::clients::{ApiRequest, HttpMethod, UploadStream};
//!
//! let request = ApiRequest::builder(HttpMethod::Post, "/api/content/create")
//!     .param("resourceSubType", "file")
//!     .param("displayName", "Report")
//!     .deferred("file", || {
//!         UploadStream::from_bytes("report.pdf", std::fs::read("report.pdf").unwrap()).into()
//!     })
//!     .build()?;
//!
//! let response = client.request(&ctx, request).await?;
//! ```

mod errors;
mod http_client;
mod http_request;
mod http_response;
mod observer;
mod params;
pub mod rest;

pub use errors::{
    AuthError, HttpStatusError, RestError, TransportError, TransportErrorKind, ValidationError,
    TRANSPORT_ERROR_CODE, VALIDATION_ERROR_CODE,
};
pub use http_client::{HttpClient, SDK_VERSION};
pub use http_request::{ApiRequest, ApiRequestBuilder, HttpMethod};
pub use http_response::{ApiResponse, ResponseBody};
pub use observer::{ObservedEvent, RecordingObserver, RequestEvent, RequestObserver};
pub use params::{
    resolve, ByteStream, ParamValue, Params, Produced, Producer, ResolvedParams, ResolvedValue,
    Scalar, UploadStream, STREAM_PLACEHOLDER,
};

// Re-export the REST client at the clients module level
pub use rest::{RestClient, RestClientBuilder};
