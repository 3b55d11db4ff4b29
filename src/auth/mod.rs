//! Contexts, sessions and the auth gate.
//!
//! # Overview
//!
//! - [`RestContext`]: a tenant base URL bound to an optional user
//! - [`SessionState`]: the cookie jar and transport owned by one context
//! - [`RestClient::ensure_authenticated`](crate::RestClient::ensure_authenticated):
//!   creates a context's session on first use, logging in if it has credentials
//!
//! # Session Lifecycle
//!
//! A context starts without a session. The first request through a
//! [`RestClient`](crate::RestClient) creates one; for contexts with
//! credentials the login call is made with that session, so the cookie the
//! server sets is replayed on every later request. Concurrent first requests
//! share a single login. A failed login leaves the context without a session
//! and the next request tries again.
//!
//! # Example
//!
//! ```rust,ignore
//! use tenant_rest::{BaseUrl, Credentials, RestClient, RestContext};
//!
//! let client = RestClient::new();
//! let ctx = RestContext::authenticated(
//!     BaseUrl::new("http://cam.oae.example")?,
//!     Credentials::new("alice", "password")?,
//! );
//!
//! let session = client.ensure_authenticated(&ctx).await?;
//! assert!(ctx.session().is_some());
//! println!("Cookies: {:?}", session.cookie_header(ctx.base_url()));
//! ```

mod context;
mod gate;
pub mod session;

pub use context::{RestContext, RestContextBuilder};
pub use session::SessionState;
