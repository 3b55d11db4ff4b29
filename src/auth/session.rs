//! Per-context session state.
//!
//! A [`SessionState`] owns the cookie jar for one context and the transport
//! client wired to it. Cookies the server sets, authenticated or anonymous,
//! are stored in the jar and replayed on every later request issued with the
//! same session.

use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::redirect::Policy;

use crate::clients::TransportError;
use crate::config::BaseUrl;

/// Maximum number of redirects followed when redirects are enabled.
const MAX_REDIRECTS: usize = 10;

/// The cookie store and transport of one context.
///
/// Sessions are created by [`RestClient::ensure_authenticated`](crate::RestClient::ensure_authenticated)
/// and live as long as the context that owns them.
///
/// # Thread Safety
///
/// `SessionState` is `Send + Sync`. The jar is internally synchronized, so
/// concurrent requests on the same context share one consistent session.
#[derive(Debug)]
pub struct SessionState {
    jar: Arc<Jar>,
    client: reqwest::Client,
}

// Verify SessionState is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<SessionState>();
};

impl SessionState {
    /// Creates an empty session.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the transport cannot be initialized
    /// (e.g., TLS backend failure).
    pub(crate) fn new(strict_tls: bool, follow_redirects: bool) -> Result<Self, TransportError> {
        let jar = Arc::new(Jar::default());
        let redirect = if follow_redirects {
            Policy::limited(MAX_REDIRECTS)
        } else {
            Policy::none()
        };

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .cookie_provider(Arc::clone(&jar))
            .danger_accept_invalid_certs(!strict_tls)
            .redirect(redirect)
            .build()
            .map_err(|e| TransportError::from_reqwest(&e))?;

        Ok(Self { jar, client })
    }

    /// Returns the `Cookie` header this session would send to `base_url`.
    #[must_use]
    pub fn cookie_header(&self, base_url: &BaseUrl) -> Option<String> {
        let url = reqwest::Url::parse(base_url.as_ref()).ok()?;
        self.jar
            .cookies(&url)
            .and_then(|value| value.to_str().ok().map(String::from))
    }

    /// Seeds a cookie, as if `base_url` had sent it in a `Set-Cookie` header.
    pub fn add_cookie(&self, cookie: &str, base_url: &BaseUrl) {
        if let Ok(url) = reqwest::Url::parse(base_url.as_ref()) {
            self.jar.add_cookie_str(cookie, &url);
        }
    }

    pub(crate) const fn client(&self) -> &reqwest::Client {
        &self.client
    }
}
