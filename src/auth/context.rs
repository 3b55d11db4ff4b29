//! Request contexts.
//!
//! A [`RestContext`] binds a tenant base URL to an optional user. Each
//! context owns at most one [`SessionState`], created the first time a
//! request needs it. Two contexts never share a session, even when their
//! base URL and credentials are identical.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};

use crate::auth::SessionState;
use crate::clients::AuthError;
use crate::config::{BaseUrl, Credentials};

type SessionFuture = Shared<BoxFuture<'static, Result<Arc<SessionState>, AuthError>>>;

enum SessionSlot {
    Empty,
    Pending(SessionFuture),
    Ready(Arc<SessionState>),
}

struct ContextInner {
    base_url: BaseUrl,
    credentials: Option<Credentials>,
    host_override: Option<String>,
    referer_override: Option<String>,
    strict_tls: bool,
    follow_redirects: bool,
    additional_headers: Mutex<HashMap<String, String>>,
    session: Mutex<SessionSlot>,
}

/// A tenant/user binding used to issue calls.
///
/// Cloning a `RestContext` yields another handle on the same binding and
/// session; building a new context always yields a fresh, isolated session.
///
/// # Example
///
/// ```rust
/// use tenant_rest::{BaseUrl, Credentials, RestContext};
///
/// let anonymous = RestContext::anonymous(BaseUrl::new("http://cam.oae.example").unwrap());
/// assert!(anonymous.is_anonymous());
///
/// let admin = RestContext::builder(BaseUrl::new("http://localhost:2000").unwrap())
///     .credentials(Credentials::new("administrator", "administrator").unwrap())
///     .host_override("admin.oae.example")
///     .build();
/// assert_eq!(admin.referer(), "http://admin.oae.example/");
/// ```
#[derive(Clone)]
pub struct RestContext {
    inner: Arc<ContextInner>,
}

// Verify RestContext is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<RestContext>();
};

impl RestContext {
    /// Creates a new builder for a context on `base_url`.
    #[must_use]
    pub fn builder(base_url: BaseUrl) -> RestContextBuilder {
        RestContextBuilder::new(base_url)
    }

    /// Creates an anonymous context with default transport settings.
    #[must_use]
    pub fn anonymous(base_url: BaseUrl) -> Self {
        Self::builder(base_url).build()
    }

    /// Creates an authenticated context with default transport settings.
    #[must_use]
    pub fn authenticated(base_url: BaseUrl, credentials: Credentials) -> Self {
        Self::builder(base_url).credentials(credentials).build()
    }

    /// Returns the tenant base URL.
    #[must_use]
    pub fn base_url(&self) -> &BaseUrl {
        &self.inner.base_url
    }

    /// Returns the credentials, if any.
    #[must_use]
    pub fn credentials(&self) -> Option<&Credentials> {
        self.inner.credentials.as_ref()
    }

    /// Returns `true` if this context never logs in.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.inner.credentials.is_none()
    }

    /// Returns the `Host` header override, if any.
    #[must_use]
    pub fn host_override(&self) -> Option<&str> {
        self.inner.host_override.as_deref()
    }

    /// Returns the `Referer` override, if any.
    #[must_use]
    pub fn referer_override(&self) -> Option<&str> {
        self.inner.referer_override.as_deref()
    }

    /// Returns whether TLS certificates are verified.
    #[must_use]
    pub fn strict_tls(&self) -> bool {
        self.inner.strict_tls
    }

    /// Returns whether redirects are followed.
    #[must_use]
    pub fn follow_redirects(&self) -> bool {
        self.inner.follow_redirects
    }

    /// Returns the `Referer` sent with every request.
    ///
    /// An explicit override wins, even when empty. Otherwise the referer is
    /// derived from the host override, and failing that from the base URL.
    #[must_use]
    pub fn referer(&self) -> String {
        if let Some(referer) = &self.inner.referer_override {
            return referer.clone();
        }
        match &self.inner.host_override {
            Some(host) => format!("{}://{host}/", self.inner.base_url.scheme()),
            None => format!("{}/", self.inner.base_url),
        }
    }

    /// Sets headers to be merged into the next call only.
    ///
    /// Replaces any headers set earlier that were not yet consumed.
    pub fn set_additional_headers(&self, headers: HashMap<String, String>) {
        *lock(&self.inner.additional_headers) = headers;
    }

    /// Adds one header to be merged into the next call only.
    pub fn add_additional_header(&self, key: impl Into<String>, value: impl Into<String>) {
        lock(&self.inner.additional_headers).insert(key.into(), value.into());
    }

    /// Returns a copy of the headers waiting for the next call.
    #[must_use]
    pub fn additional_headers(&self) -> HashMap<String, String> {
        lock(&self.inner.additional_headers).clone()
    }

    /// Removes and returns the headers waiting for the next call.
    pub(crate) fn take_additional_headers(&self) -> HashMap<String, String> {
        std::mem::take(&mut *lock(&self.inner.additional_headers))
    }

    /// Returns a new context with the same settings but its own empty
    /// session slot and no transient headers.
    ///
    /// An in-flight login runs against such a copy, so the future parked in
    /// the session slot never keeps its own context alive.
    pub(crate) fn detached(&self) -> Self {
        RestContextBuilder {
            base_url: self.inner.base_url.clone(),
            credentials: self.inner.credentials.clone(),
            host_override: self.inner.host_override.clone(),
            referer_override: self.inner.referer_override.clone(),
            strict_tls: self.inner.strict_tls,
            follow_redirects: self.inner.follow_redirects,
        }
        .build()
    }

    /// Returns the established session, if any.
    ///
    /// A session whose login is still in flight is not returned.
    #[must_use]
    pub fn session(&self) -> Option<Arc<SessionState>> {
        match &*lock(&self.inner.session) {
            SessionSlot::Ready(session) => Some(Arc::clone(session)),
            SessionSlot::Empty | SessionSlot::Pending(_) => None,
        }
    }

    /// Returns the session, establishing it with `establish` if needed.
    ///
    /// Concurrent callers share one in-flight `establish` future and all
    /// observe its outcome. A failed attempt leaves the slot empty so a later
    /// call starts over.
    pub(crate) async fn session_or_establish<F>(
        &self,
        establish: F,
    ) -> Result<Arc<SessionState>, AuthError>
    where
        F: FnOnce() -> BoxFuture<'static, Result<Arc<SessionState>, AuthError>>,
    {
        let pending = {
            let mut slot = lock(&self.inner.session);
            match &*slot {
                SessionSlot::Ready(session) => return Ok(Arc::clone(session)),
                SessionSlot::Pending(pending) => pending.clone(),
                SessionSlot::Empty => {
                    let pending = establish().shared();
                    *slot = SessionSlot::Pending(pending.clone());
                    pending
                }
            }
        };

        let outcome = pending.clone().await;

        let mut slot = lock(&self.inner.session);
        let settles_slot =
            matches!(&*slot, SessionSlot::Pending(current) if current.ptr_eq(&pending));
        if settles_slot {
            *slot = match &outcome {
                Ok(session) => SessionSlot::Ready(Arc::clone(session)),
                Err(_) => SessionSlot::Empty,
            };
        }
        outcome
    }
}

impl fmt::Debug for RestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestContext")
            .field("base_url", &self.inner.base_url)
            .field("credentials", &self.inner.credentials)
            .field("host_override", &self.inner.host_override)
            .field("referer_override", &self.inner.referer_override)
            .field("strict_tls", &self.inner.strict_tls)
            .field("follow_redirects", &self.inner.follow_redirects)
            .finish_non_exhaustive()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Builder for constructing [`RestContext`] instances.
///
/// # Defaults
///
/// - `credentials`: `None` (anonymous)
/// - `host_override`, `referer_override`: `None`
/// - `strict_tls`: `true`
/// - `follow_redirects`: `true`
#[derive(Debug)]
pub struct RestContextBuilder {
    base_url: BaseUrl,
    credentials: Option<Credentials>,
    host_override: Option<String>,
    referer_override: Option<String>,
    strict_tls: bool,
    follow_redirects: bool,
}

impl RestContextBuilder {
    fn new(base_url: BaseUrl) -> Self {
        Self {
            base_url,
            credentials: None,
            host_override: None,
            referer_override: None,
            strict_tls: true,
            follow_redirects: true,
        }
    }

    /// Sets the credentials used for the implicit login.
    #[must_use]
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Sets the `Host` header, addressing a tenant whose public hostname is
    /// not reachable from this process.
    #[must_use]
    pub fn host_override(mut self, host: impl Into<String>) -> Self {
        self.host_override = Some(host.into());
        self
    }

    /// Sets the `Referer` header. An empty string sends an empty referer.
    #[must_use]
    pub fn referer_override(mut self, referer: impl Into<String>) -> Self {
        self.referer_override = Some(referer.into());
        self
    }

    /// Sets whether TLS certificates are verified.
    #[must_use]
    pub const fn strict_tls(mut self, strict: bool) -> Self {
        self.strict_tls = strict;
        self
    }

    /// Sets whether redirects are followed.
    #[must_use]
    pub const fn follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = follow;
        self
    }

    /// Builds the [`RestContext`].
    #[must_use]
    pub fn build(self) -> RestContext {
        RestContext {
            inner: Arc::new(ContextInner {
                base_url: self.base_url,
                credentials: self.credentials,
                host_override: self.host_override,
                referer_override: self.referer_override,
                strict_tls: self.strict_tls,
                follow_redirects: self.follow_redirects,
                additional_headers: Mutex::new(HashMap::new()),
                session: Mutex::new(SessionSlot::Empty),
            }),
        }
    }
}
