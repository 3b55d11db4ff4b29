//! Configuration types for the REST client core.
//!
//! This module provides the configuration shared by every context a
//! [`RestClient`](crate::RestClient) talks to.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`ClientConfig`]: Platform paths, timeouts and error classification settings
//! - [`ClientConfigBuilder`]: A builder for constructing [`ClientConfig`] instances
//! - [`BaseUrl`]: A validated tenant base URL
//! - [`Credentials`]: A username/password pair with masked debug output
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use tenant_rest::ClientConfig;
//!
//! let config = ClientConfig::builder()
//!     .auth_path("/api/auth/login")
//!     .refresh_delay(Duration::from_millis(50))
//!     .build()
//!     .unwrap();
//!
//! assert!(config.is_error_status(404));
//! assert!(!config.is_error_status(302));
//! ```

mod newtypes;

pub use newtypes::{BaseUrl, Credentials};

use std::collections::BTreeSet;
use std::time::Duration;

use crate::error::ConfigError;

/// Default path of the platform's login endpoint.
pub const DEFAULT_AUTH_PATH: &str = "/api/auth/login";

/// Default path of the search index refresh endpoint.
pub const DEFAULT_REFRESH_PATH: &str = "/api/search/_refresh";

/// Default delay before refreshing the search index.
pub const DEFAULT_REFRESH_DELAY: Duration = Duration::from_millis(100);

/// Default per-request deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Response statuses classified as application errors.
pub const DEFAULT_ERROR_STATUSES: [u16; 7] = [400, 401, 403, 404, 418, 500, 503];

/// Configuration for the REST client core.
///
/// # Thread Safety
///
/// `ClientConfig` is `Clone`, `Send`, and `Sync`.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    auth_path: String,
    refresh_path: String,
    refresh_delay: Duration,
    timeout: Duration,
    error_statuses: BTreeSet<u16>,
    user_agent_prefix: Option<String>,
}

impl ClientConfig {
    /// Creates a new builder for constructing a `ClientConfig`.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Returns the login path.
    #[must_use]
    pub fn auth_path(&self) -> &str {
        &self.auth_path
    }

    /// Returns the search index refresh path.
    #[must_use]
    pub fn refresh_path(&self) -> &str {
        &self.refresh_path
    }

    /// Returns the delay applied before each index refresh.
    #[must_use]
    pub const fn refresh_delay(&self) -> Duration {
        self.refresh_delay
    }

    /// Returns the default per-request deadline.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the set of statuses classified as application errors.
    #[must_use]
    pub const fn error_statuses(&self) -> &BTreeSet<u16> {
        &self.error_statuses
    }

    /// Returns `true` if `status` is classified as an application error.
    #[must_use]
    pub fn is_error_status(&self, status: u16) -> bool {
        self.error_statuses.contains(&status)
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            auth_path: DEFAULT_AUTH_PATH.to_string(),
            refresh_path: DEFAULT_REFRESH_PATH.to_string(),
            refresh_delay: DEFAULT_REFRESH_DELAY,
            timeout: DEFAULT_TIMEOUT,
            error_statuses: DEFAULT_ERROR_STATUSES.into_iter().collect(),
            user_agent_prefix: None,
        }
    }
}

// Verify ClientConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ClientConfig>();
};

/// Builder for constructing [`ClientConfig`] instances.
///
/// Every field is optional.
///
/// # Defaults
///
/// - `auth_path`: [`DEFAULT_AUTH_PATH`]
/// - `refresh_path`: [`DEFAULT_REFRESH_PATH`]
/// - `refresh_delay`: [`DEFAULT_REFRESH_DELAY`]
/// - `timeout`: [`DEFAULT_TIMEOUT`]
/// - `error_statuses`: [`DEFAULT_ERROR_STATUSES`]
/// - `user_agent_prefix`: `None`
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    auth_path: Option<String>,
    refresh_path: Option<String>,
    refresh_delay: Option<Duration>,
    timeout: Option<Duration>,
    error_statuses: Option<BTreeSet<u16>>,
    user_agent_prefix: Option<String>,
}

impl ClientConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the login path.
    #[must_use]
    pub fn auth_path(mut self, path: impl Into<String>) -> Self {
        self.auth_path = Some(path.into());
        self
    }

    /// Sets the search index refresh path.
    #[must_use]
    pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = Some(path.into());
        self
    }

    /// Sets the delay applied before each index refresh.
    #[must_use]
    pub const fn refresh_delay(mut self, delay: Duration) -> Self {
        self.refresh_delay = Some(delay);
        self
    }

    /// Sets the default per-request deadline.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Replaces the set of statuses classified as application errors.
    #[must_use]
    pub fn error_statuses(mut self, statuses: impl IntoIterator<Item = u16>) -> Self {
        self.error_statuses = Some(statuses.into_iter().collect());
        self
    }

    /// Sets the user agent prefix for HTTP requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Builds the [`ClientConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPath`] if a path does not start with `/`,
    /// or [`ConfigError::EmptyErrorStatuses`] if an empty status set was given.
    pub fn build(self) -> Result<ClientConfig, ConfigError> {
        let defaults = ClientConfig::default();

        let auth_path = validate_path("auth_path", self.auth_path)?.unwrap_or(defaults.auth_path);
        let refresh_path =
            validate_path("refresh_path", self.refresh_path)?.unwrap_or(defaults.refresh_path);

        let error_statuses = match self.error_statuses {
            Some(statuses) if statuses.is_empty() => return Err(ConfigError::EmptyErrorStatuses),
            Some(statuses) => statuses,
            None => defaults.error_statuses,
        };

        Ok(ClientConfig {
            auth_path,
            refresh_path,
            refresh_delay: self.refresh_delay.unwrap_or(defaults.refresh_delay),
            timeout: self.timeout.unwrap_or(defaults.timeout),
            error_statuses,
            user_agent_prefix: self.user_agent_prefix,
        })
    }
}

fn validate_path(
    field: &'static str,
    path: Option<String>,
) -> Result<Option<String>, ConfigError> {
    match path {
        Some(path) if !path.starts_with('/') => Err(ConfigError::InvalidPath { field, path }),
        other => Ok(other),
    }
}
