//! Validated newtype wrappers for configuration values.
//!
//! This module provides type-safe wrappers around string values that validate
//! their contents on construction. Invalid values are rejected with clear error messages.

use crate::error::ConfigError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A validated tenant base URL.
///
/// A base URL is a scheme (`http` or `https`) followed by a host and an
/// optional port. It never carries a path or a trailing slash, so request
/// paths can be appended directly.
///
/// # Example
///
/// ```rust
/// use tenant_rest::BaseUrl;
///
/// let url = BaseUrl::new("https://tenant.example.com:8443/").unwrap();
/// assert_eq!(url.as_ref(), "https://tenant.example.com:8443");
/// assert_eq!(url.scheme(), "https");
/// assert_eq!(url.authority(), "tenant.example.com:8443");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BaseUrl {
    url: String,
    scheme_end: usize,
}

impl BaseUrl {
    const SEPARATOR: &'static str = "://";

    /// Creates a new validated base URL.
    ///
    /// A single trailing slash is stripped.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if the scheme is not `http` or
    /// `https`, the host is empty, or the URL carries a path, query or fragment.
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into();
        let trimmed = url.trim();
        let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
        let invalid = || ConfigError::InvalidBaseUrl { url: url.clone() };

        let scheme_end = trimmed.find(Self::SEPARATOR).ok_or_else(invalid)?;
        let scheme = &trimmed[..scheme_end];
        if scheme != "http" && scheme != "https" {
            return Err(invalid());
        }

        let authority = &trimmed[scheme_end + Self::SEPARATOR.len()..];
        if authority.is_empty()
            || authority
                .chars()
                .any(|c| matches!(c, '/' | '?' | '#') || c.is_whitespace())
        {
            return Err(invalid());
        }

        Ok(Self {
            url: trimmed.to_string(),
            scheme_end,
        })
    }

    /// Returns the scheme (`http` or `https`).
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.url[..self.scheme_end]
    }

    /// Returns the host and optional port.
    #[must_use]
    pub fn authority(&self) -> &str {
        &self.url[self.scheme_end + Self::SEPARATOR.len()..]
    }

    /// Joins a request path onto this base URL.
    #[must_use]
    pub fn join(&self, path: &str) -> String {
        format!("{}{path}", self.url)
    }
}

impl AsRef<str> for BaseUrl {
    fn as_ref(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

impl Serialize for BaseUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.url)
    }
}

impl<'de> Deserialize<'de> for BaseUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(de::Error::custom)
    }
}

/// Login credentials for a non-anonymous context.
///
/// # Security
///
/// The `Debug` implementation masks the password.
///
/// ```rust
/// use tenant_rest::Credentials;
///
/// let credentials = Credentials::new("alice", "hunter2").unwrap();
/// assert_eq!(credentials.username(), "alice");
/// assert!(!format!("{credentials:?}").contains("hunter2"));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Creates a new credential pair.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyUsername`] if the username is empty.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let username = username.into();
        if username.trim().is_empty() {
            return Err(ConfigError::EmptyUsername);
        }
        Ok(Self {
            username,
            password: password.into(),
        })
    }

    /// Returns the username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the password.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"*****")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_strips_trailing_slash() {
        let url = BaseUrl::new("http://localhost:2001/").unwrap();
        assert_eq!(url.as_ref(), "http://localhost:2001");
        assert_eq!(url.join("/api/me"), "http://localhost:2001/api/me");
    }

    #[test]
    fn test_base_url_rejects_unknown_scheme() {
        assert!(matches!(
            BaseUrl::new("ftp://files.example.com"),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn test_base_url_rejects_paths_and_missing_host() {
        assert!(BaseUrl::new("http://example.com/api").is_err());
        assert!(BaseUrl::new("http://example.com?x=1").is_err());
        assert!(BaseUrl::new("http://").is_err());
        assert!(BaseUrl::new("example.com").is_err());
    }

    #[test]
    fn test_base_url_accessors() {
        let url = BaseUrl::new("  https://cam.oae.example:443  ").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.authority(), "cam.oae.example:443");
        assert_eq!(url.to_string(), "https://cam.oae.example:443");
    }

    #[test]
    fn test_base_url_serde_round_trip_validates() {
        let url: BaseUrl = serde_json::from_str(r#""http://a.example/""#).unwrap();
        assert_eq!(serde_json::to_string(&url).unwrap(), r#""http://a.example""#);

        let bad: Result<BaseUrl, _> = serde_json::from_str(r#""gopher://x""#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_credentials_reject_empty_username() {
        assert!(matches!(
            Credentials::new("  ", "secret"),
            Err(ConfigError::EmptyUsername)
        ));
    }

    #[test]
    fn test_credentials_debug_masks_password() {
        let credentials = Credentials::new("admin", "administrator").unwrap();
        let debug = format!("{credentials:?}");
        assert!(debug.contains("admin"));
        assert!(!debug.contains("administrator"));
    }
}
