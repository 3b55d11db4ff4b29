//! Error types for client configuration.
//!
//! This module contains the error type returned when constructing validated
//! configuration values such as [`BaseUrl`](crate::BaseUrl),
//! [`ClientConfig`](crate::ClientConfig) and
//! [`RestContext`](crate::RestContext).
//!
//! Request-time failures live in [`crate::clients::RestError`].
//!
//! # Example
//!
//! ```rust
//! use tenant_rest::{BaseUrl, ConfigError};
//!
//! let result = BaseUrl::new("not a url");
//! assert!(matches!(result, Err(ConfigError::InvalidBaseUrl { .. })));
//! ```

use thiserror::Error;

/// Errors that can occur while configuring the client or a context.
///
/// Each variant provides a clear, actionable error message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The base URL is invalid.
    #[error("Invalid base URL '{url}'. Expected 'http://host[:port]' or 'https://host[:port]' without a path.")]
    InvalidBaseUrl {
        /// The invalid URL that was provided.
        url: String,
    },

    /// A configured request path is invalid.
    #[error("Invalid path '{path}' for {field}. Paths must start with '/'.")]
    InvalidPath {
        /// The configuration field the path was provided for.
        field: &'static str,
        /// The invalid path that was provided.
        path: String,
    },

    /// A username was provided without a usable value.
    #[error("Username cannot be empty. Omit credentials entirely for an anonymous context.")]
    EmptyUsername,

    /// The error status set was configured empty.
    #[error("The error status set cannot be empty.")]
    EmptyErrorStatuses,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_base_url_error_message() {
        let error = ConfigError::InvalidBaseUrl {
            url: "ftp://nope".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("ftp://nope"));
        assert!(message.contains("Expected"));
    }

    #[test]
    fn test_invalid_path_error_message() {
        let error = ConfigError::InvalidPath {
            field: "auth_path",
            path: "api/auth".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("auth_path"));
        assert!(message.contains("must start with '/'"));
    }

    #[test]
    fn test_error_implements_std_error() {
        let error = ConfigError::EmptyUsername;
        let _: &dyn std::error::Error = &error;
    }
}
