//! Request-time error types.
//!
//! Every failure a call can produce is surfaced as a [`RestError`]:
//!
//! - [`TransportError`]: DNS, connection or deadline failures (code 500)
//! - [`HttpStatusError`]: a response whose status is in the configured error set
//! - [`AuthError`]: the implicit login call failed
//! - [`ValidationError`]: a request was rejected locally before being sent (code 400)
//!
//! The core never retries; retry policy belongs to the caller.
//!
//! # Example
//!
//! ```rust,ignore
//! use tenant_rest::RestError;
//!
//! match client.get(&ctx, "/api/me", Params::new()).await {
//!     Ok(response) => println!("{}", response.body),
//!     Err(RestError::Http(e)) if e.code == 404 => println!("not found: {}", e.message),
//!     Err(e) => println!("failed with {}: {e}", e.code()),
//! }
//! ```

use std::fmt;

use thiserror::Error;

/// Code reported for failures that never produced a response.
pub const TRANSPORT_ERROR_CODE: u16 = 500;

/// Code reported for requests rejected before being sent.
pub const VALIDATION_ERROR_CODE: u16 = 400;

/// The kind of transport failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// The connection could not be established (DNS, refused, TLS).
    Connect,
    /// The request deadline expired.
    Timeout,
    /// Any other failure while sending the request or reading the response.
    Other,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect => write!(f, "connect"),
            Self::Timeout => write!(f, "timeout"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Error returned when no response could be obtained from the server.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct TransportError {
    /// What went wrong at the transport level.
    pub kind: TransportErrorKind,
    /// Message embedding the underlying cause.
    pub message: String,
}

impl TransportError {
    /// Builds a transport error from the underlying client error.
    pub(crate) fn from_reqwest(error: &reqwest::Error) -> Self {
        let kind = if error.is_timeout() {
            TransportErrorKind::Timeout
        } else if error.is_connect() {
            TransportErrorKind::Connect
        } else {
            TransportErrorKind::Other
        };
        Self {
            kind,
            message: format!("Something went wrong trying to contact the server:\n{error}"),
        }
    }

    /// Returns the synthetic status code, always 500.
    #[must_use]
    pub const fn code(&self) -> u16 {
        TRANSPORT_ERROR_CODE
    }
}

/// Error returned when the response status is in the configured error set.
///
/// `message` carries the raw response body so callers can parse
/// platform-specific error payloads.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct HttpStatusError {
    /// The HTTP status code of the response.
    pub code: u16,
    /// The raw response body.
    pub message: String,
}

/// Error returned when the implicit login call fails.
///
/// `AuthError` is `Clone` so a single failed login can be handed to every
/// caller that was waiting on it.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("Login failed ({code}): {message}")]
pub struct AuthError {
    /// Status code of the failed login (500 for transport failures).
    pub code: u16,
    /// Message of the underlying failure.
    pub message: String,
}

impl From<RestError> for AuthError {
    fn from(error: RestError) -> Self {
        match error {
            RestError::Auth(inner) => inner,
            other => Self {
                code: other.code(),
                message: other.message(),
            },
        }
    }
}

/// Error returned when a request is rejected locally.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    /// What is wrong with the request.
    pub message: String,
}

impl ValidationError {
    /// Creates a validation error with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the status code, always 400.
    #[must_use]
    pub const fn code(&self) -> u16 {
        VALIDATION_ERROR_CODE
    }
}

/// Unified error type for every request-time failure.
///
/// # Example
///
/// ```rust
/// use tenant_rest::clients::{HttpStatusError, RestError};
///
/// let error = RestError::from(HttpStatusError {
///     code: 404,
///     message: "Not found".to_string(),
/// });
/// assert_eq!(error.code(), 404);
/// ```
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RestError {
    /// No response could be obtained.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response status is in the error set.
    #[error(transparent)]
    Http(#[from] HttpStatusError),

    /// The implicit login failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The request was rejected before being sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl RestError {
    /// Returns the status code associated with this error.
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            Self::Transport(e) => e.code(),
            Self::Http(e) => e.code,
            Self::Auth(e) => e.code,
            Self::Validation(e) => e.code(),
        }
    }

    /// Returns the error message without any wrapping.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Transport(e) => e.message.clone(),
            Self::Http(e) => e.message.clone(),
            Self::Auth(e) => e.message.clone(),
            Self::Validation(e) => e.message.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_error_displays_body() {
        let error = HttpStatusError {
            code: 404,
            message: r#"{"msg":"Not Found"}"#.to_string(),
        };
        assert_eq!(error.to_string(), r#"{"msg":"Not Found"}"#);
    }

    #[test]
    fn test_transport_error_code_is_500() {
        let error = TransportError {
            kind: TransportErrorKind::Connect,
            message: "refused".to_string(),
        };
        assert_eq!(error.code(), 500);
        assert_eq!(RestError::from(error).code(), 500);
    }

    #[test]
    fn test_validation_error_code_is_400() {
        let error = RestError::from(ValidationError::new("A size must be specified"));
        assert_eq!(error.code(), 400);
        assert_eq!(error.message(), "A size must be specified");
    }

    #[test]
    fn test_auth_error_from_http_error_keeps_code_and_body() {
        let error: AuthError = RestError::from(HttpStatusError {
            code: 401,
            message: "Invalid credentials".to_string(),
        })
        .into();

        assert_eq!(error.code, 401);
        assert_eq!(error.message, "Invalid credentials");
        assert!(error.to_string().contains("Login failed (401)"));
    }

    #[test]
    fn test_auth_error_from_auth_error_is_unwrapped() {
        let inner = AuthError {
            code: 500,
            message: "boom".to_string(),
        };
        let error: AuthError = RestError::Auth(inner.clone()).into();
        assert_eq!(error, inner);
    }

    #[test]
    fn test_transport_kind_display() {
        assert_eq!(TransportErrorKind::Timeout.to_string(), "timeout");
        assert_eq!(TransportErrorKind::Connect.to_string(), "connect");
    }

    #[test]
    fn test_error_types_implement_std_error() {
        let _: &dyn std::error::Error = &ValidationError::new("x");
        let _: &dyn std::error::Error = &AuthError {
            code: 401,
            message: "x".to_string(),
        };
        let _: &dyn std::error::Error = &RestError::from(ValidationError::new("x"));
    }
}
