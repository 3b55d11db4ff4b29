//! Lifecycle notifications for external observers.
//!
//! Observers are injected into a [`RestClient`](crate::RestClient) when it is
//! built, so two clients in the same process never see each other's traffic.
//! Notifications are side effects only; they never change a call's result.

use std::sync::{Arc, Mutex, PoisonError};

use crate::auth::RestContext;
use crate::clients::errors::RestError;
use crate::clients::http_request::HttpMethod;
use crate::clients::http_response::ApiResponse;

/// Emitted right before a request is handed to the transport.
#[derive(Debug)]
pub struct RequestEvent<'a> {
    /// The context the request is issued for.
    pub context: &'a RestContext,
    /// The absolute URL.
    pub url: &'a str,
    /// The HTTP method.
    pub method: HttpMethod,
    /// The resolved parameters; stream fields appear as a placeholder.
    pub data: &'a [(String, String)],
}

/// Receives request lifecycle notifications.
///
/// Every method has an empty default, so implementors only override what
/// they care about.
///
/// # Example
///
/// ```rust
/// use tenant_rest::clients::{RequestEvent, RequestObserver};
///
/// struct PrintUrls;
///
/// impl RequestObserver for PrintUrls {
///     fn on_request(&self, event: &RequestEvent<'_>) {
///         println!("{} {}", event.method, event.url);
///     }
/// }
/// ```
pub trait RequestObserver: Send + Sync {
    /// Called when a request is issued.
    fn on_request(&self, event: &RequestEvent<'_>) {
        let _ = event;
    }

    /// Called when a successful response is received.
    fn on_response(&self, response: &ApiResponse) {
        let _ = response;
    }

    /// Called when a call fails. `response` is present when the server
    /// answered with an error status.
    ///
    /// A failed login is reported twice: first as the login call's own
    /// error, then once as [`RestError::Auth`], however many calls were
    /// waiting on that login.
    fn on_error(&self, error: &RestError, response: Option<&ApiResponse>) {
        let _ = (error, response);
    }
}

/// The observers registered on a client.
#[derive(Clone, Default)]
pub(crate) struct Observers(Vec<Arc<dyn RequestObserver>>);

impl Observers {
    pub(crate) fn push(&mut self, observer: Arc<dyn RequestObserver>) {
        self.0.push(observer);
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }

    pub(crate) fn request(&self, event: &RequestEvent<'_>) {
        for observer in &self.0 {
            observer.on_request(event);
        }
    }

    pub(crate) fn response(&self, response: &ApiResponse) {
        for observer in &self.0 {
            observer.on_response(response);
        }
    }

    pub(crate) fn error(&self, error: &RestError, response: Option<&ApiResponse>) {
        for observer in &self.0 {
            observer.on_error(error, response);
        }
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Observers({})", self.len())
    }
}

/// An owned copy of a notification, as stored by [`RecordingObserver`].
#[derive(Clone, Debug, PartialEq)]
pub enum ObservedEvent {
    /// A request was issued.
    Request {
        /// The absolute URL.
        url: String,
        /// The HTTP method.
        method: HttpMethod,
        /// The resolved parameters.
        data: Vec<(String, String)>,
    },
    /// A successful response was received.
    Response {
        /// The status code.
        code: u16,
    },
    /// A call failed.
    Error {
        /// The error.
        error: RestError,
        /// The error response's status, if the server answered.
        code: Option<u16>,
    },
}

/// An observer that records every notification, for test assertions.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use tenant_rest::clients::RecordingObserver;
/// use tenant_rest::RestClient;
///
/// let recorder = Arc::new(RecordingObserver::default());
/// let client = RestClient::builder().observer(recorder.clone()).build();
/// assert!(recorder.events().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ObservedEvent>>,
}

impl RecordingObserver {
    /// Returns a snapshot of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<ObservedEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the URLs of the recorded requests, in order.
    #[must_use]
    pub fn request_urls(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ObservedEvent::Request { url, .. } => Some(url),
                _ => None,
            })
            .collect()
    }

    /// Removes every recorded event.
    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn record(&self, event: ObservedEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl RequestObserver for RecordingObserver {
    fn on_request(&self, event: &RequestEvent<'_>) {
        self.record(ObservedEvent::Request {
            url: event.url.to_string(),
            method: event.method,
            data: event.data.to_vec(),
        });
    }

    fn on_response(&self, response: &ApiResponse) {
        self.record(ObservedEvent::Response {
            code: response.code,
        });
    }

    fn on_error(&self, error: &RestError, response: Option<&ApiResponse>) {
        self.record(ObservedEvent::Error {
            error: error.clone(),
            code: response.map(|r| r.code),
        });
    }
}
