//! Request parameters and their resolution into wire-ready fields.
//!
//! Callers describe a request's fields with [`Params`], an ordered map from
//! field name to [`ParamValue`]. A value is either a scalar, an array of
//! scalars, or a deferred producer that is only invoked when the request is
//! actually dispatched. Producers are how file uploads are expressed: the
//! stream is opened at the last possible moment and handed straight to the
//! transport.
//!
//! [`resolve`] turns a [`Params`] into [`ResolvedParams`]:
//!
//! 1. every producer is invoked, exactly once;
//! 2. any resulting stream flags the request as streaming;
//! 3. null scalars are dropped, null array elements are filtered out and
//!    arrays left empty are dropped;
//! 4. remaining scalars are rendered as text (`true`/`false` for booleans).
//!
//! # Example
//!
//! ```rust
//! use tenant_rest::clients::{resolve, Params, Scalar, UploadStream};
//!
//! let params = Params::new()
//!     .with("displayName", "Quarterly report")
//!     .with("description", Scalar::Null)
//!     .with("viewers", vec!["u:cam:alice", "u:cam:bob"])
//!     .deferred("file", || UploadStream::from_bytes("report.pdf", "%PDF-1.4").into());
//!
//! let resolved = resolve(params);
//! assert!(resolved.has_stream());
//! assert_eq!(resolved.len(), 3);
//! ```

use std::fmt;
use std::io;
use std::pin::Pin;

use bytes::Bytes;
use futures::stream::{self, Stream};
use reqwest::multipart::{Form, Part};

use crate::clients::errors::ValidationError;

/// Placeholder used when describing a stream field to observers.
pub const STREAM_PLACEHOLDER: &str = "<stream>";

/// A single parameter value.
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    /// An absent value. Never sent.
    Null,
    /// A boolean, rendered `true` or `false`.
    Bool(bool),
    /// An integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// A string.
    Text(String),
}

impl Scalar {
    /// Returns `true` for [`Scalar::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Renders the value as it is sent on the wire, or `None` when absent.
    #[must_use]
    pub fn to_wire(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Bool(b) => Some(b.to_string()),
            Self::Int(i) => Some(i.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::Text(s) => Some(s.clone()),
        }
    }
}

macro_rules! scalar_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Scalar {
                fn from(value: $ty) -> Self {
                    Self::$variant(value.into())
                }
            }

            impl From<$ty> for ParamValue {
                fn from(value: $ty) -> Self {
                    Self::Scalar(Scalar::from(value))
                }
            }

            impl From<Option<$ty>> for ParamValue {
                fn from(value: Option<$ty>) -> Self {
                    Self::Scalar(value.map_or(Scalar::Null, Scalar::from))
                }
            }

            impl From<Vec<$ty>> for ParamValue {
                fn from(values: Vec<$ty>) -> Self {
                    Self::Array(values.into_iter().map(Scalar::from).collect())
                }
            }
        )*
    };
}

scalar_from! {
    bool => Bool,
    i32 => Int,
    u32 => Int,
    i64 => Int,
    f64 => Float,
    String => Text,
    &str => Text,
}

/// Type of the byte stream carried by an [`UploadStream`].
pub type ByteStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send + Sync>>;

/// A file upload produced by a deferred parameter.
///
/// The stream is single-use. It is consumed by the transport, and dropped
/// (closing any underlying resource) if the request fails before or while
/// sending it.
pub struct UploadStream {
    file_name: Option<String>,
    mime: Option<String>,
    length: Option<u64>,
    stream: ByteStream,
}

impl UploadStream {
    /// Wraps an arbitrary byte stream.
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = io::Result<Bytes>> + Send + Sync + 'static,
    {
        Self {
            file_name: None,
            mime: None,
            length: None,
            stream: Box::pin(stream),
        }
    }

    /// Creates an upload from an in-memory buffer.
    pub fn from_bytes(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        let length = bytes.len() as u64;
        Self::new(stream::once(async move { Ok::<_, io::Error>(bytes) }))
            .file_name(file_name)
            .length(length)
    }

    /// Sets the file name sent in the part's `Content-Disposition`.
    #[must_use]
    pub fn file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Sets the part's MIME type.
    #[must_use]
    pub fn mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    /// Sets the stream's length in bytes, when known.
    #[must_use]
    pub const fn length(mut self, length: u64) -> Self {
        self.length = Some(length);
        self
    }

    fn into_part(self) -> Result<Part, ValidationError> {
        let body = reqwest::Body::wrap_stream(self.stream);
        let mut part = match self.length {
            Some(length) => Part::stream_with_length(body, length),
            None => Part::stream(body),
        };
        if let Some(file_name) = self.file_name {
            part = part.file_name(file_name);
        }
        if let Some(mime) = self.mime {
            part = part
                .mime_str(&mime)
                .map_err(|_| ValidationError::new(format!("Invalid MIME type '{mime}'")))?;
        }
        Ok(part)
    }
}

impl fmt::Debug for UploadStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadStream")
            .field("file_name", &self.file_name)
            .field("mime", &self.mime)
            .field("length", &self.length)
            .finish_non_exhaustive()
    }
}

/// The value returned by a deferred producer.
#[derive(Debug)]
pub enum Produced {
    /// A plain value.
    Scalar(Scalar),
    /// A byte stream to be sent as a multipart file part.
    Stream(UploadStream),
}

impl From<Scalar> for Produced {
    fn from(value: Scalar) -> Self {
        Self::Scalar(value)
    }
}

impl From<UploadStream> for Produced {
    fn from(value: UploadStream) -> Self {
        Self::Stream(value)
    }
}

/// A zero-argument function yielding a parameter's real value at dispatch time.
pub type Producer = Box<dyn FnOnce() -> Produced + Send>;

/// A caller-supplied parameter value.
pub enum ParamValue {
    /// A single value.
    Scalar(Scalar),
    /// Several values sent under the same field name.
    Array(Vec<Scalar>),
    /// A value produced when the request is dispatched.
    Deferred(Producer),
}

impl From<Scalar> for ParamValue {
    fn from(value: Scalar) -> Self {
        Self::Scalar(value)
    }
}

impl From<Vec<Scalar>> for ParamValue {
    fn from(values: Vec<Scalar>) -> Self {
        Self::Array(values)
    }
}

impl fmt::Debug for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(value) => f.debug_tuple("Scalar").field(value).finish(),
            Self::Array(values) => f.debug_tuple("Array").field(values).finish(),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

/// An ordered set of request parameters.
///
/// Setting a field that already exists replaces its value in place.
#[derive(Debug, Default)]
pub struct Params {
    fields: Vec<(String, ParamValue)>,
}

impl Params {
    /// Creates an empty parameter set.
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Sets a field, replacing any earlier value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Sets a field and returns the set, for chaining.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Sets a field whose value is produced at dispatch time.
    #[must_use]
    pub fn deferred<F>(self, name: impl Into<String>, producer: F) -> Self
    where
        F: FnOnce() -> Produced + Send + 'static,
    {
        self.with(name, ParamValue::Deferred(Box::new(producer)))
    }

    /// Returns the value of a field.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    /// Returns the number of fields, including ones that resolve to nothing.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

/// A sanitized, wire-ready field value.
#[derive(Debug)]
pub enum ResolvedValue {
    /// A single text value.
    Text(String),
    /// Several text values sharing the field name.
    List(Vec<String>),
    /// A file upload.
    Stream(UploadStream),
}

/// The output of [`resolve`].
#[derive(Debug, Default)]
pub struct ResolvedParams {
    fields: Vec<(String, ResolvedValue)>,
    has_stream: bool,
}

impl ResolvedParams {
    /// Returns `true` if any field is a byte stream.
    #[must_use]
    pub const fn has_stream(&self) -> bool {
        self.has_stream
    }

    /// Returns the resolved fields in order.
    #[must_use]
    pub fn fields(&self) -> &[(String, ResolvedValue)] {
        &self.fields
    }

    /// Returns the number of resolved fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if nothing is left to send.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns `true` if `name` survived sanitization.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|(existing, _)| existing == name)
    }

    /// Describes the fields as name/value pairs, with streams shown as
    /// [`STREAM_PLACEHOLDER`].
    #[must_use]
    pub fn describe(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.fields.len());
        for (name, value) in &self.fields {
            match value {
                ResolvedValue::Text(text) => pairs.push((name.clone(), text.clone())),
                ResolvedValue::List(items) => {
                    pairs.extend(items.iter().map(|item| (name.clone(), item.clone())));
                }
                ResolvedValue::Stream(_) => {
                    pairs.push((name.clone(), STREAM_PLACEHOLDER.to_string()));
                }
            }
        }
        pairs
    }

    fn push_scalar(&mut self, name: String, scalar: &Scalar) {
        if let Some(text) = scalar.to_wire() {
            self.fields.push((name, ResolvedValue::Text(text)));
        }
    }

    /// Flattens the fields into pairs for query strings and URL-encoded
    /// bodies. Array values become repeated keys. Streams cannot be expressed
    /// this way and are dropped.
    pub(crate) fn into_pairs(self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.fields.len());
        for (name, value) in self.fields {
            match value {
                ResolvedValue::Text(text) => pairs.push((name, text)),
                ResolvedValue::List(items) => {
                    pairs.extend(items.into_iter().map(|item| (name.clone(), item)));
                }
                ResolvedValue::Stream(_) => {
                    tracing::warn!("Dropping stream field '{}' from a non-multipart request", name);
                }
            }
        }
        pairs
    }

    /// Builds a multipart form. Array values are unrolled into one part per
    /// element, all sharing the field name.
    pub(crate) fn into_multipart(self) -> Result<Form, ValidationError> {
        let mut form = Form::new();
        for (name, value) in self.fields {
            match value {
                ResolvedValue::Text(text) => form = form.text(name, text),
                ResolvedValue::List(items) => {
                    for item in items {
                        form = form.text(name.clone(), item);
                    }
                }
                ResolvedValue::Stream(upload) => form = form.part(name, upload.into_part()?),
            }
        }
        Ok(form)
    }
}

/// Resolves caller parameters into wire-ready fields.
///
/// Deferred producers are invoked here, once each, in field order.
#[must_use]
pub fn resolve(params: Params) -> ResolvedParams {
    let mut resolved = ResolvedParams::default();

    for (name, value) in params.fields {
        match value {
            ParamValue::Scalar(scalar) => resolved.push_scalar(name, &scalar),
            ParamValue::Array(items) => {
                let items: Vec<String> = items.iter().filter_map(Scalar::to_wire).collect();
                if !items.is_empty() {
                    resolved.fields.push((name, ResolvedValue::List(items)));
                }
            }
            ParamValue::Deferred(producer) => match producer() {
                Produced::Scalar(scalar) => resolved.push_scalar(name, &scalar),
                Produced::Stream(upload) => {
                    resolved.has_stream = true;
                    resolved.fields.push((name, ResolvedValue::Stream(upload)));
                }
            },
        }
    }

    resolved
}
