//! Generic message exchanged with the binding.
//!
//! A [`Message`] is transport-agnostic: a [`HeaderBag`] of named values plus a
//! [`Body`] in one of a small set of shapes. The binding reads headers and the
//! outbound body from it, and writes response headers and the inbound body
//! back into it.

use std::fmt;
use std::path::PathBuf;

use bytes::Bytes;

use crate::body::{ByteStream, RequestBody};
use crate::headers::{FieldValue, HeaderBag};

/// Body shapes a message can carry.
///
/// The set is closed: callers pick one of these shapes, and the binding
/// decides per shape how to put it on the wire.
#[derive(Debug, Default)]
pub enum Body {
    /// No payload.
    #[default]
    Empty,
    /// Raw bytes, sent as-is with an exact content length.
    Bytes(Bytes),
    /// Text, encoded with the message charset before sending.
    Text(String),
    /// A file on disk, streamed with its size as the content length.
    File(PathBuf),
    /// An arbitrary chunk stream, sent with its declared length if known.
    Stream(ByteStream),
    /// A payload already in wire form, sent without further interpretation.
    Prepared(RequestBody),
}

impl Body {
    /// `true` for every shape except [`Body::Empty`].
    #[inline]
    pub fn is_present(&self) -> bool {
        !matches!(self, Body::Empty)
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Body::Bytes(bytes)
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Body::Bytes(bytes.into())
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::Text(text)
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Body::Text(text.to_owned())
    }
}

impl From<PathBuf> for Body {
    fn from(path: PathBuf) -> Self {
        Body::File(path)
    }
}

impl From<ByteStream> for Body {
    fn from(stream: ByteStream) -> Self {
        Body::Stream(stream)
    }
}

impl From<RequestBody> for Body {
    fn from(body: RequestBody) -> Self {
        Body::Prepared(body)
    }
}

/// Protocol-neutral message: headers, a body and an optional charset.
///
/// The charset is advisory. On the way out it selects the encoding for
/// [`Body::Text`]; on the way in the binding records the charset announced by
/// the peer's `Content-Type` so later processing can decode the payload.
#[derive(Debug, Default)]
pub struct Message {
    headers: HeaderBag,
    body: Body,
    charset: Option<String>,
}

impl Message {
    pub fn new() -> Self {
        Self::default()
    }

    /// Message with the given body and no headers.
    pub fn with_body<B: Into<Body>>(body: B) -> Self {
        Self { body: body.into(), ..Self::default() }
    }

    #[inline]
    pub fn headers(&self) -> &HeaderBag {
        &self.headers
    }

    #[inline]
    pub fn headers_mut(&mut self) -> &mut HeaderBag {
        &mut self.headers
    }

    /// First value of a header, if any.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.first(name)
    }

    /// Sets a header, replacing previous values.
    pub fn set_header<V: Into<FieldValue>>(&mut self, name: &str, value: V) {
        self.headers.set(name, value);
    }

    #[inline]
    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn set_body<B: Into<Body>>(&mut self, body: B) {
        self.body = body.into();
    }

    /// Removes and returns the body, leaving [`Body::Empty`] behind.
    ///
    /// Single-pass shapes can only go on the wire once, so the binding takes
    /// the body rather than borrowing it.
    pub fn take_body(&mut self) -> Body {
        std::mem::take(&mut self.body)
    }

    /// `true` when the body shape carries a payload.
    #[inline]
    pub fn has_body(&self) -> bool {
        self.body.is_present()
    }

    pub fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    pub fn set_charset<S: Into<String>>(&mut self, charset: S) {
        self.charset = Some(charset.into());
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shape = match &self.body {
            Body::Empty => "empty",
            Body::Bytes(_) => "bytes",
            Body::Text(_) => "text",
            Body::File(_) => "file",
            Body::Stream(_) => "stream",
            Body::Prepared(_) => "prepared",
        };
        write!(f, "Message({} headers, {shape} body)", self.headers.len())
    }
}
