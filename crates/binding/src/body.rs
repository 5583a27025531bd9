//! Payload carriers used on both sides of the wire.
//!
//! [`ByteStream`] is the stream shape a message body or a wire response body
//! takes: either a single-pass boxed chunk stream or a fully buffered payload
//! that can be re-read. [`RequestBody`] is the publisher handed to the
//! transport, an [`http_body::Body`] whose size hint drives content-length
//! framing.

use std::fmt;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use bytes::{Bytes, BytesMut};
use futures::stream::{BoxStream, Stream, StreamExt};
use http_body::{Body as HttpBody, Frame, SizeHint};

/// Byte payload, either streamed once or buffered and re-readable.
pub struct ByteStream {
    kind: StreamKind,
    length: Option<u64>,
}

enum StreamKind {
    Stream(BoxStream<'static, io::Result<Bytes>>),
    Cached(Bytes),
}

impl ByteStream {
    /// Wraps a single-pass chunk stream with no known length.
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = io::Result<Bytes>> + Send + 'static,
    {
        Self { kind: StreamKind::Stream(stream.boxed()), length: None }
    }

    /// A buffered payload. Cheap to copy via [`ByteStream::try_clone`] and
    /// collectable any number of times.
    pub fn cached<B: Into<Bytes>>(bytes: B) -> Self {
        let bytes = bytes.into();
        let length = bytes.len() as u64;
        Self { kind: StreamKind::Cached(bytes), length: Some(length) }
    }

    /// Attaches a length hint without touching the data.
    pub fn with_declared_length(mut self, length: u64) -> Self {
        self.length = Some(length);
        self
    }

    pub fn length(&self) -> Option<u64> {
        self.length
    }

    #[inline]
    pub fn is_cached(&self) -> bool {
        matches!(self.kind, StreamKind::Cached(_))
    }

    /// Copy of a buffered payload, `None` for single-pass streams.
    pub fn try_clone(&self) -> Option<Self> {
        match &self.kind {
            StreamKind::Cached(bytes) => Some(Self::cached(bytes.clone())),
            StreamKind::Stream(_) => None,
        }
    }

    /// Drains the payload into one contiguous buffer.
    pub async fn collect(self) -> io::Result<Bytes> {
        match self.kind {
            StreamKind::Cached(bytes) => Ok(bytes),
            StreamKind::Stream(mut stream) => {
                let mut buf = BytesMut::new();
                while let Some(chunk) = stream.next().await {
                    buf.extend_from_slice(&chunk?);
                }
                Ok(buf.freeze())
            }
        }
    }
}

impl Stream for ByteStream {
    type Item = io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let kind = &mut self.get_mut().kind;
        match kind {
            StreamKind::Stream(stream) => stream.as_mut().poll_next(cx),
            StreamKind::Cached(bytes) if bytes.is_empty() => Poll::Ready(None),
            StreamKind::Cached(bytes) => Poll::Ready(Some(Ok(std::mem::take(bytes)))),
        }
    }
}

impl From<Bytes> for ByteStream {
    fn from(bytes: Bytes) -> Self {
        Self::cached(bytes)
    }
}

impl From<Vec<u8>> for ByteStream {
    fn from(bytes: Vec<u8>) -> Self {
        Self::cached(bytes)
    }
}

impl fmt::Debug for ByteStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            StreamKind::Stream(_) => "stream",
            StreamKind::Cached(_) => "cached",
        };
        f.debug_struct("ByteStream").field("kind", &kind).field("length", &self.length).finish()
    }
}

/// Request payload in the form the transport consumes.
pub struct RequestBody {
    kind: BodyKind,
}

enum BodyKind {
    Empty,
    Full(Option<Bytes>),
    Stream { stream: BoxStream<'static, io::Result<Bytes>>, length: Option<u64> },
}

impl RequestBody {
    pub fn empty() -> Self {
        Self { kind: BodyKind::Empty }
    }

    /// Fixed-length payload; the exact size hint becomes the content length.
    pub fn full<B: Into<Bytes>>(bytes: B) -> Self {
        Self { kind: BodyKind::Full(Some(bytes.into())) }
    }

    /// Streaming payload. A buffered [`ByteStream`] degrades to the
    /// fixed-length form; a single-pass stream keeps its length hint, if any.
    pub fn stream(inner: ByteStream) -> Self {
        let length = inner.length();
        match inner.kind {
            StreamKind::Cached(bytes) => Self::full(bytes),
            StreamKind::Stream(stream) => Self { kind: BodyKind::Stream { stream, length } },
        }
    }

    #[inline]
    pub fn is_empty_payload(&self) -> bool {
        match &self.kind {
            BodyKind::Empty => true,
            BodyKind::Full(bytes) => bytes.as_ref().is_none_or(Bytes::is_empty),
            BodyKind::Stream { .. } => false,
        }
    }

    /// Declared or buffered payload length, `None` when unknown.
    pub fn length(&self) -> Option<u64> {
        match &self.kind {
            BodyKind::Empty => Some(0),
            BodyKind::Full(bytes) => Some(bytes.as_ref().map_or(0, Bytes::len) as u64),
            BodyKind::Stream { length, .. } => *length,
        }
    }

    /// The whole payload when it is buffered in memory, `None` for streams.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match &self.kind {
            BodyKind::Full(Some(bytes)) => Some(bytes),
            _ => None,
        }
    }
}

impl Default for RequestBody {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Bytes> for RequestBody {
    fn from(bytes: Bytes) -> Self {
        Self::full(bytes)
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(bytes: Vec<u8>) -> Self {
        Self::full(bytes)
    }
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        Self::full(text)
    }
}

impl From<&'static str> for RequestBody {
    fn from(text: &'static str) -> Self {
        if text.is_empty() { Self::empty() } else { Self::full(text) }
    }
}

impl HttpBody for RequestBody {
    type Data = Bytes;
    type Error = io::Error;

    fn poll_frame(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let kind = &mut self.get_mut().kind;
        match kind {
            BodyKind::Empty => Poll::Ready(None),
            BodyKind::Full(bytes) => Poll::Ready(bytes.take().filter(|b| !b.is_empty()).map(|b| Ok(Frame::data(b)))),
            BodyKind::Stream { stream, .. } => match ready!(stream.as_mut().poll_next(cx)) {
                Some(Ok(chunk)) => Poll::Ready(Some(Ok(Frame::data(chunk)))),
                Some(Err(e)) => Poll::Ready(Some(Err(e))),
                None => Poll::Ready(None),
            },
        }
    }

    fn is_end_stream(&self) -> bool {
        match &self.kind {
            BodyKind::Empty => true,
            BodyKind::Full(bytes) => bytes.is_none(),
            BodyKind::Stream { .. } => false,
        }
    }

    fn size_hint(&self) -> SizeHint {
        match &self.kind {
            BodyKind::Empty => SizeHint::with_exact(0),
            BodyKind::Full(bytes) => SizeHint::with_exact(bytes.as_ref().map_or(0, Bytes::len) as u64),
            BodyKind::Stream { length, .. } => length.map_or_else(SizeHint::default, SizeHint::with_exact),
        }
    }
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            BodyKind::Empty => "empty",
            BodyKind::Full(_) => "full",
            BodyKind::Stream { .. } => "stream",
        };
        f.debug_struct("RequestBody").field("kind", &kind).field("length", &self.length()).finish()
    }
}
