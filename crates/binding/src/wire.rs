//! Wire-level request and response shapes exchanged with the transport.

use std::time::Duration;

use http::{HeaderMap, Method, StatusCode, Uri, Version};

use crate::body::{ByteStream, RequestBody};

/// One HTTP request, built fresh per call and never reused.
///
/// Wraps an [`http::Request`] and carries the two attributes that have no
/// place in it: the expect-continue flag and the per-call response timeout.
#[derive(Debug)]
pub struct ClientRequest {
    inner: http::Request<RequestBody>,
    expect_continue: bool,
    timeout: Option<Duration>,
}

impl ClientRequest {
    pub(crate) fn new(inner: http::Request<RequestBody>, expect_continue: bool, timeout: Option<Duration>) -> Self {
        Self { inner, expect_continue, timeout }
    }

    pub fn method(&self) -> &Method {
        self.inner.method()
    }

    pub fn uri(&self) -> &Uri {
        self.inner.uri()
    }

    pub fn version(&self) -> Version {
        self.inner.version()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    pub fn body(&self) -> &RequestBody {
        self.inner.body()
    }

    pub fn expect_continue(&self) -> bool {
        self.expect_continue
    }

    /// Response timeout forwarded to the transport, if configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Unwraps into the plain [`http::Request`], dropping the side-band
    /// attributes. Read [`ClientRequest::expect_continue`] and
    /// [`ClientRequest::timeout`] first.
    pub fn into_inner(self) -> http::Request<RequestBody> {
        self.inner
    }
}

/// One HTTP response as the transport delivered it.
///
/// The body is owned: whoever consumes or drops the response closes the
/// underlying stream, so release happens exactly once on every path.
#[derive(Debug)]
pub struct ClientResponse {
    uri: Uri,
    status: StatusCode,
    headers: HeaderMap,
    body: ByteStream,
}

impl ClientResponse {
    pub fn new(uri: Uri, status: StatusCode, headers: HeaderMap, body: ByteStream) -> Self {
        Self { uri, status, headers, body }
    }

    /// URI the response was received from, after any redirects.
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn into_body(self) -> ByteStream {
        self.body
    }
}
