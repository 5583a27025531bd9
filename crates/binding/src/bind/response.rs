//! Wire-response to message translation.

use http::header::{CONTENT_TYPE, LOCATION};
use tracing::debug;

use crate::body::ByteStream;
use crate::charset::content_type_charset;
use crate::config::HttpConfig;
use crate::error::{OperationFailed, ResponseError};
use crate::filter::HeaderFilter;
use crate::headers::{self, FieldValue};
use crate::message::Message;
use crate::wire::ClientResponse;

/// Maps the wire response back into `message`.
///
/// The status gate runs before anything is written: outside the success set
/// with failure-throwing on, the call fails and the response body is
/// released unread. Otherwise status metadata, filtered headers and the
/// materialized body land in the message.
pub(crate) async fn map_response(
    response: ClientResponse,
    message: &mut Message,
    config: &HttpConfig,
    filter: &dyn HeaderFilter,
) -> Result<(), ResponseError> {
    let status = response.status();
    debug!(status = %status, uri = %response.uri(), "mapping wire response");

    if !config.ok_status_ranges().contains(status.as_u16()) && config.throw_on_failure() {
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        return Err(OperationFailed::new(response.uri().clone(), status, location).into());
    }

    message.set_header(headers::HTTP_RESPONSE_CODE, status.as_u16());
    if let Some(reason) = status.canonical_reason() {
        message.set_header(headers::HTTP_RESPONSE_TEXT, reason);
    }

    for name in response.headers().keys() {
        let mut values: Vec<String> = response
            .headers()
            .get_all(name)
            .iter()
            .map(|raw| match raw.to_str() {
                Ok(text) => text.to_owned(),
                Err(_) => String::from_utf8_lossy(raw.as_bytes()).into_owned(),
            })
            .collect();

        // Charset is recorded before the filter gets a say, so text decoding
        // works even when the content-type header itself is filtered out.
        if name == CONTENT_TYPE {
            if let Some(label) = values.first().and_then(|value| content_type_charset(value)) {
                message.set_charset(label);
            }
        }

        if !values.first().is_some_and(|value| filter.keep_inbound(name.as_str(), value)) {
            continue;
        }

        let field = match values.len() {
            0 => continue,
            1 => FieldValue::from(values.swap_remove(0)),
            _ => FieldValue::from(values),
        };
        message.set_header(name.as_str(), field);
    }

    let body = response.into_body();
    if config.response_body_as_bytes() {
        let bytes = body.collect().await.map_err(ResponseError::io)?;
        message.set_body(bytes);
    } else if config.disable_stream_cache() {
        message.set_body(body);
    } else {
        let bytes = body.collect().await.map_err(ResponseError::io)?;
        message.set_body(ByteStream::cached(bytes));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::pin::Pin;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::task::{Context, Poll};

    use bytes::Bytes;
    use futures::stream::Stream;
    use http::{HeaderMap, HeaderValue, StatusCode, Uri};

    use super::*;
    use crate::filter::{StandardHeaderFilter, fn_filter};
    use crate::message::Body;

    fn uri() -> Uri {
        "http://example.org/api".parse().unwrap()
    }

    fn config() -> HttpConfig {
        HttpConfig::parse("http://example.org/api").unwrap()
    }

    fn response(status: StatusCode, headers: HeaderMap, body: ByteStream) -> ClientResponse {
        ClientResponse::new(uri(), status, headers, body)
    }

    async fn map(response: ClientResponse, message: &mut Message, config: &HttpConfig) -> Result<(), ResponseError> {
        map_response(response, message, config, &StandardHeaderFilter).await
    }

    struct ProbeStream {
        chunk: Option<Bytes>,
        drops: Arc<AtomicUsize>,
    }

    impl ProbeStream {
        fn new(drops: Arc<AtomicUsize>) -> Self {
            Self { chunk: Some(Bytes::from_static(b"probe")), drops }
        }
    }

    impl Stream for ProbeStream {
        type Item = io::Result<Bytes>;

        fn poll_next(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
            Poll::Ready(self.get_mut().chunk.take().map(Ok))
        }
    }

    impl Drop for ProbeStream {
        fn drop(&mut self) {
            self.drops.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn success_maps_metadata_headers_and_cached_body() {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("text/plain; charset=iso-8859-1"));
        headers.insert("x-one", HeaderValue::from_static("1"));
        headers.append("set-cookie", HeaderValue::from_static("a=1"));
        headers.append("set-cookie", HeaderValue::from_static("b=2"));

        let mut message = Message::new();
        map(response(StatusCode::OK, headers, ByteStream::cached(Bytes::from_static(b"hello"))), &mut message, &config())
            .await
            .unwrap();

        assert_eq!(message.header(headers::HTTP_RESPONSE_CODE), Some("200"));
        assert_eq!(message.header(headers::HTTP_RESPONSE_TEXT), Some("OK"));
        assert_eq!(message.header("Content-Type"), Some("text/plain; charset=iso-8859-1"));
        assert_eq!(message.header("X-One"), Some("1"));
        assert!(message.charset().is_some_and(|label| label.eq_ignore_ascii_case("iso-8859-1")));

        let cookies = message.headers().get("set-cookie").unwrap();
        assert!(!cookies.is_single());
        assert_eq!(cookies.iter().collect::<Vec<_>>(), ["a=1", "b=2"]);

        match message.take_body() {
            Body::Stream(stream) => {
                assert!(stream.is_cached());
                assert_eq!(stream.collect().await.unwrap(), Bytes::from_static(b"hello"));
            }
            other => panic!("expected cached stream body, got {other:?}"),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn failure_status_raises_and_releases_body_unread() {
        let drops = Arc::new(AtomicUsize::new(0));
        let mut headers = HeaderMap::new();
        headers.insert("location", HeaderValue::from_static("http://example.org/moved"));

        let mut message = Message::new();
        let err = map(
            response(StatusCode::NOT_FOUND, headers, ByteStream::new(ProbeStream::new(Arc::clone(&drops)))),
            &mut message,
            &config(),
        )
        .await
        .unwrap_err();

        let failure = err.operation_failed().unwrap();
        assert_eq!(failure.status, StatusCode::NOT_FOUND);
        assert_eq!(failure.status_text.as_deref(), Some("Not Found"));
        assert_eq!(failure.location.as_deref(), Some("http://example.org/moved"));
        assert_eq!(failure.uri.to_string(), "http://example.org/api");

        // body never read, released exactly once on the error path
        assert_eq!(drops.load(Ordering::SeqCst), 1);
        assert_eq!(message.header(headers::HTTP_RESPONSE_CODE), None);
        assert!(!message.has_body());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn failure_status_with_throwing_disabled_records_metadata() {
        let mut config = config();
        config.set_throw_on_failure(false);

        let mut message = Message::new();
        map(response(StatusCode::NOT_FOUND, HeaderMap::new(), ByteStream::cached(Bytes::from_static(b"missing"))), &mut message, &config)
            .await
            .unwrap();

        assert_eq!(message.header(headers::HTTP_RESPONSE_CODE), Some("404"));
        assert_eq!(message.header(headers::HTTP_RESPONSE_TEXT), Some("Not Found"));
        assert!(message.has_body());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn widened_status_ranges_accept_redirects() {
        let mut config = config();
        config.set_ok_status_ranges("200-299,301-302").unwrap();

        let mut message = Message::new();
        map(response(StatusCode::MOVED_PERMANENTLY, HeaderMap::new(), ByteStream::cached(Bytes::new())), &mut message, &config)
            .await
            .unwrap();

        assert_eq!(message.header(headers::HTTP_RESPONSE_CODE), Some("301"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn byte_array_mode_reads_eagerly() {
        let mut config = config();
        config.set_response_body_as_bytes(true);

        let mut message = Message::new();
        map(response(StatusCode::OK, HeaderMap::new(), ByteStream::cached(Bytes::from_static(b"payload"))), &mut message, &config)
            .await
            .unwrap();

        assert!(matches!(message.body(), Body::Bytes(bytes) if bytes == &Bytes::from_static(b"payload")));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn disabled_cache_exposes_raw_stream() {
        let mut config = config();
        config.set_disable_stream_cache(true);

        let drops = Arc::new(AtomicUsize::new(0));
        let mut message = Message::new();
        map(response(StatusCode::OK, HeaderMap::new(), ByteStream::new(ProbeStream::new(Arc::clone(&drops)))), &mut message, &config)
            .await
            .unwrap();

        // stream handed over untouched, still unreleased and single-pass
        assert_eq!(drops.load(Ordering::SeqCst), 0);
        match message.take_body() {
            Body::Stream(stream) => {
                assert!(!stream.is_cached());
                assert_eq!(stream.collect().await.unwrap(), Bytes::from_static(b"probe"));
            }
            other => panic!("expected raw stream body, got {other:?}"),
        }
        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn default_mode_buffers_into_rereadable_stream() {
        let drops = Arc::new(AtomicUsize::new(0));
        let mut message = Message::new();
        map(response(StatusCode::OK, HeaderMap::new(), ByteStream::new(ProbeStream::new(Arc::clone(&drops)))), &mut message, &config())
            .await
            .unwrap();

        assert_eq!(drops.load(Ordering::SeqCst), 1);
        match message.take_body() {
            Body::Stream(stream) => {
                let copy = stream.try_clone().unwrap();
                assert_eq!(stream.collect().await.unwrap(), Bytes::from_static(b"probe"));
                assert_eq!(copy.collect().await.unwrap(), Bytes::from_static(b"probe"));
            }
            other => panic!("expected cached stream body, got {other:?}"),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn read_failure_surfaces_as_io_error() {
        let failing = ByteStream::new(futures::stream::iter(vec![
            Ok(Bytes::from_static(b"a")),
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")),
        ]));

        let mut message = Message::new();
        let err = map(response(StatusCode::OK, HeaderMap::new(), failing), &mut message, &config()).await.unwrap_err();
        assert!(matches!(err, ResponseError::Io { .. }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn inbound_filter_drops_rejected_headers() {
        let filter = fn_filter(|_, name, _| !name.eq_ignore_ascii_case("x-internal"));

        let mut headers = HeaderMap::new();
        headers.insert("x-internal", HeaderValue::from_static("secret"));
        headers.insert("x-public", HeaderValue::from_static("ok"));

        let mut message = Message::new();
        map_response(
            response(StatusCode::OK, headers, ByteStream::cached(Bytes::new())),
            &mut message,
            &config(),
            &filter,
        )
        .await
        .unwrap();

        assert_eq!(message.header("x-internal"), None);
        assert_eq!(message.header("x-public"), Some("ok"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn charset_recorded_even_when_content_type_is_filtered() {
        let filter = fn_filter(|_, name, _| !name.eq_ignore_ascii_case("content-type"));

        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("application/json; charset=utf-8"));

        let mut message = Message::new();
        map_response(
            response(StatusCode::OK, headers, ByteStream::cached(Bytes::new())),
            &mut message,
            &config(),
            &filter,
        )
        .await
        .unwrap();

        assert_eq!(message.header("content-type"), None);
        assert!(message.charset().is_some_and(|label| label.eq_ignore_ascii_case("utf-8")));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn control_named_wire_headers_cannot_spoof_metadata() {
        let mut headers = HeaderMap::new();
        headers.insert("ferry-http-response-code", HeaderValue::from_static("999"));

        let mut message = Message::new();
        map(response(StatusCode::OK, headers, ByteStream::cached(Bytes::new())), &mut message, &config())
            .await
            .unwrap();

        assert_eq!(message.header(headers::HTTP_RESPONSE_CODE), Some("200"));
    }
}
