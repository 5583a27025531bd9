//! Bundled transport over a shared `reqwest` engine.
//!
//! One engine is built per endpoint from the configuration snapshot and
//! cloned into every producer; clones share the same connection pool.

use std::io;

use async_trait::async_trait;
use futures::StreamExt;
use http::header::{CONTENT_LENGTH, EXPECT};
use http::{HeaderValue, Uri, Version};
use http_body_util::BodyExt;
use reqwest::redirect;
use tracing::debug;

use ferry_binding::{ByteStream, ClientRequest, ClientResponse, HttpConfig, RedirectPolicy};

use crate::error::{EndpointBuildError, TransportError};
use crate::transport::Transport;

const MAX_REDIRECT_HOPS: usize = 10;

/// The bundled [`Transport`]: a `reqwest` client configured from an
/// [`HttpConfig`] snapshot.
#[derive(Debug, Clone)]
pub struct SharedClient {
    client: reqwest::Client,
}

impl SharedClient {
    pub fn from_config(config: &HttpConfig) -> Result<Self, EndpointBuildError> {
        Ok(Self { client: build_engine(config)? })
    }

    fn prepare(&self, request: ClientRequest) -> Result<reqwest::RequestBuilder, TransportError> {
        let expect_continue = request.expect_continue();
        let timeout = request.timeout();
        let (mut parts, body) = request.into_inner().into_parts();

        let url = reqwest::Url::parse(&parts.uri.to_string()).map_err(TransportError::protocol)?;
        debug!(method = %parts.method, url = %url, "dispatching wire request");

        // The binding keeps Expect off the wire map and hands over a flag.
        if expect_continue {
            parts.headers.entry(EXPECT).or_insert(HeaderValue::from_static("100-continue"));
        }

        let mut builder = self.client.request(parts.method, url).version(parts.version);

        if body.is_empty_payload() {
            // no payload, no body on the wire
        } else if let Some(bytes) = body.as_bytes() {
            builder = builder.body(bytes.clone());
        } else {
            if let Some(length) = body.length() {
                parts.headers.entry(CONTENT_LENGTH).or_insert(HeaderValue::from(length));
            }
            builder = builder.body(reqwest::Body::wrap_stream(body.into_data_stream()));
        }

        builder = builder.headers(parts.headers);

        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(builder)
    }
}

#[async_trait]
impl Transport for SharedClient {
    async fn send(&self, request: ClientRequest) -> Result<ClientResponse, TransportError> {
        let builder = self.prepare(request)?;
        let response = builder.send().await?;
        convert_response(response)
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::timeout(e)
        } else if e.is_connect() {
            Self::connect(e)
        } else {
            Self::protocol(e)
        }
    }
}

fn convert_response(response: reqwest::Response) -> Result<ClientResponse, TransportError> {
    let uri: Uri = response.url().as_str().parse().map_err(TransportError::protocol)?;
    let status = response.status();
    let headers = response.headers().clone();
    let body = ByteStream::new(response.bytes_stream().map(|chunk| chunk.map_err(io::Error::other)));
    Ok(ClientResponse::new(uri, status, headers, body))
}

fn build_engine(config: &HttpConfig) -> Result<reqwest::Client, EndpointBuildError> {
    if config.use_default_client() {
        return reqwest::Client::builder().build().map_err(EndpointBuildError::engine);
    }

    let mut builder = reqwest::Client::builder()
        .connect_timeout(config.connect_timeout())
        .pool_max_idle_per_host(config.max_connections())
        .redirect(redirect_policy(config.redirect_policy()));

    // Version preference: pin 1.1, or leave ALPN to negotiate upward.
    if config.version() == Version::HTTP_11 {
        builder = builder.http1_only();
    }

    if let Some((host, port)) = config.proxy()? {
        let proxy =
            reqwest::Proxy::all(format!("http://{host}:{port}")).map_err(EndpointBuildError::engine)?;
        builder = builder.proxy(proxy);
    }

    if let Some(priority) = config.http2_priority() {
        debug!(priority, "engine has no stream priority support, hint unused");
    }

    builder.build().map_err(EndpointBuildError::engine)
}

fn redirect_policy(policy: RedirectPolicy) -> redirect::Policy {
    match policy {
        RedirectPolicy::Never => redirect::Policy::none(),
        RedirectPolicy::Always => redirect::Policy::limited(MAX_REDIRECT_HOPS),
        RedirectPolicy::Normal => redirect::Policy::custom(|attempt| {
            if attempt.previous().len() >= MAX_REDIRECT_HOPS {
                return attempt.error("too many redirects");
            }
            let downgrade = attempt.url().scheme() == "http"
                && attempt.previous().last().is_some_and(|prior| prior.scheme() == "https");
            if downgrade { attempt.stop() } else { attempt.follow() }
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use bytes::Bytes;
    use ferry_binding::{HttpBinding, Message};

    use super::*;

    fn config(uri: &str) -> HttpConfig {
        HttpConfig::parse(uri).unwrap()
    }

    fn build(config: HttpConfig, setup: impl FnOnce(&mut Message)) -> ClientRequest {
        let binding = HttpBinding::new(Arc::new(config));
        let mut message = Message::new();
        setup(&mut message);
        binding.build_request(&mut message).unwrap()
    }

    #[test]
    fn engine_builds_for_every_redirect_policy() {
        for policy in [RedirectPolicy::Never, RedirectPolicy::Normal, RedirectPolicy::Always] {
            let mut config = config("http://h.example/");
            config.set_redirect_policy(policy);
            SharedClient::from_config(&config).unwrap();
        }
    }

    #[test]
    fn proxy_needs_its_port() {
        let mut config = config("http://h.example/");
        config.set_proxy_host("proxy.example");
        let err = SharedClient::from_config(&config).unwrap_err();
        assert!(matches!(err, EndpointBuildError::Config { .. }));
    }

    #[test]
    fn get_request_has_no_wire_body() {
        let client = SharedClient::from_config(&config("http://h.example/")).unwrap();
        let request = build(config("http://h.example/things"), |_| {});
        let prepared = client.prepare(request).unwrap().build().unwrap();
        assert_eq!(prepared.method().as_str(), "GET");
        assert_eq!(prepared.url().as_str(), "http://h.example/things");
        assert!(prepared.body().is_none());
    }

    #[test]
    fn buffered_body_goes_out_verbatim() {
        let client = SharedClient::from_config(&config("http://h.example/")).unwrap();
        let request = build(config("http://h.example/things"), |m| {
            m.set_body(Bytes::from_static(b"payload"));
        });
        let prepared = client.prepare(request).unwrap().build().unwrap();
        assert_eq!(prepared.method().as_str(), "POST");
        let body = prepared.body().and_then(reqwest::Body::as_bytes);
        assert_eq!(body, Some(b"payload".as_ref()));
    }

    #[test]
    fn stream_body_declares_its_length() {
        let client = SharedClient::from_config(&config("http://h.example/")).unwrap();
        let request = build(config("http://h.example/things"), |m| {
            m.set_body(ByteStream::new(futures::stream::iter([Ok::<_, io::Error>(
                Bytes::from_static(b"chunked data"),
            )])));
            m.set_header("Content-Length", "12");
        });
        let prepared = client.prepare(request).unwrap().build().unwrap();
        assert_eq!(prepared.headers().get(CONTENT_LENGTH).and_then(|v| v.to_str().ok()), Some("12"));
        // streaming bodies have no buffered representation
        assert_eq!(prepared.body().and_then(reqwest::Body::as_bytes), None);
    }

    #[test]
    fn expect_flag_restores_the_wire_header() {
        let client = SharedClient::from_config(&config("http://h.example/")).unwrap();
        let request = build(config("http://h.example/things"), |m| {
            m.set_body("ping");
            m.set_header("Expect", "100-continue");
        });
        let prepared = client.prepare(request).unwrap().build().unwrap();
        assert_eq!(
            prepared.headers().get(EXPECT).and_then(|v| v.to_str().ok()),
            Some("100-continue")
        );
    }

    #[test]
    fn response_timeout_reaches_the_engine_request() {
        let mut timed = config("http://h.example/");
        timed.set_response_timeout(Duration::from_secs(5));
        let client = SharedClient::from_config(&timed).unwrap();
        let request = build(timed, |_| {});
        let prepared = client.prepare(request).unwrap().build().unwrap();
        assert_eq!(prepared.timeout(), Some(&Duration::from_secs(5)));
    }
}
