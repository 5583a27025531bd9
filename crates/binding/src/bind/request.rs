//! Message to wire-request translation.

use http::header::{CONTENT_LENGTH, CONTENT_TYPE, EXPECT};
use http::{HeaderMap, HeaderName, HeaderValue, Method, Uri, Version};
use tokio_util::io::ReaderStream;
use tracing::debug;

use crate::body::{ByteStream, RequestBody};
use crate::charset::{Charset, content_type_charset};
use crate::config::{HttpConfig, is_supported_method, parse_method};
use crate::context::BindingContext;
use crate::error::RequestError;
use crate::filter::{HeaderFilter, is_restricted_header};
use crate::headers::{self, is_control_header};
use crate::message::{Body, Message};
use crate::uri::{self, UriOverrides};
use crate::wire::ClientRequest;

/// Builds the wire request for `message`.
///
/// The message body is always taken, even when the selected method sends
/// none, so a single-pass body is released no matter which method wins.
pub(crate) fn build_request(
    message: &mut Message,
    config: &HttpConfig,
    filter: &dyn HeaderFilter,
    context: &dyn BindingContext,
) -> Result<ClientRequest, RequestError> {
    let uri = resolve_target(message, config, context)?;
    let method = select_method(message, config)?;

    let body = message.take_body();
    let request_body = if matches!(method.as_str(), "PATCH" | "POST" | "PUT") {
        materialize_body(body, message, context)?
    } else {
        drop(body);
        RequestBody::empty()
    };

    let header_map = outbound_headers(message, config, filter)?;
    let expect_continue =
        message.header(EXPECT.as_str()).is_some_and(|value| value.trim().eq_ignore_ascii_case("100-continue"));
    let version = match non_blank(message.header(headers::HTTP_PROTOCOL_VERSION)) {
        Some(text) => parse_version(text).ok_or_else(|| RequestError::invalid_override("protocol version", text))?,
        None => config.version(),
    };

    debug!(method = %method, uri = %uri, version = ?version, "built wire request");

    let mut request = http::Request::new(request_body);
    *request.method_mut() = method;
    *request.uri_mut() = uri;
    *request.version_mut() = version;
    *request.headers_mut() = header_map;

    Ok(ClientRequest::new(request, expect_continue, config.response_timeout()))
}

fn resolve_target(message: &Message, config: &HttpConfig, context: &dyn BindingContext) -> Result<Uri, RequestError> {
    let base_text = match non_blank(message.header(headers::HTTP_URI)) {
        Some(uri) => uri.to_owned(),
        None => config.base_uri().to_string(),
    };
    let resolved = context.resolve_placeholders(&base_text)?;
    let base: Uri = resolved.parse().map_err(|e: http::uri::InvalidUri| RequestError::invalid_uri(format!("{e}: {resolved}")))?;

    let port = match non_blank(message.header(headers::HTTP_PORT)) {
        Some(text) => Some(text.parse::<u16>().map_err(|_| RequestError::invalid_override("port", text))?),
        None => None,
    };
    let overrides = UriOverrides {
        scheme: message.header(headers::HTTP_SCHEME),
        host: message.header(headers::HTTP_HOST),
        port,
        path: message.header(headers::HTTP_PATH),
        query: message.header(headers::HTTP_QUERY),
    };

    uri::resolve(&base, &overrides)
}

/// Fixed config override first, then the per-call method header, then
/// `POST`/`GET` depending on body presence.
fn select_method(message: &Message, config: &HttpConfig) -> Result<Method, RequestError> {
    if let Some(method) = config.method() {
        return Ok(method.clone());
    }

    if let Some(text) = non_blank(message.header(headers::HTTP_METHOD)) {
        let method = parse_method(text).ok_or_else(|| RequestError::unsupported_method(text))?;
        if !is_supported_method(&method) {
            return Err(RequestError::unsupported_method(text));
        }
        return Ok(method);
    }

    Ok(if message.has_body() { Method::POST } else { Method::GET })
}

fn materialize_body(body: Body, message: &Message, context: &dyn BindingContext) -> Result<RequestBody, RequestError> {
    match body {
        Body::Empty => Ok(RequestBody::empty()),
        Body::Prepared(prepared) => Ok(prepared),
        Body::Bytes(bytes) => Ok(RequestBody::full(bytes)),
        Body::Text(text) => {
            let charset = text_charset(message, context)?;
            Ok(RequestBody::full(charset.encode(&text)))
        }
        Body::File(path) => {
            let file = std::fs::File::open(&path).map_err(RequestError::io)?;
            let length = file.metadata().map_err(RequestError::io)?.len();
            let stream = ReaderStream::new(tokio::fs::File::from_std(file));
            Ok(RequestBody::stream(ByteStream::new(stream).with_declared_length(length)))
        }
        Body::Stream(stream) => {
            let stream = match declared_content_length(message) {
                Some(length) => stream.with_declared_length(length),
                None => stream,
            };
            Ok(RequestBody::stream(stream))
        }
    }
}

/// Charset for a text body: the `Content-Type` parameter when the header is
/// present, else the message charset, else the context default.
fn text_charset(message: &Message, context: &dyn BindingContext) -> Result<Charset, RequestError> {
    match non_blank(message.header(CONTENT_TYPE.as_str())) {
        Some(content_type) => match content_type_charset(content_type) {
            Some(label) => Charset::parse(&label),
            None => Ok(context.default_charset()),
        },
        None => match message.charset() {
            Some(label) => Charset::parse(label),
            None => Ok(context.default_charset()),
        },
    }
}

fn declared_content_length(message: &Message) -> Option<u64> {
    message.header(CONTENT_LENGTH.as_str()).and_then(|value| value.trim().parse().ok())
}

/// Converts message headers into the wire header map.
///
/// Control headers never propagate; restricted names propagate only when
/// the config allow-list names them; everything else is put to the filter
/// per value. The bag iterates in case-insensitive name order, so the wire
/// map is populated in stable sorted order.
fn outbound_headers(message: &Message, config: &HttpConfig, filter: &dyn HeaderFilter) -> Result<HeaderMap, RequestError> {
    let mut map = HeaderMap::new();
    for (name, value) in message.headers().iter() {
        let name_str = name.as_str();
        if is_control_header(name_str) {
            continue;
        }
        if is_restricted_header(name_str) && !config.is_restricted_header_allowed(name_str) {
            continue;
        }

        let kept: Vec<&str> = value.iter().filter(|item| filter.keep_outbound(name_str, item)).collect();
        if kept.is_empty() {
            continue;
        }

        let header_name: HeaderName = name_str.parse().map_err(|e| RequestError::invalid_header(name_str, e))?;
        for item in kept {
            let header_value = HeaderValue::try_from(item).map_err(|e| RequestError::invalid_header(name_str, e))?;
            map.append(header_name.clone(), header_value);
        }
    }
    Ok(map)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_version(text: &str) -> Option<Version> {
    let digits = match text.get(..5) {
        Some(prefix) if prefix.eq_ignore_ascii_case("HTTP/") => &text[5..],
        _ => text,
    };
    match digits {
        "1.1" => Some(Version::HTTP_11),
        "2" | "2.0" => Some(Version::HTTP_2),
        _ => None,
    }
}
